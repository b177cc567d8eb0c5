pub mod cmd;
pub mod project;
