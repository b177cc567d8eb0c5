use std::io::stdout;

use clap::CommandFactory;

use crate::args::{CliArgs, Completions};

pub fn run(args: &Completions) {
    clap_complete::generate(args.shell, &mut CliArgs::command(), "rfh", &mut stdout());
}
