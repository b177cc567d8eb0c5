use assert_cmd::Command;

pub fn rfh_cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}
