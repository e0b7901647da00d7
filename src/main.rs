use std::process::ExitCode;

fn main() -> ExitCode {
    hawiya_lib::run()
}
