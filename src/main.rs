use std::process::ExitCode;

fn main() -> ExitCode {
    modlife::app::startup::run()
}
