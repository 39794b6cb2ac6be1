//! `oapigen` binary.

fn main() {
    oapigen_cli::init_tracing();
    std::process::exit(oapigen_cli::run(std::env::args().collect()));
}
