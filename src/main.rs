use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let cli = waiterbot_runtime::config::Cli::parse();
    if let Err(e) = waiterbot_runtime::runtime::run(&cli) {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
