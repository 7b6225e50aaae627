mod cli;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli::run() {
        cli::RunOutcome::Serve { addr, config } => slambook::serve(addr, config).await,
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    }
}
