use githerd::presentation::cli::CliApp;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; diagnostics stay on stderr behind GITHERD_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GITHERD_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Run the CLI application
    let app = CliApp::new();
    app.run().await
}
