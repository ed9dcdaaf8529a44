use anyhow::Result;
use clap::Parser;
use gpumon::app;
use gpumon::config::Cli;
use gpumon::logging;
use tokio_util::sync::CancellationToken;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();
    let _guard = logging::init(&cli.log_file, cli.timezone)?;

    tracing::info!("Starting gpumon {}", &**version::VERSION);
    tracing::debug!("configuration: {cli:?}");

    let cancellation_token = CancellationToken::new();
    app::spawn_shutdown_listener(cancellation_token.clone())?;

    app::run(cli, cancellation_token).await
}
