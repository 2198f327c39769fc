use clap::Parser;
use duckgen::config::setup_logging;
use duckgen::web::AppState;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = duckgen::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let state = match AppState::from_cli(&cli) {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to initialise: {}", err);
            return;
        }
    };

    if let Err(err) =
        duckgen::web::setup_server(&cli.listen_address, cli.port, &cli.storage_dir, state).await
    {
        error!("Application error: {}", err);
    }
}
