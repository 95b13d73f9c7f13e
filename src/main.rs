use clap::Parser;
use phase_diagram_api::core::shutdown;
use phase_diagram_api::utils::logger;
use phase_diagram_api::{CliConfig, LogFormat, Server, ServerConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = ServerConfig::default();
    let server = match Server::bind(config.clone()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Error starting server on {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };

    // trap interrupt/terminate and hand it to the server as a cancellation
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = shutdown::wait_for_shutdown().await {
                tracing::warn!(
                    error = %e,
                    "Signal handler failed; falling back to ctrl_c()"
                );
                let _ = tokio::signal::ctrl_c().await;
            }
            cancel.cancel();
        });
    }

    if let Err(e) = server.run(cancel).await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
