use std::process::ExitCode;
use tg_code_relay::{logging, HttpForwarder, RelayConfig, SessionMonitor, TelegramTransport};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Set the required environment variables and run again");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init(&config.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        official_id = config.official_id,
        target = %format!("{}[code]", config.base_service_url),
        "Starting Telegram login-code relay"
    );

    let forwarder = match HttpForwarder::new(&config.base_service_url, config.forward_timeout) {
        Ok(forwarder) => forwarder,
        Err(e) => {
            error!(error = %e, "Cannot create HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let transport = TelegramTransport::new(&config);
    let mut monitor = SessionMonitor::new(transport, forwarder, config.official_id);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for interrupt signal");
            std::future::pending::<()>().await;
        }
    };

    match monitor.run(shutdown).await {
        Ok(()) => {
            info!("Relay stopped");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_fatal() => {
            error!(
                error = %e,
                category = %e.category(),
                "Relay cannot run until the configuration or session is fixed"
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, category = %e.category(), "Relay stopped with error");
            ExitCode::FAILURE
        }
    }
}
