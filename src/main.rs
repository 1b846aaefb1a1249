use clap::Parser;
use pizza_service::utils::error::{ErrorSeverity, ServiceError};
use pizza_service::utils::logger;
use pizza_service::{api, open_gateway, AppState, CliConfig};

fn exit_code(e: &ServiceError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 設定錯誤時 logger 尚未啟動，直接輸出到 stderr
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e).max(1));
        }
    };

    logger::init_logger(cli.verbose, config.log_level(), config.json_logs());

    tracing::info!("Starting pizza-service");
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    let gateway = match open_gateway(&config.database) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(
                "❌ Failed to open store: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(&e).max(1));
        }
    };

    let state = AppState::new(gateway);

    if let Some(seed) = &config.seed {
        let inserted = state.catalog.seed(seed).await?;
        if inserted > 0 {
            tracing::info!("🌱 Inserted {} seed rows", inserted);
        }
    }

    let addr = config.bind_address()?;
    api::serve(state, addr).await?;

    Ok(())
}
