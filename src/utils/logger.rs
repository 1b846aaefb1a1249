use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 根據設定組出 EnvFilter；RUST_LOG 優先
fn build_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = match (verbose, level) {
            (true, _) => "pizza_service=debug,tower_http=debug,info".to_string(),
            (false, Some(level)) => format!("pizza_service={},tower_http={}", level, level),
            (false, None) => "pizza_service=info,tower_http=info".to_string(),
        };
        EnvFilter::new(directive)
    })
}

pub fn init_logger(verbose: bool, level: Option<&str>, json: bool) {
    let filter = build_filter(verbose, level);

    if json {
        // JSON 格式方便集中式日誌收集
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init();
    }
}
