use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "iam_onboard=info";

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        env_filter_or("iam_onboard=debug,info")
    } else {
        env_filter_or(DEFAULT_FILTER)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr) // stdout 留給 render / outputs
                .compact(),
        )
        .init();
}

/// JSON lines, one object per event, so CloudWatch Logs Insights can query
/// `user_name` / `email_found` directly.
pub fn init_lambda_logger() {
    tracing_subscriber::registry()
        .with(env_filter_or(DEFAULT_FILTER))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_target(false)
                .without_time(),
        )
        .init();
}
