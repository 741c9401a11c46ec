use market_server::core::{Config, Server};
use market_server::utils::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let log_level = std::env::var("LOG_LEVEL").ok();
    logger::init_logger_with_file(log_level.as_deref(), config.log_dir.as_deref());

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "starting marketplace server"
    );

    Server::new(config).run().await
}
