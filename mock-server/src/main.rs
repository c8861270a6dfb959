use mock_homeserver::{Config, Homeserver};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Seeded account so a fresh server can be logged into straight away.
const DEMO_USER: (&str, &str) = ("alice", "wonderland");

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    let server = Homeserver::new(&config.server_name).with_user(DEMO_USER.0, DEMO_USER.1);
    tracing::info!(%addr, server_name = %server.server_name(), user = DEMO_USER.0, "listening");
    mock_homeserver::run(listener, server).await
}
