use lobby_server::WebsocketServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let address = std::env::var("LOBBY_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let server = WebsocketServer::new(&address);
    server.run().await?;
    Ok(())
}
