use thermo_gateway::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, logging)
    setup_environment()?;

    // 2. Load configuration
    let config = Config::from_env();
    print_banner(&config);

    tracing::info!("Thermo gateway starting...");

    // 3. Initialize server state (CUPS backend)
    let state = ServerState::new(config.clone());

    // 4. Run the HTTP server
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
