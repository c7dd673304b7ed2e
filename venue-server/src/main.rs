use venue_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (.env, configuration, logging)
    let config = setup_environment()?;

    tracing::info!("Venue server starting...");

    // 2. State (work dir, event database)
    let state = ServerState::initialize(&config)?;

    // 3. HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
