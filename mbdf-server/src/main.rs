use mbdf_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, work dir, logging)
    setup_environment().map_err(|e| anyhow::anyhow!("Environment setup failed: {e}"))?;

    tracing::info!("MBDF Room Server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. State (database, migrations, JWT service)
    let state = ServerState::initialize(config.clone()).await?;

    // 4. HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}
