use library_server::{config::ServerConfig, init_logging, run, Result};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = ServerConfig::load()?;
    run(args).await
}
