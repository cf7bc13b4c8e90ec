use std::net::SocketAddr;

// Standalone entry point for `cargo run -p web-server`. The `vizfolio serve` subcommand is
// the usual way in; this one reads the same configuration sources.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = configuration::load_settings(None)?;
    let _guard = configuration::init_tracing(&settings.logging)?;

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    web_server::run_server(settings, addr).await
}
