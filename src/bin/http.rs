#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::net::SocketAddr;

    use anyhow::Context;
    use semester_planner::{PlannerConfig, http_api};

    let filter = tracing_subscriber::EnvFilter::try_from_env("PLANNER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    let config_file = std::env::var_os("PLANNER_CONFIG").map(std::path::PathBuf::from);
    let config = PlannerConfig::load(config_file.as_deref())?;
    let taxonomy = config.taxonomy()?;
    let addr: SocketAddr = config
        .http_addr
        .parse()
        .with_context(|| format!("invalid PLANNER_HTTP_ADDR '{}'", config.http_addr))?;

    println!("semester-planner HTTP API listening on http://{addr}");
    http_api::serve(addr, taxonomy, config.planner_options()).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
