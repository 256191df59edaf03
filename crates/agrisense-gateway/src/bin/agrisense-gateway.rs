//! AgriSense Gateway Binary
//!
//! # Usage
//! ```bash
//! agrisense-gateway [--port 8080] [--host 127.0.0.1] [--config gateway.json] [--verbose]
//! ```

use agrisense_advisor::AdvisorConfig;
use agrisense_gateway::{Gateway, GatewayConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// AgriSense Gateway - land, crop, growth and remedy advice over HTTP
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON gateway configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Seconds to wait for the completion provider
    #[arg(long)]
    ai_timeout: Option<u64>,

    /// Do not keep lands, plans or tracking history
    #[arg(long)]
    no_persistence: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::default().with_advisor(AdvisorConfig::from_env()?),
    };
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(secs) = args.ai_timeout {
        config.advisor = config.advisor.with_timeout_secs(secs);
    }
    if args.no_persistence {
        config = config.with_persistence(false);
    }

    print_banner(&config);

    let gateway = Gateway::from_config(config)?;
    gateway.start().await?;

    Ok(())
}

fn print_banner(config: &GatewayConfig) {
    println!();
    println!("AgriSense Gateway v{}", agrisense_gateway::VERSION);
    println!("   http://{}:{}", config.host, config.port);
    println!();
    println!("   GET  /health");
    println!("   POST /api/land/analyze");
    println!("   POST /api/crops/recommend");
    println!("   POST /api/crops/plan");
    println!("   POST /api/growth/insights");
    println!("   POST /api/organic/solution");
    println!("   GET  /api/organic/solutions");
    println!("   GET  /api/dashboard");
    println!();
    println!("Press Ctrl+C to stop the gateway");
    println!();
}
