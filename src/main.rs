use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use deluge_incoming_port::{Args, Client, DelugeSink, HttpTransport, Renewer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .init();

    let transport = HttpTransport::new(&args.deluge_url)
        .with_context(|| format!("invalid Deluge URL {}", args.deluge_url))?;
    let mut sink = DelugeSink::new(transport);
    if let Some(password) = args.deluge_password {
        sink = sink.password(password);
    }
    let gateway = Client::new(args.gateway).lifetime(args.lifetime);

    info!(
        gateway = %args.gateway,
        deluge = %args.deluge_url,
        lifetime = args.lifetime,
        "Starting"
    );
    Renewer::new(gateway, sink).run().await;
    Ok(())
}
