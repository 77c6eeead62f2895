use quantum_preview_engine::server::PreviewServer;

fn main() {
    init_tracing();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "preview engine listening on stdio"
    );

    if let Err(e) = PreviewServer::default().run() {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

// Diagnostics go to stderr; stdout is reserved for the NDJSON protocol.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
