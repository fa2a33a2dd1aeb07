//! request-id-echo: a small HTTP service that shows the request-id layer at
//! work. Every response carries `X-Request-Id`, and `/echo` reports the
//! identifier its handler saw.

mod config;
mod server;

use config::EchoConfig;

fn main() -> anyhow::Result<()> {
    let config_path = {
        let args: Vec<String> = std::env::args().collect();
        args.iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1).cloned())
            .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
            .or_else(|| std::env::var("REQUEST_ID_CONFIG").ok())
            .unwrap_or_else(|| "request-id-echo.toml".to_string())
    };

    let config = EchoConfig::load(&config_path)?;

    // The tonic OTLP exporter needs a reactor, so build the runtime first.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let tracing_guard = request_id_tracing::init_tracing(&config.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            otlp_export = tracing_guard.is_exporting(),
            "Starting request-id-echo"
        );

        server::run(config).await
    })
}
