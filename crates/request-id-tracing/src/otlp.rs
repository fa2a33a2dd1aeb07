//! Subscriber initialization with optional OTLP export.

use anyhow::Result;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{OtlpProtocol, TracingConfig};

/// Flushes and shuts down the tracer provider on drop.
///
/// Hold it for the lifetime of the process.
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl TracingGuard {
    /// Whether spans are being exported over OTLP.
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(ref mut provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shutdown tracer provider: {e}");
            }
        }
    }
}

fn env_filter(config: &TracingConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn fmt_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
}

/// Install the global subscriber: fmt logging to stderr, plus OTLP export
/// when `otlp_endpoint` is set.
///
/// An exporter that fails to build is logged and skipped; the service keeps
/// running with fmt-only output.
pub fn init_tracing(config: &TracingConfig) -> TracingGuard {
    let Some(endpoint) = config.otlp_endpoint.clone() else {
        init_fmt_only(config);
        return TracingGuard { provider: None };
    };

    match try_init_with_otlp(config, &endpoint) {
        Ok(guard) => guard,
        Err(e) => {
            init_fmt_only(config);
            tracing::warn!(
                error = %e,
                endpoint = %endpoint,
                "OTLP exporter failed to initialize, running with fmt-only tracing"
            );
            TracingGuard { provider: None }
        }
    }
}

fn init_fmt_only(config: &TracingConfig) {
    tracing_subscriber::registry()
        .with(fmt_layer())
        .with(env_filter(config))
        .init();
}

fn try_init_with_otlp(config: &TracingConfig, endpoint: &str) -> Result<TracingGuard> {
    let exporter = match config.protocol {
        OtlpProtocol::Grpc => opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?,
        OtlpProtocol::Http => opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .build()?,
    };

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder_empty()
                .with_service_name(config.service_name.clone())
                .build(),
        )
        .build();

    let tracer = provider.tracer(config.service_name.clone());

    tracing_subscriber::registry()
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(fmt_layer())
        .with(env_filter(config))
        .init();

    tracing::info!(
        endpoint = %endpoint,
        service = %config.service_name,
        protocol = ?config.protocol,
        "OpenTelemetry OTLP tracing initialized"
    );

    Ok(TracingGuard {
        provider: Some(provider),
    })
}
