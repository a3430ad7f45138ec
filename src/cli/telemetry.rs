//! Log output and optional OTLP trace export for the session server.

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::{SdkTracerProvider, Tracer},
    Resource,
};
use std::{env::var, str::FromStr, time::Duration};
use tracing::{debug, Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    EnvFilter, Layer, Registry,
};
use ulid::Ulid;

pub const ENV_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const SERVICE_NAMESPACE: &str = "identity";

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// How log events are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event, plus a record when each span closes.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// What the subscriber needs from the command line.
#[derive(Clone, Debug)]
pub struct Settings {
    pub level: Level,
    pub format: LogFormat,
    /// User pool region, recorded on exported traces.
    pub region: Option<String>,
}

fn collector_endpoint(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_end_matches('/');
    if raw.is_empty() {
        None
    } else if raw.starts_with("http://") || raw.starts_with("https://") {
        Some(raw.to_string())
    } else {
        Some(format!("https://{raw}"))
    }
}

fn resource_attributes(region: Option<&str>, instance_id: String) -> Vec<KeyValue> {
    let mut attributes = vec![
        KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
        KeyValue::new("service.namespace", SERVICE_NAMESPACE),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("service.instance.id", instance_id),
        KeyValue::new("vcs.revision", crate::GIT_COMMIT_HASH),
        KeyValue::new("cloud.provider", "aws"),
    ];
    if let Some(region) = region {
        attributes.push(KeyValue::new("cloud.region", region.to_string()));
    }
    attributes
}

fn cognito_tracer(endpoint: &str, region: Option<&str>) -> Result<Tracer> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(3))
        .build()?;

    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder_empty()
                .with_attributes(resource_attributes(region, instance_id))
                .build(),
        )
        .build();

    TRACER_PROVIDER
        .set(provider.clone())
        .map_err(|_| anyhow!("tracer provider already installed"))?;

    global::set_tracer_provider(provider.clone());
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));

    Ok(provider.tracer(env!("CARGO_PKG_NAME")))
}

/// `RUST_LOG` wins over `level`; SDK and transport internals stay quiet.
fn filter(level: Level) -> Result<EnvFilter> {
    Ok(EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("h2=warn".parse()?)
        .add_directive("aws_smithy_runtime=warn".parse()?)
        .add_directive("aws_sdk_cognitoidentityprovider=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?))
}

fn log_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer().with_target(false).with_file(false).with_line_number(false);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    }
}

/// Install the global subscriber. Spans are exported over OTLP/gRPC only when
/// [`ENV_OTLP_ENDPOINT`] is set.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built or a subscriber is already set.
pub fn init(settings: &Settings) -> Result<()> {
    let otel_layer = match var(ENV_OTLP_ENDPOINT).ok().as_deref().and_then(collector_endpoint) {
        Some(endpoint) => {
            let tracer = cognito_tracer(&endpoint, settings.region.as_deref())?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(filter(settings.level)?)
        .with(log_layer(settings.format))
        .with(otel_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Flush pending spans, if an exporter was installed.
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        debug!("flushing trace exporter");
        if let Err(err) = provider.shutdown() {
            debug!(error = %err, "trace exporter shutdown failed");
        }
    }
}
