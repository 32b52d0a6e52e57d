//! Logging, trace propagation, and the portal's Prometheus metrics.
//!
//! # Purpose
//! Installs the tracing subscriber (with OTLP export when an endpoint is
//! configured), extracts W3C trace context from incoming requests, and owns
//! the names and descriptions of every metric the portal records.
//!
//! # Key invariants
//! - Handlers and the store record metrics only through the names declared
//!   here, so `/metrics` always carries a `# HELP` line for them.
//! - Initialization runs once per process; later calls return the same
//!   Prometheus handle.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOGINS_TOTAL: &str = "internhub_logins_total";
pub const REGISTRATIONS_TOTAL: &str = "internhub_registrations_total";
pub const USERS_TOTAL: &str = "internhub_users_total";
pub const ANNOUNCEMENTS_TOTAL: &str = "internhub_announcements_total";
pub const ANNOUNCEMENTS_CREATED_TOTAL: &str = "internhub_announcements_created_total";
pub const CERTIFICATES_TOTAL: &str = "internhub_certificates_total";
pub const CERTIFICATES_UPLOADED_TOTAL: &str = "internhub_certificates_uploaded_total";
pub const CERTIFICATE_DOWNLOADS_TOTAL: &str = "internhub_certificate_downloads_total";
pub const MESSAGES_SENT_TOTAL: &str = "internhub_messages_sent_total";
pub const MEETINGS_TOTAL: &str = "internhub_meetings_total";

enum MetricKind {
    Counter,
    Gauge,
}

const PORTAL_METRICS: &[(&str, MetricKind, &str)] = &[
    (LOGINS_TOTAL, MetricKind::Counter, "Login attempts by outcome"),
    (REGISTRATIONS_TOTAL, MetricKind::Counter, "Accounts created through verified registration"),
    (USERS_TOTAL, MetricKind::Gauge, "Registered accounts"),
    (ANNOUNCEMENTS_TOTAL, MetricKind::Gauge, "Stored announcements"),
    (ANNOUNCEMENTS_CREATED_TOTAL, MetricKind::Counter, "Announcements posted"),
    (CERTIFICATES_TOTAL, MetricKind::Gauge, "Stored certificates"),
    (CERTIFICATES_UPLOADED_TOTAL, MetricKind::Counter, "Certificates uploaded"),
    (CERTIFICATE_DOWNLOADS_TOTAL, MetricKind::Counter, "Certificate downloads by their owners"),
    (MESSAGES_SENT_TOTAL, MetricKind::Counter, "Direct messages sent"),
    (MEETINGS_TOTAL, MetricKind::Gauge, "Stored meetings"),
];

static TRACING_INIT: OnceLock<()> = OnceLock::new();
static PROPAGATOR_INIT: OnceLock<()> = OnceLock::new();
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_observability(service_name: &str) -> PrometheusHandle {
    TRACING_INIT.get_or_init(|| {
        install_propagator();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer());
        match build_tracer_provider(service_name) {
            Some(provider) => {
                let tracer = provider.tracer(service_name.to_string());
                let _ = registry
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .try_init();
            }
            None => {
                let _ = registry.try_init();
            }
        }
    });
    install_metrics_recorder()
}

fn install_propagator() {
    PROPAGATOR_INIT.get_or_init(|| {
        global::set_text_map_propagator(TraceContextPropagator::new());
    });
}

/// OTLP export is opt-in through the standard `OTEL_EXPORTER_OTLP_ENDPOINT`.
fn build_tracer_provider(
    service_name: &str,
) -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;
    let attributes = resource_attributes(service_name, |key| std::env::var(key).ok());
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    Some(
        opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(Resource::builder_empty().with_attributes(attributes).build())
            .build(),
    )
}

fn resource_attributes(
    service_name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<KeyValue> {
    let mut attrs = vec![KeyValue::new("service.name", service_name.to_string())];
    if let Some(instance) = lookup("INTERNHUB_SERVICE_INSTANCE_ID").or_else(|| lookup("HOSTNAME")) {
        attrs.push(KeyValue::new("service.instance.id", instance));
    }
    if let Some(environment) = lookup("DEPLOYMENT_ENVIRONMENT") {
        attrs.push(KeyValue::new("deployment.environment", environment));
    }
    attrs
}

/// Parent context for a request span, from `traceparent`/`tracestate`.
pub fn trace_context_from_headers(headers: &axum::http::HeaderMap) -> opentelemetry::Context {
    install_propagator();
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

struct HeaderExtractor<'a>(&'a axum::http::HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

fn install_metrics_recorder() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            match metrics::set_global_recorder(recorder) {
                Ok(()) => describe_portal_metrics(),
                // Another recorder owns the global slot; this handle renders empty.
                Err(err) => tracing::warn!(error = %err, "metrics recorder already installed"),
            }
            handle
        })
        .clone()
}

fn describe_portal_metrics() {
    for (name, kind, help) in PORTAL_METRICS {
        match kind {
            MetricKind::Counter => metrics::describe_counter!(*name, *help),
            MetricKind::Gauge => metrics::describe_gauge!(*name, *help),
        }
    }
}

pub fn metrics_router(handle: PrometheusHandle) -> axum::Router {
    axum::Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    )
}

pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics listening");
    axum::serve(listener, metrics_router(handle).into_make_service()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppState, AuthSettings, build_router};
    use crate::auth::keys::generate_signing_key;
    use crate::auth::session_token::SessionSigner;
    use crate::store::memory::InMemoryStore;
    use crate::store::seed::demo_data;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use opentelemetry::trace::{TraceContextExt, TraceId};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn attribute(attrs: &[KeyValue], key: &str) -> Option<String> {
        attrs
            .iter()
            .find(|attr| attr.key.as_str() == key)
            .map(|attr| attr.value.to_string())
    }

    #[test]
    fn instance_id_prefers_portal_setting_over_hostname() {
        let env = HashMap::from([
            ("INTERNHUB_SERVICE_INSTANCE_ID", "portal-1"),
            ("HOSTNAME", "pod-abc"),
            ("DEPLOYMENT_ENVIRONMENT", "staging"),
        ]);
        let attrs = resource_attributes("internhub-portal", |key| {
            env.get(key).map(|value| value.to_string())
        });
        assert_eq!(attribute(&attrs, "service.name").as_deref(), Some("internhub-portal"));
        assert_eq!(attribute(&attrs, "service.instance.id").as_deref(), Some("portal-1"));
        assert_eq!(attribute(&attrs, "deployment.environment").as_deref(), Some("staging"));

        let attrs = resource_attributes("internhub-portal", |key| {
            (key == "HOSTNAME").then(|| "pod-abc".to_string())
        });
        assert_eq!(attribute(&attrs, "service.instance.id").as_deref(), Some("pod-abc"));
        assert!(attribute(&attrs, "deployment.environment").is_none());
    }

    #[test]
    fn request_spans_continue_the_caller_trace() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            "traceparent",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
                .parse()
                .expect("header"),
        );
        let context = trace_context_from_headers(&headers);
        let span = context.span();
        assert!(span.span_context().is_valid());
        assert_eq!(
            span.span_context().trace_id(),
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").expect("trace id")
        );

        let context = trace_context_from_headers(&axum::http::HeaderMap::new());
        assert!(!context.span().span_context().is_valid());
    }

    #[test]
    fn every_metric_name_is_portal_scoped_and_unique() {
        let mut names: Vec<&str> = PORTAL_METRICS.iter().map(|(name, _, _)| *name).collect();
        assert!(names.iter().all(|name| name.starts_with("internhub_")));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PORTAL_METRICS.len());
    }

    #[tokio::test]
    async fn login_counter_renders_on_metrics_endpoint() {
        let handle = install_metrics_recorder();
        let state = AppState {
            api_version: "v1".to_string(),
            store: Arc::new(InMemoryStore::seeded(demo_data(chrono::Utc::now()))),
            signer: Arc::new(SessionSigner::new(&generate_signing_key()).expect("signer")),
            auth: AuthSettings::default(),
        };
        let login = Request::post("/v1/login")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"email":"intern@renu.org","password":"password","role":"participant"}"#,
            ))
            .expect("request");
        let response = build_router(state).oneshot(login).await.expect("login");
        assert_eq!(response.status(), StatusCode::OK);

        let response = metrics_router(handle)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("metrics");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let rendered = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert!(rendered.contains(r#"internhub_logins_total{outcome="success"}"#));
        assert!(rendered.contains("# HELP internhub_logins_total Login attempts by outcome"));
        assert!(rendered.contains("internhub_users_total"));
    }
}
