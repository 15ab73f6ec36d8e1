use autometrics::prometheus_exporter::{self, PrometheusResponse};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

lazy_static! {
    pub static ref LEADERSHIP_BATCHES_SENT: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "leadership_batches_sent",
            "Leadership update batches delivered per destination node"
        ),
        &["peer_id"]
    )
    .expect("metric can not be created");

    pub static ref LEADERSHIP_BATCHES_FAILED: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "leadership_batches_failed",
            "Leadership update batches that failed delivery per destination node"
        ),
        &["peer_id"]
    )
    .expect("metric can not be created");

    pub static ref LEADERSHIP_UPDATES_APPLIED: IntCounter = IntCounter::new(
        "leadership_updates_applied",
        "Leadership facts applied into the local metadata cache"
    )
    .expect("metric can not be created");

    pub static ref LEADERSHIP_UPDATES_STALE: IntCounter = IntCounter::new(
        "leadership_updates_stale",
        "Leadership facts discarded as stale by term ordering"
    )
    .expect("metric can not be created");

    pub static ref BOOTSTRAP_ATTEMPTS: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "bootstrap_attempts",
            "Startup metadata pull attempts per candidate node"
        ),
        &["peer_id"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

fn register_custom_metrics() {
    REGISTRY
        .register(Box::new(LEADERSHIP_BATCHES_SENT.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(LEADERSHIP_BATCHES_FAILED.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(LEADERSHIP_UPDATES_APPLIED.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(LEADERSHIP_UPDATES_STALE.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(BOOTSTRAP_ATTEMPTS.clone()))
        .expect("collector can be registered");
}

pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    register_custom_metrics();

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    let (_, server) = warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
        let _ = shutdown_signal.changed().await;
    });
    server.await;
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        eprintln!("could not encode custom metrics: {}", e);
    };
    let mut res = match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };

    let autometrics_metrics = get_metrics_body();
    res.push_str(&autometrics_metrics);
    Ok(res)
}

/// Export metrics for Prometheus to scrape
pub fn get_metrics_body() -> String {
    let autometrics_response = prometheus_exporter::encode_http_response();
    autometrics_response.into_body()
}

/// Export metrics for Prometheus to scrape
pub fn get_metrics() -> PrometheusResponse {
    prometheus_exporter::encode_http_response()
}
