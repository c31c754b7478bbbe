use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod catalog;
mod selection;
mod query;
mod metrics;

use catalog::loader::CatalogLoader;
use catalog::source::StaticCatalogSource;
use catalog::ItemKind;
use query::executor::{
    ExecutionBackend, ExecutionConfig, ExecutionCoordinator, ExecutionResult, RunState,
};
use selection::board::{DropRequested, DropTarget, QueryBoard};
use selection::item::{FilterBounds, SelectionItem, DATE_RANGE};

const DEMO_CATALOG: &str = r#"[
    {"name": "telemetry", "measurements": [
        {"name": "cpu", "fields": ["usage_user", "usage_system"]},
        {"name": "mem", "fields": ["used_percent"]}
    ]},
    {"name": "sensors", "measurements": [
        {"name": "airSensors", "fields": ["temperature", "humidity"]}
    ]}
]"#;

/// Backend that echoes a canned result instead of talking to InfluxDB.
struct DemoBackend;

#[async_trait]
impl ExecutionBackend for DemoBackend {
    async fn execute(&self, _query: &str) -> ExecutionResult<String> {
        Ok("\
,result,table,_time,_value,_field,_measurement
,,0,2024-01-01T00:05:00Z,12.5,usage_user,cpu
,,0,2024-01-01T00:10:00Z,13.1,usage_user,cpu
"
        .to_string())
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(true)
        .pretty()
        .init();

    // Initialize metrics
    let metrics_addr = SocketAddr::from(([127, 0, 0, 1], 9090));
    if let Err(e) = metrics::init_metrics(metrics_addr) {
        eprintln!("Failed to initialize metrics: {}", e);
    } else {
        info!("Metrics server listening on {}", metrics_addr);
    }

    info!("Starting FLUXBOARD demo...");

    let source = StaticCatalogSource::from_json(DEMO_CATALOG).expect("demo catalog fixture");
    let catalog = Arc::new(CatalogLoader::new(Arc::new(source)).load().await);
    info!("Catalog loaded: {} buckets", catalog.buckets().len());

    // Assemble a query the way a drag session would.
    let mut board = QueryBoard::new(catalog);
    board.handle_drop(DropRequested {
        candidate: SelectionItem::from_catalog(ItemKind::Bucket, "telemetry"),
        target: DropTarget::Gap(0),
    });
    board.handle_drop(DropRequested {
        candidate: SelectionItem::from_catalog(ItemKind::Measurement, "cpu"),
        target: DropTarget::Gap(1),
    });
    board.handle_drop(DropRequested {
        candidate: SelectionItem::from_catalog(ItemKind::Field, "usage_user"),
        target: DropTarget::Gap(2),
    });
    board.handle_drop(DropRequested {
        candidate: SelectionItem::filter(DATE_RANGE),
        target: DropTarget::Gap(0),
    });
    board.set_filter_bounds(0, FilterBounds::new("-1h", ""));

    info!("Compiled query:\n{}", board.flux());

    let coordinator = ExecutionCoordinator::new(Arc::new(DemoBackend), ExecutionConfig::default());
    coordinator.run(board.flux().to_string()).await;

    loop {
        match coordinator.state().await {
            RunState::Running => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            RunState::Succeeded(result) => {
                info!("Query returned {} rows", result.row_count());
                break;
            }
            RunState::Failed(error) => {
                info!("Query failed: {}", error);
                break;
            }
            RunState::Idle => break,
        }
    }
}
