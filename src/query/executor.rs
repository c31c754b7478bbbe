use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::metrics;
use crate::query::result::QueryResult;

/// Error type for execution operations
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Query execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Query timeout")]
    Timeout,
    #[error("Malformed result payload: {0}")]
    MalformedResult(String),
}

/// Result type for execution operations
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// The external execution backend. Takes compiled Flux text and
/// returns the raw annotated-CSV payload.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, query: &str) -> ExecutionResult<String>;
}

/// Configuration for query execution
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Timeout for a single backend call
    pub timeout: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Lifecycle of the result view.
#[derive(Debug, Clone)]
pub enum RunState {
    Idle,
    Running,
    Succeeded(QueryResult),
    Failed(String),
}

/// Drives compiled query text to the execution backend.
///
/// `run` may be invoked while a request is already in flight; the
/// in-flight call is not cancelled, but only the last-submitted run
/// gets to publish its outcome. A backend failure is surfaced in the
/// state slot and never touches the selection.
#[derive(Clone)]
pub struct ExecutionCoordinator {
    backend: Arc<dyn ExecutionBackend>,
    config: ExecutionConfig,
    state: Arc<RwLock<RunState>>,
    last_query: Arc<RwLock<String>>,
    generation: Arc<Mutex<u64>>,
}

impl ExecutionCoordinator {
    pub fn new(backend: Arc<dyn ExecutionBackend>, config: ExecutionConfig) -> Self {
        Self {
            backend,
            config,
            state: Arc::new(RwLock::new(RunState::Idle)),
            last_query: Arc::new(RwLock::new(String::new())),
            generation: Arc::new(Mutex::new(0)),
        }
    }

    /// Submits `query` to the backend and transitions to Running. The
    /// outcome is published asynchronously unless a newer run has been
    /// submitted in the meantime.
    pub async fn run(&self, query: String) {
        let my_generation = {
            let mut generation = self.generation.lock().await;
            *generation += 1;
            *generation
        };

        *self.last_query.write().await = query.clone();
        *self.state.write().await = RunState::Running;

        let coordinator = self.clone();
        tokio::spawn(async move {
            let started = Instant::now();

            let outcome = tokio::select! {
                result = coordinator.backend.execute(&query) => result,
                _ = tokio::time::sleep(coordinator.config.timeout) => Err(ExecutionError::Timeout),
            };
            metrics::record_query(started.elapsed().as_secs_f64() * 1000.0);

            let next = match outcome.and_then(|payload| {
                QueryResult::parse_annotated_csv(&payload)
                    .map_err(|e| ExecutionError::MalformedResult(e.to_string()))
            }) {
                Ok(result) => RunState::Succeeded(result),
                Err(e) => {
                    warn!("Query run failed: {}", e);
                    RunState::Failed(e.to_string())
                }
            };

            // Last-submitted run wins; a superseded outcome is dropped.
            let generation = coordinator.generation.lock().await;
            if *generation == my_generation {
                *coordinator.state.write().await = next;
            } else {
                debug!("Dropping superseded run outcome");
            }
        });
    }

    pub async fn state(&self) -> RunState {
        self.state.read().await.clone()
    }

    /// Closes the result view. The last compiled query text is kept.
    pub async fn close_result(&self) {
        *self.state.write().await = RunState::Idle;
    }

    pub async fn last_query(&self) -> String {
        self.last_query.read().await.clone()
    }
}
