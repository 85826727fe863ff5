//! Shared application state.

use conveyor_consume::ConsumptionEngine;
use conveyor_ingest::{IngestionGateway, RecordSink};
use conveyor_schema::{Catalog, Introspector, Provisioner};
use sqlx::PgPool;
use std::sync::Arc;

/// Everything the handlers need, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub introspector: Introspector,
    pub provisioner: Provisioner,
    pub engine: ConsumptionEngine,
    pub gateway: Arc<IngestionGateway>,
}

impl AppState {
    pub fn new(pool: PgPool, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            catalog: Catalog::new(pool.clone()),
            introspector: Introspector::new(pool.clone()),
            provisioner: Provisioner::new(pool.clone()),
            engine: ConsumptionEngine::new(pool.clone()),
            gateway: Arc::new(IngestionGateway::new(pool, sink)),
        }
    }
}
