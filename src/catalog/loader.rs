use std::sync::Arc;

use tracing::{debug, warn};

use super::source::CatalogSource;
use super::{Catalog, CatalogNode, ItemKind};
use crate::metrics;

/// Populates a [`Catalog`] from an external source.
///
/// The load order is buckets, then measurements per bucket, then fields
/// per (bucket, measurement) pair. A failed fetch inside a bucket's
/// subtree marks that bucket incomplete and moves on; it never aborts
/// the rest of the load, so partially loaded state stays interactive.
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Loads the full catalog. Total: fetch failures are contained to
    /// the affected bucket and logged.
    pub async fn load(&self) -> Catalog {
        let mut catalog = Catalog::new();

        let buckets = match self.source.list_buckets().await {
            Ok(buckets) => {
                metrics::record_catalog_fetch("buckets");
                buckets
            }
            Err(e) => {
                warn!("Catalog bucket listing failed: {}", e);
                return catalog;
            }
        };

        for bucket_name in buckets {
            match self.load_bucket(&bucket_name).await {
                Ok(bucket) => {
                    debug!(
                        "Loaded bucket {}: {} measurements",
                        bucket.name,
                        bucket.children.len()
                    );
                    catalog.push_bucket(bucket);
                }
                Err(partial) => {
                    // Keep the partial subtree visible but not draggable.
                    catalog.push_bucket(partial);
                    catalog.mark_incomplete(&bucket_name);
                }
            }
        }

        catalog
    }

    /// Loads one bucket's subtree. On any fetch failure the partial
    /// node built so far is returned as the error value.
    async fn load_bucket(&self, bucket_name: &str) -> Result<CatalogNode, CatalogNode> {
        let mut bucket = CatalogNode::new(ItemKind::Bucket, bucket_name);

        let measurements = match self.source.list_measurements(bucket_name).await {
            Ok(names) => {
                metrics::record_catalog_fetch("measurements");
                names
            }
            Err(e) => {
                warn!("Catalog measurement listing failed: {}", e);
                return Err(bucket);
            }
        };

        for measurement_name in measurements {
            let mut measurement = CatalogNode::new(ItemKind::Measurement, &measurement_name);
            match self.source.list_fields(bucket_name, &measurement_name).await {
                Ok(fields) => {
                    metrics::record_catalog_fetch("fields");
                    measurement.children = fields
                        .into_iter()
                        .map(|f| CatalogNode::new(ItemKind::Field, f))
                        .collect();
                    bucket.children.push(measurement);
                }
                Err(e) => {
                    warn!("Catalog field listing failed: {}", e);
                    bucket.children.push(measurement);
                    return Err(bucket);
                }
            }
        }

        Ok(bucket)
    }
}
