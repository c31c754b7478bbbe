use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while fetching catalog entries
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to list buckets: {0}")]
    BucketFetch(String),
    #[error("Failed to list measurements for bucket {0}: {1}")]
    MeasurementFetch(String, String),
    #[error("Failed to list fields for {0}/{1}: {2}")]
    FieldFetch(String, String, String),
    #[error("Invalid catalog fixture: {0}")]
    InvalidFixture(String),
}

/// Result type for catalog source operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// The external, read-only source of selectable buckets, measurements,
/// and fields.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_buckets(&self) -> CatalogResult<Vec<String>>;
    async fn list_measurements(&self, bucket: &str) -> CatalogResult<Vec<String>>;
    async fn list_fields(&self, bucket: &str, measurement: &str) -> CatalogResult<Vec<String>>;
}

/// Schema query an InfluxDB-backed source posts to enumerate the
/// measurements of a bucket.
pub fn measurements_query(bucket: &str) -> String {
    format!(
        "import \"influxdata/influxdb/schema\"\nschema.measurements(bucket: \"{}\")",
        bucket
    )
}

/// Schema query an InfluxDB-backed source posts to enumerate the field
/// keys of a measurement within a bucket.
pub fn field_keys_query(bucket: &str, measurement: &str) -> String {
    format!(
        "import \"influxdata/influxdb/schema\"\nschema.fieldKeys(bucket: \"{}\", predicate: (r) => (r._measurement == \"{}\"))",
        bucket, measurement
    )
}

#[derive(Debug, Deserialize)]
struct FixtureMeasurement {
    name: String,
    #[serde(default)]
    fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FixtureBucket {
    name: String,
    #[serde(default)]
    measurements: Vec<FixtureMeasurement>,
}

/// In-memory catalog source backed by a JSON fixture. Used by the demo
/// binary and by tests.
pub struct StaticCatalogSource {
    buckets: Vec<String>,
    measurements: HashMap<String, Vec<String>>,
    fields: HashMap<(String, String), Vec<String>>,
}

impl StaticCatalogSource {
    /// Builds a source from a fixture of the shape
    /// `[{"name": "b1", "measurements": [{"name": "m1", "fields": ["f1"]}]}]`.
    pub fn from_json(fixture: &str) -> CatalogResult<Self> {
        let parsed: Vec<FixtureBucket> = serde_json::from_str(fixture)
            .map_err(|e| CatalogError::InvalidFixture(e.to_string()))?;

        let mut buckets = Vec::new();
        let mut measurements = HashMap::new();
        let mut fields = HashMap::new();
        for bucket in parsed {
            buckets.push(bucket.name.clone());
            let mut names = Vec::new();
            for measurement in bucket.measurements {
                names.push(measurement.name.clone());
                fields.insert(
                    (bucket.name.clone(), measurement.name),
                    measurement.fields,
                );
            }
            measurements.insert(bucket.name, names);
        }

        Ok(Self {
            buckets,
            measurements,
            fields,
        })
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn list_buckets(&self) -> CatalogResult<Vec<String>> {
        Ok(self.buckets.clone())
    }

    async fn list_measurements(&self, bucket: &str) -> CatalogResult<Vec<String>> {
        self.measurements
            .get(bucket)
            .cloned()
            .ok_or_else(|| {
                CatalogError::MeasurementFetch(bucket.to_string(), "unknown bucket".to_string())
            })
    }

    async fn list_fields(&self, bucket: &str, measurement: &str) -> CatalogResult<Vec<String>> {
        self.fields
            .get(&(bucket.to_string(), measurement.to_string()))
            .cloned()
            .ok_or_else(|| {
                CatalogError::FieldFetch(
                    bucket.to_string(),
                    measurement.to_string(),
                    "unknown measurement".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"[
        {"name": "b1", "measurements": [
            {"name": "m1", "fields": ["f1", "f2"]},
            {"name": "m2", "fields": []}
        ]},
        {"name": "b2"}
    ]"#;

    #[tokio::test]
    async fn test_static_source_lookups() {
        let source = StaticCatalogSource::from_json(FIXTURE).unwrap();

        let buckets = source.list_buckets().await.unwrap();
        assert_eq!(buckets, vec!["b1".to_string(), "b2".to_string()]);

        let measurements = source.list_measurements("b1").await.unwrap();
        assert_eq!(measurements, vec!["m1".to_string(), "m2".to_string()]);

        let fields = source.list_fields("b1", "m1").await.unwrap();
        assert_eq!(fields, vec!["f1".to_string(), "f2".to_string()]);

        assert!(matches!(
            source.list_measurements("nope").await,
            Err(CatalogError::MeasurementFetch(_, _))
        ));
    }

    #[test]
    fn test_invalid_fixture() {
        assert!(matches!(
            StaticCatalogSource::from_json("not json"),
            Err(CatalogError::InvalidFixture(_))
        ));
    }

    #[test]
    fn test_schema_query_shapes() {
        let q = measurements_query("b1");
        assert!(q.contains("schema.measurements(bucket: \"b1\")"));

        let q = field_keys_query("b1", "m1");
        assert!(q.contains("schema.fieldKeys(bucket: \"b1\""));
        assert!(q.contains("r._measurement == \"m1\""));
    }
}
