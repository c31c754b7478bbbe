//! Deterministic Flux pipeline compiler.
//!
//! One fixed pipeline shape is generated: from → range → measurement
//! filter → field filter → value lower bound → value upper bound, each
//! stage emitted only when its inputs are present. Compilation is a
//! total function; an empty selection compiles to the empty string.

use crate::catalog::ItemKind;
use crate::selection::item::{DATE_RANGE, VALUE_RANGE};
use crate::selection::list::SelectionList;

/// Builder for one Flux query program.
#[derive(Debug, Clone, Default)]
pub struct FluxQuery {
    bucket: Option<String>,
    start_time: Option<String>,
    stop_time: Option<String>,
    min_value: Option<String>,
    max_value: Option<String>,
    measurements: Vec<String>,
    fields: Vec<String>,
}

impl FluxQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source bucket. Only the first bucket wins; later calls
    /// are ignored, matching the one-bucket-per-query pipeline shape.
    pub fn set_bucket(&mut self, bucket: impl Into<String>) -> &mut Self {
        if self.bucket.is_none() {
            self.bucket = Some(bucket.into());
        }
        self
    }

    /// Sets the time range. An empty stop bound defaults to `now()`.
    pub fn set_date_range(
        &mut self,
        start: impl Into<String>,
        stop: impl Into<String>,
    ) -> &mut Self {
        let stop = stop.into();
        self.start_time = Some(start.into());
        self.stop_time = Some(if stop.is_empty() {
            "now()".to_string()
        } else {
            stop
        });
        self
    }

    pub fn add_measurement(&mut self, measurement: impl Into<String>) -> &mut Self {
        self.measurements.push(measurement.into());
        self
    }

    pub fn add_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.push(field.into());
        self
    }

    pub fn set_value_range(
        &mut self,
        min: impl Into<String>,
        max: impl Into<String>,
    ) -> &mut Self {
        self.min_value = Some(min.into());
        self.max_value = Some(max.into());
        self
    }

    /// Builds the Flux program text. Deterministic: the same builder
    /// state always yields byte-identical output.
    pub fn build(&self) -> String {
        let mut query = String::new();

        let bucket = match &self.bucket {
            Some(bucket) => bucket,
            None => return query,
        };
        query.push_str(&format!("from(bucket: \"{}\")\n", bucket));

        if let (Some(start), Some(stop)) = (&self.start_time, &self.stop_time) {
            if !start.is_empty() {
                query.push_str(&format!("|> range(start: {}, stop: {})\n", start, stop));
            }
        }

        if !self.measurements.is_empty() {
            let tests: Vec<String> = self
                .measurements
                .iter()
                .map(|m| format!("r._measurement == \"{}\"", m))
                .collect();
            query.push_str(&format!("|> filter(fn: (r) => {})\n", tests.join(" or ")));
        }

        if !self.fields.is_empty() {
            let tests: Vec<String> = self
                .fields
                .iter()
                .map(|f| format!("r._field == \"{}\"", f))
                .collect();
            query.push_str(&format!("|> filter(fn: (r) => {})\n", tests.join(" or ")));
        }

        if let Some(min) = &self.min_value {
            if bound_present(min) {
                query.push_str(&format!("|> filter(fn: (r) => r._value >= {})\n", min));
            }
        }
        if let Some(max) = &self.max_value {
            if bound_present(max) {
                query.push_str(&format!("|> filter(fn: (r) => r._value <= {})\n", max));
            }
        }

        query
    }
}

/// A value bound is absent when empty or numerically zero. The zero
/// case is a known quirk of the observed behavior, kept as-is; bounds
/// that do not parse as numbers are emitted verbatim.
fn bound_present(bound: &str) -> bool {
    !bound.is_empty() && bound.parse::<f64>().map_or(true, |v| v != 0.0)
}

/// Compiles the selection into Flux text. Pure and total: invalid or
/// bucketless selections yield the empty string, never an error.
pub fn compile(main: &SelectionList, filters: &SelectionList) -> String {
    let mut query = FluxQuery::new();

    for item in main.iter() {
        match item.kind {
            ItemKind::Bucket => {
                query.set_bucket(&item.name);
            }
            ItemKind::Measurement => {
                query.add_measurement(&item.name);
            }
            ItemKind::Field => {
                query.add_field(&item.name);
            }
            ItemKind::Filter => {}
        }
    }

    for item in filters.iter() {
        if item.kind != ItemKind::Filter {
            continue;
        }
        let bounds = item.bounds.clone().unwrap_or_default();
        match item.name.as_str() {
            DATE_RANGE => {
                query.set_date_range(bounds.min, bounds.max);
            }
            VALUE_RANGE => {
                query.set_value_range(bounds.min, bounds.max);
            }
            _ => {}
        }
    }

    query.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::item::{FilterBounds, SelectionItem};

    fn item(kind: ItemKind, name: &str) -> SelectionItem {
        SelectionItem::from_catalog(kind, name)
    }

    fn filter(name: &str, min: &str, max: &str) -> SelectionItem {
        let mut item = SelectionItem::filter(name);
        item.bounds = Some(FilterBounds::new(min, max));
        item
    }

    #[test]
    fn test_bucket_only() {
        let main = SelectionList::from_items(vec![item(ItemKind::Bucket, "b1")]);
        assert_eq!(
            compile(&main, &SelectionList::new()),
            "from(bucket: \"b1\")\n"
        );
    }

    #[test]
    fn test_no_bucket_yields_empty_program() {
        assert_eq!(compile(&SelectionList::new(), &SelectionList::new()), "");
    }

    #[test]
    fn test_bucket_and_measurement() {
        let main = SelectionList::from_items(vec![
            item(ItemKind::Bucket, "b1"),
            item(ItemKind::Measurement, "m1"),
        ]);
        assert_eq!(
            compile(&main, &SelectionList::new()),
            "from(bucket: \"b1\")\n|> filter(fn: (r) => r._measurement == \"m1\")\n"
        );
    }

    #[test]
    fn test_or_combined_stages() {
        let main = SelectionList::from_items(vec![
            item(ItemKind::Bucket, "b1"),
            item(ItemKind::Measurement, "m1"),
            item(ItemKind::Field, "f1"),
            item(ItemKind::Field, "f2"),
            item(ItemKind::Measurement, "m2"),
        ]);
        let text = compile(&main, &SelectionList::new());
        assert!(text.contains(
            "|> filter(fn: (r) => r._measurement == \"m1\" or r._measurement == \"m2\")\n"
        ));
        assert!(text.contains("|> filter(fn: (r) => r._field == \"f1\" or r._field == \"f2\")\n"));
    }

    #[test]
    fn test_only_first_bucket_wins() {
        let main = SelectionList::from_items(vec![
            item(ItemKind::Bucket, "b1"),
            item(ItemKind::Bucket, "b2"),
        ]);
        assert_eq!(
            compile(&main, &SelectionList::new()),
            "from(bucket: \"b1\")\n"
        );
    }

    #[test]
    fn test_date_range_defaults_stop_to_now() {
        let main = SelectionList::from_items(vec![item(ItemKind::Bucket, "b1")]);
        let filters = SelectionList::from_items(vec![filter(DATE_RANGE, "-7d", "")]);
        assert_eq!(
            compile(&main, &filters),
            "from(bucket: \"b1\")\n|> range(start: -7d, stop: now())\n"
        );

        let filters = SelectionList::from_items(vec![filter(DATE_RANGE, "-7d", "-1d")]);
        assert!(compile(&main, &filters).contains("|> range(start: -7d, stop: -1d)\n"));
    }

    #[test]
    fn test_date_range_without_start_is_omitted() {
        let main = SelectionList::from_items(vec![item(ItemKind::Bucket, "b1")]);
        let filters = SelectionList::from_items(vec![filter(DATE_RANGE, "", "-1d")]);
        assert_eq!(compile(&main, &filters), "from(bucket: \"b1\")\n");
    }

    #[test]
    fn test_value_range_bounds() {
        let main = SelectionList::from_items(vec![item(ItemKind::Bucket, "b1")]);
        let filters = SelectionList::from_items(vec![filter(VALUE_RANGE, "1.5", "99")]);
        assert_eq!(
            compile(&main, &filters),
            "from(bucket: \"b1\")\n|> filter(fn: (r) => r._value >= 1.5)\n|> filter(fn: (r) => r._value <= 99)\n"
        );
    }

    #[test]
    fn test_zero_bound_is_treated_as_absent() {
        // Known quirk: a bound of literal zero never emits its stage.
        let main = SelectionList::from_items(vec![item(ItemKind::Bucket, "b1")]);
        let filters = SelectionList::from_items(vec![filter(VALUE_RANGE, "0", "10")]);
        assert_eq!(
            compile(&main, &filters),
            "from(bucket: \"b1\")\n|> filter(fn: (r) => r._value <= 10)\n"
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let main = SelectionList::from_items(vec![
            item(ItemKind::Bucket, "b1"),
            item(ItemKind::Measurement, "m1"),
            item(ItemKind::Field, "f1"),
        ]);
        let filters = SelectionList::from_items(vec![
            filter(DATE_RANGE, "2024-01-01T00:00:00Z", ""),
            filter(VALUE_RANGE, "3", "7"),
        ]);
        assert_eq!(compile(&main, &filters), compile(&main, &filters));
    }
}
