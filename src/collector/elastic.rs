use log::{debug, trace, warn};
use std::collections::HashSet;

use super::config::{CollectorConfig, OrderingPolicy};
use super::core::PointCollector;
use crate::error::{CollectorError, Result};
use crate::types::{DataType, Point, PointBatch};

/// An in-memory collector that grows as points arrive and enforces the
/// output type and timestamp rules on every put
#[derive(Debug)]
pub struct ElasticPointCollector {
    config: CollectorConfig,
    points: Vec<Point>,
    /// Only populated under `OrderingPolicy::Unordered`
    seen: HashSet<i64>,
    /// Greatest timestamp collected so far
    last_timestamp: Option<i64>,
}

impl ElasticPointCollector {
    /// Create an unbounded, strictly ordered collector for `output_type`
    pub fn new(output_type: DataType) -> Self {
        Self::with_config(CollectorConfig::new(output_type))
    }

    /// Create a collector with custom configuration
    pub fn with_config(config: CollectorConfig) -> Self {
        Self {
            config,
            points: Vec::new(),
            seen: HashSet::new(),
            last_timestamp: None,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_timestamp
    }

    /// Points collected so far, in arrival order
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Take every collected point as a batch for `series`, sorted by
    /// timestamp, and reset the collector for reuse
    pub fn drain(&mut self, series: impl Into<String>) -> PointBatch {
        let mut points = std::mem::take(&mut self.points);
        if self.config.ordering == OrderingPolicy::Unordered {
            points.sort_by_key(|p| p.timestamp);
        }
        self.seen.clear();
        self.last_timestamp = None;

        let batch = PointBatch::new(series, self.config.output_type, points);
        debug!(
            "Drained {} {} points into batch for series '{}'",
            batch.len(),
            batch.data_type,
            batch.series
        );
        batch
    }

    fn check_timestamp(&self, timestamp: i64) -> Result<()> {
        match self.config.ordering {
            OrderingPolicy::Strict => match self.last_timestamp {
                Some(last) if timestamp == last => {
                    Err(CollectorError::DuplicateTimestamp(timestamp))
                }
                Some(last) if timestamp < last => {
                    Err(CollectorError::OutOfOrder { last, timestamp })
                }
                _ => Ok(()),
            },
            OrderingPolicy::Unordered => {
                if self.seen.contains(&timestamp) {
                    Err(CollectorError::DuplicateTimestamp(timestamp))
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl PointCollector for ElasticPointCollector {
    fn output_type(&self) -> DataType {
        self.config.output_type
    }

    fn collect(&mut self, point: Point) -> Result<()> {
        let actual = point.data_type();
        if actual != self.config.output_type {
            warn!(
                "Rejected {} point at {}: collector outputs {}",
                actual, point.timestamp, self.config.output_type
            );
            return Err(CollectorError::TypeMismatch {
                expected: self.config.output_type,
                actual,
            });
        }

        if let Err(e) = self.check_timestamp(point.timestamp) {
            warn!("Rejected point: {}", e);
            return Err(e);
        }

        if self.config.capacity > 0 && self.points.len() >= self.config.capacity {
            return Err(CollectorError::CapacityExceeded(self.config.capacity));
        }

        if self.config.ordering == OrderingPolicy::Unordered {
            self.seen.insert(point.timestamp);
        }
        self.last_timestamp = Some(
            self.last_timestamp
                .map_or(point.timestamp, |last| last.max(point.timestamp)),
        );

        trace!("Collected {} point at {}", actual, point.timestamp);
        self.points.push(point);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::CollectorConfigBuilder;
    use crate::types::{Binary, Value};

    fn put_matching(collector: &mut ElasticPointCollector, timestamp: i64) -> Result<()> {
        match collector.output_type() {
            DataType::Int32 => collector.put_int(timestamp, 7),
            DataType::Int64 => collector.put_long(timestamp, 7),
            DataType::Float => collector.put_float(timestamp, 0.5),
            DataType::Double => collector.put_double(timestamp, 0.25),
            DataType::Boolean => collector.put_boolean(timestamp, true),
            DataType::Text => {
                collector.put_binary(timestamp, Binary::from("b"))?;
                collector.put_string(timestamp + 1, "s")
            }
        }
    }

    #[test]
    fn test_each_put_matches_its_output_type() {
        let types = [
            DataType::Int32,
            DataType::Int64,
            DataType::Float,
            DataType::Double,
            DataType::Boolean,
            DataType::Text,
        ];

        for data_type in types {
            let mut collector = ElasticPointCollector::new(data_type);
            put_matching(&mut collector, 1).unwrap();
            assert!(!collector.is_empty());
            assert!(collector.points().iter().all(|p| p.data_type() == data_type));
        }
    }

    #[test]
    fn test_wrong_put_is_rejected() {
        let mut collector = ElasticPointCollector::new(DataType::Int32);

        let err = collector.put_long(1, 1).unwrap_err();
        assert!(matches!(
            err,
            CollectorError::TypeMismatch {
                expected: DataType::Int32,
                actual: DataType::Int64
            }
        ));
        assert!(err.is_contract_violation());
        assert!(collector.is_empty());
        assert_eq!(collector.last_timestamp(), None);
    }

    #[test]
    fn test_binary_and_string_both_fill_text_output() {
        let mut collector = ElasticPointCollector::new(DataType::Text);
        collector.put_binary(1, Binary::new(vec![0, 1, 2])).unwrap();
        collector.put_string(2, "two").unwrap();

        assert_eq!(collector.points()[0].value, Value::Binary(Binary::new(vec![0, 1, 2])));
        assert_eq!(collector.points()[1].value, Value::Text("two".to_string()));
    }

    #[test]
    fn test_strict_ordering_rejects_duplicate_and_earlier() {
        let mut collector = ElasticPointCollector::new(DataType::Double);
        collector.put_double(10, 1.0).unwrap();
        collector.put_double(20, 2.0).unwrap();

        assert!(matches!(
            collector.put_double(20, 3.0),
            Err(CollectorError::DuplicateTimestamp(20))
        ));
        assert!(matches!(
            collector.put_double(15, 3.0),
            Err(CollectorError::OutOfOrder { last: 20, timestamp: 15 })
        ));
        assert_eq!(collector.len(), 2);

        collector.put_double(21, 4.0).unwrap();
        assert_eq!(collector.last_timestamp(), Some(21));
    }

    #[test]
    fn test_unordered_detects_duplicates_and_sorts_on_drain() {
        let config = CollectorConfigBuilder::new(DataType::Int64)
            .ordering(OrderingPolicy::Unordered)
            .build();
        let mut collector = ElasticPointCollector::with_config(config);

        collector.put_long(30, 3).unwrap();
        collector.put_long(10, 1).unwrap();
        collector.put_long(20, 2).unwrap();
        assert!(matches!(
            collector.put_long(10, 9),
            Err(CollectorError::DuplicateTimestamp(10))
        ));
        assert_eq!(collector.last_timestamp(), Some(30));

        let batch = collector.drain("out");
        let timestamps: Vec<i64> = batch.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);
        assert_eq!(batch.data_type, DataType::Int64);
    }

    #[test]
    fn test_capacity_limit() {
        let config = CollectorConfigBuilder::new(DataType::Boolean)
            .capacity(2)
            .build();
        let mut collector = ElasticPointCollector::with_config(config);

        collector.put_boolean(1, true).unwrap();
        collector.put_boolean(2, false).unwrap();
        assert!(matches!(
            collector.put_boolean(3, true),
            Err(CollectorError::CapacityExceeded(2))
        ));
        assert_eq!(collector.last_timestamp(), Some(2));
    }

    #[test]
    fn test_drain_resets_collector() {
        let mut collector = ElasticPointCollector::new(DataType::Float);
        collector.put_float(5, 1.0).unwrap();

        let batch = collector.drain("series");
        assert_eq!(batch.series, "series");
        assert_eq!(batch.len(), 1);
        assert!(collector.is_empty());

        // Timestamp history is cleared along with the points
        collector.put_float(5, 2.0).unwrap();
        assert_eq!(collector.output_type(), DataType::Float);
    }

    #[test]
    fn test_negative_timestamps_are_ordered() {
        let mut collector = ElasticPointCollector::new(DataType::Int32);
        collector.put_int(-5, 1).unwrap();
        collector.put_int(0, 2).unwrap();
        assert!(collector.put_int(-1, 3).is_err());
    }
}
