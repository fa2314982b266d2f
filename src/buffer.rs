use log::{debug, info, trace};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{CollectorError, Result};
use crate::types::{DataType, Point, PointBatch};

/// Configuration for the output buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BufferConfig {
    /// Maximum points to hold per series
    pub max_per_series: usize,

    /// Total maximum buffer size across all series
    pub max_total: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_per_series: 10_000,
            max_total: 100_000,
        }
    }
}

/// Staged output of one series
#[derive(Debug)]
struct SeriesBuffer {
    data_type: DataType,
    points: Vec<Point>,
}

/// Points waiting to be written to a sink, keyed by series name
pub struct PointBuffer {
    buffer: RwLock<HashMap<String, SeriesBuffer>>,

    /// Configuration for buffer management
    config: BufferConfig,
}

impl PointBuffer {
    /// Create a new point buffer with default configuration
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// Create a new point buffer with custom configuration
    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            buffer: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Stage a batch; a series keeps the data type of its first batch
    pub fn add_batch(&self, batch: PointBatch) -> Result<usize> {
        self.stage(batch, false)
    }

    /// Put back a batch that failed to write, keeping the series in
    /// timestamp order ahead of anything staged since it was taken
    pub fn restage(&self, batch: PointBatch) -> Result<usize> {
        self.stage(batch, true)
    }

    fn stage(&self, batch: PointBatch, reorder: bool) -> Result<usize> {
        let mut buffer = self
            .buffer
            .write()
            .map_err(|_| CollectorError::Buffer("Lock poisoned".to_string()))?;

        let count = batch.points.len();
        let entry = buffer
            .entry(batch.series.clone())
            .or_insert_with(|| SeriesBuffer {
                data_type: batch.data_type,
                points: Vec::new(),
            });

        if entry.data_type != batch.data_type {
            return Err(CollectorError::TypeMismatch {
                expected: entry.data_type,
                actual: batch.data_type,
            });
        }

        entry.points.extend(batch.points);
        if reorder {
            entry.points.sort_by_key(|p| p.timestamp);
        }
        trace!("Buffered {} points for series '{}'", count, batch.series);

        Ok(count)
    }

    /// Get all series names in the buffer
    pub fn series_names(&self) -> Result<Vec<String>> {
        let buffer = self
            .buffer
            .read()
            .map_err(|_| CollectorError::Buffer("Lock poisoned".to_string()))?;
        Ok(buffer.keys().cloned().collect())
    }

    /// Get and remove the points of one series
    pub fn take_for_series(&self, series: &str) -> Result<Option<PointBatch>> {
        let mut buffer = self
            .buffer
            .write()
            .map_err(|_| CollectorError::Buffer("Lock poisoned".to_string()))?;

        match buffer.remove(series) {
            Some(staged) => {
                debug!(
                    "Removed {} buffered points for series '{}'",
                    staged.points.len(),
                    series
                );
                Ok(Some(PointBatch::new(series, staged.data_type, staged.points)))
            }
            None => Ok(None),
        }
    }

    /// Enforce the size limits, dropping the oldest points first
    pub fn cleanup(&self) -> Result<usize> {
        let mut total_removed = 0;

        let mut buffer = self
            .buffer
            .write()
            .map_err(|_| CollectorError::Buffer("Lock poisoned".to_string()))?;

        // Per-series limit keeps the newest points
        for (series, staged) in buffer.iter_mut() {
            if staged.points.len() > self.config.max_per_series {
                staged.points.sort_by_key(|p| p.timestamp);
                let excess = staged.points.len() - self.config.max_per_series;
                staged.points.drain(..excess);
                debug!(
                    "Truncated {} excess buffered points for series '{}'",
                    excess, series
                );
                total_removed += excess;
            }
        }

        buffer.retain(|_, staged| !staged.points.is_empty());

        let total_buffered: usize = buffer.values().map(|s| s.points.len()).sum();

        if total_buffered > self.config.max_total {
            let mut to_remove = total_buffered - self.config.max_total;
            info!(
                "Total buffer size ({}) exceeds maximum ({}), removing {} oldest points",
                total_buffered, self.config.max_total, to_remove
            );
            total_removed += to_remove;

            for staged in buffer.values_mut() {
                staged.points.sort_by_key(|p| p.timestamp);
            }

            // Everything older than the cutoff goes; ties at the cutoff are
            // dropped in series name order
            let mut timestamps: Vec<i64> = buffer
                .values()
                .flat_map(|s| s.points.iter().map(|p| p.timestamp))
                .collect();
            let cutoff = *timestamps.select_nth_unstable(to_remove - 1).1;

            for staged in buffer.values_mut() {
                let older = staged.points.partition_point(|p| p.timestamp < cutoff);
                staged.points.drain(..older);
                to_remove -= older;
            }

            let mut names: Vec<String> = buffer.keys().cloned().collect();
            names.sort();
            for name in names {
                if to_remove == 0 {
                    break;
                }
                if let Some(staged) = buffer.get_mut(&name) {
                    let ties = staged
                        .points
                        .partition_point(|p| p.timestamp <= cutoff)
                        .min(to_remove);
                    staged.points.drain(..ties);
                    to_remove -= ties;
                }
            }

            buffer.retain(|_, staged| !staged.points.is_empty());
        }

        Ok(total_removed)
    }

    /// Get the total number of buffered points
    pub fn total_count(&self) -> Result<usize> {
        let buffer = self
            .buffer
            .read()
            .map_err(|_| CollectorError::Buffer("Lock poisoned".to_string()))?;
        Ok(buffer.values().map(|s| s.points.len()).sum())
    }

    /// Get the number of series in the buffer
    pub fn series_count(&self) -> Result<usize> {
        let buffer = self
            .buffer
            .read()
            .map_err(|_| CollectorError::Buffer("Lock poisoned".to_string()))?;
        Ok(buffer.len())
    }

    /// Get count of points for a specific series
    pub fn count_for_series(&self, series: &str) -> Result<usize> {
        let buffer = self
            .buffer
            .read()
            .map_err(|_| CollectorError::Buffer("Lock poisoned".to_string()))?;
        Ok(buffer.get(series).map_or(0, |s| s.points.len()))
    }
}

impl Default for PointBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn batch(series: &str, timestamps: &[i64]) -> PointBatch {
        let points = timestamps
            .iter()
            .map(|&t| Point::new(t, Value::Double(t as f64)))
            .collect();
        PointBatch::new(series, DataType::Double, points)
    }

    #[test]
    fn test_add_and_take() {
        let buffer = PointBuffer::new();
        buffer.add_batch(batch("a", &[1, 2])).unwrap();
        buffer.add_batch(batch("a", &[3])).unwrap();
        buffer.add_batch(batch("b", &[1])).unwrap();

        assert_eq!(buffer.total_count().unwrap(), 4);
        assert_eq!(buffer.series_count().unwrap(), 2);
        assert_eq!(buffer.count_for_series("a").unwrap(), 3);

        let taken = buffer.take_for_series("a").unwrap().unwrap();
        assert_eq!(taken.len(), 3);
        assert_eq!(taken.data_type, DataType::Double);
        assert!(buffer.take_for_series("a").unwrap().is_none());
        assert_eq!(buffer.series_names().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_series_type_is_fixed() {
        let buffer = PointBuffer::new();
        buffer.add_batch(batch("a", &[1])).unwrap();

        let other = PointBatch::new("a", DataType::Int32, vec![Point::new(2, Value::Int32(2))]);
        assert!(matches!(
            buffer.add_batch(other),
            Err(CollectorError::TypeMismatch { .. })
        ));
        assert_eq!(buffer.count_for_series("a").unwrap(), 1);
    }

    #[test]
    fn test_cleanup_per_series_keeps_newest() {
        let buffer = PointBuffer::with_config(BufferConfig {
            max_per_series: 2,
            max_total: 100,
        });
        buffer.add_batch(batch("a", &[1, 2, 3, 4])).unwrap();

        assert_eq!(buffer.cleanup().unwrap(), 2);
        let kept = buffer.take_for_series("a").unwrap().unwrap();
        let timestamps: Vec<i64> = kept.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![3, 4]);
    }

    #[test]
    fn test_cleanup_global_limit_drops_oldest_across_series() {
        let buffer = PointBuffer::with_config(BufferConfig {
            max_per_series: 100,
            max_total: 3,
        });
        buffer.add_batch(batch("a", &[1, 5])).unwrap();
        buffer.add_batch(batch("b", &[2, 3])).unwrap();
        buffer.add_batch(batch("c", &[0])).unwrap();

        assert_eq!(buffer.cleanup().unwrap(), 2);
        assert_eq!(buffer.total_count().unwrap(), 3);
        assert_eq!(buffer.count_for_series("c").unwrap(), 0);
        assert_eq!(buffer.count_for_series("a").unwrap(), 1);
        assert_eq!(buffer.count_for_series("b").unwrap(), 2);
        assert_eq!(buffer.series_count().unwrap(), 2);
    }

    #[test]
    fn test_cleanup_global_limit_on_one_large_series() {
        let buffer = PointBuffer::with_config(BufferConfig {
            max_per_series: 1_000_000,
            max_total: 1_000,
        });
        let timestamps: Vec<i64> = (0..200_000).rev().collect();
        buffer.add_batch(batch("big", &timestamps)).unwrap();

        assert_eq!(buffer.cleanup().unwrap(), 199_000);
        let kept = buffer.take_for_series("big").unwrap().unwrap();
        assert_eq!(kept.len(), 1_000);
        assert_eq!(kept.points[0].timestamp, 199_000);
        assert_eq!(kept.points[999].timestamp, 199_999);
    }

    #[test]
    fn test_cleanup_global_limit_breaks_ties_by_series_name() {
        let buffer = PointBuffer::with_config(BufferConfig {
            max_per_series: 100,
            max_total: 3,
        });
        buffer.add_batch(batch("b", &[5, 7])).unwrap();
        buffer.add_batch(batch("a", &[5, 6])).unwrap();

        assert_eq!(buffer.cleanup().unwrap(), 1);
        assert_eq!(buffer.count_for_series("a").unwrap(), 1);
        assert_eq!(buffer.count_for_series("b").unwrap(), 2);
    }

    #[test]
    fn test_restage_puts_older_points_first() {
        let buffer = PointBuffer::new();
        buffer.add_batch(batch("a", &[3, 4])).unwrap();
        buffer.restage(batch("a", &[1, 2])).unwrap();

        let taken = buffer.take_for_series("a").unwrap().unwrap();
        let timestamps: Vec<i64> = taken.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![1, 2, 3, 4]);

        let other = PointBatch::new("a", DataType::Int32, vec![Point::new(0, Value::Int32(0))]);
        buffer.add_batch(batch("a", &[5])).unwrap();
        assert!(buffer.restage(other).is_err());
        assert_eq!(buffer.count_for_series("a").unwrap(), 1);
    }
}
