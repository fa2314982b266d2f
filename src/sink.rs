use async_trait::async_trait;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc;

use crate::error::{CollectorError, Result};
use crate::types::{DataType, Point, PointBatch};

/// Destination for finished UDTF output
#[async_trait]
pub trait PointSink: Send + Sync + 'static {
    /// Write points of one series, returning how many were accepted
    async fn write_points(&self, series: &str, data_type: DataType, points: &[Point])
    -> Result<usize>;

    /// Check whether the sink can accept writes
    async fn health_check(&self) -> Result<bool>;

    /// Get a name for this sink
    fn name(&self) -> &str;
}

/// In-memory sink, mostly for tests
pub struct MemorySink {
    series: RwLock<HashMap<String, (DataType, Vec<Point>)>>,
    name: String,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            series: RwLock::new(HashMap::new()),
            name: name.into(),
        }
    }

    /// Points written so far for `series`
    pub fn points(&self, series: &str) -> Result<Vec<Point>> {
        let stored = self
            .series
            .read()
            .map_err(|_| CollectorError::Sink("Lock poisoned".to_string()))?;
        Ok(stored
            .get(series)
            .map(|(_, points)| points.clone())
            .unwrap_or_default())
    }

    pub fn data_type(&self, series: &str) -> Result<Option<DataType>> {
        let stored = self
            .series
            .read()
            .map_err(|_| CollectorError::Sink("Lock poisoned".to_string()))?;
        Ok(stored.get(series).map(|(data_type, _)| *data_type))
    }

    /// Names of every series written to
    pub fn series(&self) -> Result<Vec<String>> {
        let stored = self
            .series
            .read()
            .map_err(|_| CollectorError::Sink("Lock poisoned".to_string()))?;
        Ok(stored.keys().cloned().collect())
    }
}

#[async_trait]
impl PointSink for MemorySink {
    async fn write_points(
        &self,
        series: &str,
        data_type: DataType,
        points: &[Point],
    ) -> Result<usize> {
        let mut stored = self
            .series
            .write()
            .map_err(|_| CollectorError::Sink("Lock poisoned".to_string()))?;

        let entry = stored
            .entry(series.to_string())
            .or_insert_with(|| (data_type, Vec::new()));
        if entry.0 != data_type {
            return Err(CollectorError::TypeMismatch {
                expected: entry.0,
                actual: data_type,
            });
        }

        entry.1.extend_from_slice(points);
        trace!("Stored {} points for series '{}' in {}", points.len(), series, self.name);
        Ok(points.len())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Forwards each write as a batch on a channel
pub struct ChannelSink {
    sender: mpsc::Sender<PointBatch>,
    name: String,
}

impl ChannelSink {
    /// Create a sink and the receiver its batches arrive on
    pub fn new(name: impl Into<String>, buffer_size: usize) -> (Self, mpsc::Receiver<PointBatch>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        (
            Self {
                sender,
                name: name.into(),
            },
            receiver,
        )
    }
}

#[async_trait]
impl PointSink for ChannelSink {
    async fn write_points(
        &self,
        series: &str,
        data_type: DataType,
        points: &[Point],
    ) -> Result<usize> {
        let batch = PointBatch::new(series, data_type, points.to_vec());
        let count = batch.len();

        self.sender
            .send(batch)
            .await
            .map_err(|_| CollectorError::Sink(format!("{}: receiver closed", self.name)))?;

        debug!("Sent batch of {} points for series '{}'", count, series);
        Ok(count)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.sender.is_closed())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
