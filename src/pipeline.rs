//! Stages finished UDTF output and writes it to a sink
use log::{debug, error, info};
use std::sync::Arc;

use crate::buffer::{BufferConfig, PointBuffer};
use crate::config::Settings;
use crate::error::Result;
use crate::retry::{RetryConfig, execute_with_retry};
use crate::sink::PointSink;
use crate::types::PointBatch;

pub struct OutputPipeline<S: PointSink> {
    buffer: PointBuffer,
    sink: Arc<S>,
    retry: RetryConfig,
}

impl<S: PointSink> OutputPipeline<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, BufferConfig::default(), RetryConfig::default())
    }

    pub fn with_config(sink: S, buffer: BufferConfig, retry: RetryConfig) -> Self {
        Self {
            buffer: PointBuffer::with_config(buffer),
            sink: Arc::new(sink),
            retry,
        }
    }

    pub fn from_settings(sink: S, settings: &Settings) -> Self {
        Self::with_config(sink, (&settings.buffer).into(), (&settings.retry).into())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    /// Stage a batch, then enforce the buffer limits
    pub fn accept(&self, batch: PointBatch) -> Result<usize> {
        let count = self.buffer.add_batch(batch)?;
        let dropped = self.buffer.cleanup()?;
        if dropped > 0 {
            info!("Dropped {} buffered points over limit", dropped);
        }
        Ok(count)
    }

    /// Write every staged series to the sink.
    ///
    /// A series whose write fails after retries goes back into the buffer in
    /// timestamp order; the last such error is returned once every series
    /// has been attempted.
    pub async fn flush(&self) -> Result<usize> {
        let mut written = 0;
        let mut failure = None;

        for series in self.buffer.series_names()? {
            let Some(batch) = self.buffer.take_for_series(&series)? else {
                continue;
            };
            if batch.is_empty() {
                continue;
            }

            let result = execute_with_retry(
                || {
                    let sink = Arc::clone(&self.sink);
                    let batch = &batch;
                    async move {
                        sink.write_points(&batch.series, batch.data_type, &batch.points)
                            .await
                    }
                },
                self.retry.clone(),
                &format!("write series '{}' to {}", series, self.sink.name()),
            )
            .await;

            match result {
                Ok(count) => {
                    debug!("Flushed {} points for series '{}'", count, series);
                    written += count;
                }
                Err(e) => {
                    error!("Failed to flush series '{}': {}", series, e);
                    let count = batch.len();
                    if let Err(restage_err) = self.buffer.restage(batch) {
                        error!(
                            "Lost {} points of series '{}' while re-staging: {}",
                            count, series, restage_err
                        );
                    }
                    failure = Some(e);
                }
            }
        }

        if failure.is_some() {
            let dropped = self.buffer.cleanup()?;
            if dropped > 0 {
                info!("Dropped {} re-staged points over limit", dropped);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }
}
