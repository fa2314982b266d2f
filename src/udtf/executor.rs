use log::{debug, error, info};

use super::configurations::{AccessStrategy, UdtfConfigurations};
use super::core::Udtf;
use super::parameters::UdfParameters;
use super::row::{Row, RowWindow};
use crate::collector::{CollectorConfig, ElasticPointCollector, OrderingPolicy};
use crate::config::CollectorSettings;
use crate::error::{CollectorError, Result};
use crate::types::PointBatch;

/// Drives a UDTF through its lifecycle over a set of input rows
#[derive(Debug, Clone, Default)]
pub struct UdtfExecutor {
    capacity: usize,
    ordering: OrderingPolicy,
}

impl UdtfExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor whose collectors follow the collector settings
    pub fn from_settings(settings: &CollectorSettings) -> Self {
        Self {
            capacity: settings.capacity,
            ordering: settings.ordering,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Run `udtf` over `rows` and return its output as a batch for `series`.
    ///
    /// The first error from the UDTF or its collector stops the calculation.
    pub fn execute(
        &self,
        udtf: &mut dyn Udtf,
        parameters: &UdfParameters,
        rows: &[Row],
        series: &str,
    ) -> Result<PointBatch> {
        info!(
            "Executing UDTF {} over {} rows into '{}'",
            udtf.name(),
            rows.len(),
            series
        );

        let result = self.run(udtf, parameters, rows, series);
        udtf.before_destroy();

        match &result {
            Ok(batch) => info!(
                "UDTF {} produced {} points for '{}'",
                udtf.name(),
                batch.len(),
                series
            ),
            Err(e) => error!("UDTF {} stopped: {}", udtf.name(), e),
        }

        result
    }

    fn run(
        &self,
        udtf: &mut dyn Udtf,
        parameters: &UdfParameters,
        rows: &[Row],
        series: &str,
    ) -> Result<PointBatch> {
        udtf.validate(parameters)?;
        let mut configurations = UdtfConfigurations::new();
        udtf.before_start(parameters, &mut configurations)?;
        let output_type = configurations.check()?;
        check_rows(parameters, rows)?;

        let mut collector = ElasticPointCollector::with_config(CollectorConfig {
            output_type,
            capacity: self.capacity,
            ordering: self.ordering,
        });

        match configurations.access_strategy() {
            AccessStrategy::RowByRow => {
                for row in rows {
                    udtf.transform(row, &mut collector)?;
                }
            }
            AccessStrategy::SlidingSizeWindow { size, step } => {
                let mut delivered = 0usize;
                for window in size_windows(rows, *size, *step) {
                    udtf.transform_window(&window, &mut collector)?;
                    delivered += 1;
                }
                debug!("Delivered {} size windows to {}", delivered, udtf.name());
            }
            AccessStrategy::SlidingTimeWindow {
                interval,
                step,
                start,
                end,
            } => {
                let mut delivered = 0usize;
                for window in time_windows(rows, *interval, *step, *start, *end) {
                    udtf.transform_window(&window, &mut collector)?;
                    delivered += 1;
                }
                debug!("Delivered {} time windows to {}", delivered, udtf.name());
            }
        }

        udtf.terminate(&mut collector)?;

        Ok(collector.drain(series))
    }
}

/// Input rows must be strictly ascending and as wide as the declared inputs
fn check_rows(parameters: &UdfParameters, rows: &[Row]) -> Result<()> {
    for pair in rows.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(CollectorError::Udf(format!(
                "Input rows are not in ascending timestamp order: {} follows {}",
                pair[1].timestamp, pair[0].timestamp
            )));
        }
    }

    let width = parameters.input_count();
    if width > 0 {
        if let Some(row) = rows.iter().find(|r| r.size() != width) {
            return Err(CollectorError::Udf(format!(
                "Row at {} has {} values, expected {}",
                row.timestamp,
                row.size(),
                width
            )));
        }
    }

    Ok(())
}

/// Windows of up to `size` rows starting every `step` rows; never empty
pub fn size_windows(rows: &[Row], size: usize, step: usize) -> SizeWindows<'_> {
    SizeWindows {
        rows,
        size,
        step,
        next: (size > 0 && step > 0).then_some(0),
    }
}

/// Lazy iterator over size windows
#[derive(Debug, Clone)]
pub struct SizeWindows<'a> {
    rows: &'a [Row],
    size: usize,
    step: usize,
    next: Option<usize>,
}

impl<'a> Iterator for SizeWindows<'a> {
    type Item = RowWindow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let begin = self.next.filter(|&b| b < self.rows.len())?;
        let end = begin.saturating_add(self.size).min(self.rows.len());
        self.next = begin.checked_add(self.step);

        let slice = &self.rows[begin..end];
        let start_time = slice[0].timestamp;
        let end_time = slice[slice.len() - 1].timestamp.saturating_add(1);
        Some(RowWindow::new(slice, start_time, end_time))
    }
}

/// Half-open time windows `[t, t + interval)` every `step`, clipped to the
/// display range; empty windows are kept
pub fn time_windows(
    rows: &[Row],
    interval: i64,
    step: i64,
    start: Option<i64>,
    end: Option<i64>,
) -> TimeWindows<'_> {
    let begin = start.or_else(|| rows.first().map(|r| r.timestamp));
    let finish = end
        .or_else(|| rows.last().map(|r| r.timestamp.saturating_add(1)))
        .unwrap_or(i64::MIN);

    TimeWindows {
        rows,
        interval,
        step,
        next: begin.filter(|_| interval > 0 && step > 0),
        finish,
    }
}

/// Lazy iterator over time windows
#[derive(Debug, Clone)]
pub struct TimeWindows<'a> {
    rows: &'a [Row],
    interval: i64,
    step: i64,
    next: Option<i64>,
    finish: i64,
}

impl<'a> Iterator for TimeWindows<'a> {
    type Item = RowWindow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let window_start = self.next.filter(|&t| t < self.finish)?;
        let window_end = window_start.saturating_add(self.interval).min(self.finish);
        self.next = window_start.checked_add(self.step);

        let lo = self.rows.partition_point(|r| r.timestamp < window_start);
        let hi = self.rows.partition_point(|r| r.timestamp < window_end);
        Some(RowWindow::new(
            &self.rows[lo..hi.max(lo)],
            window_start,
            window_end,
        ))
    }
}
