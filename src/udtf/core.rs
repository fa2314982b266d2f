//! The user-defined table function lifecycle
use super::configurations::UdtfConfigurations;
use super::parameters::UdfParameters;
use super::row::{Row, RowWindow};
use crate::collector::PointCollector;
use crate::error::{CollectorError, Result};

/// A user-defined table function.
///
/// The executor calls `validate`, then `before_start`, then `transform` once
/// per row (or `transform_window` once per window, depending on the access
/// strategy chosen in `before_start`), then `terminate`. `before_destroy`
/// runs last even when an earlier step failed.
pub trait Udtf {
    /// Name used in log messages
    fn name(&self) -> &str;

    /// Check the parameters before anything else runs
    fn validate(&self, _parameters: &UdfParameters) -> Result<()> {
        Ok(())
    }

    /// Read parameters and choose the output type and access strategy
    fn before_start(
        &mut self,
        parameters: &UdfParameters,
        configurations: &mut UdtfConfigurations,
    ) -> Result<()>;

    /// Process one row under `AccessStrategy::RowByRow`
    fn transform(&mut self, _row: &Row, _collector: &mut dyn PointCollector) -> Result<()> {
        Err(CollectorError::Udf(format!(
            "{} does not implement row-by-row transform",
            self.name()
        )))
    }

    /// Process one window under a sliding window strategy
    fn transform_window(
        &mut self,
        _window: &RowWindow<'_>,
        _collector: &mut dyn PointCollector,
    ) -> Result<()> {
        Err(CollectorError::Udf(format!(
            "{} does not implement window transform",
            self.name()
        )))
    }

    /// Emit any remaining points after the last row
    fn terminate(&mut self, _collector: &mut dyn PointCollector) -> Result<()> {
        Ok(())
    }

    /// Release resources
    fn before_destroy(&mut self) {}
}
