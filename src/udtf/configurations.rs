use crate::error::{CollectorError, Result};
use crate::types::DataType;

/// How input rows are delivered to a UDTF
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessStrategy {
    /// One `transform` call per row
    #[default]
    RowByRow,
    /// Windows of `size` rows, a new one every `step` rows
    SlidingSizeWindow { size: usize, step: usize },
    /// Half-open time windows of `interval`, a new one every `step`
    SlidingTimeWindow {
        interval: i64,
        step: i64,
        start: Option<i64>,
        end: Option<i64>,
    },
}

impl AccessStrategy {
    /// Tumbling size window, step equals size
    pub fn size_window(size: usize) -> Self {
        AccessStrategy::SlidingSizeWindow { size, step: size }
    }

    /// Tumbling time window over the whole input range
    pub fn time_window(interval: i64) -> Self {
        AccessStrategy::SlidingTimeWindow {
            interval,
            step: interval,
            start: None,
            end: None,
        }
    }

    pub fn check(&self) -> Result<()> {
        match self {
            AccessStrategy::RowByRow => Ok(()),
            AccessStrategy::SlidingSizeWindow { size, step } => {
                if *size == 0 || *step == 0 {
                    return Err(CollectorError::Config(format!(
                        "Size window needs positive size and step, got size={} step={}",
                        size, step
                    )));
                }
                Ok(())
            }
            AccessStrategy::SlidingTimeWindow {
                interval,
                step,
                start,
                end,
            } => {
                if *interval <= 0 || *step <= 0 {
                    return Err(CollectorError::Config(format!(
                        "Time window needs positive interval and step, got interval={} step={}",
                        interval, step
                    )));
                }
                if let (Some(start), Some(end)) = (start, end) {
                    if end <= start {
                        return Err(CollectorError::Config(format!(
                            "Time window end {} is not after start {}",
                            end, start
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

/// Settings a UDTF chooses in `before_start`
#[derive(Debug, Clone, Default)]
pub struct UdtfConfigurations {
    output_type: Option<DataType>,
    access_strategy: AccessStrategy,
}

impl UdtfConfigurations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the single data type the UDTF will put into its collector
    pub fn set_output_data_type(&mut self, data_type: DataType) -> &mut Self {
        self.output_type = Some(data_type);
        self
    }

    pub fn set_access_strategy(&mut self, strategy: AccessStrategy) -> &mut Self {
        self.access_strategy = strategy;
        self
    }

    pub fn output_data_type(&self) -> Option<DataType> {
        self.output_type
    }

    pub fn access_strategy(&self) -> &AccessStrategy {
        &self.access_strategy
    }

    /// Validate the configuration and return the output type
    pub fn check(&self) -> Result<DataType> {
        let output_type = self.output_type.ok_or_else(|| {
            CollectorError::Config("Output data type was not set in before_start".to_string())
        })?;
        self.access_strategy.check()?;
        Ok(output_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_type_is_required() {
        let mut configs = UdtfConfigurations::new();
        assert!(matches!(configs.check(), Err(CollectorError::Config(_))));

        configs.set_output_data_type(DataType::Double);
        assert_eq!(configs.check().unwrap(), DataType::Double);
        assert_eq!(configs.access_strategy(), &AccessStrategy::RowByRow);
    }

    #[test]
    fn test_window_strategies_are_validated() {
        let mut configs = UdtfConfigurations::new();
        configs
            .set_output_data_type(DataType::Int64)
            .set_access_strategy(AccessStrategy::size_window(0));
        assert!(configs.check().is_err());

        configs.set_access_strategy(AccessStrategy::SlidingTimeWindow {
            interval: 10,
            step: 5,
            start: Some(100),
            end: Some(100),
        });
        assert!(configs.check().is_err());

        configs.set_access_strategy(AccessStrategy::time_window(10));
        assert!(configs.check().is_ok());
    }
}
