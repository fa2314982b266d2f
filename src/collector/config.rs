use serde::Deserialize;

use crate::types::DataType;

/// How a collector treats the order of incoming timestamps
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    /// Timestamps must be strictly ascending
    #[default]
    Strict,
    /// Any order is accepted; output is sorted when drained
    Unordered,
}

/// Configuration for a point collector
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// The single data type the collector accepts
    pub output_type: DataType,
    /// Maximum number of points held, 0 for no limit
    pub capacity: usize,
    /// Timestamp ordering rule
    pub ordering: OrderingPolicy,
}

impl CollectorConfig {
    pub fn new(output_type: DataType) -> Self {
        Self {
            output_type,
            capacity: 0,
            ordering: OrderingPolicy::default(),
        }
    }
}

/// Builder for collector configuration
pub struct CollectorConfigBuilder {
    config: CollectorConfig,
}

impl CollectorConfigBuilder {
    /// Create a new collector config builder
    pub fn new(output_type: DataType) -> Self {
        Self {
            config: CollectorConfig::new(output_type),
        }
    }

    /// Set the point capacity
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the ordering policy
    pub fn ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.config.ordering = ordering;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CollectorConfig {
        self.config
    }
}
