mod config;
mod core;
mod elastic;

// Re-export public items
pub use self::config::{CollectorConfig, CollectorConfigBuilder, OrderingPolicy};
pub use self::core::PointCollector;
pub use elastic::ElasticPointCollector;
