//! Point collection and execution runtime for user-defined time-series functions

pub mod buffer;
pub mod collector;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod retry;
pub mod sink;
pub mod types;
pub mod udtf;
pub mod util;

/// Re-export of commonly used types for convenience
pub mod prelude {
    pub use crate::buffer::{BufferConfig, PointBuffer};
    pub use crate::collector::{
        CollectorConfig, CollectorConfigBuilder, ElasticPointCollector, OrderingPolicy,
        PointCollector,
    };
    pub use crate::config::{Settings, SettingsBuilder, load_settings};
    pub use crate::error::{CollectorError, Result};
    pub use crate::pipeline::OutputPipeline;
    pub use crate::retry::{RetryConfig, execute_with_retry};
    pub use crate::sink::{ChannelSink, MemorySink, PointSink};
    pub use crate::types::{Binary, DataType, Point, PointBatch, Value};
    pub use crate::udtf::{
        AccessStrategy, Row, RowWindow, Udtf, UdfParameters, UdtfConfigurations, UdtfExecutor,
    };
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
