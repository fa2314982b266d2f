mod configurations;
mod core;
mod executor;
mod parameters;
mod row;

// Re-export public items
pub use configurations::{AccessStrategy, UdtfConfigurations};
pub use self::core::Udtf;
pub use executor::{SizeWindows, TimeWindows, UdtfExecutor, size_windows, time_windows};
pub use parameters::UdfParameters;
pub use row::{Row, RowWindow};
