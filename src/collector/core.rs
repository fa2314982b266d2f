//! The point collection contract used by UDTFs
use crate::error::Result;
use crate::types::{Binary, DataType, Point, Value};

/// Collects the timestamped points a UDTF produces during `transform` and
/// `terminate`.
///
/// A collector is bound to one output data type, set through
/// `UdtfConfigurations::set_output_data_type` in `Udtf::before_start`. Each
/// `put_*` method only succeeds when the configured type matches its value
/// kind. A timestamp can be collected at most once; putting it again fails
/// and stops the calculation.
pub trait PointCollector {
    /// The data type this collector accepts
    fn output_type(&self) -> DataType;

    /// Collect a point whose value kind has already been chosen
    fn collect(&mut self, point: Point) -> Result<()>;

    /// Collect an INT32 point
    fn put_int(&mut self, timestamp: i64, value: i32) -> Result<()> {
        self.collect(Point::new(timestamp, Value::Int32(value)))
    }

    /// Collect an INT64 point
    fn put_long(&mut self, timestamp: i64, value: i64) -> Result<()> {
        self.collect(Point::new(timestamp, Value::Int64(value)))
    }

    /// Collect a FLOAT point
    fn put_float(&mut self, timestamp: i64, value: f32) -> Result<()> {
        self.collect(Point::new(timestamp, Value::Float(value)))
    }

    /// Collect a DOUBLE point
    fn put_double(&mut self, timestamp: i64, value: f64) -> Result<()> {
        self.collect(Point::new(timestamp, Value::Double(value)))
    }

    /// Collect a BOOLEAN point
    fn put_boolean(&mut self, timestamp: i64, value: bool) -> Result<()> {
        self.collect(Point::new(timestamp, Value::Boolean(value)))
    }

    /// Collect a binary payload into a TEXT output
    fn put_binary(&mut self, timestamp: i64, value: Binary) -> Result<()> {
        self.collect(Point::new(timestamp, Value::Binary(value)))
    }

    /// Collect a string into a TEXT output
    fn put_string(&mut self, timestamp: i64, value: &str) -> Result<()> {
        self.collect(Point::new(timestamp, Value::Text(value.to_string())))
    }
}
