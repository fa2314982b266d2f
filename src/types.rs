//! Output data types and the values a UDTF can emit
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CollectorError, Result};

/// Data type of a series, and of the single kind of value a collector accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Int32,
    Int64,
    Float,
    Double,
    Boolean,
    Text,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int32 => "INT32",
            DataType::Int64 => "INT64",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Boolean => "BOOLEAN",
            DataType::Text => "TEXT",
        }
    }

    /// Whether values of this type convert to `f64`
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Boolean | DataType::Text)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INT32" => Ok(DataType::Int32),
            "INT64" => Ok(DataType::Int64),
            "FLOAT" => Ok(DataType::Float),
            "DOUBLE" => Ok(DataType::Double),
            "BOOLEAN" => Ok(DataType::Boolean),
            "TEXT" => Ok(DataType::Text),
            other => Err(CollectorError::Config(format!(
                "Unknown data type: {}",
                other
            ))),
        }
    }
}

/// Opaque binary payload stored in a TEXT series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binary(Vec<u8>);

impl Binary {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Binary(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the payload as UTF-8
    pub fn to_string_value(&self) -> Result<String> {
        String::from_utf8(self.0.clone())
            .map_err(|e| CollectorError::Other(format!("Binary is not valid UTF-8: {}", e)))
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for Binary {
    fn from(s: &str) -> Self {
        Binary(s.as_bytes().to_vec())
    }
}

impl From<String> for Binary {
    fn from(s: String) -> Self {
        Binary(s.into_bytes())
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Binary(bytes)
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Binary(bytes.to_vec())
    }
}

/// A single emitted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Binary(Binary),
    Text(String),
}

impl Value {
    /// The output data type this value requires; binary and text share TEXT
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Boolean(_) => DataType::Boolean,
            Value::Binary(_) | Value::Text(_) => DataType::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of a TEXT value, decoding binary payloads lossily
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Binary(b) => Some(b.to_string_lossy()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Binary(b) => write!(f, "{}", b.to_string_lossy()),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A timestamped value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub timestamp: i64,
    pub value: Value,
}

impl Point {
    pub fn new(timestamp: i64, value: Value) -> Self {
        Self { timestamp, value }
    }

    pub fn data_type(&self) -> DataType {
        self.value.data_type()
    }

    /// Convert the point to a JSON-compatible format
    pub fn to_json(&self) -> serde_json::Value {
        let value = match &self.value {
            Value::Int32(v) => serde_json::json!(v),
            Value::Int64(v) => serde_json::json!(v),
            Value::Float(v) => serde_json::json!(v),
            Value::Double(v) => serde_json::json!(v),
            Value::Boolean(v) => serde_json::json!(v),
            Value::Binary(b) => serde_json::json!(b.to_string_lossy()),
            Value::Text(s) => serde_json::json!(s),
        };

        serde_json::json!({
            "timestamp": self.timestamp,
            "type": self.data_type().as_str(),
            "value": value,
        })
    }
}

/// The points drained from one collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointBatch {
    pub id: Uuid,
    /// Output series the points belong to
    pub series: String,
    pub data_type: DataType,
    pub points: Vec<Point>,
    pub created_at: DateTime<Utc>,
}

impl PointBatch {
    pub fn new(series: impl Into<String>, data_type: DataType, points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            series: series.into(),
            data_type,
            points,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.points.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.points.last().map(|p| p.timestamp)
    }
}
