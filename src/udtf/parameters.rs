use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{CollectorError, Result};
use crate::types::DataType;

/// Attributes and input series handed to a UDTF before it starts
#[derive(Debug, Clone, Default)]
pub struct UdfParameters {
    attributes: HashMap<String, String>,
    paths: Vec<String>,
    data_types: Vec<DataType>,
}

impl UdfParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user attribute, e.g. `"window" => "5"`
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add an input series with its data type
    pub fn with_input(mut self, path: impl Into<String>, data_type: DataType) -> Self {
        self.paths.push(path.into());
        self.data_types.push(data_type);
        self
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn input_count(&self) -> usize {
        self.paths.len()
    }

    pub fn path(&self, index: usize) -> Result<&str> {
        self.paths
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| CollectorError::Udf(format!("No input series at index {}", index)))
    }

    pub fn data_type(&self, index: usize) -> Result<DataType> {
        self.data_types
            .get(index)
            .copied()
            .ok_or_else(|| CollectorError::Udf(format!("No input series at index {}", index)))
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn get_string_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_string(key).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str) -> Result<i32> {
        self.require(key)
    }

    pub fn get_int_or(&self, key: &str, default: i32) -> Result<i32> {
        self.parse_or(key, default)
    }

    pub fn get_long(&self, key: &str) -> Result<i64> {
        self.require(key)
    }

    pub fn get_long_or(&self, key: &str, default: i64) -> Result<i64> {
        self.parse_or(key, default)
    }

    pub fn get_float(&self, key: &str) -> Result<f32> {
        self.require(key)
    }

    pub fn get_float_or(&self, key: &str, default: f32) -> Result<f32> {
        self.parse_or(key, default)
    }

    pub fn get_double(&self, key: &str) -> Result<f64> {
        self.require(key)
    }

    pub fn get_double_or(&self, key: &str, default: f64) -> Result<f64> {
        self.parse_or(key, default)
    }

    pub fn get_boolean(&self, key: &str) -> Result<bool> {
        self.require(key)
    }

    pub fn get_boolean_or(&self, key: &str, default: bool) -> Result<bool> {
        self.parse_or(key, default)
    }

    fn require<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_string(key) {
            Some(raw) => parse_attribute(key, raw),
            None => Err(CollectorError::Udf(format!("Missing attribute '{}'", key))),
        }
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_string(key) {
            Some(raw) => parse_attribute(key, raw),
            None => Ok(default),
        }
    }
}

fn parse_attribute<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        CollectorError::Udf(format!("Invalid value '{}' for attribute '{}': {}", raw, key, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_attributes() {
        let params = UdfParameters::new()
            .with_attribute("window", "5")
            .with_attribute("factor", "0.5")
            .with_attribute("strict", "true")
            .with_attribute("label", "avg");

        assert_eq!(params.get_int("window").unwrap(), 5);
        assert_eq!(params.get_long("window").unwrap(), 5);
        assert_eq!(params.get_double("factor").unwrap(), 0.5);
        assert_eq!(params.get_float("factor").unwrap(), 0.5);
        assert!(params.get_boolean("strict").unwrap());
        assert_eq!(params.get_string("label"), Some("avg"));
        assert_eq!(params.get_string_or("missing", "x"), "x");
    }

    #[test]
    fn test_missing_and_invalid_attributes() {
        let params = UdfParameters::new().with_attribute("window", "five");

        assert!(matches!(params.get_int("window"), Err(CollectorError::Udf(_))));
        assert!(params.get_int_or("window", 3).is_err());
        assert!(matches!(params.get_long("absent"), Err(CollectorError::Udf(_))));
        assert_eq!(params.get_long_or("absent", 9).unwrap(), 9);
    }

    #[test]
    fn test_inputs() {
        let params = UdfParameters::new()
            .with_input("root.sg.d1.s1", DataType::Double)
            .with_input("root.sg.d1.s2", DataType::Int32);

        assert_eq!(params.input_count(), 2);
        assert_eq!(params.path(1).unwrap(), "root.sg.d1.s2");
        assert_eq!(params.data_type(0).unwrap(), DataType::Double);
        assert!(params.data_type(2).is_err());
    }
}
