use crate::types::Value;

/// One input row: a timestamp and one optional value per input series
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub timestamp: i64,
    pub values: Vec<Option<Value>>,
}

impl Row {
    pub fn new(timestamp: i64, values: Vec<Option<Value>>) -> Self {
        Self { timestamp, values }
    }

    /// A row with a single non-null value
    pub fn single(timestamp: i64, value: Value) -> Self {
        Self::new(timestamp, vec![Some(value)])
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.value(index).is_none()
    }
}

/// A window of consecutive rows covering `[start, end)`
#[derive(Debug, Clone, PartialEq)]
pub struct RowWindow<'a> {
    rows: &'a [Row],
    start: i64,
    end: i64,
}

impl<'a> RowWindow<'a> {
    pub fn new(rows: &'a [Row], start: i64, end: i64) -> Self {
        Self { rows, start, end }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&'a Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &'a [Row] {
        self.rows
    }

    pub fn window_start_time(&self) -> i64 {
        self.start
    }

    pub fn window_end_time(&self) -> i64 {
        self.end
    }
}
