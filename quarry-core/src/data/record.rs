use serde::{Deserialize, Serialize};

use super::DataValue;

/// A single row returned from a data source, keeping its column order
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, DataValue)>,
}

impl Record {
    pub fn new(fields: Vec<(String, DataValue)>) -> Self {
        Self { fields }
    }

    /// Appends a field, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Gets the value of the first column
    pub fn first(&self) -> Option<&DataValue> {
        self.fields.first().map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, DataValue)] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<(String, DataValue)> {
        self.fields
    }
}
