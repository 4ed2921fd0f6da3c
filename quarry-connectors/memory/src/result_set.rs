use std::collections::VecDeque;

use quarry_connectors_base::interface::{ResultSet, RowStructure};
use quarry_core::{
    data::{DataType, DataValue, Record},
    err::{ensure, Result},
};

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryResultSet {
    pub cols: Vec<(String, DataType)>,
    pub data: VecDeque<Vec<DataValue>>,
}

impl MemoryResultSet {
    pub fn new(cols: Vec<(String, DataType)>, data: Vec<Vec<DataValue>>) -> Result<Self> {
        for row in data.iter() {
            ensure!(
                row.len() == cols.len(),
                "Expected {} values per row, found {}",
                cols.len(),
                row.len()
            );
        }

        Ok(Self {
            cols,
            data: data.into(),
        })
    }

    /// Builds a result set from records, the first record defines the columns
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let cols = match records.first() {
            Some(first) => first
                .fields()
                .iter()
                .map(|(name, value)| (name.clone(), value.r#type()))
                .collect(),
            None => vec![],
        };

        Self::new(
            cols,
            records
                .into_iter()
                .map(|r| r.into_fields().into_iter().map(|(_, v)| v).collect())
                .collect(),
        )
    }
}

impl ResultSet for MemoryResultSet {
    fn get_structure(&self) -> Result<RowStructure> {
        Ok(RowStructure::new(self.cols.clone()))
    }

    fn next_row(&mut self) -> Result<Option<Record>> {
        Ok(self.data.pop_front().map(|row| {
            Record::new(
                self.cols
                    .iter()
                    .map(|(name, _)| name.clone())
                    .zip(row.into_iter())
                    .collect(),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_connector_result_set() {
        let mut result_set = MemoryResultSet::new(
            vec![("col".to_string(), DataType::UInt32)],
            vec![vec![DataValue::UInt32(123)]],
        )
        .unwrap();

        assert_eq!(
            result_set.get_structure().unwrap(),
            RowStructure::new(vec![("col".to_string(), DataType::UInt32)])
        );

        assert_eq!(
            result_set.next_row().unwrap(),
            Some(Record::default().with("col", DataValue::UInt32(123)))
        );
        assert_eq!(result_set.next_row().unwrap(), None);
    }

    #[test]
    fn test_memory_connector_result_set_mismatched_row() {
        assert!(MemoryResultSet::new(
            vec![("col".to_string(), DataType::UInt32)],
            vec![vec![DataValue::UInt32(1), DataValue::Null]],
        )
        .is_err());
    }

    #[test]
    fn test_memory_connector_result_set_from_records() {
        let mut result_set = MemoryResultSet::from_records(vec![
            Record::default().with("a", 1).with("b", "x"),
            Record::default().with("a", 2).with("b", "y"),
        ])
        .unwrap();

        assert_eq!(
            result_set.get_structure().unwrap().names(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(result_set.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_memory_connector_result_set_from_no_records() {
        let mut result_set = MemoryResultSet::from_records(vec![]).unwrap();

        assert!(result_set.get_structure().unwrap().cols.is_empty());
        assert_eq!(result_set.next_row().unwrap(), None);
    }
}
