use quarry_core::{
    data::{DataType, Record},
    err::Result,
};

/// A result set from an executed command
pub trait ResultSet {
    /// Gets the row structure of the result set
    fn get_structure(&self) -> Result<RowStructure>;

    /// Reads the next row, returning `None` once the result set is exhausted
    fn next_row(&mut self) -> Result<Option<Record>>;

    /// Reads every remaining row
    fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut rows = vec![];

        while let Some(row) = self.next_row()? {
            rows.push(row);
        }

        Ok(rows)
    }
}

/// The structure of a row
#[derive(Debug, Clone, PartialEq)]
pub struct RowStructure {
    /// The list of named columns in the row with their corrosponding data types
    pub cols: Vec<(String, DataType)>,
}

impl RowStructure {
    pub fn new(cols: Vec<(String, DataType)>) -> Self {
        Self { cols }
    }

    pub fn names(&self) -> Vec<String> {
        self.cols.iter().map(|i| i.0.clone()).collect()
    }

    pub fn types(&self) -> Vec<DataType> {
        self.cols.iter().map(|i| i.1.clone()).collect()
    }
}
