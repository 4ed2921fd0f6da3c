use enum_as_inner::EnumAsInner;
use quarry_core::data::{DataValue, Record};

use crate::{
    descriptor::ReturnShape,
    types::{CollectionType, EntityType},
};

/// A single item produced by a finder method
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum ResultValue {
    /// First column of a row, for scalar entity types
    Scalar(DataValue),
    /// A whole row
    Record(Record),
}

/// The shaped result of a finder call
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum FinderResult {
    Plain(Option<ResultValue>),
    Array(Vec<ResultValue>),
    Collection {
        kind: CollectionType,
        items: Vec<ResultValue>,
    },
}

impl FinderResult {
    /// Shapes the rows returned by the executor
    pub(crate) fn shape(
        rows: Vec<Record>,
        shape: ReturnShape,
        entity: &EntityType,
        collection: Option<CollectionType>,
    ) -> Self {
        let items = rows.into_iter().map(|row| match entity {
            EntityType::Scalar(_) => ResultValue::Scalar(
                row.into_fields()
                    .into_iter()
                    .next()
                    .map(|(_, v)| v)
                    .unwrap_or(DataValue::Null),
            ),
            _ => ResultValue::Record(row),
        });

        match shape {
            ReturnShape::Plain => FinderResult::Plain(items.take(1).next()),
            ReturnShape::Array => FinderResult::Array(items.collect()),
            ReturnShape::Collection => {
                let kind = collection.unwrap_or(CollectionType::List);
                let mut items: Vec<ResultValue> = items.collect();

                if kind.is_set() {
                    // ResultValue holds floats so is neither Hash nor Eq,
                    // duplicates are found by linear scan
                    let mut unique = Vec::with_capacity(items.len());
                    for item in items {
                        if !unique.contains(&item) {
                            unique.push(item);
                        }
                    }
                    items = unique;
                }

                FinderResult::Collection { kind, items }
            }
        }
    }

    /// Every item of the result, regardless of shape
    pub fn items(&self) -> Vec<&ResultValue> {
        match self {
            FinderResult::Plain(item) => item.iter().collect(),
            FinderResult::Array(items) | FinderResult::Collection { items, .. } => {
                items.iter().collect()
            }
        }
    }

    pub fn into_items(self) -> Vec<ResultValue> {
        match self {
            FinderResult::Plain(item) => item.into_iter().collect(),
            FinderResult::Array(items) | FinderResult::Collection { items, .. } => items,
        }
    }

    /// The items as records, scalar items are skipped
    pub fn records(&self) -> Vec<&Record> {
        self.items()
            .into_iter()
            .filter_map(|i| i.as_record())
            .collect()
    }
}
