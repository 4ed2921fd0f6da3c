use quarry_connectors_base::common::Command;
use quarry_core::{config::ConnectionCategory, data::Record, err::Result};

use crate::types::EntityType;

mod pooled;
mod registry;

pub use pooled::*;
pub use registry::*;

/// Executes finder queries through one category of connection
///
/// Executors are shared between every descriptor bound to them and must
/// not hold per call state.
pub trait FinderExecutor: Send + Sync {
    /// The connection category this executor runs queries through
    fn category(&self) -> ConnectionCategory;

    /// Whether results of the entity type should run through this executor
    fn accept(&self, entity: &EntityType) -> bool;

    /// Executes the command on the current connection, returning every row
    fn execute(&self, command: Command) -> Result<Vec<Record>>;
}

/// Entity types an executor takes responsibility for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptRule {
    /// Raw documents
    Documents,
    /// The named mapped entities
    Entities(Vec<String>),
    /// Vertices and edges
    GraphElements,
    /// Only selected through a connection hint or as the default
    Nothing,
}

impl AcceptRule {
    pub fn accept(&self, entity: &EntityType) -> bool {
        match (self, entity) {
            (AcceptRule::Documents, EntityType::Document) => true,
            (AcceptRule::Entities(names), EntityType::Entity(name)) => names.contains(name),
            (AcceptRule::GraphElements, EntityType::Vertex | EntityType::Edge) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::data::DataType;

    use super::*;

    #[test]
    fn test_accept_rules() {
        assert!(AcceptRule::Documents.accept(&EntityType::Document));
        assert!(!AcceptRule::Documents.accept(&EntityType::Any));

        let entities = AcceptRule::Entities(vec!["Person".into()]);
        assert!(entities.accept(&EntityType::entity("Person")));
        assert!(!entities.accept(&EntityType::entity("Car")));
        assert!(!entities.accept(&EntityType::Document));

        assert!(AcceptRule::GraphElements.accept(&EntityType::Vertex));
        assert!(AcceptRule::GraphElements.accept(&EntityType::Edge));
        assert!(!AcceptRule::GraphElements.accept(&EntityType::Scalar(DataType::Int32)));

        assert!(!AcceptRule::Nothing.accept(&EntityType::Document));
    }
}
