use std::sync::Arc;

use itertools::Itertools;
use quarry_core::config::ConnectionCategory;
use quarry_logging::{debug, warn};

use crate::{
    descriptor::DefinitionWarning,
    err::Result,
    method::MethodId,
    types::EntityType,
    FinderError,
};

use super::FinderExecutor;

/// The registered executors, in registration order
pub struct ExecutorRegistry {
    executors: Vec<Arc<dyn FinderExecutor>>,
    default: Arc<dyn FinderExecutor>,
}

impl ExecutorRegistry {
    /// Fails when no executor serves the default category
    pub fn new(
        executors: Vec<Arc<dyn FinderExecutor>>,
        default_category: ConnectionCategory,
    ) -> Result<Self> {
        let default = Self::find_in(&executors, default_category).ok_or_else(|| {
            FinderError::Configuration(format!(
                "No executor found for default connection {}",
                default_category
            ))
        })?;

        debug!(
            "Registered finder executors: [{}], default {}",
            executors.iter().map(|e| e.category()).join(", "),
            default_category
        );

        Ok(Self { executors, default })
    }

    pub fn find(&self, category: ConnectionCategory) -> Option<Arc<dyn FinderExecutor>> {
        Self::find_in(&self.executors, category)
    }

    fn find_in(
        executors: &[Arc<dyn FinderExecutor>],
        category: ConnectionCategory,
    ) -> Option<Arc<dyn FinderExecutor>> {
        executors
            .iter()
            .find(|e| e.category() == category)
            .map(Arc::clone)
    }

    pub fn default_executor(&self) -> &Arc<dyn FinderExecutor> {
        &self.default
    }

    pub fn categories(&self) -> Vec<ConnectionCategory> {
        self.executors.iter().map(|e| e.category()).collect()
    }

    /// Selects the executor for a method returning the entity type
    ///
    /// The executor detected from the entity wins over the hint, unless the
    /// detected executor is the generic one.
    pub fn resolve(
        &self,
        id: &MethodId,
        entity: &EntityType,
        hint: Option<ConnectionCategory>,
        warnings: &mut Vec<DefinitionWarning>,
    ) -> Result<Arc<dyn FinderExecutor>> {
        let detected = self.executors.iter().find(|e| e.accept(entity));

        let resolved = match (detected, hint) {
            (Some(detected), Some(hint)) if detected.category() != hint => {
                if detected.category().is_generic() {
                    self.find(hint)
                } else {
                    warn!(
                        "Connection hint {} ignored, because execution type {} was recognized from return type in finder method {}",
                        hint,
                        detected.category(),
                        id
                    );
                    warnings.push(DefinitionWarning::IgnoredConnectionHint {
                        hint,
                        detected: detected.category(),
                    });
                    Some(Arc::clone(detected))
                }
            }
            (Some(detected), _) => Some(Arc::clone(detected)),
            (None, Some(hint)) => self.find(hint),
            (None, None) => Some(Arc::clone(&self.default)),
        };

        resolved.ok_or_else(|| {
            FinderError::definition(
                id,
                format!(
                    "Executor not found for connection hint {}",
                    hint.map(|h| h.to_string()).unwrap_or_else(|| "none".into())
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        executor::AcceptRule,
        testing::{registry, MockExecutor},
    };

    use super::*;

    fn resolve(
        entity: EntityType,
        hint: Option<ConnectionCategory>,
    ) -> (Result<ConnectionCategory>, Vec<DefinitionWarning>) {
        let mut warnings = vec![];
        let res = registry()
            .resolve(&MethodId::new("Test", "method"), &entity, hint, &mut warnings)
            .map(|e| e.category());

        (res, warnings)
    }

    #[test]
    fn test_registry_requires_default() {
        let res = ExecutorRegistry::new(
            vec![Arc::new(MockExecutor::new(
                ConnectionCategory::Object,
                AcceptRule::Nothing,
            ))],
            ConnectionCategory::Document,
        );

        assert!(matches!(res, Err(FinderError::Configuration(_))));
    }

    #[test]
    fn test_resolve_auto_detected() {
        let (res, warnings) = resolve(EntityType::entity("Person"), None);

        assert_eq!(res.unwrap(), ConnectionCategory::Object);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_default_when_undetected() {
        let (res, _) = resolve(EntityType::Any, None);

        assert_eq!(res.unwrap(), ConnectionCategory::Document);
    }

    #[test]
    fn test_resolve_hint_when_undetected() {
        let (res, warnings) = resolve(EntityType::Any, Some(ConnectionCategory::Graph));

        assert_eq!(res.unwrap(), ConnectionCategory::Graph);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_document_overridden_by_hint() {
        let (res, warnings) = resolve(EntityType::Document, Some(ConnectionCategory::Object));

        assert_eq!(res.unwrap(), ConnectionCategory::Object);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_specific_category_ignores_hint() {
        let (res, warnings) = resolve(EntityType::Vertex, Some(ConnectionCategory::Object));

        assert_eq!(res.unwrap(), ConnectionCategory::Graph);
        assert_eq!(
            warnings,
            vec![DefinitionWarning::IgnoredConnectionHint {
                hint: ConnectionCategory::Object,
                detected: ConnectionCategory::Graph
            }]
        );
    }

    #[test]
    fn test_resolve_matching_hint() {
        let (res, warnings) = resolve(EntityType::Vertex, Some(ConnectionCategory::Graph));

        assert_eq!(res.unwrap(), ConnectionCategory::Graph);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_unknown_hint_fails() {
        let registry = ExecutorRegistry::new(
            vec![Arc::new(MockExecutor::new(
                ConnectionCategory::Document,
                AcceptRule::Documents,
            ))],
            ConnectionCategory::Document,
        )
        .unwrap();

        let err = registry
            .resolve(
                &MethodId::new("Test", "method"),
                &EntityType::Any,
                Some(ConnectionCategory::Graph),
                &mut vec![],
            )
            .err().unwrap();

        assert_eq!(
            err.to_string(),
            "Invalid finder method Test#method: Executor not found for connection hint graph"
        );

        // document auto-detection overridden by an unregistered hint
        assert!(registry
            .resolve(
                &MethodId::new("Test", "method"),
                &EntityType::Document,
                Some(ConnectionCategory::Graph),
                &mut vec![],
            )
            .is_err());
    }
}
