use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use quarry_core::{config::ConnectionCategory, data::DataType};

use crate::{
    executor::FinderExecutor,
    method::MethodId,
    placeholder::{PlaceholderDefaults, Template},
    types::{CollectionType, EntityType},
};

/// What a finder method executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    Query(Template),
    Function(Template),
}

impl QuerySource {
    pub fn template(&self) -> &Template {
        match self {
            QuerySource::Query(t) | QuerySource::Function(t) => t,
        }
    }
}

/// The shape of the value returned by a finder method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    Plain,
    Array,
    Collection,
}

/// How ordinary parameters are passed to the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// Argument positions, in query parameter order
    Ordinal(Vec<usize>),
    /// Query parameter name to argument position
    Named(BTreeMap<String, usize>),
}

/// A parameter substituted into a template token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderParam {
    pub position: usize,
    pub r#type: DataType,
}

/// Non fatal issues found while compiling a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionWarning {
    /// The connection hint disagreed with the executor detected from the result type
    IgnoredConnectionHint {
        hint: ConnectionCategory,
        detected: ConnectionCategory,
    },
    /// A string placeholder accepts any value
    UnguardedPlaceholder { name: String },
    /// A named parameter was bound by position
    NamedParamAsOrdinal { name: String, position: usize },
    /// No entity type could be read from the return type
    UnresolvedEntity,
}

/// The compiled, immutable form of a finder method
pub struct FinderDescriptor {
    pub(crate) id: MethodId,
    pub(crate) source: QuerySource,
    pub(crate) placeholder_defaults: PlaceholderDefaults,
    pub(crate) return_shape: ReturnShape,
    pub(crate) entity: EntityType,
    pub(crate) collection: Option<CollectionType>,
    pub(crate) declared_collection: Option<CollectionType>,
    pub(crate) executor: Arc<dyn FinderExecutor>,
    pub(crate) param_count: usize,
    pub(crate) params: ParamBinding,
    pub(crate) first_result: Option<usize>,
    pub(crate) max_results: Option<usize>,
    pub(crate) placeholder_params: BTreeMap<String, PlaceholderParam>,
    pub(crate) warnings: Vec<DefinitionWarning>,
}

impl FinderDescriptor {
    pub fn id(&self) -> &MethodId {
        &self.id
    }

    pub fn source(&self) -> &QuerySource {
        &self.source
    }

    pub fn is_function_call(&self) -> bool {
        matches!(self.source, QuerySource::Function(_))
    }

    pub fn placeholder_names(&self) -> BTreeSet<String> {
        self.source.template().names()
    }

    /// Allowed values of a placeholder, empty when unrestricted
    pub fn placeholder_defaults(&self, name: &str) -> &[String] {
        self.placeholder_defaults.get(name)
    }

    pub fn return_shape(&self) -> ReturnShape {
        self.return_shape
    }

    pub fn entity(&self) -> &EntityType {
        &self.entity
    }

    /// The collection requested for the result, if any
    pub fn declared_collection(&self) -> Option<CollectionType> {
        self.declared_collection
    }

    /// The collection kind results are returned as
    pub fn result_collection(&self) -> Option<CollectionType> {
        self.declared_collection.or(self.collection)
    }

    pub fn executor(&self) -> &Arc<dyn FinderExecutor> {
        &self.executor
    }

    pub fn connection(&self) -> ConnectionCategory {
        self.executor.category()
    }

    pub fn params(&self) -> &ParamBinding {
        &self.params
    }

    pub fn first_result_position(&self) -> Option<usize> {
        self.first_result
    }

    pub fn max_results_position(&self) -> Option<usize> {
        self.max_results
    }

    pub fn placeholder_params(&self) -> &BTreeMap<String, PlaceholderParam> {
        &self.placeholder_params
    }

    pub fn warnings(&self) -> &[DefinitionWarning] {
        &self.warnings
    }
}

impl fmt::Debug for FinderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderDescriptor")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("return_shape", &self.return_shape)
            .field("entity", &self.entity)
            .field("collection", &self.result_collection())
            .field("executor", &self.executor.category())
            .field("params", &self.params)
            .field("first_result", &self.first_result)
            .field("max_results", &self.max_results)
            .field("placeholder_params", &self.placeholder_params)
            .field("warnings", &self.warnings)
            .finish()
    }
}
