use std::fmt;

use quarry_core::{config::ConnectionCategory, data::DataType};

use crate::types::{CollectionType, TypeRef};

/// Stable identity of a declared finder method, used as the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    pub owner: String,
    pub name: String,
}

impl MethodId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner, self.name)
    }
}

/// The declaration of a finder method
///
/// Built once at startup and compiled into a descriptor on first use.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub id: MethodId,
    /// Raw query text, exclusive with `function`
    pub query: Option<String>,
    /// Name of a stored function, exclusive with `query`
    pub function: Option<String>,
    pub return_type: TypeRef,
    /// Concrete collection requested for the result
    pub return_as: Option<CollectionType>,
    /// Connection to use when the result type is ambiguous
    pub use_connection: Option<ConnectionCategory>,
    pub params: Vec<ParamDefinition>,
    pub placeholder_values: Vec<PlaceholderValues>,
}

/// A declared method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDefinition {
    pub name: String,
    pub r#type: DataType,
    pub tag: Option<ParamTag>,
}

/// The role of a method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamTag {
    /// Bound to the named query parameter
    Named(String),
    /// Number of leading results to skip
    FirstResult,
    /// Maximum number of results
    MaxResults,
    /// Substituted into the `${name}` token of the query template
    Placeholder(String),
}

/// Allowed values of a placeholder token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderValues {
    pub name: String,
    pub values: Vec<String>,
}

impl MethodDefinition {
    pub fn new(id: MethodId) -> Self {
        Self {
            id,
            query: None,
            function: None,
            return_type: TypeRef::Entity(crate::types::EntityType::Any),
            return_as: None,
            use_connection: None,
            params: vec![],
            placeholder_values: vec![],
        }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn returns(mut self, return_type: impl Into<TypeRef>) -> Self {
        self.return_type = return_type.into();
        self
    }

    pub fn return_as(mut self, kind: CollectionType) -> Self {
        self.return_as = Some(kind);
        self
    }

    pub fn use_connection(mut self, category: ConnectionCategory) -> Self {
        self.use_connection = Some(category);
        self
    }

    pub fn param(mut self, param: ParamDefinition) -> Self {
        self.params.push(param);
        self
    }

    pub fn placeholder_values(mut self, name: impl Into<String>, values: Vec<&str>) -> Self {
        self.placeholder_values.push(PlaceholderValues {
            name: name.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        });
        self
    }
}

impl ParamDefinition {
    pub fn new(name: impl Into<String>, r#type: DataType) -> Self {
        Self {
            name: name.into(),
            r#type,
            tag: None,
        }
    }

    /// Shorthand for a parameter bound by its own name
    pub fn named(name: impl Into<String>, r#type: DataType) -> Self {
        let name = name.into();
        Self::new(name.clone(), r#type).tag(ParamTag::Named(name))
    }

    pub fn tag(mut self, tag: ParamTag) -> Self {
        self.tag = Some(tag);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::types::EntityType;

    use super::*;

    #[test]
    fn test_method_definition_builder() {
        let def = MethodDefinition::new(MethodId::new("PersonRepository", "find_by_name"))
            .query("select from Person where name = :name")
            .returns(TypeRef::list_of(EntityType::entity("Person")))
            .return_as(CollectionType::Vec)
            .use_connection(ConnectionCategory::Object)
            .param(ParamDefinition::named("name", DataType::rust_string()));

        assert_eq!(def.id.to_string(), "PersonRepository#find_by_name");
        assert_eq!(
            def.query.as_deref(),
            Some("select from Person where name = :name")
        );
        assert_eq!(def.function, None);
        assert_eq!(def.return_as, Some(CollectionType::Vec));
        assert_eq!(
            def.params,
            vec![ParamDefinition {
                name: "name".into(),
                r#type: DataType::rust_string(),
                tag: Some(ParamTag::Named("name".into()))
            }]
        );
    }
}
