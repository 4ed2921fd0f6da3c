use quarry_logging::warn;

use crate::{
    descriptor::{DefinitionWarning, ReturnShape},
    err::{check, Result},
    method::{MethodDefinition, MethodId},
    types::{CollectionType, EntityType, TypeRef},
    FinderError,
};

/// The analyzed return type of a method
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReturnAnalysis {
    pub shape: ReturnShape,
    pub entity: EntityType,
    /// The collection kind of the declared return type
    pub collection: Option<CollectionType>,
    /// The concrete collection requested by the method
    pub declared: Option<CollectionType>,
}

pub(crate) fn analyze_return_type(
    def: &MethodDefinition,
    warnings: &mut Vec<DefinitionWarning>,
) -> Result<ReturnAnalysis> {
    let id = &def.id;
    let return_type = &def.return_type;

    if let Some(requested) = def.return_as {
        let compatible = match return_type {
            TypeRef::Collection(kind, _) => kind.is_assignable_from(requested),
            _ => false,
        };

        check!(
            id,
            compatible,
            "Requested collection {} is incompatible with method return type {}",
            requested,
            return_type
        );
    }

    let (shape, entity, collection) = match return_type {
        TypeRef::Collection(kind, arg) => (
            ReturnShape::Collection,
            generic_entity(id, arg.as_deref(), warnings)?,
            Some(*kind),
        ),
        TypeRef::Array(element) => (
            ReturnShape::Array,
            element_entity(id, element)?,
            None,
        ),
        TypeRef::Optional(arg) => (
            ReturnShape::Plain,
            generic_entity(id, arg.as_deref(), warnings)?,
            None,
        ),
        TypeRef::Entity(entity) => (ReturnShape::Plain, entity.clone(), None),
    };

    Ok(ReturnAnalysis {
        shape,
        entity,
        collection,
        declared: def.return_as,
    })
}

fn generic_entity(
    id: &MethodId,
    arg: Option<&TypeRef>,
    warnings: &mut Vec<DefinitionWarning>,
) -> Result<EntityType> {
    match arg {
        Some(arg) => element_entity(id, arg),
        None => {
            warn!(
                "Can't detect entity: no generic set in finder method return type: {}",
                id
            );
            warnings.push(DefinitionWarning::UnresolvedEntity);
            Ok(EntityType::Any)
        }
    }
}

fn element_entity(id: &MethodId, element: &TypeRef) -> Result<EntityType> {
    element.as_entity().cloned().ok_or_else(|| {
        FinderError::definition(
            id,
            format!("Can't detect entity from nested element type {}", element),
        )
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn analyze(return_type: TypeRef, return_as: Option<CollectionType>) -> Result<(ReturnAnalysis, Vec<DefinitionWarning>)> {
        let mut def = MethodDefinition::new(MethodId::new("Test", "method"))
            .query("select from Person")
            .returns(return_type);
        def.return_as = return_as;

        let mut warnings = vec![];
        let analysis = analyze_return_type(&def, &mut warnings)?;

        Ok((analysis, warnings))
    }

    fn person() -> EntityType {
        EntityType::entity("Person")
    }

    #[test]
    fn test_list_return_type() {
        let (analysis, warnings) = analyze(TypeRef::list_of(person()), None).unwrap();

        assert_eq!(
            analysis,
            ReturnAnalysis {
                shape: ReturnShape::Collection,
                entity: person(),
                collection: Some(CollectionType::List),
                declared: None
            }
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_array_return_type() {
        let (analysis, _) = analyze(TypeRef::array(person().into()), None).unwrap();

        assert_eq!(analysis.shape, ReturnShape::Array);
        assert_eq!(analysis.entity, person());
    }

    #[test]
    fn test_plain_return_type() {
        let (analysis, _) = analyze(person().into(), None).unwrap();

        assert_eq!(analysis.shape, ReturnShape::Plain);
        assert_eq!(analysis.entity, person());
    }

    #[test]
    fn test_optional_return_type() {
        let (analysis, _) = analyze(TypeRef::optional(person().into()), None).unwrap();

        assert_eq!(analysis.shape, ReturnShape::Plain);
        assert_eq!(analysis.entity, person());
    }

    #[test]
    fn test_untyped_return_types_warn() {
        let (analysis, warnings) =
            analyze(TypeRef::raw_collection(CollectionType::Iterator), None).unwrap();
        assert_eq!(analysis.shape, ReturnShape::Collection);
        assert_eq!(analysis.entity, EntityType::Any);
        assert_eq!(warnings, vec![DefinitionWarning::UnresolvedEntity]);

        let (analysis, warnings) = analyze(TypeRef::Optional(None), None).unwrap();
        assert_eq!(analysis.shape, ReturnShape::Plain);
        assert_eq!(analysis.entity, EntityType::Any);
        assert_eq!(warnings, vec![DefinitionWarning::UnresolvedEntity]);
    }

    #[test]
    fn test_nested_element_type_fails() {
        let nested = TypeRef::collection(CollectionType::List, TypeRef::list_of(person()));

        assert!(analyze(nested, None).unwrap_err().is_definition());
        assert!(analyze(TypeRef::array(TypeRef::array(person().into())), None).is_err());
    }

    #[test]
    fn test_requested_collection() {
        let (analysis, _) = analyze(
            TypeRef::collection(CollectionType::Collection, person().into()),
            Some(CollectionType::BTreeSet),
        )
        .unwrap();

        assert_eq!(analysis.declared, Some(CollectionType::BTreeSet));
        assert_eq!(analysis.collection, Some(CollectionType::Collection));
    }

    #[test]
    fn test_requested_collection_incompatible() {
        let err = analyze(TypeRef::list_of(person()), Some(CollectionType::HashSet)).unwrap_err();

        match err {
            FinderError::Definition { message, .. } => assert_eq!(
                message,
                "Requested collection HashSet is incompatible with method return type List<Person>"
            ),
            other => panic!("Unexpected error {:?}", other),
        }

        assert!(analyze(person().into(), Some(CollectionType::Vec)).is_err());
    }
}
