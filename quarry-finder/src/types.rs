use std::fmt;

use quarry_core::data::DataType;

/// The type of each value a finder method produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityType {
    /// Untyped, the entity could not be detected
    Any,
    /// A raw document
    Document,
    /// A graph vertex
    Vertex,
    /// A graph edge
    Edge,
    /// A named, mapped entity
    Entity(String),
    /// A single column value
    Scalar(DataType),
}

impl EntityType {
    pub fn entity(name: impl Into<String>) -> Self {
        Self::Entity(name.into())
    }

    /// Scalars are projected from the first column of each row
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Any => write!(f, "Any"),
            EntityType::Document => write!(f, "Document"),
            EntityType::Vertex => write!(f, "Vertex"),
            EntityType::Edge => write!(f, "Edge"),
            EntityType::Entity(name) => write!(f, "{}", name),
            EntityType::Scalar(t) => write!(f, "{:?}", t),
        }
    }
}

/// Collection kinds a method may return
///
/// `Iterable` accepts every collection, `Collection` every list or set,
/// `List` and `Set` their concrete forms. `Iterator` only accepts itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionType {
    Iterable,
    Iterator,
    Collection,
    List,
    Set,
    Vec,
    VecDeque,
    HashSet,
    BTreeSet,
}

impl CollectionType {
    fn parent(&self) -> Option<CollectionType> {
        use CollectionType::*;

        match self {
            Iterable | Iterator => None,
            Collection => Some(Iterable),
            List | Set => Some(Collection),
            Vec | VecDeque => Some(List),
            HashSet | BTreeSet => Some(Set),
        }
    }

    /// Checks if a value of `other` may be returned where `self` is declared
    pub fn is_assignable_from(&self, other: CollectionType) -> bool {
        let mut current = Some(other);

        while let Some(kind) = current {
            if kind == *self {
                return true;
            }

            current = kind.parent();
        }

        false
    }

    /// Set kinds never hold duplicate items
    pub fn is_set(&self) -> bool {
        CollectionType::Set.is_assignable_from(*self)
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The declared return type of a finder method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A single entity, returned as is
    Entity(EntityType),
    /// A fixed array of elements
    Array(Box<TypeRef>),
    /// A collection with an optional element type argument
    Collection(CollectionType, Option<Box<TypeRef>>),
    /// An optional value with an optional type argument
    Optional(Option<Box<TypeRef>>),
}

impl TypeRef {
    pub fn entity(entity: EntityType) -> Self {
        Self::Entity(entity)
    }

    pub fn array(element: TypeRef) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn collection(kind: CollectionType, element: TypeRef) -> Self {
        Self::Collection(kind, Some(Box::new(element)))
    }

    pub fn raw_collection(kind: CollectionType) -> Self {
        Self::Collection(kind, None)
    }

    pub fn optional(inner: TypeRef) -> Self {
        Self::Optional(Some(Box::new(inner)))
    }

    pub fn list_of(entity: EntityType) -> Self {
        Self::collection(CollectionType::List, TypeRef::Entity(entity))
    }

    pub fn as_entity(&self) -> Option<&EntityType> {
        match self {
            TypeRef::Entity(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EntityType> for TypeRef {
    fn from(entity: EntityType) -> Self {
        Self::Entity(entity)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Entity(e) => write!(f, "{}", e),
            TypeRef::Array(e) => write!(f, "{}[]", e),
            TypeRef::Collection(kind, Some(e)) => write!(f, "{}<{}>", kind, e),
            TypeRef::Collection(kind, None) => write!(f, "{}", kind),
            TypeRef::Optional(Some(e)) => write!(f, "Optional<{}>", e),
            TypeRef::Optional(None) => write!(f, "Optional"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_assignability() {
        use CollectionType::*;

        assert!(Iterable.is_assignable_from(Vec));
        assert!(Iterable.is_assignable_from(BTreeSet));
        assert!(Collection.is_assignable_from(List));
        assert!(List.is_assignable_from(VecDeque));
        assert!(Set.is_assignable_from(HashSet));
        assert!(Vec.is_assignable_from(Vec));

        assert!(!List.is_assignable_from(HashSet));
        assert!(!Vec.is_assignable_from(List));
        assert!(!Iterator.is_assignable_from(Vec));
        assert!(!Iterable.is_assignable_from(Iterator));
        assert!(Iterator.is_assignable_from(Iterator));
    }

    #[test]
    fn test_collection_is_set() {
        assert!(CollectionType::Set.is_set());
        assert!(CollectionType::BTreeSet.is_set());
        assert!(!CollectionType::List.is_set());
        assert!(!CollectionType::Iterable.is_set());
    }

    #[test]
    fn test_type_ref_display() {
        assert_eq!(
            TypeRef::list_of(EntityType::entity("Person")).to_string(),
            "List<Person>"
        );
        assert_eq!(
            TypeRef::array(EntityType::Document.into()).to_string(),
            "Document[]"
        );
        assert_eq!(
            TypeRef::optional(EntityType::Vertex.into()).to_string(),
            "Optional<Vertex>"
        );
        assert_eq!(
            TypeRef::raw_collection(CollectionType::Iterator).to_string(),
            "Iterator"
        );
    }
}
