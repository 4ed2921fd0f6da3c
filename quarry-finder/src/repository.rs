use std::{collections::BTreeMap, sync::Arc};

use quarry_core::data::DataValue;

use crate::{
    descriptor::FinderDescriptor,
    err::Result,
    factory::FinderDescriptorFactory,
    method::{MethodDefinition, MethodId},
    result::FinderResult,
    FinderError,
};

/// A method implemented by another component, called with the raw arguments
pub type Delegate = Arc<dyn Fn(&[DataValue]) -> Result<FinderResult> + Send + Sync>;

enum RepositoryMethod {
    Finder(MethodDefinition),
    Delegate(Delegate),
}

/// A named set of methods dispatched by method name
///
/// Finder methods are compiled through the shared factory on first invocation,
/// delegate methods forward their arguments to the registered callback.
pub struct Repository {
    name: String,
    methods: BTreeMap<String, RepositoryMethod>,
    factory: Arc<FinderDescriptorFactory>,
}

pub struct RepositoryBuilder {
    name: String,
    methods: Vec<(String, RepositoryMethod)>,
}

impl Repository {
    pub fn builder(name: impl Into<String>) -> RepositoryBuilder {
        RepositoryBuilder {
            name: name.into(),
            methods: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(|k| k.as_str())
    }

    pub fn is_delegate(&self, method: &str) -> bool {
        matches!(self.methods.get(method), Some(RepositoryMethod::Delegate(_)))
    }

    fn method(&self, method: &str) -> Result<&RepositoryMethod> {
        self.methods.get(method).ok_or_else(|| {
            FinderError::argument(
                &self.id(method),
                format!("Unknown method {} on repository {}", method, self.name),
            )
        })
    }

    fn id(&self, method: &str) -> MethodId {
        MethodId::new(self.name.clone(), method)
    }

    /// The compiled descriptor of a finder method
    pub fn descriptor(&self, method: &str) -> Result<Arc<FinderDescriptor>> {
        match self.method(method)? {
            RepositoryMethod::Finder(def) => self.factory.create(def),
            RepositoryMethod::Delegate(_) => Err(FinderError::argument(
                &self.id(method),
                format!(
                    "Method {} on repository {} is a delegate without a finder descriptor",
                    method, self.name
                ),
            )),
        }
    }

    /// Calls the method with the supplied arguments
    pub fn invoke(&self, method: &str, args: &[DataValue]) -> Result<FinderResult> {
        match self.method(method)? {
            RepositoryMethod::Finder(def) => self.factory.create(def)?.execute(args),
            RepositoryMethod::Delegate(delegate) => delegate(args),
        }
    }
}

impl RepositoryBuilder {
    /// Adds a finder method, its id is owned by this repository
    pub fn method(mut self, mut def: MethodDefinition) -> Self {
        def.id.owner = self.name.clone();
        self.methods
            .push((def.id.name.clone(), RepositoryMethod::Finder(def)));
        self
    }

    /// Adds a method which forwards its arguments to another component
    pub fn delegate(
        mut self,
        name: impl Into<String>,
        delegate: impl Fn(&[DataValue]) -> Result<FinderResult> + Send + Sync + 'static,
    ) -> Self {
        self.methods
            .push((name.into(), RepositoryMethod::Delegate(Arc::new(delegate))));
        self
    }

    /// Builds the repository, claiming its name on the factory
    pub fn build(self, factory: Arc<FinderDescriptorFactory>) -> Result<Repository> {
        let mut methods = BTreeMap::new();

        for (name, method) in self.methods {
            if methods.contains_key(&name) {
                return Err(FinderError::Configuration(format!(
                    "Duplicate method {} on repository {}",
                    name, self.name
                )));
            }

            methods.insert(name, method);
        }

        factory.register_owner(&self.name)?;

        Ok(Repository {
            name: self.name,
            methods,
            factory,
        })
    }
}
