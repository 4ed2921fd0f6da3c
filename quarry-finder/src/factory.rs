use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, RwLock},
};

use quarry_logging::{debug, trace};

use crate::{
    descriptor::{FinderDescriptor, QuerySource},
    err::{check, Result},
    executor::ExecutorRegistry,
    method::{MethodDefinition, MethodId},
    params::analyze_parameters,
    placeholder::{PlaceholderDefaults, Template},
    shape::analyze_return_type,
    FinderError,
};

/// Compiles method definitions into descriptors, at most once per method
pub struct FinderDescriptorFactory {
    registry: ExecutorRegistry,
    cache: RwLock<HashMap<MethodId, Arc<FinderDescriptor>>>,
    // Held while building so each descriptor is only built once.
    // Cached descriptors are read without it.
    lock: Mutex<()>,
    // Method ids are only unique within one owner
    owners: Mutex<HashSet<String>>,
}

impl FinderDescriptorFactory {
    pub fn new(registry: ExecutorRegistry) -> Self {
        Self {
            registry,
            cache: RwLock::new(HashMap::new()),
            lock: Mutex::new(()),
            owners: Mutex::new(HashSet::new()),
        }
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Claims the owner name for the methods compiled through this factory
    pub fn register_owner(&self, owner: &str) -> Result<()> {
        let mut owners = self
            .owners
            .lock()
            .map_err(|_| FinderError::Internal("Owner registry poisoned".into()))?;

        if !owners.insert(owner.to_string()) {
            return Err(FinderError::Configuration(format!(
                "Owner {} is already registered, method ids would clash",
                owner
            )));
        }

        Ok(())
    }

    /// Returns the cached descriptor of the method, building it on first use
    ///
    /// Failed builds are not cached, each later call fails again.
    pub fn create(&self, def: &MethodDefinition) -> Result<Arc<FinderDescriptor>> {
        if let Some(descriptor) = self.cached(&def.id)? {
            return Ok(descriptor);
        }

        let _guard = self
            .lock
            .lock()
            .map_err(|_| FinderError::Internal("Descriptor build lock poisoned".into()))?;

        // could be built while waiting for the lock
        if let Some(descriptor) = self.cached(&def.id)? {
            return Ok(descriptor);
        }

        let descriptor = Arc::new(self.build(def)?);

        let mut cache = self
            .cache
            .write()
            .map_err(|_| FinderError::Internal("Descriptor cache poisoned".into()))?;

        if cache.contains_key(&def.id) {
            return Err(FinderError::Internal(format!(
                "Bad concurrency: descriptor for {} already present in cache",
                def.id
            )));
        }

        cache.insert(def.id.clone(), Arc::clone(&descriptor));
        debug!("Compiled finder method {}: {:?}", def.id, descriptor);

        Ok(descriptor)
    }

    /// Returns the descriptor if the method was already compiled
    pub fn cached(&self, id: &MethodId) -> Result<Option<Arc<FinderDescriptor>>> {
        Ok(self
            .cache
            .read()
            .map_err(|_| FinderError::Internal("Descriptor cache poisoned".into()))?
            .get(id)
            .cloned())
    }

    /// Number of compiled methods
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build(&self, def: &MethodDefinition) -> Result<FinderDescriptor> {
        let id = &def.id;
        trace!("Compiling finder method {}", id);

        let query = def.query.as_deref().filter(|q| !q.is_empty());
        let function = def.function.as_deref().filter(|f| !f.is_empty());

        check!(
            id,
            !(query.is_some() && function.is_some()),
            "Choose what to use function or query, but not both"
        );

        let source = match (query, function) {
            (Some(query), _) => QuerySource::Query(parse_template(id, query)?),
            (_, Some(function)) => QuerySource::Function(parse_template(id, function)?),
            (None, None) => {
                return Err(FinderError::definition(
                    id,
                    "Either query or function must be declared",
                ))
            }
        };

        let mut warnings = vec![];

        let mut defaults = PlaceholderDefaults::default();
        for values in def.placeholder_values.iter() {
            defaults
                .register(source.template(), &values.name, values.values.clone())
                .map_err(|e| FinderError::definition(id, e.to_string()))?;
        }

        let ret = analyze_return_type(def, &mut warnings)?;
        let executor = self
            .registry
            .resolve(id, &ret.entity, def.use_connection, &mut warnings)?;
        let params = analyze_parameters(def, source.template(), &defaults, &mut warnings)?;

        Ok(FinderDescriptor {
            id: id.clone(),
            source,
            placeholder_defaults: defaults,
            return_shape: ret.shape,
            entity: ret.entity,
            collection: ret.collection,
            declared_collection: ret.declared,
            executor,
            param_count: def.params.len(),
            params: params.binding,
            first_result: params.first_result,
            max_results: params.max_results,
            placeholder_params: params.placeholders,
            warnings,
        })
    }
}

fn parse_template(id: &MethodId, template: &str) -> Result<Template> {
    Template::parse(template).map_err(|e| FinderError::definition(id, e.to_string()))
}
