//! # Mapper Registry
//!
//! Explicitly constructed set of entity mappers. Registration happens during
//! startup through `&mut self`; afterwards the registry is shared read-only
//! (e.g. `Arc<MapperRegistry>`) and lookups need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::entity::EntityMapper;
use super::errors::{MappingError, MappingResult};

#[derive(Debug, Default)]
pub struct MapperRegistry {
    mappers: HashMap<String, Arc<EntityMapper>>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mapper under its entity name
    pub fn register(&mut self, mapper: EntityMapper) -> MappingResult<Arc<EntityMapper>> {
        self.register_shared(Arc::new(mapper))
    }

    /// Registers a mapper that is also referenced by relations
    pub fn register_shared(&mut self, mapper: Arc<EntityMapper>) -> MappingResult<Arc<EntityMapper>> {
        if self.mappers.contains_key(mapper.entity()) {
            return Err(MappingError::DuplicateEntity(mapper.entity().to_string()));
        }
        debug!(entity = mapper.entity(), table = mapper.table(), "registered entity mapper");
        self.mappers
            .insert(mapper.entity().to_string(), Arc::clone(&mapper));
        Ok(mapper)
    }

    pub fn get(&self, entity: &str) -> MappingResult<&Arc<EntityMapper>> {
        self.mappers
            .get(entity)
            .ok_or_else(|| MappingError::UndefinedEntity(entity.to_string()))
    }

    /// Registered entity names, sorted
    pub fn entities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}
