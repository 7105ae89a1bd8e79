//! # Mapping Configuration
//!
//! JSON description of entities, loaded once at startup:
//!
//! ```json
//! {
//!   "entities": [
//!     { "name": "customer", "table": "customers",
//!       "columns": [ { "property": "id", "type": "integer", "identity": true } ] },
//!     { "name": "order", "table": "orders",
//!       "columns": [ { "property": "id", "type": "integer", "identity": true },
//!                    { "property": "status", "type": "enum", "variants": ["open", "paid"] } ],
//!       "relations": [ { "property": "customer", "entity": "customer",
//!                        "local_column": "customer_id", "foreign_column": "id",
//!                        "join": "left" } ] }
//!   ]
//! }
//! ```
//!
//! Relations may reference entities declared later in the document.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::column::ColumnType;
use super::entity::{EntityMapper, JoinType, Relation};
use super::errors::{MappingError, MappingResult};
use super::registry::MapperRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    pub entities: Vec<EntityDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    pub property: String,
    /// Physical column name (defaults to the property name)
    #[serde(default)]
    pub column: Option<String>,
    #[serde(flatten)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub identity: bool,
}

impl ColumnDef {
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.property)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDef {
    pub property: String,
    pub entity: String,
    pub local_column: String,
    pub foreign_column: String,
    #[serde(default)]
    pub join: JoinType,
}

impl MappingConfig {
    /// Reads and validates a mapping document
    pub fn load(path: &Path) -> MappingResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MappingError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> MappingResult<Self> {
        let config: MappingConfig = serde_json::from_str(content)
            .map_err(|e| MappingError::Config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks names and column references; relation targets and cycles are
    /// checked while building
    fn validate(&self) -> MappingResult<()> {
        let mut names = HashSet::new();
        for entity in &self.entities {
            if !names.insert(entity.name.as_str()) {
                return Err(MappingError::DuplicateEntity(entity.name.clone()));
            }

            let mut properties = HashSet::new();
            let declared = entity
                .columns
                .iter()
                .map(|c| &c.property)
                .chain(entity.relations.iter().map(|r| &r.property));
            for property in declared {
                if !properties.insert(property.as_str()) {
                    return Err(MappingError::DuplicateProperty {
                        entity: entity.name.clone(),
                        property: property.clone(),
                    });
                }
            }

            for relation in &entity.relations {
                if !entity
                    .columns
                    .iter()
                    .any(|c| c.column_name() == relation.local_column)
                {
                    return Err(MappingError::Config(format!(
                        "relation '{}.{}' joins on unknown column '{}'",
                        entity.name, relation.property, relation.local_column
                    )));
                }
            }
        }
        Ok(())
    }
}

impl MapperRegistry {
    /// Builds every entity of `config`, related entities first
    pub fn from_config(config: &MappingConfig) -> MappingResult<Self> {
        let defs: HashMap<&str, &EntityDef> = config
            .entities
            .iter()
            .map(|e| (e.name.as_str(), e))
            .collect();

        let mut built: HashMap<String, Arc<EntityMapper>> = HashMap::new();
        let mut registry = MapperRegistry::new();
        for entity in &config.entities {
            let mapper = build(&entity.name, &defs, &mut built, &mut Vec::new())?;
            registry.register_shared(mapper)?;
        }
        Ok(registry)
    }

    pub fn load(path: &Path) -> MappingResult<Self> {
        Self::from_config(&MappingConfig::load(path)?)
    }
}

fn build(
    name: &str,
    defs: &HashMap<&str, &EntityDef>,
    built: &mut HashMap<String, Arc<EntityMapper>>,
    visiting: &mut Vec<String>,
) -> MappingResult<Arc<EntityMapper>> {
    if let Some(mapper) = built.get(name) {
        return Ok(Arc::clone(mapper));
    }
    if visiting.iter().any(|v| v == name) {
        return Err(MappingError::CyclicRelation(name.to_string()));
    }
    let def = defs
        .get(name)
        .ok_or_else(|| MappingError::UndefinedEntity(name.to_string()))?;

    visiting.push(name.to_string());
    let mut mapper = EntityMapper::new(&def.name, &def.table);
    for column in &def.columns {
        let column_type = column.column_type.clone();
        mapper = if column.identity {
            mapper.with_identity(&column.property, column.column_name(), column_type)
        } else {
            mapper.with_column(&column.property, column.column_name(), column_type)
        };
    }
    for relation in &def.relations {
        let target = build(&relation.entity, defs, built, visiting)?;
        if !target
            .columns()
            .iter()
            .any(|c| c.name() == relation.foreign_column)
        {
            return Err(MappingError::Config(format!(
                "relation '{}.{}' joins on unknown column '{}.{}'",
                def.name,
                relation.property,
                target.table(),
                relation.foreign_column
            )));
        }
        mapper = mapper.with_relation(
            &relation.property,
            Relation::new(target, &relation.local_column, &relation.foreign_column)
                .with_join_type(relation.join),
        );
    }
    visiting.pop();

    let mapper = Arc::new(mapper);
    built.insert(name.to_string(), Arc::clone(&mapper));
    Ok(mapper)
}
