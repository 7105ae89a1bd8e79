//! # Entity Mapper
//!
//! Relates the logical properties of one entity to physical columns, and
//! its relations to the mappers of related entities. A dotted path such as
//! `customer.address.city` is resolved one segment at a time, each segment
//! against the mapper reached by the previous one.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::column::{Column, ColumnType};
use super::errors::{MappingError, MappingResult};

/// How a related table is joined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

/// A property that leads to another entity
#[derive(Debug, Clone)]
pub struct Relation {
    mapper: Arc<EntityMapper>,
    join_type: JoinType,
    /// Column on the owning table
    local_column: String,
    /// Column on the related table
    foreign_column: String,
}

impl Relation {
    /// Inner-joined relation on `owner.local_column = related.foreign_column`
    pub fn new(
        mapper: Arc<EntityMapper>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        Self {
            mapper,
            join_type: JoinType::default(),
            local_column: local_column.into(),
            foreign_column: foreign_column.into(),
        }
    }

    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    pub fn mapper(&self) -> &Arc<EntityMapper> {
        &self.mapper
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }
}

#[derive(Debug, Clone)]
enum Property {
    Column(Column),
    Relation(Relation),
}

/// What a path ends on
enum Resolved<'a> {
    Column(&'a Column),
    Entity(&'a EntityMapper),
}

/// A related table that must be joined to reach some field
#[derive(Debug, Clone)]
pub struct JoinedEntity {
    mapper: Arc<EntityMapper>,
    join_type: JoinType,
    parent_table: String,
    local_column: String,
    foreign_column: String,
}

impl JoinedEntity {
    pub fn mapper(&self) -> &EntityMapper {
        &self.mapper
    }

    pub fn table(&self) -> &str {
        self.mapper.table()
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    /// Table the join hangs off
    pub fn parent_table(&self) -> &str {
        &self.parent_table
    }

    pub fn local_column(&self) -> &str {
        &self.local_column
    }

    pub fn foreign_column(&self) -> &str {
        &self.foreign_column
    }
}

/// Field resolver for one entity.
///
/// Built once, then shared read-only (usually behind an `Arc`).
#[derive(Debug, Clone)]
pub struct EntityMapper {
    entity: String,
    table: String,
    properties: Vec<(String, Property)>,
    index: HashMap<String, usize>,
}

impl EntityMapper {
    pub fn new(entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            table: table.into(),
            properties: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds a plain column property.
    ///
    /// A later property with the same name replaces the earlier one.
    pub fn with_column(
        self,
        property: impl Into<String>,
        column: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        let column = Column::new(self.table.clone(), column, column_type);
        self.with_property(property.into(), Property::Column(column))
    }

    /// Adds an identity column property
    pub fn with_identity(
        self,
        property: impl Into<String>,
        column: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        let column = Column::new(self.table.clone(), column, column_type).identity();
        self.with_property(property.into(), Property::Column(column))
    }

    pub fn with_relation(self, property: impl Into<String>, relation: Relation) -> Self {
        self.with_property(property.into(), Property::Relation(relation))
    }

    fn with_property(mut self, name: String, property: Property) -> Self {
        match self.index.get(&name) {
            Some(&position) => self.properties[position].1 = property,
            None => {
                self.index.insert(name.clone(), self.properties.len());
                self.properties.push((name, property));
            }
        }
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Direct columns in declaration order
    pub fn columns(&self) -> Vec<&Column> {
        self.properties
            .iter()
            .filter_map(|(_, property)| match property {
                Property::Column(column) => Some(column),
                Property::Relation(_) => None,
            })
            .collect()
    }

    pub fn identity_columns(&self) -> Vec<&Column> {
        self.columns()
            .into_iter()
            .filter(|c| c.is_identity())
            .collect()
    }

    /// Direct relations in declaration order
    pub fn relations(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.properties
            .iter()
            .filter_map(|(name, property)| match property {
                Property::Relation(relation) => Some((name.as_str(), relation)),
                Property::Column(_) => None,
            })
    }

    fn property(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&i| &self.properties[i].1)
    }

    /// Walks `path`, returning every relation crossed and where it ended
    fn resolve<'a>(&'a self, path: &str) -> MappingResult<(Vec<&'a Relation>, Resolved<'a>)> {
        let mut mapper: &'a EntityMapper = self;
        let mut hops: Vec<&'a Relation> = Vec::new();
        let mut segments = path.split('.');

        while let Some(segment) = segments.next() {
            let property = mapper
                .property(segment)
                .ok_or_else(|| mapper.undefined(path, segment))?;
            match property {
                Property::Column(column) => {
                    // a column has no members to descend into
                    if let Some(next) = segments.next() {
                        return Err(MappingError::UndefinedField {
                            entity: column.to_string(),
                            path: path.to_string(),
                            segment: next.to_string(),
                        });
                    }
                    return Ok((hops, Resolved::Column(column)));
                }
                Property::Relation(relation) => {
                    hops.push(relation);
                    mapper = &*relation.mapper;
                }
            }
        }
        Ok((hops, Resolved::Entity(mapper)))
    }

    fn undefined(&self, path: &str, segment: &str) -> MappingError {
        MappingError::UndefinedField {
            entity: self.entity.clone(),
            path: path.to_string(),
            segment: segment.to_string(),
        }
    }

    /// Columns a field denotes: one for a plain property, every direct
    /// column for a property naming a whole entity
    pub fn resolve_columns(&self, path: &str) -> MappingResult<Vec<Column>> {
        match self.resolve(path)?.1 {
            Resolved::Column(column) => Ok(vec![column.clone()]),
            Resolved::Entity(mapper) => Ok(mapper.columns().into_iter().cloned().collect()),
        }
    }

    /// The single column a field compares or sorts on.
    ///
    /// A property naming a whole entity stands for its first identity column.
    pub fn resolve_column(&self, path: &str) -> MappingResult<Column> {
        match self.resolve(path)?.1 {
            Resolved::Column(column) => Ok(column.clone()),
            Resolved::Entity(mapper) => mapper
                .identity_columns()
                .first()
                .map(|c| (*c).clone())
                .ok_or_else(|| MappingError::MissingIdentity(mapper.entity.clone())),
        }
    }

    /// Distinct related tables needed to reach `paths`, parents before
    /// children, excluding this entity's own table
    pub fn joined_entities<S: AsRef<str>>(&self, paths: &[S]) -> MappingResult<Vec<JoinedEntity>> {
        let mut joins: Vec<JoinedEntity> = Vec::new();
        for path in paths {
            let (hops, _) = self.resolve(path.as_ref())?;
            let mut parent_table = self.table.as_str();
            for relation in hops {
                let table = relation.mapper.table();
                if table != self.table && !joins.iter().any(|j| j.table() == table) {
                    joins.push(JoinedEntity {
                        mapper: Arc::clone(&relation.mapper),
                        join_type: relation.join_type,
                        parent_table: parent_table.to_string(),
                        local_column: relation.local_column.clone(),
                        foreign_column: relation.foreign_column.clone(),
                    });
                }
                parent_table = table;
            }
        }
        Ok(joins)
    }

    /// Configured join type for a related table reachable from this entity
    pub fn join_type(&self, table: &str) -> Option<JoinType> {
        self.relations().find_map(|(_, relation)| {
            if relation.mapper.table() == table {
                Some(relation.join_type)
            } else {
                relation.mapper.join_type(table)
            }
        })
    }
}
