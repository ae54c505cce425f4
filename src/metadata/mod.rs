// Entity Metadata Module
//
// This module defines the lookup contract the translator uses to resolve
// logical entity, property and relationship names to physical schema names,
// plus an in-memory registry implementation for tests and simple hosts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Physical mapping of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Logical entity name
    pub name: String,
    /// Physical table name
    pub table: String,
    /// Optional schema the table lives in
    pub schema: Option<String>,
}

impl EntityMeta {
    /// The table reference as it appears in SQL, schema-qualified when a
    /// schema is declared
    pub fn table_ref(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

/// Physical mapping of one entity property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Physical column name
    pub column: String,
    /// Declared SQL type
    pub sql_type: String,
}

/// A declared relationship/navigation property used as a join target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipMeta {
    /// Entity on the far side of the relationship
    pub target_entity: String,
    /// Join column on the owning entity's table
    pub source_column: String,
    /// Join column on the target entity's table
    pub target_column: String,
}

/// Resolution of logical names to physical schema, injected into the
/// translator. Implementations are read-only from the engine's perspective.
pub trait MetadataLookup {
    /// Look up an entity by its logical name
    fn entity(&self, entity: &str) -> Option<&EntityMeta>;

    /// Look up a property's column on the given entity
    fn column(&self, entity: &str, property: &str) -> Option<&ColumnMeta>;

    /// Look up a relationship declared on the given entity
    fn relationship(&self, entity: &str, relationship: &str) -> Option<&RelationshipMeta>;
}

/// In-memory metadata registry
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entities: HashMap<String, EntityMeta>,
    columns: HashMap<String, HashMap<String, ColumnMeta>>,
    relationships: HashMap<String, HashMap<String, RelationshipMeta>>,
}

impl MetadataRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity and its physical table
    pub fn register_entity(&mut self, name: &str, table: &str) {
        self.entities.insert(
            name.to_string(),
            EntityMeta {
                name: name.to_string(),
                table: table.to_string(),
                schema: None,
            },
        );
    }

    /// Register an entity whose table lives in a named schema
    pub fn register_entity_with_schema(&mut self, name: &str, schema: &str, table: &str) {
        self.entities.insert(
            name.to_string(),
            EntityMeta {
                name: name.to_string(),
                table: table.to_string(),
                schema: Some(schema.to_string()),
            },
        );
    }

    /// Register a property column on an entity
    pub fn register_column(&mut self, entity: &str, property: &str, column: &str, sql_type: &str) {
        self.columns.entry(entity.to_string()).or_default().insert(
            property.to_string(),
            ColumnMeta {
                column: column.to_string(),
                sql_type: sql_type.to_string(),
            },
        );
    }

    /// Register a relationship on an entity
    pub fn register_relationship(
        &mut self,
        entity: &str,
        name: &str,
        target_entity: &str,
        source_column: &str,
        target_column: &str,
    ) {
        self.relationships
            .entry(entity.to_string())
            .or_default()
            .insert(
                name.to_string(),
                RelationshipMeta {
                    target_entity: target_entity.to_string(),
                    source_column: source_column.to_string(),
                    target_column: target_column.to_string(),
                },
            );
    }
}

impl MetadataLookup for MetadataRegistry {
    fn entity(&self, entity: &str) -> Option<&EntityMeta> {
        self.entities.get(entity)
    }

    fn column(&self, entity: &str, property: &str) -> Option<&ColumnMeta> {
        self.columns.get(entity)?.get(property)
    }

    fn relationship(&self, entity: &str, relationship: &str) -> Option<&RelationshipMeta> {
        self.relationships.get(entity)?.get(relationship)
    }
}
