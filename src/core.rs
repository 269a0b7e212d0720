//! Core pgarray functionality
//!
//! This module contains the named array type registry and the connection
//! helpers used to talk to PostgreSQL.

use array_codec::{CodecError, CodecOptions, ElementType};
use config::{CodecConfig, DatabaseConfig};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;
use type_mapping::{DynamicArray, PostgresValue};

use crate::binding::TypedArray;
use crate::errors::PgArrayError;

/// A named array mapping, e.g. `int-array` for `integer[]` columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayTypeDef {
    pub name: String,
    pub element_type: ElementType,
    /// Whether the array may hold NULL elements
    pub nullable_elements: bool,
}

impl ArrayTypeDef {
    pub fn new(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
            nullable_elements: true,
        }
    }

    /// Reject NULL elements on encode and decode
    pub fn non_null_elements(mut self) -> Self {
        self.nullable_elements = false;
        self
    }

    /// SQL column type, e.g. `integer[]`
    pub fn column_definition(&self) -> String {
        type_mapping::array_cast(self.element_type)
    }

    fn check_elements(&self, values: &[Option<PostgresValue>]) -> Result<(), CodecError> {
        if self.nullable_elements {
            return Ok(());
        }
        match values.iter().position(Option::is_none) {
            Some(index) => Err(CodecError::malformed(
                index,
                format!("array type '{}' does not allow NULL elements", self.name),
            )),
            None => Ok(()),
        }
    }
}

const DEFAULT_TYPES: [(&str, ElementType); 11] = [
    ("boolean-array", ElementType::Boolean),
    ("short-array", ElementType::SmallInt),
    ("int-array", ElementType::Integer),
    ("long-array", ElementType::BigInt),
    ("float-array", ElementType::Real),
    ("double-array", ElementType::DoublePrecision),
    ("string-array", ElementType::Text),
    ("uuid-array", ElementType::Uuid),
    ("date-array", ElementType::Date),
    ("timestamp-array", ElementType::Timestamp),
    ("timestamptz-array", ElementType::TimestampTz),
];

/// Registry of named array types sharing one set of codec options
pub struct ArrayTypeRegistry {
    types: HashMap<String, ArrayTypeDef>,
    options: CodecOptions,
}

impl ArrayTypeRegistry {
    /// Create an empty registry
    pub fn new(options: CodecOptions) -> Self {
        Self {
            types: HashMap::new(),
            options,
        }
    }

    /// Create a registry holding one definition per built-in element type
    pub fn with_defaults(options: CodecOptions) -> Self {
        let mut registry = Self::new(options);
        for (name, element_type) in DEFAULT_TYPES {
            registry
                .types
                .insert(name.to_string(), ArrayTypeDef::new(name, element_type));
        }
        registry
    }

    /// Create a registry with the defaults and the configured codec options
    pub fn from_config(config: &CodecConfig) -> Self {
        Self::with_defaults(config.options())
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Register a new array type definition
    pub fn register(&mut self, def: ArrayTypeDef) -> Result<(), PgArrayError> {
        if self.types.contains_key(&def.name) {
            return Err(PgArrayError::TypeAlreadyRegistered(def.name));
        }
        debug_log!("Registering array type '{}' as {}[]", def.name, def.element_type);
        self.types.insert(def.name.clone(), def);
        Ok(())
    }

    /// Get a registered array type by name
    pub fn get(&self, name: &str) -> Result<&ArrayTypeDef, PgArrayError> {
        self.types
            .get(name)
            .ok_or_else(|| PgArrayError::UnknownArrayType(name.to_string()))
    }

    /// Remove an array type by name
    pub fn unregister(&mut self, name: &str) -> Result<ArrayTypeDef, PgArrayError> {
        self.types
            .remove(name)
            .ok_or_else(|| PgArrayError::UnknownArrayType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// List registered names in sorted order
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Find the first definition, by name, whose element type matches a Rust field type
    pub fn find_for_rust_type(&self, rust_type: &str) -> Option<&ArrayTypeDef> {
        let element_type = type_mapping::array_element_type(rust_type)?;
        self.list()
            .into_iter()
            .filter_map(|name| self.types.get(name))
            .find(|def| def.element_type == element_type)
    }

    /// Encode a column value through a named type; `None` stays SQL NULL
    pub fn encode_text(
        &self,
        name: &str,
        values: Option<&[Option<PostgresValue>]>,
    ) -> Result<Option<String>, PgArrayError> {
        let def = self.get(name)?;
        if let Some(values) = values {
            def.check_elements(values)?;
        }
        let literal = type_mapping::encode_text_array(values, def.element_type, &self.options)?;
        trace_log!("Encoded '{}' value: {:?}", name, literal);
        Ok(literal)
    }

    /// Decode a column value through a named type
    pub fn decode_text(
        &self,
        name: &str,
        literal: Option<&str>,
    ) -> Result<Option<DynamicArray>, PgArrayError> {
        let def = self.get(name)?;
        let decoded = type_mapping::decode_text_array(literal, def.element_type, &self.options)?;
        if let Some(values) = &decoded {
            def.check_elements(values)?;
        }
        Ok(decoded)
    }

    /// Build a query parameter typed as the named array type
    pub fn bind(&self, name: &str, values: DynamicArray) -> Result<TypedArray, PgArrayError> {
        let def = self.get(name)?;
        def.check_elements(&values)?;
        Ok(TypedArray::new(def.element_type, values)?)
    }
}

impl Default for ArrayTypeRegistry {
    fn default() -> Self {
        Self::with_defaults(CodecOptions::default())
    }
}

/// Open a connection pool with the configured pool settings
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, PgArrayError> {
    let mut pool_options = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

    // Set max lifetime if specified
    if config.max_lifetime_seconds > 0 {
        pool_options = pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
    }

    let pool = pool_options.connect(&config.connection_string()).await?;
    tracing::info!(host = %config.host, database = %config.database, "connected to PostgreSQL");
    Ok(pool)
}

/// Check database connection health
pub async fn health_check(pool: &PgPool) -> Result<(), PgArrayError> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_element_type() {
        let registry = ArrayTypeRegistry::default();
        assert_eq!(registry.list().len(), ElementType::ALL.len());
        for ty in ElementType::ALL {
            assert!(registry.list().iter().any(|name| registry.get(name).unwrap().element_type == ty));
        }
        assert_eq!(registry.get("int-array").unwrap().column_definition(), "integer[]");
        assert_eq!(
            registry.get("timestamptz-array").unwrap().column_definition(),
            "timestamp with time zone[]"
        );
    }

    #[test]
    fn test_register_and_unregister() {
        let mut registry = ArrayTypeRegistry::new(CodecOptions::default());
        assert!(registry.list().is_empty());

        registry
            .register(ArrayTypeDef::new("list-array", ElementType::BigInt))
            .unwrap();
        assert!(matches!(
            registry.register(ArrayTypeDef::new("list-array", ElementType::Text)),
            Err(PgArrayError::TypeAlreadyRegistered(name)) if name == "list-array"
        ));
        assert_eq!(registry.get("list-array").unwrap().element_type, ElementType::BigInt);

        let removed = registry.unregister("list-array").unwrap();
        assert_eq!(removed.name, "list-array");
        assert!(!registry.contains("list-array"));
        assert!(matches!(
            registry.unregister("list-array"),
            Err(PgArrayError::UnknownArrayType(_))
        ));
        assert!(matches!(registry.get("nope"), Err(PgArrayError::UnknownArrayType(_))));
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = ArrayTypeRegistry::default();
        let names = registry.list();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "boolean-array");
    }

    #[test]
    fn test_find_for_rust_type() {
        let registry = ArrayTypeRegistry::default();
        assert_eq!(registry.find_for_rust_type("Vec<i64>").unwrap().name, "long-array");
        assert_eq!(
            registry.find_for_rust_type("Option<Vec<Option<String>>>").unwrap().name,
            "string-array"
        );
        assert!(registry.find_for_rust_type("Vec<u8>").is_none());
    }

    #[test]
    fn test_encode_and_decode_through_named_type() {
        let registry = ArrayTypeRegistry::default();
        let values = type_mapping::to_dynamic_array(vec![Some(1i32), Some(2), Some(3)]);

        let literal = registry.encode_text("int-array", Some(values.as_slice())).unwrap();
        assert_eq!(literal.as_deref(), Some("{1,2,3}"));
        assert_eq!(
            registry.decode_text("int-array", literal.as_deref()).unwrap(),
            Some(values)
        );

        assert_eq!(registry.encode_text("int-array", None).unwrap(), None);
        assert_eq!(registry.decode_text("int-array", None).unwrap(), None);
        assert!(matches!(
            registry.decode_text("int-array", Some("{1,2")),
            Err(PgArrayError::Codec(CodecError::MalformedArrayLiteral { .. }))
        ));
        assert!(matches!(
            registry.decode_text("missing", Some("{}")),
            Err(PgArrayError::UnknownArrayType(_))
        ));
    }

    #[test]
    fn test_non_null_elements_are_enforced() {
        let mut registry = ArrayTypeRegistry::new(CodecOptions::default());
        registry
            .register(ArrayTypeDef::new("primitive-int-array", ElementType::Integer).non_null_elements())
            .unwrap();

        assert!(registry.decode_text("primitive-int-array", Some("{1,2}")).is_ok());
        assert!(registry.decode_text("primitive-int-array", Some("{1,NULL}")).is_err());

        let values = vec![Some(PostgresValue::Integer(1)), None];
        assert!(registry.encode_text("primitive-int-array", Some(values.as_slice())).is_err());
        assert!(registry.bind("primitive-int-array", values).is_err());
    }

    #[test]
    fn test_registry_uses_configured_delimiter() {
        let registry = ArrayTypeRegistry::from_config(&CodecConfig::new(';', 0));
        let values = type_mapping::to_dynamic_array(vec![Some("a,b"), Some("c")]);
        assert_eq!(
            registry.encode_text("string-array", Some(values.as_slice())).unwrap().as_deref(),
            Some("{a,b;c}")
        );
    }
}
