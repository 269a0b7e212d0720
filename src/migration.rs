//! Database migration functionality
//!
//! DDL helpers for array columns and the `@>` containment function used by
//! array-typed query predicates.

use array_codec::ElementType;
use sqlx::PgPool;

use crate::errors::PgArrayError;

/// Plain lowercase SQL identifiers only; names are spliced into DDL unquoted
fn check_identifier(name: &str) -> Result<(), PgArrayError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    if valid_start
        && name.len() <= 63
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        Ok(())
    } else {
        Err(PgArrayError::InvalidIdentifier(name.to_string()))
    }
}

/// Column definition fragment, e.g. `sensor_ids integer[]`
pub fn array_column_sql(column: &str, element_type: ElementType) -> Result<String, PgArrayError> {
    check_identifier(column)?;
    Ok(format!(
        "{} {}",
        column,
        type_mapping::array_cast(element_type)
    ))
}

/// `CREATE OR REPLACE FUNCTION` statement for a boolean `left @> right` helper
pub fn array_contains_function_sql(
    function_name: &str,
    element_type: ElementType,
) -> Result<String, PgArrayError> {
    check_identifier(function_name)?;
    let array_type = type_mapping::array_cast(element_type);
    Ok(format!(
        "CREATE OR REPLACE FUNCTION {name}(left_array {ty}, right_array {ty})
        RETURNS boolean AS $$
        BEGIN
            RETURN left_array @> right_array;
        END;
        $$ LANGUAGE 'plpgsql'",
        name = function_name,
        ty = array_type
    ))
}

/// Create or replace the containment helper for one array type
pub async fn install_array_contains_function(
    pool: &PgPool,
    function_name: &str,
    element_type: ElementType,
) -> Result<(), PgArrayError> {
    let sql = array_contains_function_sql(function_name, element_type)?;
    debug_log!("Installing array function with SQL: {}", sql);
    sqlx::query(&sql).execute(pool).await?;
    tracing::info!(function = function_name, %element_type, "installed array containment function");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_column_sql() {
        assert_eq!(
            array_column_sql("sensor_ids", ElementType::Integer).unwrap(),
            "sensor_ids integer[]"
        );
        assert_eq!(
            array_column_sql("sensor_names", ElementType::Text).unwrap(),
            "sensor_names text[]"
        );
    }

    #[test]
    fn test_identifiers_are_checked() {
        for name in ["", "1abc", "drop table", "Name", "a;b", "x\"y"] {
            assert!(
                matches!(
                    array_column_sql(name, ElementType::Integer),
                    Err(PgArrayError::InvalidIdentifier(_))
                ),
                "{}",
                name
            );
        }
        assert!(array_column_sql(&"a".repeat(64), ElementType::Integer).is_err());
        assert!(array_column_sql("_tags2", ElementType::Text).is_ok());
    }

    #[test]
    fn test_array_contains_function_sql() {
        let sql = array_contains_function_sql("fn_array_contains", ElementType::BigInt).unwrap();
        assert!(sql.starts_with("CREATE OR REPLACE FUNCTION fn_array_contains("));
        assert!(sql.contains("left_array bigint[], right_array bigint[]"));
        assert!(sql.contains("RETURN left_array @> right_array;"));
        assert!(sql.contains("RETURNS boolean"));
    }
}
