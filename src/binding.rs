//! sqlx bindings for PostgreSQL arrays
//!
//! `PgArray<T>` maps a column or parameter whose element type is known at
//! compile time. `TypedArray` carries its element type as a value, so a
//! parameter built from a runtime mapping still reaches the server as
//! `integer[]` (or whichever array type it declares) instead of an untyped
//! value.
//!
//! Parameters are always sent in the binary format. Columns are decoded from
//! either format, depending on how the query was executed.

use array_codec::{
    encode_binary, format_literal, parse_binary, parse_literal, split_binary, write_binary_elements,
    ArrayElement, CodecError, CodecOptions, ElementType,
};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueFormat, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type, ValueRef};
use std::ops::Deref;
use type_mapping::{DynamicArray, PostgresValue};

fn array_type_info(element_type: ElementType) -> PgTypeInfo {
    PgTypeInfo::with_oid(Oid(element_type.array_oid()))
}

/// One-dimensional array of `T`; `None` entries are NULL elements.
///
/// Wrap it in `Option` to express a NULL column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PgArray<T>(pub Vec<Option<T>>);

impl<T: ArrayElement> PgArray<T> {
    pub fn new(values: Vec<Option<T>>) -> Self {
        Self(values)
    }

    /// Build an array without NULL elements
    pub fn from_values(values: Vec<T>) -> Self {
        Self(values.into_iter().map(Some).collect())
    }

    pub fn into_inner(self) -> Vec<Option<T>> {
        self.0
    }

    /// Unwrap every element, failing on the first NULL
    pub fn into_values(self) -> Result<Vec<T>, CodecError> {
        self.0
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                value.ok_or_else(|| {
                    CodecError::malformed(
                        index,
                        format!(
                            "null element in array of non-nullable {}",
                            T::ELEMENT_TYPE.sql_name()
                        ),
                    )
                })
            })
            .collect()
    }

    /// Text literal form, as PostgreSQL would print the value
    pub fn to_literal(&self, options: &CodecOptions) -> String {
        format_literal(&self.0, options)
    }

    pub fn from_literal(literal: &str, options: &CodecOptions) -> Result<Self, CodecError> {
        parse_literal(literal, options).map(Self)
    }

    /// Binary wire form
    pub fn to_binary(&self) -> Result<Vec<u8>, CodecError> {
        encode_binary(&self.0)
    }

    pub fn from_binary(bytes: &[u8], options: &CodecOptions) -> Result<Self, CodecError> {
        parse_binary(bytes, options).map(Self)
    }
}

impl<T> Deref for PgArray<T> {
    type Target = [Option<T>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<Vec<Option<T>>> for PgArray<T> {
    fn from(values: Vec<Option<T>>) -> Self {
        Self(values)
    }
}

impl<T: ArrayElement> Type<Postgres> for PgArray<T> {
    fn type_info() -> PgTypeInfo {
        array_type_info(T::ELEMENT_TYPE)
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        match ty.oid() {
            Some(oid) => T::ELEMENT_TYPE.accepts_array_oid(oid.0),
            None => *ty == Self::type_info(),
        }
    }
}

impl<'q, T: ArrayElement> Encode<'q, Postgres> for PgArray<T> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        write_binary_elements(self.0.iter().map(Option::as_ref), &mut **buf)?;
        Ok(IsNull::No)
    }
}

impl<'r, T: ArrayElement> Decode<'r, Postgres> for PgArray<T> {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let options = CodecOptions::default();
        let elements = match value.format() {
            PgValueFormat::Binary => parse_binary(value.as_bytes()?, &options)?,
            PgValueFormat::Text => parse_literal(value.as_str()?, &options)?,
        };
        Ok(Self(elements))
    }
}

/// Array parameter or column whose element type is chosen at runtime
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    element_type: ElementType,
    values: DynamicArray,
}

impl TypedArray {
    /// Fails if an element does not match `element_type`
    pub fn new(element_type: ElementType, values: DynamicArray) -> Result<Self, CodecError> {
        let mismatch = values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.as_ref().map(|value| (index, value)))
            .find(|(_, value)| value.element_type() != element_type);
        if let Some((index, value)) = mismatch {
            return Err(CodecError::malformed(
                index,
                format!(
                    "element {} is {} but the array is declared as {}[]",
                    index,
                    value.element_type(),
                    element_type
                ),
            ));
        }
        Ok(Self {
            element_type,
            values,
        })
    }

    /// Collect typed values into a parameter of their natural array type
    pub fn from_values<T, I>(values: I) -> Self
    where
        T: ArrayElement + Into<PostgresValue>,
        I: IntoIterator<Item = Option<T>>,
    {
        Self {
            element_type: T::ELEMENT_TYPE,
            values: type_mapping::to_dynamic_array(values),
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn values(&self) -> &[Option<PostgresValue>] {
        &self.values
    }

    pub fn into_values(self) -> DynamicArray {
        self.values
    }

    /// SQL cast for the parameter placeholder, e.g. `integer[]`
    pub fn sql_type(&self) -> String {
        type_mapping::array_cast(self.element_type)
    }
}

impl Type<Postgres> for TypedArray {
    fn type_info() -> PgTypeInfo {
        array_type_info(ElementType::Text)
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        ty.oid()
            .and_then(|oid| ElementType::from_array_oid(oid.0))
            .is_some()
    }
}

impl<'q> Encode<'q, Postgres> for TypedArray {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        type_mapping::encode_binary_array(&self.values, self.element_type, &mut **buf)?;
        Ok(IsNull::No)
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(array_type_info(self.element_type))
    }
}

impl<'r> Decode<'r, Postgres> for TypedArray {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let options = CodecOptions::default();
        let declared = value
            .type_info()
            .oid()
            .and_then(|oid| ElementType::from_array_oid(oid.0));

        let (element_type, values) = match value.format() {
            PgValueFormat::Binary => {
                let bytes = value.as_bytes()?;
                let element_oid = split_binary(bytes, &options)?.element_oid;
                let element_type = ElementType::from_oid(element_oid)
                    .or(declared)
                    .ok_or_else(|| format!("unsupported array element type oid {}", element_oid))?;
                let values =
                    type_mapping::decode_binary_array(Some(bytes), element_type, &options)?;
                (element_type, values)
            }
            PgValueFormat::Text => {
                let element_type = declared.ok_or("cannot determine array element type")?;
                let values =
                    type_mapping::decode_text_array(Some(value.as_str()?), element_type, &options)?;
                (element_type, values)
            }
        };

        Ok(Self {
            element_type,
            values: values.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pg_array_type_info_uses_array_oid() {
        assert_eq!(
            <PgArray<i32> as Type<Postgres>>::type_info().oid(),
            Some(Oid(1007))
        );
        assert_eq!(
            <PgArray<String> as Type<Postgres>>::type_info().oid(),
            Some(Oid(1009))
        );
        assert!(<PgArray<String> as Type<Postgres>>::compatible(&PgTypeInfo::with_oid(Oid(1015))));
        assert!(!<PgArray<i64> as Type<Postgres>>::compatible(&PgTypeInfo::with_oid(Oid(1007))));
    }

    #[test]
    fn test_pg_array_literal_helpers() {
        let options = CodecOptions::default();
        let array = PgArray::from_values(vec![1i64, 2, 3]);
        assert_eq!(array.to_literal(&options), "{1,2,3}");
        assert_eq!(PgArray::<i64>::from_literal("{1,2,3}", &options).unwrap(), array);
        assert_eq!(array.len(), 3);

        let bytes = array.to_binary().unwrap();
        assert_eq!(PgArray::<i64>::from_binary(&bytes, &options).unwrap(), array);
        assert_eq!(array.clone().into_values().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pg_array_into_values_rejects_nulls() {
        let array = PgArray::new(vec![Some(1i32), None]);
        let err = array.into_values().unwrap_err();
        assert_eq!(err.position(), Some(1));
    }

    #[test]
    fn test_typed_array_validates_elements() {
        let values = vec![Some(PostgresValue::Integer(1)), Some(PostgresValue::BigInt(2))];
        let err = TypedArray::new(ElementType::Integer, values).unwrap_err();
        assert_eq!(err.position(), Some(1));

        let typed = TypedArray::from_values(vec![Some(2i32), None]);
        assert_eq!(typed.element_type(), ElementType::Integer);
        assert_eq!(typed.sql_type(), "integer[]");
        assert_eq!(typed.values().len(), 2);
    }

    #[test]
    fn test_typed_array_produces_declared_type() {
        let typed = TypedArray::from_values(vec![Some(1i64)]);
        let produced = <TypedArray as Encode<'_, Postgres>>::produces(&typed);
        assert_eq!(produced.and_then(|info| info.oid()), Some(Oid(1016)));
        assert!(<TypedArray as Type<Postgres>>::compatible(&PgTypeInfo::with_oid(Oid(2951))));
        assert!(!<TypedArray as Type<Postgres>>::compatible(&PgTypeInfo::with_oid(Oid(23))));
    }
}
