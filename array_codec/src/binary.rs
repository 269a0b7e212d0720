//! Binary array wire format
//!
//! Layout used by `array_send`/`array_recv`, all integers big endian:
//!
//! ```text
//! ndim: i32 | has_nulls: i32 | element_oid: u32
//! ndim x ( len: i32 | lower_bound: i32 )
//! per element: len: i32 (-1 = NULL) | bytes
//! ```
//!
//! An empty array is sent with `ndim = 0` and no dimension header.

use crate::element::{ArrayElement, ElementType};
use crate::errors::{CodecError, CodecResult};
use crate::options::CodecOptions;

const HEADER_LEN: usize = 12;
const DIMENSION_LEN: usize = 8;

/// Header and raw element slices of a decoded binary array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryArray<'a> {
    pub element_oid: u32,
    pub lower_bound: i32,
    pub elements: Vec<BinaryElement<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryElement<'a> {
    /// Byte offset of the element's length word
    pub offset: usize,
    pub bytes: Option<&'a [u8]>,
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize, what: &str) -> CodecResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                CodecError::malformed(
                    self.offset,
                    format!("truncated binary array while reading {}", what),
                )
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_i32(&mut self, what: &str) -> CodecResult<i32> {
        let slice = self.take(4, what)?;
        Ok(i32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn read_u32(&mut self, what: &str) -> CodecResult<u32> {
        let slice = self.take(4, what)?;
        Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }
}

/// Split binary array data into its header and element slices
pub fn split_binary<'a>(bytes: &'a [u8], options: &CodecOptions) -> CodecResult<BinaryArray<'a>> {
    split(bytes, options).inspect_err(|e| {
        tracing::debug!(error = %e, "rejected binary array");
    })
}

fn split<'a>(bytes: &'a [u8], options: &CodecOptions) -> CodecResult<BinaryArray<'a>> {
    let mut reader = Reader { bytes, offset: 0 };

    let ndim = reader.read_i32("dimension count")?;
    let flags = reader.read_i32("null flag")?;
    let element_oid = reader.read_u32("element type")?;

    if flags != 0 && flags != 1 {
        return Err(CodecError::malformed(4, format!("invalid array flags {}", flags)));
    }

    let (len, lower_bound) = match ndim {
        0 => (0, 1),
        1 => {
            let len = reader.read_i32("dimension length")?;
            let lower_bound = reader.read_i32("lower bound")?;
            let len = usize::try_from(len).map_err(|_| {
                CodecError::malformed(HEADER_LEN, format!("negative array length {}", len))
            })?;
            (len, lower_bound)
        }
        n if n > 1 => {
            return Err(CodecError::malformed(
                0,
                format!("multi-dimensional arrays are not supported ({} dimensions)", n),
            ));
        }
        n => return Err(CodecError::malformed(0, format!("invalid dimension count {}", n))),
    };

    if !options.allows_len(len) {
        return Err(CodecError::malformed(
            HEADER_LEN,
            format!("array has more than {} elements", options.max_elements),
        ));
    }

    // Every element needs at least its length word, so cap the allocation
    let mut elements = Vec::with_capacity(len.min(bytes.len() / 4));
    for _ in 0..len {
        let offset = reader.offset;
        let element_len = reader.read_i32("element length")?;
        let element = match element_len {
            -1 => None,
            n if n >= 0 => Some(reader.take(n as usize, "element data")?),
            n => {
                return Err(CodecError::malformed(
                    offset,
                    format!("invalid element length {}", n),
                ));
            }
        };
        elements.push(BinaryElement {
            offset,
            bytes: element,
        });
    }

    if reader.offset != bytes.len() {
        return Err(CodecError::malformed(
            reader.offset,
            format!("{} trailing bytes after array data", bytes.len() - reader.offset),
        ));
    }

    Ok(BinaryArray {
        element_oid,
        lower_bound,
        elements,
    })
}

/// Fail unless the array's element OID can be read as `expected`
pub fn check_element_oid(array: &BinaryArray<'_>, expected: ElementType) -> CodecResult<()> {
    if expected.accepts_oid(array.element_oid) {
        return Ok(());
    }
    Err(CodecError::malformed(
        8,
        format!(
            "binary array has element type oid {} instead of {} ({})",
            array.element_oid,
            expected.oid(),
            expected.sql_name()
        ),
    ))
}

fn coerce<T: ArrayElement>(element: BinaryElement<'_>) -> CodecResult<Option<T>> {
    match element.bytes {
        None => Ok(None),
        Some(bytes) => T::parse_binary(bytes)
            .map(Some)
            .map_err(|reason| CodecError::malformed(element.offset, reason)),
    }
}

/// Decode binary array data into elements of the declared type
pub fn parse_binary<T: ArrayElement>(
    bytes: &[u8],
    options: &CodecOptions,
) -> CodecResult<Vec<Option<T>>> {
    let array = split_binary(bytes, options)?;
    check_element_oid(&array, T::ELEMENT_TYPE)?;
    array.elements.into_iter().map(coerce).collect()
}

/// Decode binary array data whose elements may not be null
pub fn parse_binary_values<T: ArrayElement>(
    bytes: &[u8],
    options: &CodecOptions,
) -> CodecResult<Vec<T>> {
    let array = split_binary(bytes, options)?;
    check_element_oid(&array, T::ELEMENT_TYPE)?;
    array
        .elements
        .into_iter()
        .map(|element| {
            coerce::<T>(element)?.ok_or_else(|| {
                CodecError::malformed(
                    element.offset,
                    format!(
                        "null element in array of non-nullable {}",
                        T::ELEMENT_TYPE.sql_name()
                    ),
                )
            })
        })
        .collect()
}

fn patch_i32(buf: &mut [u8], at: usize, value: i32) {
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

/// Append the binary form of `elements`, each written by `write`.
///
/// Shared by the typed encoders and by callers holding dynamically typed
/// values.
pub fn write_binary_with<I, F>(
    element_type: ElementType,
    elements: I,
    buf: &mut Vec<u8>,
    mut write: F,
) -> CodecResult<()>
where
    I: IntoIterator,
    F: FnMut(I::Item, &mut Vec<u8>) -> CodecResult<bool>,
{
    let start = buf.len();
    buf.extend_from_slice(&1i32.to_be_bytes());
    buf.extend_from_slice(&0i32.to_be_bytes());
    buf.extend_from_slice(&element_type.oid().to_be_bytes());
    let dimension_at = buf.len();
    buf.extend_from_slice(&0i32.to_be_bytes());
    buf.extend_from_slice(&1i32.to_be_bytes());

    let mut count: usize = 0;
    let mut has_nulls = false;
    for element in elements {
        let len_at = buf.len();
        buf.extend_from_slice(&(-1i32).to_be_bytes());
        let data_at = buf.len();
        if write(element, buf)? {
            let written = buf.len() - data_at;
            let len = i32::try_from(written).map_err(|_| CodecError::ElementTooLarge(written))?;
            patch_i32(buf, len_at, len);
        } else {
            has_nulls = true;
        }
        count += 1;
    }

    if count == 0 {
        buf.truncate(dimension_at);
        patch_i32(buf, start, 0);
        return Ok(());
    }

    let len = i32::try_from(count).map_err(|_| CodecError::ElementTooLarge(count))?;
    patch_i32(buf, dimension_at, len);
    patch_i32(buf, start + 4, i32::from(has_nulls));
    Ok(())
}

/// Append the binary form of a sequence; `None` entries are written as NULL
pub fn write_binary_elements<'a, T, I>(elements: I, buf: &mut Vec<u8>) -> CodecResult<()>
where
    T: ArrayElement + 'a,
    I: IntoIterator<Item = Option<&'a T>>,
{
    write_binary_with(T::ELEMENT_TYPE, elements, buf, |element, buf| {
        Ok(match element {
            Some(value) => {
                value.write_binary(buf);
                true
            }
            None => false,
        })
    })
}

pub fn encode_binary<T: ArrayElement>(values: &[Option<T>]) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(HEADER_LEN + DIMENSION_LEN + values.len() * 8);
    write_binary_elements(values.iter().map(Option::as_ref), &mut buf)?;
    Ok(buf)
}

pub fn encode_binary_values<T: ArrayElement>(values: &[T]) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(HEADER_LEN + DIMENSION_LEN + values.len() * 8);
    write_binary_elements(values.iter().map(Some), &mut buf)?;
    Ok(buf)
}
