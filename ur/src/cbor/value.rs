// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

use alloc::{boxed::Box, vec::Vec};

use minicbor::data::{Tag, Type};

/// A structural CBOR value.
///
/// Byte strings and text strings borrow from the buffer the value was
/// decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<'a> {
    /// An unsigned integer (major type 0), up to 64 bits.
    Unsigned(u64),
    /// A byte string (major type 2).
    Bytes(&'a [u8]),
    /// A text string (major type 3).
    Text(&'a str),
    /// An array of values (major type 4).
    Array(Vec<Value<'a>>),
    /// A map with unsigned integer keys (major type 5).
    ///
    /// Entries keep their decoded order; lookup is linear, which is fine
    /// for the tiny maps this system uses.
    Map(Vec<(u64, Value<'a>)>),
    /// A tagged value (major type 6).
    Tagged(u64, Box<Value<'a>>),
    /// A boolean (major type 7).
    Bool(bool),
}

impl<'a> Value<'a> {
    /// Returns the unsigned integer value, if this is one.
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Value::Unsigned(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the byte string contents, if this is one.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the text string contents, if this is one.
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the array elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a map entry by its integer key.
    ///
    /// Returns `None` if this is not a map, or the key is absent.
    pub fn map_get(&self, key: u64) -> Option<&Value<'a>> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Encode a value to its canonical CBOR bytes.
#[must_use]
pub fn to_vec(value: &Value) -> Vec<u8> {
    // Writing into a `Vec` is infallible and the value model contains
    // nothing the encoder can reject.
    minicbor::to_vec(value).expect("encoding into a vec cannot fail")
}

/// Decode a CBOR byte sequence into a value tree.
///
/// # Errors
///
/// Returns an error for truncated or malformed input, and for any CBOR
/// construct outside the supported subset.
pub fn decode(bytes: &[u8]) -> Result<Value<'_>, minicbor::decode::Error> {
    minicbor::decode(bytes)
}

impl<'a, C> minicbor::Encode<C> for Value<'a> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Value::Unsigned(n) => {
                e.u64(*n)?;
            }
            Value::Bytes(b) => {
                e.bytes(b)?;
            }
            Value::Text(t) => {
                e.str(t)?;
            }
            Value::Array(items) => {
                e.array(
                    items
                        .len()
                        .try_into()
                        .map_err(|_| minicbor::encode::Error::message("array too long"))?,
                )?;
                for item in items {
                    item.encode(e, ctx)?;
                }
            }
            Value::Map(entries) => {
                e.map(entries
                    .len()
                    .try_into()
                    .map_err(|_| minicbor::encode::Error::message("map too long"))?)?;
                for (key, value) in entries {
                    e.u64(*key)?;
                    value.encode(e, ctx)?;
                }
            }
            Value::Tagged(tag, inner) => {
                e.tag(Tag::new(*tag))?;
                inner.encode(e, ctx)?;
            }
            Value::Bool(b) => {
                e.bool(*b)?;
            }
        }

        Ok(())
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Value<'b> {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        match d.datatype()? {
            Type::U8 | Type::U16 | Type::U32 | Type::U64 => Ok(Value::Unsigned(d.u64()?)),
            Type::Bytes => Ok(Value::Bytes(d.bytes()?)),
            Type::String => Ok(Value::Text(d.str()?)),
            Type::Array => {
                let len = d.array()?.ok_or(minicbor::decode::Error::message(
                    "indefinite-length arrays are not supported",
                ))?;

                let mut items = Vec::new();
                for _ in 0..len {
                    items.push(Value::decode(d, ctx)?);
                }
                Ok(Value::Array(items))
            }
            Type::Map => {
                let len = d.map()?.ok_or(minicbor::decode::Error::message(
                    "indefinite-length maps are not supported",
                ))?;

                let mut entries = Vec::new();
                for _ in 0..len {
                    let key = d.u64()?;
                    entries.push((key, Value::decode(d, ctx)?));
                }
                Ok(Value::Map(entries))
            }
            Type::Tag => {
                let tag = d.tag()?;
                Ok(Value::Tagged(tag.as_u64(), Box::new(Value::decode(d, ctx)?)))
            }
            Type::Bool => Ok(Value::Bool(d.bool()?)),
            other => Err(minicbor::decode::Error::type_mismatch(other)),
        }
    }
}
