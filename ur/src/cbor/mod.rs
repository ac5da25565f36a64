// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Minimal structural CBOR value model.
//!
//! [`Value`] covers the subset of CBOR that Uniform Resource payloads are
//! built from: unsigned integers, byte and text strings, arrays, maps with
//! small unsigned integer keys, tagged values and booleans. Encoding always
//! produces the canonical shortest-form heads (via [`minicbor`]); decoding
//! rejects everything outside the subset, notably negative integers,
//! floats, indefinite-length items and non-integer map keys.
//!
//! # Examples
//!
//! ```
//! use ur::cbor::Value;
//!
//! let value = Value::Map(vec![
//!     (1, Value::Text("en")),
//!     (2, Value::Unsigned(12)),
//! ]);
//! let bytes = ur::cbor::to_vec(&value);
//! assert_eq!(ur::cbor::decode(&bytes).unwrap(), value);
//! ```

#[cfg(feature = "alloc")]
mod value;

#[cfg(feature = "alloc")]
pub use self::value::{decode, to_vec, Value};
