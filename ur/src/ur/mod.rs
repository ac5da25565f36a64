// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

pub mod decoder;
pub mod encoder;

#[cfg(feature = "alloc")]
pub use self::decoder::Decoder;
pub use self::decoder::{BaseDecoder, HeaplessDecoder};

#[cfg(feature = "alloc")]
pub use self::encoder::Encoder;
pub use self::encoder::{BaseEncoder, HeaplessEncoder};

use crate::{bytewords::Bytewords, fountain::part::Part};
use core::{fmt, num::ParseIntError};

/// Returns `true` if `ur_type` is a well-formed type tag.
///
/// The tag grammar is `[a-z0-9]([a-z0-9-]*[a-z0-9])?`, checked
/// case-insensitively: letters, digits and internal hyphens, with neither
/// the first nor the last character a hyphen.
#[must_use]
pub fn is_ur_type(ur_type: &str) -> bool {
    !ur_type.is_empty()
        && !ur_type.starts_with('-')
        && !ur_type.ends_with('-')
        && ur_type
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// An uniform resource.
#[derive(Debug, Clone)]
pub enum UR<'a> {
    /// A single-part resource.
    SinglePart {
        /// The type.
        ur_type: &'a str,
        /// The bytewords-encoded message.
        message: &'a str,
    },
    /// A deserialized single-part resource.
    SinglePartDeserialized {
        /// The type.
        ur_type: &'a str,
        /// The message.
        message: &'a [u8],
    },
    /// A multiple-part resource.
    MultiPart {
        /// The type.
        ur_type: &'a str,
        /// The bytewords-encoded fragment.
        fragment: &'a str,
        /// The sequence number.
        sequence: u32,
        /// The total sequence count.
        sequence_count: u32,
    },
    /// A deserialized multiple-part resource.
    MultiPartDeserialized {
        /// The type.
        ur_type: &'a str,
        /// The fragment.
        fragment: Part<'a>,
    },
}

impl<'a> UR<'a> {
    /// Construct a new single-part [`UR`].
    pub fn new(ur_type: &'a str, message: &'a [u8]) -> Self {
        UR::SinglePartDeserialized { ur_type, message }
    }

    /// Parses an uniform resource string.
    ///
    /// The scheme and the type are matched case-insensitively. This does
    /// not deserialize the bytewords payload; deserialization is
    /// performed separately, for example, by the [decoder](BaseDecoder).
    ///
    /// # Errors
    ///
    /// An error is returned when the string does not have the
    /// `ur:<type>[/<seq_num>-<seq_len>]/<bytewords>` shape.
    pub fn parse(s: &'a str) -> Result<Self, ParseURError> {
        let rest = match (s.get(..3), s.get(3..)) {
            (Some(scheme), Some(rest)) if scheme.eq_ignore_ascii_case("ur:") => rest,
            _ => return Err(ParseURError::InvalidScheme),
        };

        let mut components = rest.split('/');
        let ur_type = components.next().ok_or(ParseURError::TypeUnspecified)?;
        if ur_type.is_empty() {
            return Err(ParseURError::TypeUnspecified);
        }
        if !is_ur_type(ur_type) {
            return Err(ParseURError::InvalidCharacters);
        }

        let second = components.next().ok_or(ParseURError::TypeUnspecified)?;
        let Some(fragment) = components.next() else {
            return Ok(UR::SinglePart {
                ur_type,
                message: second,
            });
        };

        if components.next().is_some() {
            return Err(ParseURError::InvalidPathLength);
        }

        let (sequence, sequence_count) = second
            .split_once('-')
            .ok_or(ParseURError::InvalidIndices)?;
        let sequence: u32 = sequence.parse()?;
        let sequence_count: u32 = sequence_count.parse()?;
        if sequence == 0 || sequence_count == 0 {
            return Err(ParseURError::InvalidIndices);
        }

        Ok(UR::MultiPart {
            ur_type,
            fragment,
            sequence,
            sequence_count,
        })
    }

    /// Returns true if the Uniform Resource is single-part.
    #[inline]
    pub fn is_single_part(&self) -> bool {
        matches!(
            self,
            UR::SinglePart { .. } | UR::SinglePartDeserialized { .. }
        )
    }

    /// Returns `true` if the Uniform Resource is multi-part.
    #[inline]
    pub fn is_multi_part(&self) -> bool {
        matches!(
            self,
            UR::MultiPart { .. } | UR::MultiPartDeserialized { .. }
        )
    }

    /// Returns `true` if this Uniform Resource is deserialized.
    #[inline]
    pub fn is_deserialized(&self) -> bool {
        matches!(
            self,
            UR::SinglePartDeserialized { .. } | UR::MultiPartDeserialized { .. }
        )
    }

    /// Returns the UR type.
    pub fn as_type(&self) -> &'a str {
        match self {
            UR::SinglePart { ur_type, .. }
            | UR::SinglePartDeserialized { ur_type, .. }
            | UR::MultiPart { ur_type, .. }
            | UR::MultiPartDeserialized { ur_type, .. } => ur_type,
        }
    }

    /// Returns `Some(bytewords)` if the Uniform Resource is serialized.
    pub fn as_bytewords(&self) -> Option<&'a str> {
        match self {
            UR::SinglePart { message, .. } => Some(message),
            UR::MultiPart { fragment, .. } => Some(fragment),
            _ => None,
        }
    }

    /// Returns `Some(part)` if the Uniform Resource is multi-part and is
    /// deserialized.
    pub fn as_part(&self) -> Option<&Part<'a>> {
        match self {
            UR::MultiPartDeserialized { fragment, .. } => Some(fragment),
            _ => None,
        }
    }

    /// Returns `Some(n)` where `n` is the sequence number if the Uniform
    /// Resource is multi part.
    pub fn sequence(&self) -> Option<u32> {
        match self {
            UR::MultiPart { sequence, .. } => Some(*sequence),
            UR::MultiPartDeserialized { fragment, .. } => Some(fragment.sequence),
            _ => None,
        }
    }

    /// Returns `Some(n)` where `n` is the sequence count if the Uniform
    /// Resource is multi part.
    pub fn sequence_count(&self) -> Option<u32> {
        match self {
            UR::MultiPart { sequence_count, .. } => Some(*sequence_count),
            UR::MultiPartDeserialized { fragment, .. } => Some(fragment.sequence_count),
            _ => None,
        }
    }
}

fn write_upper(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for c in s.chars() {
        fmt::Write::write_char(f, c.to_ascii_uppercase())?;
    }
    Ok(())
}

/// Displays the resource as a URI, entirely in uppercase so that the
/// string fits the QR alphanumeric character set.
impl<'a> fmt::Display for UR<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UR:")?;
        write_upper(f, self.as_type())?;

        match self {
            UR::SinglePart { message, .. } => {
                write!(f, "/")?;
                write_upper(f, message)
            }
            UR::SinglePartDeserialized { message, .. } => {
                write!(f, "/{}", Bytewords(message))
            }
            UR::MultiPart {
                fragment,
                sequence,
                sequence_count,
                ..
            } => {
                write!(f, "/{sequence}-{sequence_count}/")?;
                write_upper(f, fragment)
            }
            UR::MultiPartDeserialized { fragment, .. } => {
                write!(
                    f,
                    "/{}-{}/{fragment}",
                    fragment.sequence, fragment.sequence_count
                )
            }
        }
    }
}

/// Errors that can happen during parsing of Uniform Resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseURError {
    /// Invalid scheme.
    InvalidScheme,
    /// No type specified.
    TypeUnspecified,
    /// The type contains invalid characters.
    InvalidCharacters,
    /// Invalid indices in multi-part UR.
    InvalidIndices,
    /// Wrong number of path components.
    InvalidPathLength,
    /// Could not parse indices integers.
    ParseInt(ParseIntError),
}

impl fmt::Display for ParseURError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseURError::InvalidScheme => write!(f, "Invalid Uniform Resource scheme"),
            ParseURError::TypeUnspecified => {
                write!(f, "No type was specified for the Uniform Resource")
            }
            ParseURError::InvalidCharacters => {
                write!(f, "Uniform Resource type contains invalid characters")
            }
            ParseURError::InvalidIndices => write!(f, "Uniform Resource indices are invalid"),
            ParseURError::InvalidPathLength => {
                write!(f, "Uniform Resource has a wrong number of path components")
            }
            ParseURError::ParseInt(e) => {
                write!(f, "Could not parse Uniform Resource indices: {e}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseURError {}

impl From<ParseIntError> for ParseURError {
    fn from(e: ParseIntError) -> Self {
        Self::ParseInt(e)
    }
}

/// Encode a single part UR to a string.
#[cfg(feature = "alloc")]
pub fn to_string(ur_type: &str, message: &[u8]) -> alloc::string::String {
    #[cfg(not(feature = "std"))]
    use alloc::string::ToString;

    UR::SinglePartDeserialized { ur_type, message }.to_string()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::bytewords;
    use std::num::IntErrorKind;

    pub fn make_message_ur(length: usize, seed: &str) -> Vec<u8> {
        let message = crate::xoshiro::test_utils::make_message(seed, length);
        let mut cbor = Vec::new();
        minicbor::Encoder::new(&mut cbor).bytes(&message).unwrap();
        cbor
    }

    #[test]
    fn test_single_part_ur() {
        const EXPECTED: &str = "UR:BYTES/HDEYMEJTSWHHYLKEPMYKHHTSYTSNOYOYAXAEDSUTTYDMMHHPKTPMSRJTGWDPFNSBOXGWLBAAWZUEFYWKDPLRSRJYNBVYGABWJLDAPFCSDWKBRKCH";

        let message = make_message_ur(50, "Wolf");
        let encoded = UR::new("bytes", &message).to_string();
        assert_eq!(&encoded, EXPECTED);

        let parsed = UR::parse(&encoded).unwrap();
        assert!(parsed.is_single_part());
        assert_eq!(parsed.as_type(), "BYTES");
        assert_eq!(
            bytewords::decode(parsed.as_bytewords().unwrap()).unwrap(),
            message
        );
    }

    #[test]
    fn test_ur_roundtrip() {
        let ur = make_message_ur(32767, "Wolf");
        let mut encoder = Encoder::new();
        encoder.start("bytes", &ur, 1000).unwrap();

        let mut decoder = Decoder::default();
        while !decoder.is_complete() {
            assert_eq!(decoder.message(), None);
            decoder.receive(encoder.next_part()).unwrap();
        }
        assert!(decoder.is_success());
        assert_eq!(decoder.message(), Some(ur.as_slice()));
    }

    #[test]
    fn test_is_ur_type() {
        assert!(is_ur_type("bytes"));
        assert!(is_ur_type("crypto-psbt"));
        assert!(is_ur_type("whatever-12"));
        assert!(is_ur_type("BYTES"));

        assert!(!is_ur_type(""));
        assert!(!is_ur_type("-bytes"));
        assert!(!is_ur_type("bytes-"));
        assert!(!is_ur_type("by#tes"));
        assert!(!is_ur_type("crypto_psbt"));
    }

    #[test]
    fn test_parser() {
        UR::parse("ur:bytes/aeadaolazmjendeoti").unwrap();
        UR::parse("UR:BYTES/AEADAOLAZMJENDEOTI").unwrap();
        UR::parse("Ur:Whatever-12/aeadaolazmjendeoti").unwrap();

        let multi = UR::parse("ur:bytes/6-23/aeadaolazmjendeoti").unwrap();
        assert!(multi.is_multi_part());
        assert_eq!(multi.sequence(), Some(6));
        assert_eq!(multi.sequence_count(), Some(23));
        assert_eq!(multi.as_bytewords(), Some("aeadaolazmjendeoti"));
    }

    #[test]
    fn test_parser_errors() {
        const TEST_VECTORS: &[(&str, ParseURError)] = &[
            ("uhr:bytes/aeadaolazmjendeoti", ParseURError::InvalidScheme),
            ("u", ParseURError::InvalidScheme),
            ("ur:aeadaolazmjendeoti", ParseURError::TypeUnspecified),
            ("ur:", ParseURError::TypeUnspecified),
            (
                "ur:bytes#4/aeadaolazmjendeoti",
                ParseURError::InvalidCharacters,
            ),
            (
                "ur:bytes/1 1/aeadaolazmjendeoti",
                ParseURError::InvalidIndices,
            ),
            (
                "ur:bytes/0-1/aeadaolazmjendeoti",
                ParseURError::InvalidIndices,
            ),
            (
                "ur:bytes/1-1/toomuch/aeadaolazmjendeoti",
                ParseURError::InvalidPathLength,
            ),
        ];

        for (input, error) in TEST_VECTORS {
            assert_eq!(UR::parse(input).unwrap_err(), error.clone());
        }

        match UR::parse("ur:bytes/1-1a/aeadaolazmjendeoti") {
            Err(ParseURError::ParseInt(e)) => {
                assert_eq!(*e.kind(), IntErrorKind::InvalidDigit)
            }
            _ => panic!(),
        }
    }
}
