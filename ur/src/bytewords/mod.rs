// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Encode and decode byte payloads according to the minimal style of the
//! [`bytewords`](https://github.com/BlockchainCommons/Research/blob/master/papers/bcr-2020-012-bytewords.md)
//! scheme.
//!
//! Every byte maps to a two-letter code (the first and last letter of a
//! four-letter word from the canonical list), so an `n`-byte payload
//! encodes to `2 * (n + 4)` characters: a four-byte CRC-32 trailer is
//! appended to the payload before encoding. Codes are emitted uppercase
//! to stay within the QR alphanumeric character set; decoding is
//! case-insensitive.
//!
//! ```
//! use ur::bytewords::{decode, encode};
//! let data = "Some binary data".as_bytes();
//! let encoded = encode(data);
//! assert_eq!(encoded, "GUJLJNIHCXIDINJTHSJPKKCXIEHSJYHSNSGDMKHT");
//! assert_eq!(data, decode(&encoded).unwrap());
//! ```
//!
//! The raw variants ([`decode_raw`], [`decode_raw_to_slice`]) strip the
//! trailer without verifying it. They serve the multi-part receive path,
//! where the CBOR-framed fountain part carries its own checksum.

pub mod minicbor;

mod constants;

use crate::{
    bytewords::constants::{MINIMALS, MINIMAL_IDXS},
    CRC32,
};

use core::fmt;

/// The number of bytes of the CRC-32 trailer.
const CHECKSUM_LEN: usize = 4;

/// The different errors that can be returned when decoding.
#[derive(Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// A character pair is not part of the minimal bytewords alphabet.
    InvalidWord {
        /// Byte position where the invalid word was encountered.
        position: usize,
    },
    /// The CRC-32 checksum doesn't validate.
    InvalidChecksum {
        /// The expected checksum from the last bytes of the bytewords string.
        expected: [u8; 4],
        /// The calculated checksum from the payload bytes of the bytewords string.
        calculated: [u8; 4],
    },
    /// The string is too short to contain the CRC-32 trailer.
    ChecksumNotPresent,
    /// The string does not consist of character pairs.
    InvalidLength,
    /// The bytewords string contains non-ASCII characters.
    NonAscii,
    /// Not enough space to decode the bytewords into.
    NotEnoughSpace {
        /// Available space to decode the bytewords.
        available: usize,
        /// Needed space to decode the bytewords.
        needed: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidWord { position } => {
                write!(f, "Invalid word found at position {position}")
            }
            DecodeError::InvalidChecksum {
                expected,
                calculated,
            } => write!(
                f,
                "Expected checksum '{}' is different than the calculated '{}'",
                u32::from_be_bytes(*expected),
                u32::from_be_bytes(*calculated)
            ),
            DecodeError::ChecksumNotPresent => write!(f, "Checksum is not present"),
            DecodeError::InvalidLength => write!(f, "Invalid length"),
            DecodeError::NonAscii => {
                write!(f, "Bytewords string contains non-ASCII characters")
            }
            DecodeError::NotEnoughSpace { needed, available } => {
                write!(f, "Not enough space to decode the bytewords, needed {needed} but only {available} bytes available")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// The errors that can be returned when encoding.
#[derive(Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// Not enough space to encode the bytewords into.
    NotEnoughSpace,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::NotEnoughSpace => {
                write!(f, "Not enough space to encode the bytewords into")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

fn decode_word(pair: &[u8]) -> Option<u8> {
    debug_assert!(pair.len() == 2);

    let key = [pair[0].to_ascii_lowercase(), pair[1].to_ascii_lowercase()];
    match core::str::from_utf8(&key) {
        Ok(key) => MINIMAL_IDXS.get(key).copied(),
        Err(_) => None,
    }
}

/// Split an encoded string into its payload pairs and its decoded CRC-32
/// trailer, checking the overall shape.
fn split_trailer(encoded: &str) -> Result<(&str, [u8; 4]), DecodeError> {
    if !encoded.is_ascii() {
        return Err(DecodeError::NonAscii);
    }

    if encoded.len() % 2 != 0 {
        return Err(DecodeError::InvalidLength);
    }

    let bytes_len = encoded.len() / 2;
    if bytes_len < CHECKSUM_LEN {
        return Err(DecodeError::ChecksumNotPresent);
    }

    let payload_len = bytes_len - CHECKSUM_LEN;
    let (payload, trailer) = encoded.split_at(payload_len * 2);

    let mut checksum = [0u8; 4];
    for (i, b) in checksum.iter_mut().enumerate() {
        *b = decode_word(&trailer.as_bytes()[i * 2..i * 2 + 2]).ok_or(DecodeError::InvalidWord {
            position: payload_len + i,
        })?;
    }

    Ok((payload, checksum))
}

fn payload_bytes(payload: &str) -> impl Iterator<Item = Option<u8>> + '_ {
    payload.as_bytes().chunks(2).map(decode_word)
}

/// Decodes a bytewords-encoded string back into a byte payload, verifying
/// and stripping the four-byte CRC-32 trailer.
///
/// # Examples
///
/// ```
/// use ur::bytewords::decode;
/// assert_eq!(decode("AETDAOWSLG").unwrap(), vec![0]);
/// // Decoding tolerates case.
/// assert_eq!(decode("aetdaowslg").unwrap(), vec![0]);
/// ```
///
/// # Errors
///
/// If the encoded string contains unrecognized character pairs, has an
/// invalid shape, or carries a checksum that does not match its payload,
/// an error is returned.
#[cfg(feature = "alloc")]
pub fn decode(encoded: &str) -> Result<alloc::vec::Vec<u8>, DecodeError> {
    let (payload, expected_checksum) = split_trailer(encoded)?;
    let bytes = payload_bytes(payload)
        .enumerate()
        .map(|(i, b)| b.ok_or(DecodeError::InvalidWord { position: i }))
        .collect::<Result<alloc::vec::Vec<u8>, _>>()?;

    let calculated_checksum = CRC32.checksum(&bytes).to_be_bytes();
    if calculated_checksum != expected_checksum {
        return Err(DecodeError::InvalidChecksum {
            expected: expected_checksum,
            calculated: calculated_checksum,
        });
    }

    Ok(bytes)
}

/// Validate a bytewords-encoded string, including its CRC-32 trailer, and
/// calculate its payload length in bytes.
///
/// # Errors
///
/// Same conditions as [`decode`], without allocating the payload.
pub fn validate(encoded: &str) -> Result<usize, DecodeError> {
    let (payload, expected_checksum) = split_trailer(encoded)?;
    let mut digest = CRC32.digest();

    let mut n = 0;
    for maybe_byte in payload_bytes(payload) {
        digest.update(&[maybe_byte.ok_or(DecodeError::InvalidWord { position: n })?]);
        n += 1;
    }

    let calculated_checksum = digest.finalize().to_be_bytes();
    if calculated_checksum != expected_checksum {
        return Err(DecodeError::InvalidChecksum {
            expected: expected_checksum,
            calculated: calculated_checksum,
        });
    }

    Ok(n)
}

/// Decodes a bytewords-encoded string onto an existing slice, verifying
/// the CRC-32 trailer.
///
/// If the return value is `Ok(n)`, then `n` is the number of payload bytes
/// written into `result`.
///
/// # Errors
///
/// Same conditions as [`decode`], and additionally if the payload is
/// larger than `result`.
pub fn decode_to_slice(encoded: &str, result: &mut [u8]) -> Result<usize, DecodeError> {
    let (payload, expected_checksum) = split_trailer(encoded)?;
    let n = decode_pairs_to_slice(payload, result)?;

    let calculated_checksum = CRC32.checksum(&result[..n]).to_be_bytes();
    if calculated_checksum != expected_checksum {
        return Err(DecodeError::InvalidChecksum {
            expected: expected_checksum,
            calculated: calculated_checksum,
        });
    }

    Ok(n)
}

/// Decodes a bytewords-encoded string back into a byte payload, stripping
/// the four-byte trailer *without* verifying it.
///
/// # Errors
///
/// If the encoded string contains unrecognized character pairs or has an
/// invalid shape, an error is returned.
#[cfg(feature = "alloc")]
pub fn decode_raw(encoded: &str) -> Result<alloc::vec::Vec<u8>, DecodeError> {
    let (payload, _) = split_trailer(encoded)?;
    payload_bytes(payload)
        .enumerate()
        .map(|(i, b)| b.ok_or(DecodeError::InvalidWord { position: i }))
        .collect()
}

/// Calculate the payload length in bytes of a raw bytewords decode,
/// checking the string shape but not the alphabet.
///
/// # Errors
///
/// This function returns an error if the string is not made of an even,
/// sufficient number of ASCII characters.
pub fn raw_payload_length(encoded: &str) -> Result<usize, DecodeError> {
    let (payload, _) = split_trailer(encoded)?;
    Ok(payload.len() / 2)
}

/// Decodes a bytewords-encoded string onto an existing slice, stripping
/// the four-byte trailer *without* verifying it.
///
/// If the return value is `Ok(n)`, then `n` is the number of payload bytes
/// written into `result`.
///
/// # Errors
///
/// Same conditions as [`decode_raw`], and additionally if the payload is
/// larger than `result`.
pub fn decode_raw_to_slice(encoded: &str, result: &mut [u8]) -> Result<usize, DecodeError> {
    let (payload, _) = split_trailer(encoded)?;
    decode_pairs_to_slice(payload, result)
}

fn decode_pairs_to_slice(payload: &str, result: &mut [u8]) -> Result<usize, DecodeError> {
    let needed = payload.len() / 2;

    let mut n = 0;
    for maybe_byte in payload_bytes(payload) {
        let byte = maybe_byte.ok_or(DecodeError::InvalidWord { position: n })?;
        if n >= result.len() {
            return Err(DecodeError::NotEnoughSpace {
                available: result.len(),
                needed,
            });
        }

        result[n] = byte;
        n += 1;
    }

    Ok(n)
}

fn encoder<'a>(data: &'a [u8], checksum: &'a [u8]) -> impl Iterator<Item = &'static str> + 'a {
    data.iter()
        .chain(checksum.iter())
        .map(|&b| MINIMALS[b as usize])
}

/// Encodes a byte payload into a bytewords-encoded String.
///
/// # Examples
///
/// ```
/// use ur::bytewords::encode;
/// // Each code consists of the start and end letters of a byteword.
/// assert_eq!(encode(&[0]), "AETDAOWSLG");
/// ```
#[must_use]
#[cfg(feature = "alloc")]
pub fn encode(data: &[u8]) -> alloc::string::String {
    #[cfg(not(feature = "std"))]
    use alloc::string::ToString;

    Bytewords(data).to_string()
}

/// Encodes a byte payload into a bytewords-encoded string on an existing
/// slice.
///
/// If the return value of this method is `Ok(n)`, then `n` is the number
/// of characters written into `result`.
///
/// # Errors
///
/// This function returns an error if the encoding is larger than `result`.
pub fn encode_to_slice(data: &[u8], result: &mut [u8]) -> Result<usize, EncodeError> {
    let checksum = CRC32.checksum(data).to_be_bytes();

    let mut n = 0;
    for word in encoder(data, &checksum) {
        debug_assert!(word.len() == 2);

        if n + 2 > result.len() {
            return Err(EncodeError::NotEnoughSpace);
        }
        result[n..n + 2].copy_from_slice(word.as_bytes());
        n += 2;
    }

    Ok(n)
}

/// Structure to format bytewords using [`Display`](fmt::Display).
///
/// The implementation does not allocate and writes bytewords
/// directly to the formatter.
///
/// # Examples
///
/// Printing bytewords to stdout:
///
/// ```
/// use ur::bytewords::Bytewords;
///
/// let data = b"bytewords encodable message :)";
/// println!("{}", Bytewords(data));
/// ```
pub struct Bytewords<'a>(pub &'a [u8]);

impl<'a> fmt::Display for Bytewords<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let &Bytewords(data) = self;
        let checksum = CRC32.checksum(data).to_be_bytes();

        for word in encoder(data, &checksum) {
            f.write_str(word)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytewords() {
        let input = vec![0, 1, 2, 128, 255];
        assert_eq!(encode(&input), "AEADAOLAZMJENDEOTI");

        assert_eq!(decode("AEADAOLAZMJENDEOTI").unwrap(), input);
        assert_eq!(decode("aeadaolazmjendeoti").unwrap(), input);
        assert_eq!(decode("AeAdAoLaZmJeNdEoTi").unwrap(), input);

        // empty payload is allowed
        assert_eq!(decode(&encode(&[])).unwrap(), Vec::<u8>::new());

        // bad checksum
        assert_eq!(
            decode("aeadaolazojendeowf").unwrap_err(),
            DecodeError::InvalidChecksum {
                expected: [107, 155, 51, 243],
                calculated: [108, 246, 247, 201]
            }
        );

        // too short
        assert_eq!(
            decode("aeadao").unwrap_err(),
            DecodeError::ChecksumNotPresent
        );
        assert_eq!(decode("").unwrap_err(), DecodeError::ChecksumNotPresent);

        // invalid length
        assert_eq!(
            decode("aeadaolazmjendeot").unwrap_err(),
            DecodeError::InvalidLength
        );

        // non ASCII
        assert_eq!(decode("₿₿₿₿₿₿₿₿").unwrap_err(), DecodeError::NonAscii);

        // non-alphabet pair
        assert_eq!(
            decode("qqadaolazmjendeoti").unwrap_err(),
            DecodeError::InvalidWord { position: 0 }
        );
    }

    #[test]
    fn test_raw_decode_skips_checksum() {
        let input = vec![0, 1, 2, 128, 255];
        let mut encoded = encode(&input);
        assert_eq!(decode_raw(&encoded).unwrap(), input);

        // Corrupt the trailer: the raw variant does not notice, the
        // checked variant does.
        encoded.replace_range(encoded.len() - 2.., "AE");
        assert_eq!(decode_raw(&encoded).unwrap(), input);
        assert!(matches!(
            decode(&encoded),
            Err(DecodeError::InvalidChecksum { .. })
        ));

        // But the trailer must still be part of the alphabet.
        encoded.replace_range(encoded.len() - 2.., "QQ");
        assert_eq!(
            decode_raw(&encoded).unwrap_err(),
            DecodeError::InvalidWord { position: 8 }
        );
    }

    #[test]
    fn test_decode_to_slice() {
        let mut buffer = [0u8; 5];
        assert_eq!(validate("AEADAOLAZMJENDEOTI").unwrap(), 5);
        assert_eq!(decode_to_slice("AEADAOLAZMJENDEOTI", &mut buffer).unwrap(), 5);
        assert_eq!(buffer, [0, 1, 2, 128, 255]);

        assert_eq!(raw_payload_length("AEADAOLAZMJENDEOTI").unwrap(), 5);
        let mut small = [0u8; 3];
        assert_eq!(
            decode_raw_to_slice("AEADAOLAZMJENDEOTI", &mut small).unwrap_err(),
            DecodeError::NotEnoughSpace {
                available: 3,
                needed: 5
            }
        );
    }

    #[test]
    fn test_encode_to_slice() {
        let input = [0u8, 1, 2, 128, 255];
        let mut buffer = [0u8; 18];
        assert_eq!(encode_to_slice(&input, &mut buffer).unwrap(), 18);
        assert_eq!(&buffer, b"AEADAOLAZMJENDEOTI");

        let mut small = [0u8; 17];
        assert_eq!(
            encode_to_slice(&input, &mut small).unwrap_err(),
            EncodeError::NotEnoughSpace
        );
    }

    #[test]
    fn test_encoding() {
        let input: [u8; 100] = [
            245, 215, 20, 198, 241, 235, 69, 59, 209, 205, 165, 18, 150, 158, 116, 135, 229, 212,
            19, 159, 17, 37, 239, 240, 253, 11, 109, 191, 37, 242, 38, 120, 223, 41, 156, 189, 242,
            254, 147, 204, 66, 163, 216, 175, 191, 72, 169, 54, 32, 60, 144, 230, 210, 137, 184,
            197, 33, 113, 88, 14, 157, 31, 177, 46, 1, 115, 205, 69, 225, 150, 65, 235, 58, 144,
            65, 240, 133, 69, 113, 247, 63, 53, 242, 165, 160, 144, 26, 13, 79, 237, 133, 71, 82,
            69, 254, 165, 138, 41, 85, 24,
        ];

        let encoded_minimal = "yktsbbswwnwmfefrttsnonbgmtnnjyltvwtybwne\
                               bydawswtzcbdjnrsdawzdsksurdtnsrywzzemusf\
                               fwottppersfdptencxfnmhvatdldroskcljshdba\
                               ntctpadmadjksnfevymtfpwmftmhfpwtlpfejsyl\
                               fhecwzonnbmhcybtgwwelpflgmfezeonledtgocs\
                               fzhycypf";

        assert_eq!(decode(encoded_minimal).unwrap(), input.to_vec());
        assert_eq!(encode(&input), encoded_minimal.to_ascii_uppercase());
    }
}
