// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Decoder.

use crate::{
    bytewords,
    collections::Vec,
    fountain,
    ur::{is_ur_type, ParseURError, UR},
};
use core::{fmt, str};

/// A decoder.
#[cfg(feature = "alloc")]
pub type Decoder = BaseDecoder<Alloc>;

/// A static decoder.
///
/// Does not allocate memory.
pub type HeaplessDecoder<
    const MAX_MESSAGE_LEN: usize,
    const MAX_MIXED_PARTS: usize,
    const MAX_FRAGMENT_LEN: usize,
    const MAX_SEQUENCE_COUNT: usize,
    const QUEUE_SIZE: usize,
    const MAX_FINGERPRINTS: usize,
    const MAX_UR_TYPE: usize,
> = BaseDecoder<
    Heapless<
        MAX_MESSAGE_LEN,
        MAX_MIXED_PARTS,
        MAX_FRAGMENT_LEN,
        MAX_SEQUENCE_COUNT,
        QUEUE_SIZE,
        MAX_FINGERPRINTS,
        MAX_UR_TYPE,
    >,
>;

impl<
        const MAX_MESSAGE_LEN: usize,
        const MAX_MIXED_PARTS: usize,
        const MAX_FRAGMENT_LEN: usize,
        const MAX_SEQUENCE_COUNT: usize,
        const QUEUE_SIZE: usize,
        const MAX_FINGERPRINTS: usize,
        const MAX_UR_TYPE: usize,
    >
    HeaplessDecoder<
        MAX_MESSAGE_LEN,
        MAX_MIXED_PARTS,
        MAX_FRAGMENT_LEN,
        MAX_SEQUENCE_COUNT,
        QUEUE_SIZE,
        MAX_FINGERPRINTS,
        MAX_UR_TYPE,
    >
{
    /// Construct a new [`HeaplessDecoder`].
    pub const fn new() -> Self {
        Self {
            fountain: fountain::decoder::HeaplessDecoder::new(),
            fragment: heapless::Vec::new(),
            single_part_message: heapless::Vec::new(),
            ur_type: heapless::Vec::new(),
        }
    }
}

/// A uniform resource decoder able to receive URIs that encode a fountain
/// part or a whole single-part message.
///
/// # Examples
///
/// See the [`crate`] module documentation for an example.
#[derive(Default)]
pub struct BaseDecoder<T: Types> {
    fountain: fountain::decoder::BaseDecoder<T::Decoder>,
    fragment: T::Fragment,
    single_part_message: T::Message,
    ur_type: T::URType,
}

impl<T: Types> BaseDecoder<T> {
    /// Receives a Uniform Resource into the decoder.
    ///
    /// A single-part resource completes the decoder immediately; a
    /// multi-part resource feeds the underlying fountain decoder. Parts
    /// received after completion are ignored.
    ///
    /// # Examples
    ///
    /// See the [`crate`] module documentation for examples.
    ///
    /// # Errors
    ///
    /// This function may error along all the necessary decoding steps:
    ///
    ///  - The URI payload may not be a well-formed bytewords string.
    ///  - The byte payload may not be valid CBOR.
    ///  - The type or the fountain part may be inconsistent with the
    ///    previously received parts.
    ///
    /// Every error except a terminal checksum failure (see
    /// [`Error::is_terminal`]) leaves the decoder usable; each part is
    /// validated independently.
    pub fn receive(&mut self, ur: UR) -> Result<(), Error> {
        if self.is_complete() {
            return Ok(());
        }

        let ur_type = ur.as_type();
        if !is_ur_type(ur_type) {
            return Err(Error::InvalidType);
        }

        if self.ur_type.is_empty() {
            for b in ur_type.bytes() {
                self.ur_type
                    .try_push(b.to_ascii_lowercase())
                    .map_err(|_| Error::URTypeTooBig {
                        size: ur_type.len(),
                    })?;
            }
        } else if !self.is_expected_type(ur_type) {
            return Err(Error::InconsistentType);
        }

        match ur {
            UR::SinglePart { message, .. } => self.receive_single_part(message),
            UR::SinglePartDeserialized { message, .. } => {
                self.adopt_single_part(message)
            }
            UR::MultiPart { fragment, .. } => {
                let size = bytewords::raw_payload_length(fragment)?;
                self.fragment.clear();
                self.fragment
                    .try_resize(size, 0)
                    .map_err(|_| Error::FragmentTooBig { size })?;

                bytewords::decode_raw_to_slice(fragment, &mut self.fragment)?;
                let part = minicbor::decode(&self.fragment[..size])?;
                self.fountain.receive(&part)?;
                Ok(())
            }
            UR::MultiPartDeserialized { fragment, .. } => {
                self.fountain.receive(&fragment)?;
                Ok(())
            }
        }
    }

    /// Parses a Uniform Resource string and receives it into the decoder.
    ///
    /// # Errors
    ///
    /// Additionally to the conditions of [`receive`](Self::receive), the
    /// string may not be a well-formed URI according to the uniform
    /// resource scheme.
    pub fn receive_str(&mut self, s: &str) -> Result<(), Error> {
        self.receive(UR::parse(s)?)
    }

    fn receive_single_part(&mut self, message: &str) -> Result<(), Error> {
        // The whole message arrives in this one part; the bytewords
        // checksum is the only integrity check it gets.
        let size = bytewords::validate(message)?;
        if size == 0 {
            return Err(Error::EmptyMessage);
        }

        self.single_part_message
            .try_resize(size, 0)
            .map_err(|_| Error::MessageTooBig { size })?;
        if let Err(e) = bytewords::decode_to_slice(message, &mut self.single_part_message) {
            // A non-empty message buffer marks completion, so don't keep
            // a partially decoded one around.
            self.single_part_message.clear();
            return Err(e.into());
        }
        Ok(())
    }

    fn adopt_single_part(&mut self, message: &[u8]) -> Result<(), Error> {
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }

        if self
            .single_part_message
            .try_extend_from_slice(message)
            .is_err()
        {
            self.single_part_message.clear();
            return Err(Error::MessageTooBig {
                size: message.len(),
            });
        }
        Ok(())
    }

    fn is_expected_type(&self, ur_type: &str) -> bool {
        self.ur_type.len() == ur_type.len()
            && self
                .ur_type
                .iter()
                .zip(ur_type.bytes())
                .all(|(&a, b)| a == b.to_ascii_lowercase())
    }

    /// Returns whether the decoder has reached a terminal state.
    ///
    /// # Examples
    ///
    /// See the [`crate`] module documentation for an example.
    #[must_use]
    #[inline]
    pub fn is_complete(&self) -> bool {
        !self.single_part_message.is_empty() || self.fountain.is_complete()
    }

    /// Returns whether the message has been recovered and verified.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.single_part_message.is_empty() || self.fountain.is_success()
    }

    /// Returns the UR type adopted from the first received part, in
    /// lowercase.
    pub fn ur_type(&self) -> Option<&str> {
        if self.ur_type.is_empty() {
            None
        } else {
            str::from_utf8(&self.ur_type).ok()
        }
    }

    /// If the decode succeeded, returns the message.
    ///
    /// # Examples
    ///
    /// See the [`crate`] documentation for an example.
    #[must_use]
    pub fn message(&self) -> Option<&[u8]> {
        if !self.single_part_message.is_empty() {
            Some(&self.single_part_message)
        } else {
            self.fountain.message()
        }
    }

    /// If the decode succeeded, returns the adopted UR type and the
    /// message.
    #[must_use]
    pub fn result(&self) -> Option<(&str, &[u8])> {
        if !self.is_success() {
            return None;
        }

        Some((self.ur_type()?, self.message()?))
    }

    /// Returns the number of parts the transmitted message was split
    /// into, or zero if no part has been received yet.
    #[must_use]
    pub fn expected_part_count(&self) -> u32 {
        if !self.single_part_message.is_empty() {
            1
        } else {
            self.fountain.expected_part_count()
        }
    }

    /// Returns the number of unique fountain parts processed so far.
    #[must_use]
    pub fn processed_parts_count(&self) -> u32 {
        self.fountain.processed_parts_count()
    }

    /// Calculate the estimated percentage of completion.
    pub fn estimated_percent_complete(&self) -> f64 {
        if self.is_complete() {
            1.0
        } else {
            self.fountain.estimated_percent_complete()
        }
    }

    /// Returns `true` if the decoder doesn't contain any data.
    ///
    /// Once a part is successfully [received](Self::receive) this method
    /// will return `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ur::Decoder;
    ///
    /// let decoder = Decoder::default();
    /// assert!(decoder.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fountain.is_empty() && self.single_part_message.is_empty() && self.ur_type.is_empty()
    }

    /// Clear the decoder so that it can be used again.
    pub fn clear(&mut self) {
        self.fountain.clear();
        self.fragment.clear();
        self.single_part_message.clear();
        self.ur_type.clear();
    }
}

/// Types for [`BaseDecoder`].
pub trait Types: Default {
    /// Fountain decoder.
    type Decoder: fountain::decoder::Types;

    /// CBOR decoding buffer.
    ///
    /// Must be able to hold a fragment plus the CBOR framing around it
    /// (see [`Part::max_encoded_len`](crate::fountain::part::Part::max_encoded_len)).
    type Fragment: Vec<u8>;

    /// Single-part message buffer.
    type Message: Vec<u8>;

    /// The UR type.
    type URType: Vec<u8>;
}

/// [`alloc`] types for [`BaseDecoder`].
#[derive(Default)]
#[cfg(feature = "alloc")]
pub struct Alloc;

#[cfg(feature = "alloc")]
impl Types for Alloc {
    type Decoder = fountain::decoder::Alloc;

    type Fragment = alloc::vec::Vec<u8>;

    type Message = alloc::vec::Vec<u8>;

    type URType = alloc::vec::Vec<u8>;
}

/// [`heapless`] types for [`BaseDecoder`].
#[derive(Default)]
pub struct Heapless<
    const MAX_MESSAGE_LEN: usize,
    const MAX_MIXED_PARTS: usize,
    const MAX_FRAGMENT_LEN: usize,
    const MAX_SEQUENCE_COUNT: usize,
    const QUEUE_SIZE: usize,
    const MAX_FINGERPRINTS: usize,
    const MAX_UR_TYPE: usize,
>;

impl<
        const MAX_MESSAGE_LEN: usize,
        const MAX_MIXED_PARTS: usize,
        const MAX_FRAGMENT_LEN: usize,
        const MAX_SEQUENCE_COUNT: usize,
        const QUEUE_SIZE: usize,
        const MAX_FINGERPRINTS: usize,
        const MAX_UR_TYPE: usize,
    > Types
    for Heapless<
        MAX_MESSAGE_LEN,
        MAX_MIXED_PARTS,
        MAX_FRAGMENT_LEN,
        MAX_SEQUENCE_COUNT,
        QUEUE_SIZE,
        MAX_FINGERPRINTS,
        MAX_UR_TYPE,
    >
{
    type Decoder = fountain::decoder::Heapless<
        MAX_MESSAGE_LEN,
        MAX_MIXED_PARTS,
        MAX_FRAGMENT_LEN,
        MAX_SEQUENCE_COUNT,
        QUEUE_SIZE,
        MAX_FINGERPRINTS,
    >;

    type Fragment = heapless::Vec<u8, MAX_FRAGMENT_LEN>;

    type Message = heapless::Vec<u8, MAX_MESSAGE_LEN>;

    type URType = heapless::Vec<u8, MAX_UR_TYPE>;
}

/// Errors that can happen during decoding.
#[derive(Debug)]
pub enum Error {
    /// URI parsing error.
    ParseUR(ParseURError),
    /// CBOR decoding error.
    Cbor(minicbor::decode::Error),
    /// Fountain decoder error.
    Fountain(fountain::decoder::Error),
    /// Bytewords decoding error.
    Bytewords(bytewords::DecodeError),
    /// The type tag violates the grammar.
    InvalidType,
    /// The UR type of this part differs from the previously received ones.
    InconsistentType,
    /// The part carries an empty message.
    EmptyMessage,
    /// The received fragment is too big to decode.
    FragmentTooBig {
        /// The size of the received fragment.
        size: usize,
    },
    /// The received single-part message is too big for the decoder.
    MessageTooBig {
        /// The size of the message.
        size: usize,
    },
    /// The received part contained an UR type that is too big for the
    /// decoder.
    URTypeTooBig {
        /// The size of the UR type.
        size: usize,
    },
}

impl Error {
    /// Returns `true` if this error is terminal for the decoder.
    ///
    /// Only a checksum mismatch on the fully reassembled message is
    /// terminal; any other error leaves the decoder waiting for more
    /// parts.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Error::Fountain(fountain::decoder::Error::InvalidChecksum { .. })
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParseUR(e) => write!(f, "URI parsing error: {e}"),
            Error::Cbor(e) => write!(f, "CBOR decoding error: {e}"),
            Error::Fountain(e) => write!(f, "Fountain decoding error: {e}"),
            Error::Bytewords(e) => write!(f, "Bytewords decoding error: {e}"),
            Error::InvalidType => write!(f, "The Uniform Resource type is invalid"),
            Error::InconsistentType => write!(
                f,
                "The received part is not consistent with the type of the previous parts"
            ),
            Error::EmptyMessage => write!(f, "The Uniform Resource message is empty"),
            Error::FragmentTooBig { size } => write!(
                f,
                "The fragment size ({size} bytes) is too big for the decoder"
            ),
            Error::MessageTooBig { size } => write!(
                f,
                "The message size ({size} bytes) is too big for the decoder"
            ),
            Error::URTypeTooBig { size } => {
                write!(f, "The UR type ({size} bytes) is too big for the decoder")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<ParseURError> for Error {
    fn from(e: ParseURError) -> Self {
        Self::ParseUR(e)
    }
}

impl From<minicbor::decode::Error> for Error {
    fn from(e: minicbor::decode::Error) -> Self {
        Self::Cbor(e)
    }
}

impl From<bytewords::DecodeError> for Error {
    fn from(e: bytewords::DecodeError) -> Self {
        Self::Bytewords(e)
    }
}

impl From<fountain::decoder::Error> for Error {
    fn from(e: fountain::decoder::Error) -> Self {
        Self::Fountain(e)
    }
}
