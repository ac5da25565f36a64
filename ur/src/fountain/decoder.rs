// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Decoder.
//!
//! The decoder is an online Gauss-Jordan eliminator over GF(2): every
//! received part is an equation whose unknowns are the source fragments
//! and whose arithmetic is XOR. Simple equations (one fragment) land
//! directly in the reassembled message; mixed equations are reduced
//! against everything already known and kept pending otherwise. Once all
//! fragments are known the message checksum decides between the success
//! and failure terminal states.

use core::fmt;

use crate::{
    collections::{Deque, Set, Vec},
    fountain::{
        chooser,
        chooser::BaseFragmentChooser,
        part::{IndexedPart, MessageDescription, Part},
    },
    CRC32,
};

/// Maximum number of pending mixed equations.
///
/// When the limit is reached further mixed parts are dropped but
/// processing continues; the decoder stays correct and simply needs more
/// parts to converge.
pub const MAX_MIXED_PARTS: usize = 256;

/// Maximum number of part fingerprints tracked for duplicate suppression.
pub const MAX_TRACKED_FINGERPRINTS: usize = 512;

const FNV1A_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV1A_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a fingerprint of an index set, over the indices in
/// ascending order.
///
/// Two parts mixing the same fragments hash identically no matter in
/// which order their index sets were built.
#[allow(clippy::cast_possible_truncation)]
fn fingerprint<S: Set<usize>>(indexes: &S, sequence_count: u32) -> u32 {
    let mut hash = FNV1A_OFFSET_BASIS;
    for index in 0..sequence_count as usize {
        if indexes.contains(&index) {
            hash ^= index as u32;
            hash = hash.wrapping_mul(FNV1A_PRIME);
        }
    }
    hash
}

/// A [`decoder`](BaseDecoder) that uses [`alloc`] collection types.
#[cfg(feature = "alloc")]
pub type Decoder = BaseDecoder<Alloc>;

/// A [`decoder`](BaseDecoder) that uses fixed-capacity collection types.
pub type HeaplessDecoder<
    const MAX_MESSAGE_LEN: usize,
    const MAX_MIXED_PARTS: usize,
    const MAX_FRAGMENT_LEN: usize,
    const MAX_SEQUENCE_COUNT: usize,
    const QUEUE_SIZE: usize,
    const MAX_FINGERPRINTS: usize,
> = BaseDecoder<
    Heapless<
        MAX_MESSAGE_LEN,
        MAX_MIXED_PARTS,
        MAX_FRAGMENT_LEN,
        MAX_SEQUENCE_COUNT,
        QUEUE_SIZE,
        MAX_FINGERPRINTS,
    >,
>;

impl<
        const MAX_MESSAGE_LEN: usize,
        const MAX_MIXED_PARTS: usize,
        const MAX_FRAGMENT_LEN: usize,
        const MAX_SEQUENCE_COUNT: usize,
        const QUEUE_SIZE: usize,
        const MAX_FINGERPRINTS: usize,
    >
    HeaplessDecoder<
        MAX_MESSAGE_LEN,
        MAX_MIXED_PARTS,
        MAX_FRAGMENT_LEN,
        MAX_SEQUENCE_COUNT,
        QUEUE_SIZE,
        MAX_FINGERPRINTS,
    >
{
    /// Constructs a new [`HeaplessDecoder`].
    pub const fn new() -> Self {
        Self {
            message: heapless::Vec::new(),
            mixed_parts: heapless::Vec::new(),
            received: heapless::IndexSet::new(),
            queue: heapless::Deque::new(),
            fingerprints: heapless::Vec::new(),
            fragment_chooser: chooser::HeaplessFragmentChooser::new(),
            message_description: None,
            processed_parts: 0,
            outcome: None,
        }
    }
}

/// Terminal state of a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    ChecksumMismatch { expected: u32, calculated: u32 },
}

/// A decoder capable of receiving and recombining fountain-encoded
/// transmissions.
///
/// # Examples
///
/// See the [`crate::fountain`] module documentation for an example.
#[derive(Default)]
pub struct BaseDecoder<T: Types> {
    message: T::Message,
    mixed_parts: T::MixedParts,
    received: T::Indexes,
    queue: T::Queue,
    fingerprints: T::Fingerprints,
    fragment_chooser: BaseFragmentChooser<T::Chooser>,
    message_description: Option<MessageDescription>,
    processed_parts: u32,
    outcome: Option<Outcome>,
}

impl<T: Types> BaseDecoder<T> {
    /// Receives a fountain-encoded part into the decoder.
    ///
    /// Returns `Ok(true)` if the decoder needs more parts, `Ok(false)`
    /// once it is complete. Receiving a duplicate part is a successful
    /// no-op. A part is processed completely, including the whole cascade
    /// of reductions it triggers, before this function returns.
    ///
    /// # Errors
    ///
    /// If the part is inconsistent with the previously received ones an
    /// error is returned and the part is dropped; the decoder remains
    /// usable. The exception is [`Error::InvalidChecksum`], which reports
    /// that every fragment was recovered but the reassembled message
    /// failed its checksum: that state is terminal.
    pub fn receive(&mut self, part: &Part) -> Result<bool, Error> {
        if self.is_complete() {
            return Ok(false);
        }

        if !part.is_valid() {
            return Err(Error::InvalidPart);
        }

        if self.is_empty() {
            let message_len = part.data.len()
                * usize::try_from(part.sequence_count).map_err(|_| Error::InvalidPart)?;
            if self.message.try_resize(message_len, 0).is_err() {
                return Err(Error::NotEnoughSpace {
                    needed: message_len,
                    capacity: self.message.capacity(),
                });
            }
            self.message_description = Some(part.to_message_description());
        } else if !self.is_part_consistent(part) {
            return Err(Error::InconsistentPart {
                received: part.to_message_description(),
                expected: self.message_description.clone().expect("decoder is not empty"),
            });
        }

        let indexes: T::Indexes = self.fragment_chooser.choose_fragments(
            part.sequence,
            part.sequence_count,
            part.checksum,
        );

        let fingerprint = fingerprint(&indexes, part.sequence_count);
        if self.fingerprints.binary_search(&fingerprint).is_ok() {
            // Drop the duplicate, its information is already in.
            return Ok(true);
        }
        self.track_fingerprint(fingerprint);

        let mut data = T::Fragment::default();
        if data.try_extend_from_slice(part.data).is_err() {
            return Err(Error::NotEnoughSpace {
                needed: part.data.len(),
                capacity: data.capacity(),
            });
        }

        self.queue.push_back(IndexedPart::new(data, indexes));

        while !self.is_complete() {
            match self.queue.pop_front() {
                Some(part) if part.is_simple() => self.process_simple(&part)?,
                Some(part) => self.process_mixed(part),
                None => break,
            }
        }

        self.processed_parts = self.processed_parts.wrapping_add(1);

        if let Some(Outcome::ChecksumMismatch {
            expected,
            calculated,
        }) = self.outcome
        {
            return Err(Error::InvalidChecksum {
                expected,
                calculated,
            });
        }

        Ok(!self.is_complete())
    }

    /// Checks whether a [`Part`] is receivable by the decoder.
    ///
    /// This can fail if other parts were previously received whose
    /// metadata (such as number of segments) is inconsistent with the
    /// present [`Part`]. Note that a fresh decoder will always return
    /// false here.
    #[must_use]
    pub fn is_part_consistent(&self, part: &Part) -> bool {
        match self.message_description {
            Some(ref message_description) => part == message_description,
            None => false,
        }
    }

    /// If the decode succeeded, returns the reassembled message.
    ///
    /// # Examples
    ///
    /// See the [`crate::fountain`] module documentation for an example.
    #[must_use]
    pub fn message(&self) -> Option<&[u8]> {
        match self.outcome {
            Some(Outcome::Success) => Some(&self.message),
            _ => None,
        }
    }

    /// Returns whether the decoder has reached a terminal state.
    ///
    /// A complete decoder is either [successful](Self::is_success) or has
    /// failed its checksum verification.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns whether the message has been reassembled and verified by
    /// checksum.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Some(Outcome::Success))
    }

    /// Returns the number of parts the transmitted message was split
    /// into, or zero if no part has been received yet.
    #[must_use]
    pub fn expected_part_count(&self) -> u32 {
        self.message_description
            .as_ref()
            .map_or(0, |description| description.sequence_count)
    }

    /// Returns the number of unique parts processed so far.
    #[must_use]
    pub fn processed_parts_count(&self) -> u32 {
        self.processed_parts
    }

    /// Calculate the estimated percentage of completion.
    ///
    /// This is a user-facing hint, not a correctness contract: fountain
    /// decoding typically needs around 1.75 times the original part count
    /// of lossy input.
    pub fn estimated_percent_complete(&self) -> f64 {
        if self.is_complete() {
            return 1.0;
        }

        let Some(description) = self.message_description.as_ref() else {
            return 0.0;
        };

        let estimated_input_parts = f64::from(description.sequence_count) * 1.75;
        f64::min(0.99, f64::from(self.processed_parts) / estimated_input_parts)
    }

    /// Returns `true` if the decoder doesn't contain any data.
    ///
    /// Once a part is successfully [received](Self::receive) this method
    /// will return `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
            && self.mixed_parts.is_empty()
            && self.received.is_empty()
            && self.queue.is_empty()
            && self.fingerprints.is_empty()
            && self.message_description.is_none()
            && self.processed_parts == 0
            && self.outcome.is_none()
    }

    /// Clear the decoder so that it can be used again.
    pub fn clear(&mut self) {
        self.message.clear();
        self.mixed_parts.clear();
        self.received.clear();
        self.queue.clear();
        self.fingerprints.clear();
        self.message_description = None;
        self.processed_parts = 0;
        self.outcome = None;

        debug_assert!(self.is_empty());
    }

    fn track_fingerprint(&mut self, fingerprint: u32) {
        if self.fingerprints.len() >= MAX_TRACKED_FINGERPRINTS {
            // The tracking set is full. Stop tracking; reprocessing a
            // duplicate is harmless, only wasteful.
            return;
        }

        if let Err(position) = self.fingerprints.binary_search(&fingerprint) {
            let _ = self.fingerprints.try_insert(position, fingerprint);
        }
    }

    fn fragment_length(&self) -> usize {
        self.message_description
            .as_ref()
            .expect("decoder is not empty")
            .fragment_length
    }

    /// Reduce every pending mixed equation by `part`; equations reduced
    /// down to one fragment leave the pending store and are re-queued.
    fn reduce_mixed(&mut self, part: &IndexedPart<T::Fragment, T::Indexes>) {
        let queue = &mut self.queue;
        self.mixed_parts.retain_mut(|mixed_part| {
            mixed_part.reduce(part);

            if mixed_part.is_simple() {
                queue.push_back(mixed_part.clone());
                false
            } else {
                true
            }
        });
    }

    fn process_simple(&mut self, part: &IndexedPart<T::Fragment, T::Indexes>) -> Result<(), Error> {
        let index = *part.indexes.first().expect("simple part has an index");
        if self.received.contains(&index) {
            return Ok(());
        }

        let fragment_length = self.fragment_length();
        let offset = index * fragment_length;
        self.message[offset..offset + fragment_length].copy_from_slice(&part.data);
        self.received
            .insert(index)
            .map_err(|_| Error::TooManyFragments)?;

        self.reduce_mixed(part);

        let description = self.message_description.as_ref().expect("decoder is not empty");
        if self.received.len() == usize::try_from(description.sequence_count).unwrap_or(usize::MAX)
        {
            // All fragments are known: truncate the padding away and let
            // the checksum decide the terminal state.
            let message_length = description.message_length;
            let expected = description.checksum;

            let _ = self.message.try_resize(message_length, 0);
            let calculated = CRC32.checksum(&self.message);

            self.outcome = Some(if calculated == expected {
                Outcome::Success
            } else {
                Outcome::ChecksumMismatch {
                    expected,
                    calculated,
                }
            });
        }

        Ok(())
    }

    fn process_mixed(&mut self, mut part: IndexedPart<T::Fragment, T::Indexes>) {
        // Cancel the known fragments out of the equation.
        let fragment_length = self.fragment_length();
        for &index in self.received.iter() {
            if part.is_simple() {
                break;
            }

            let offset = index * fragment_length;
            part.reduce_by_simple(&self.message[offset..offset + fragment_length], index);
        }

        // Then reduce by every pending equation over a proper subset of
        // this part's fragments.
        if !part.is_simple() {
            for mixed_part in self.mixed_parts.iter() {
                part.reduce(mixed_part);
                if part.is_simple() {
                    break;
                }
            }
        }

        if part.indexes.is_empty() {
            // The zero equation carries no information.
            return;
        }

        if part.is_simple() {
            self.queue.push_back(part);
            return;
        }

        // Keep pending equations canonical: no two may share an index set.
        for mixed_part in self.mixed_parts.iter() {
            if part.indexes == mixed_part.indexes {
                return;
            }
        }

        self.reduce_mixed(&part);

        if self.mixed_parts.len() < MAX_MIXED_PARTS {
            let _ = self.mixed_parts.try_push(part);
        }
    }
}

/// Types for [`BaseDecoder`].
pub trait Types: Default {
    /// Decoded message buffer.
    type Message: Vec<u8>;

    /// Mixed parts storage.
    type MixedParts: Vec<IndexedPart<Self::Fragment, Self::Indexes>>;

    /// Fragment buffer.
    type Fragment: Clone + Vec<u8>;

    /// Indexes storage.
    type Indexes: PartialEq + Set<usize>;

    /// Part queue.
    type Queue: Deque<IndexedPart<Self::Fragment, Self::Indexes>>;

    /// Fingerprints of received parts, kept sorted.
    type Fingerprints: Vec<u32>;

    /// Fragment chooser types.
    type Chooser: chooser::Types;
}

/// [`alloc`] types for [`BaseDecoder`].
#[derive(Default)]
#[cfg(feature = "alloc")]
pub struct Alloc;

#[cfg(feature = "alloc")]
impl Types for Alloc {
    type Message = alloc::vec::Vec<u8>;
    type MixedParts =
        alloc::vec::Vec<IndexedPart<alloc::vec::Vec<u8>, alloc::collections::BTreeSet<usize>>>;
    type Fragment = alloc::vec::Vec<u8>;
    type Indexes = alloc::collections::BTreeSet<usize>;
    type Queue = alloc::collections::VecDeque<
        IndexedPart<alloc::vec::Vec<u8>, alloc::collections::BTreeSet<usize>>,
    >;
    type Fingerprints = alloc::vec::Vec<u32>;
    type Chooser = chooser::Alloc;
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
>;

impl<
        const MAX_MESSAGE_LEN: usize,
        const MAX_MIXED_PARTS: usize,
        const MAX_FRAGMENT_LEN: usize,
        const MAX_SEQUENCE_COUNT: usize,
        const QUEUE_SIZE: usize,
        const MAX_FINGERPRINTS: usize,
    > Types
    for Heapless<
        MAX_MESSAGE_LEN,
        MAX_MIXED_PARTS,
        MAX_FRAGMENT_LEN,
        MAX_SEQUENCE_COUNT,
        QUEUE_SIZE,
        MAX_FINGERPRINTS,
    >
{
    type Message = heapless::Vec<u8, MAX_MESSAGE_LEN>;

    type MixedParts = heapless::Vec<
        IndexedPart<
            heapless::Vec<u8, MAX_FRAGMENT_LEN>,
            heapless::FnvIndexSet<usize, MAX_SEQUENCE_COUNT>,
        >,
        MAX_MIXED_PARTS,
    >;

    type Fragment = heapless::Vec<u8, MAX_FRAGMENT_LEN>;

    type Indexes = heapless::FnvIndexSet<usize, MAX_SEQUENCE_COUNT>;

    type Queue = heapless::Deque<
        IndexedPart<
            heapless::Vec<u8, MAX_FRAGMENT_LEN>,
            heapless::FnvIndexSet<usize, MAX_SEQUENCE_COUNT>,
        >,
        QUEUE_SIZE,
    >;

    type Fingerprints = heapless::Vec<u32, MAX_FINGERPRINTS>;

    type Chooser = chooser::Heapless<MAX_SEQUENCE_COUNT>;
}

/// Errors that can happen during decoding.
#[derive(Debug)]
pub enum Error {
    /// The received part is inconsistent with the previously received ones.
    InconsistentPart {
        /// The description of the message from the received part.
        received: MessageDescription,
        /// The description adopted from the previously received parts.
        expected: MessageDescription,
    },
    /// The received part is structurally invalid.
    InvalidPart,
    /// Not enough space to receive the part.
    NotEnoughSpace {
        /// Needed space.
        needed: usize,
        /// Current capacity.
        capacity: usize,
    },
    /// Too many fragments.
    TooManyFragments,
    /// Every fragment was recovered but the reassembled message does not
    /// match the checksum of the parts. This state is terminal.
    InvalidChecksum {
        /// The checksum carried by the received parts.
        expected: u32,
        /// The checksum of the reassembled message.
        calculated: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InconsistentPart { received, expected } => {
                write!(f, "Inconsistent part: ")?;

                if received.sequence_count != expected.sequence_count {
                    write!(
                        f,
                        "sequence count mismatch (received {}, expected {}). ",
                        received.sequence_count, expected.sequence_count
                    )?;
                }

                if received.message_length != expected.message_length {
                    write!(
                        f,
                        "message length mismatch (received {}, expected {}). ",
                        received.message_length, expected.message_length
                    )?;
                }

                if received.checksum != expected.checksum {
                    write!(
                        f,
                        "checksum mismatch (received {:X}, expected {:X}). ",
                        received.checksum, expected.checksum
                    )?;
                }

                if received.fragment_length != expected.fragment_length {
                    write!(
                        f,
                        "fragment length mismatch (received {}, expected {}). ",
                        received.fragment_length, expected.fragment_length
                    )?;
                }
            }
            Error::InvalidPart => write!(f, "The scanned part is empty")?,
            Error::NotEnoughSpace { needed, capacity } => {
                write!(f, "Not enough space: needed {needed}, capacity {capacity}")?
            }
            Error::TooManyFragments => write!(f, "Too many fragments for the current message")?,
            Error::InvalidChecksum {
                expected,
                calculated,
            } => write!(
                f,
                "Reassembled message checksum {calculated:08X} does not match the expected {expected:08X}"
            )?,
        };
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
#[cfg(feature = "alloc")]
pub mod tests {
    use super::*;
    use crate::fountain::fragment_length;
    use crate::{fountain::Encoder, xoshiro::test_utils::make_message};

    const MESSAGE_SIZE: usize = 32767;
    const MAX_FRAGMENT_LEN: usize = 1000;
    const MAX_SEQUENCE_COUNT: usize = 64;
    const MAX_MESSAGE_SIZE: usize = match fragment_length(MESSAGE_SIZE, 10, MAX_FRAGMENT_LEN) {
        Some(fragment_length) => fragment_length * MAX_SEQUENCE_COUNT,
        None => 0,
    };
    const SEED: &str = "Wolf";

    fn message() -> alloc::vec::Vec<u8> {
        make_message(SEED, MESSAGE_SIZE)
    }

    #[test]
    fn test_decoder() {
        fn test<T: Types>(decoder: &mut BaseDecoder<T>) {
            let message = message();
            let mut encoder = Encoder::new();
            encoder.start(&message, MAX_FRAGMENT_LEN).unwrap();
            while !decoder.is_complete() {
                assert_eq!(decoder.message(), None);
                let part = encoder.next_part();
                decoder.receive(&part).unwrap();
            }
            assert!(decoder.is_success());
            assert_eq!(decoder.message(), Some(message.as_slice()));
        }

        let mut heapless_decoder: HeaplessDecoder<
            MAX_MESSAGE_SIZE,
            MAX_SEQUENCE_COUNT,
            MAX_FRAGMENT_LEN,
            MAX_SEQUENCE_COUNT,
            MAX_SEQUENCE_COUNT,
            512,
        > = HeaplessDecoder::new();
        let mut decoder = Decoder::default();

        test(&mut heapless_decoder);
        test(&mut decoder);
    }

    #[test]
    fn test_decoder_skip_some_simple_fragments() {
        let message = message();
        let mut encoder = Encoder::new();
        encoder.start(&message, MAX_FRAGMENT_LEN).unwrap();
        let mut decoder = Decoder::default();
        let mut skip = false;
        while !decoder.is_complete() {
            let part = encoder.next_part();
            if !skip {
                decoder.receive(&part).unwrap();
            }
            skip = !skip;
        }
        assert!(decoder.is_success());
        assert_eq!(decoder.message(), Some(message.as_slice()));
    }

    #[test]
    fn test_decoder_receive_return_value() {
        let message = message();
        let mut encoder = Encoder::new();
        encoder.start(&message, MAX_FRAGMENT_LEN).unwrap();
        let mut decoder = Decoder::default();
        let part = encoder.next_part();
        assert!(decoder.receive(&part).unwrap());

        while !decoder.is_complete() {
            let part = encoder.next_part();
            decoder.receive(&part).unwrap();
        }
        let part = encoder.next_part();
        assert!(!decoder.receive(&part).unwrap());
    }

    #[test]
    fn test_decoder_part_validation() {
        fn test<T: Types>(decoder: &mut BaseDecoder<T>) {
            let mut encoder = Encoder::new();
            encoder.start_with("foo".as_bytes(), 2, 0, 1).unwrap();

            let mut part = encoder.next_part();
            assert!(decoder.receive(&part).unwrap());
            assert!(decoder.is_part_consistent(&part));
            part.checksum += 1;
            assert!(!decoder.is_part_consistent(&part));
            part.checksum -= 1;
            part.message_length += 1;
            assert!(!decoder.is_part_consistent(&part));
            part.message_length -= 1;
            part.sequence_count += 1;
            assert!(!decoder.is_part_consistent(&part));
            part.sequence_count -= 1;
            part.data = &[0];
            assert!(!decoder.is_part_consistent(&part));
        }

        let mut heapless_decoder: HeaplessDecoder<8, 8, 8, 8, 8, 8> = HeaplessDecoder::new();
        let mut decoder = Decoder::default();

        test(&mut heapless_decoder);
        test(&mut decoder);
    }

    #[test]
    fn test_empty_decoder_empty_part() {
        fn test<T: Types>(decoder: &mut BaseDecoder<T>) {
            let mut part = Part {
                sequence: 12,
                sequence_count: 8,
                message_length: 100,
                checksum: 0x1234_5678,
                data: &[1, 5, 3, 3, 5],
            };

            // Check sequence_count.
            part.sequence_count = 0;
            assert!(matches!(decoder.receive(&part), Err(Error::InvalidPart)));
            part.sequence_count = 8;

            // Check message_length.
            part.message_length = 0;
            assert!(matches!(decoder.receive(&part), Err(Error::InvalidPart)));
            part.message_length = 100;

            // Check data.
            part.data = &[];
            assert!(matches!(decoder.receive(&part), Err(Error::InvalidPart)));
            part.data = &[1, 5, 3, 3, 5];

            // Should not validate as there aren't any previous parts received.
            assert!(!decoder.is_part_consistent(&part));
        }

        let mut heapless_decoder: HeaplessDecoder<100, 8, 5, 8, 8, 8> = HeaplessDecoder::new();
        let mut decoder = Decoder::default();

        test(&mut heapless_decoder);
        test(&mut decoder);
    }

    #[test]
    fn test_inconsistent_part_preserves_state() {
        let message = make_message(SEED, 800);
        let mut encoder = Encoder::new();
        encoder.start(&message, 100).unwrap();
        let mut decoder = Decoder::default();

        let part = encoder.next_part();
        decoder.receive(&part).unwrap();
        assert_eq!(decoder.expected_part_count(), 8);

        // A part claiming a different sequence count is rejected...
        let mut other = encoder.next_part();
        other.sequence_count += 1;
        assert!(matches!(
            decoder.receive(&other),
            Err(Error::InconsistentPart { .. })
        ));

        // ...while the state from the first part survives and the decode
        // can still finish from the original stream.
        assert_eq!(decoder.expected_part_count(), 8);
        assert_eq!(decoder.processed_parts_count(), 1);
        while !decoder.is_complete() {
            decoder.receive(&encoder.next_part()).unwrap();
        }
        assert_eq!(decoder.message(), Some(message.as_slice()));
    }

    #[test]
    fn test_duplicate_parts_are_dropped() {
        let message = make_message(SEED, 800);
        let mut encoder = Encoder::new();
        encoder.start(&message, 100).unwrap();
        let mut decoder = Decoder::default();

        let part = encoder.next_part();
        decoder.receive(&part).unwrap();
        let estimate = decoder.estimated_percent_complete();

        for _ in 0..1000 {
            assert!(decoder.receive(&part).unwrap());
        }

        // Duplicates are successful no-ops: no progress is recorded and
        // no state accumulates.
        assert_eq!(decoder.processed_parts_count(), 1);
        assert_eq!(decoder.estimated_percent_complete(), estimate);
        assert!(!decoder.is_complete());
        assert_eq!(decoder.expected_part_count(), 8);
    }

    #[test]
    fn test_estimated_percent_complete() {
        let message = make_message(SEED, 800);
        let mut encoder = Encoder::new();
        encoder.start(&message, 100).unwrap();
        let mut decoder = Decoder::default();

        assert_eq!(decoder.estimated_percent_complete(), 0.0);

        decoder.receive(&encoder.next_part()).unwrap();
        let expected = 1.0 / (8.0 * 1.75);
        assert!((decoder.estimated_percent_complete() - expected).abs() < 1e-9);

        while !decoder.is_complete() {
            decoder.receive(&encoder.next_part()).unwrap();
            assert!(decoder.estimated_percent_complete() <= 1.0);
        }
        assert_eq!(decoder.estimated_percent_complete(), 1.0);
    }

    #[test]
    fn test_checksum_failure_is_terminal() {
        let message = make_message(SEED, 80);
        let mut encoder = Encoder::new();
        encoder.start(&message, 40).unwrap();
        assert_eq!(encoder.sequence_count(), 2);

        let mut decoder = Decoder::default();

        // Corrupt the data of the first systematic part while keeping
        // the header intact.
        let part = encoder.next_part();
        let mut corrupted = part.data.to_vec();
        corrupted[0] ^= 0xff;
        let corrupted = Part {
            data: &corrupted,
            ..part.clone()
        };
        assert!(decoder.receive(&corrupted).unwrap());

        let part = encoder.next_part();
        assert!(matches!(
            decoder.receive(&part),
            Err(Error::InvalidChecksum { .. })
        ));

        assert!(decoder.is_complete());
        assert!(!decoder.is_success());
        assert_eq!(decoder.message(), None);

        // Terminal: further parts are ignored.
        let part = encoder.next_part();
        assert!(!decoder.receive(&part).unwrap());
    }

    #[test]
    fn test_mixed_part_cap_keeps_decoder_correct() {
        // A heapless decoder with room for a single pending mixed part
        // still converges, it just needs more of the stream.
        let message = make_message(SEED, 800);
        let mut encoder = Encoder::new();
        encoder.start(&message, 100).unwrap();

        let mut decoder: HeaplessDecoder<800, 1, 100, 8, 8, 64> = HeaplessDecoder::new();
        while !decoder.is_complete() {
            decoder.receive(&encoder.next_part()).unwrap();
        }
        assert_eq!(decoder.message(), Some(message.as_slice()));
    }

    #[test]
    fn test_known_fragments_never_regress() {
        let message = message();
        let mut encoder = Encoder::new();
        encoder.start(&message, MAX_FRAGMENT_LEN).unwrap();
        let mut decoder = Decoder::default();

        let mut known = 0;
        while !decoder.is_complete() {
            let part = encoder.next_part();
            if part.sequence % 3 == 0 {
                continue;
            }
            decoder.receive(&part).unwrap();
            let now = decoder.received.len();
            assert!(now >= known);
            known = now;
        }
        assert!(decoder.is_success());
    }

    #[test]
    fn test_fingerprint_is_order_independent() {
        let a: alloc::collections::BTreeSet<usize> = [5usize, 1, 9].into_iter().collect();
        let b: alloc::collections::BTreeSet<usize> = [9usize, 5, 1].into_iter().collect();
        assert_eq!(fingerprint(&a, 10), fingerprint(&b, 10));

        let c: alloc::collections::BTreeSet<usize> = [5usize, 1].into_iter().collect();
        assert_ne!(fingerprint(&a, 10), fingerprint(&c, 10));
    }
}
