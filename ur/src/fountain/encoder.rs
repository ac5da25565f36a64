// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Encoder.

use core::fmt;

use crate::{
    collections::{Set, Vec},
    fountain::{
        chooser,
        part::Part,
        util::{div_ceil, fragment_length, xor_into},
    },
    CRC32,
};

/// The default minimum length of a fragment, in bytes.
///
/// Only messages that need splitting are held to the minimum; a message
/// short enough for a single fragment is emitted as-is.
pub const DEFAULT_MIN_FRAGMENT_LENGTH: usize = 10;

/// An encoder.
#[cfg(feature = "alloc")]
pub type Encoder<'a> = BaseEncoder<'a, Alloc>;

#[cfg(feature = "alloc")]
impl<'a> Encoder<'a> {
    /// Construct a new [`Encoder`].
    pub const fn new() -> Self {
        Self {
            message: None,
            fragment_length: 0,
            checksum: 0,
            current_sequence: 0,
            chooser: chooser::FragmentChooser::new(),
            data: alloc::vec::Vec::new(),
            indexes: alloc::collections::BTreeSet::new(),
        }
    }
}

/// A static encoder.
pub type HeaplessEncoder<'a, const MAX_FRAGMENT_LEN: usize, const MAX_SEQUENCE_COUNT: usize> =
    BaseEncoder<'a, Heapless<MAX_FRAGMENT_LEN, MAX_SEQUENCE_COUNT>>;

impl<'a, const MAX_FRAGMENT_LEN: usize, const MAX_SEQUENCE_COUNT: usize>
    HeaplessEncoder<'a, MAX_FRAGMENT_LEN, MAX_SEQUENCE_COUNT>
{
    /// Constructs a new [`HeaplessEncoder`].
    pub const fn new() -> Self {
        Self {
            message: None,
            fragment_length: 0,
            checksum: 0,
            current_sequence: 0,
            chooser: chooser::HeaplessFragmentChooser::new(),
            data: heapless::Vec::new(),
            indexes: heapless::IndexSet::new(),
        }
    }
}

/// An encoder capable of emitting fountain-encoded transmissions.
///
/// # Examples
///
/// See the [`crate::fountain`] module documentation for an example.
pub struct BaseEncoder<'a, T: Types> {
    message: Option<&'a [u8]>,
    fragment_length: usize,
    checksum: u32,
    current_sequence: u32,
    chooser: chooser::BaseFragmentChooser<T::Chooser>,
    data: T::Data,
    indexes: T::Indexes,
}

impl<'a, T: Types> BaseEncoder<'a, T> {
    /// Start encoding a new message with the default minimum fragment
    /// length and a first sequence number of zero.
    ///
    /// # Errors
    ///
    /// See [`start_with`](Self::start_with).
    pub fn start(&mut self, message: &'a [u8], max_fragment_length: usize) -> Result<(), Error> {
        self.start_with(message, max_fragment_length, 0, DEFAULT_MIN_FRAGMENT_LENGTH)
    }

    /// Start encoding a new message.
    ///
    /// `first_sequence` is the sequence number the stream starts counting
    /// from; the first emitted part is numbered `first_sequence + 1`.
    /// The systematic prefix is only emitted when starting from zero.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    ///
    /// - The message is empty.
    /// - No fragment length within
    ///   `min_fragment_length..=max_fragment_length` can hold the message.
    /// - The fragment buffer cannot hold a fragment.
    pub fn start_with(
        &mut self,
        message: &'a [u8],
        max_fragment_length: usize,
        first_sequence: u32,
        min_fragment_length: usize,
    ) -> Result<(), Error> {
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }

        self.fragment_length =
            fragment_length(message.len(), min_fragment_length, max_fragment_length)
                .ok_or(Error::InvalidFragmentLength)?;
        self.message = Some(message);
        self.checksum = CRC32.checksum(message);
        self.current_sequence = first_sequence;

        self.data.clear();
        self.data
            .try_resize(self.fragment_length, 0)
            .map_err(|_| Error::NotEnoughSpace {
                needed: self.fragment_length,
                capacity: self.data.capacity(),
            })?;

        Ok(())
    }

    /// Returns the current count of how many parts have been emitted.
    #[must_use]
    #[inline]
    pub fn current_sequence(&self) -> u32 {
        self.current_sequence
    }

    /// Returns the number of segments the original message has been split
    /// up into.
    ///
    /// # Panics
    ///
    /// This function panics if the encoder hasn't been started.
    #[must_use]
    pub fn sequence_count(&self) -> u32 {
        div_ceil(self.message.expect("encoder is not started").len(), self.fragment_length)
            .try_into()
            .unwrap()
    }

    /// Returns whether all original segments have been emitted at least once.
    /// The fountain encoding is defined as doing this before combining segments
    /// with each other. Thus, this is equivalent to checking whether
    /// [`current_sequence`] >= [`fragment_count`].
    ///
    /// [`fragment_count`]: BaseEncoder::sequence_count
    /// [`current_sequence`]: BaseEncoder::current_sequence
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_sequence >= self.sequence_count()
    }

    /// Returns the next part to be emitted by the fountain encoder.
    /// After all parts of the original message have been emitted once,
    /// the fountain encoder will emit the result of xor-ing together the
    /// parts selected by the Xoshiro RNG (which could be a single part).
    ///
    /// # Examples
    ///
    /// See the [`crate::fountain`] module documentation for an example.
    ///
    /// # Panics
    ///
    /// This function panics if the encoder hasn't been started.
    pub fn next_part(&mut self) -> Part {
        self.current_sequence = self.current_sequence.wrapping_add(1);

        self.indexes = self.chooser.choose_fragments(
            self.current_sequence,
            self.sequence_count(),
            self.checksum,
        );

        let message = self.message.expect("encoder is not started");

        self.data.fill(0);
        for &index in self.indexes.iter() {
            let fragment = &message[index * self.fragment_length..];
            let fragment = fragment.get(..self.fragment_length).unwrap_or(fragment);

            // The last fragment can be shorter than the fragment length,
            // its padding is all zeros so there is nothing to mix in.
            xor_into(&mut self.data[..fragment.len()], fragment);
        }

        Part {
            sequence: self.current_sequence,
            sequence_count: self.sequence_count(),
            message_length: message.len(),
            checksum: self.checksum,
            data: &self.data,
        }
    }
}

/// Errors that can happen when starting an encoder.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The message to encode is empty.
    EmptyMessage,
    /// The fragment length constraints are unsatisfiable for the message.
    InvalidFragmentLength,
    /// Not enough space to hold a fragment.
    NotEnoughSpace {
        /// Needed space.
        needed: usize,
        /// Current capacity.
        capacity: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyMessage => write!(f, "The message is empty"),
            Error::InvalidFragmentLength => {
                write!(f, "No fragment length satisfies the length constraints")
            }
            Error::NotEnoughSpace { needed, capacity } => {
                write!(f, "Not enough space: needed {needed}, capacity {capacity}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Types for [`BaseEncoder`].
pub trait Types: Default {
    /// Fragment chooser types.
    type Chooser: chooser::Types;

    /// Data buffer.
    type Data: Vec<u8>;

    /// Indexes.
    type Indexes: Set<usize>;
}

/// [`alloc`] types for [`BaseEncoder`].
#[derive(Default)]
#[cfg(feature = "alloc")]
pub struct Alloc;

#[cfg(feature = "alloc")]
impl Types for Alloc {
    type Chooser = chooser::Alloc;
    type Data = alloc::vec::Vec<u8>;
    type Indexes = alloc::collections::BTreeSet<usize>;
}

/// [`heapless`] types for [`BaseEncoder`].
#[derive(Default)]
pub struct Heapless<const MAX_FRAGMENT_LEN: usize, const MAX_SEQUENCE_COUNT: usize>;

impl<const MAX_FRAGMENT_LEN: usize, const MAX_SEQUENCE_COUNT: usize> Types
    for Heapless<MAX_FRAGMENT_LEN, MAX_SEQUENCE_COUNT>
{
    type Chooser = chooser::Heapless<MAX_SEQUENCE_COUNT>;
    type Data = heapless::Vec<u8, MAX_FRAGMENT_LEN>;
    type Indexes = heapless::FnvIndexSet<usize, MAX_SEQUENCE_COUNT>;
}
