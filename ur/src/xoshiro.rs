// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Seeded xoshiro256** pseudo-random number generator.
//!
//! The seeding step (SHA-256 of the seed bytes, interpreted as four
//! big-endian 64-bit words) and the `next_double`/`next_int` derivations
//! are part of the wire contract: the decoder must regenerate the exact
//! fragment index sets the encoder chose.

use bitcoin_hashes::{GeneralHash as _, Hash as _};
use rand_xoshiro::rand_core::RngCore;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

#[allow(clippy::module_name_repetitions)]
pub struct Xoshiro256 {
    inner: Xoshiro256StarStar,
}

impl From<Xoshiro256StarStar> for Xoshiro256 {
    fn from(from: Xoshiro256StarStar) -> Self {
        Self { inner: from }
    }
}

impl From<&[u8]> for Xoshiro256 {
    fn from(from: &[u8]) -> Self {
        let hash = bitcoin_hashes::sha256::Hash::hash(from);
        Self::from(hash.to_byte_array())
    }
}

impl From<&str> for Xoshiro256 {
    fn from(value: &str) -> Self {
        Self::from(value.as_bytes())
    }
}

impl From<[u8; 32]> for Xoshiro256 {
    fn from(value: [u8; 32]) -> Self {
        // The hash bytes are big-endian words, rand_xoshiro seeds from
        // little-endian state words.
        let mut s = [0_u8; 32];
        for i in 0..4 {
            let word = u64::from_be_bytes(value[8 * i..8 * i + 8].try_into().unwrap());
            s[8 * i..8 * i + 8].copy_from_slice(&word.to_le_bytes());
        }
        Xoshiro256StarStar::from_seed(s).into()
    }
}

#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
impl Xoshiro256 {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.inner.next_u64()
    }

    pub fn next_double(&mut self) -> f64 {
        self.next() as f64 / (u64::MAX as f64 + 1.0)
    }

    #[allow(clippy::cast_sign_loss)]
    pub fn next_int(&mut self, low: u64, high: u64) -> u64 {
        (self.next_double() * ((high - low + 1) as f64)) as u64 + low
    }
}
