// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

/// Calculates the quotient of `a` and `b`, rounding the results towards
/// positive infinity.
///
/// Note: there's an implementation on the `usize` type of this function,
/// but it's not stable yet.
#[must_use]
pub const fn div_ceil(a: usize, b: usize) -> usize {
    let d = a / b;
    let r = a % b;
    if r > 0 {
        d + 1
    } else {
        d
    }
}

/// Calculate the nominal fragment length for a message.
///
/// Starting at a single fragment, the fragment count is increased until
/// the per-fragment length fits below `max_fragment_length`. A message
/// that fits in one fragment is never split, even below
/// `min_fragment_length`; a message that needs splitting must admit a
/// fragment length of at least `min_fragment_length` or the constraints
/// are unsatisfiable and `None` is returned.
///
/// # Examples
///
/// ```
/// # use ur::fountain::fragment_length;
/// assert_eq!(fragment_length(100, 10, 27), Some(25));
/// assert_eq!(fragment_length(100, 10, 200), Some(100));
/// // 100 bytes cannot be split into fragments of 9..=5 bytes.
/// assert_eq!(fragment_length(100, 9, 5), None);
/// ```
#[must_use]
pub const fn fragment_length(
    message_length: usize,
    min_fragment_length: usize,
    max_fragment_length: usize,
) -> Option<usize> {
    if message_length == 0 || min_fragment_length == 0 || max_fragment_length == 0 {
        return None;
    }

    if message_length <= max_fragment_length {
        return Some(message_length);
    }

    if max_fragment_length < min_fragment_length {
        return None;
    }

    let fragment_count = div_ceil(message_length, max_fragment_length);
    let length = div_ceil(message_length, fragment_count);
    if length < min_fragment_length {
        return None;
    }

    Some(length)
}

pub fn xor_into(v1: &mut [u8], v2: &[u8]) {
    assert_eq!(v1.len(), v2.len());

    for (x1, &x2) in v1.iter_mut().zip(v2.iter()) {
        *x1 ^= x2;
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[should_panic]
    #[test]
    fn test_div_ceil_divide_by_zero() {
        let _ = div_ceil(1, 0);
    }

    #[test]
    fn test_fragment_length() {
        assert_eq!(fragment_length(12345, 10, 1955), Some(1764));
        assert_eq!(fragment_length(12345, 10, 30000), Some(12345));

        assert_eq!(fragment_length(10, 1, 4), Some(4));
        assert_eq!(fragment_length(10, 1, 5), Some(5));
        assert_eq!(fragment_length(10, 1, 6), Some(5));
        assert_eq!(fragment_length(10, 1, 10), Some(10));

        // A message shorter than the minimum still fits a single fragment.
        assert_eq!(fragment_length(1, 10, 200), Some(1));
        assert_eq!(fragment_length(9, 10, 100), Some(9));

        // Unsatisfiable: splitting is needed but every split goes below
        // the minimum.
        assert_eq!(fragment_length(100, 51, 50), None);
        assert_eq!(fragment_length(1000, 100, 99), None);

        assert_eq!(fragment_length(0, 10, 100), None);
        assert_eq!(fragment_length(10, 0, 100), None);
        assert_eq!(fragment_length(10, 1, 0), None);
    }

    #[test]
    #[should_panic]
    fn test_xor_into_different_len() {
        let mut a = [0; 10];
        let b = [0; 9];
        xor_into(&mut a, &b);
    }

    #[test]
    fn test_xor_into() {
        const A: [u8; 10] = [0x91, 0x6e, 0xc6, 0x5c, 0xf7, 0x7c, 0xad, 0xf5, 0x5c, 0xd7];
        const B: [u8; 10] = [0xf9, 0xcd, 0xa1, 0xa1, 0x03, 0x00, 0x26, 0xdd, 0xd4, 0x2e];
        const C: [u8; 10] = [0x68, 0xa3, 0x67, 0xfd, 0xf4, 0x7c, 0x8b, 0x28, 0x88, 0xf9];

        let mut a = A.clone();
        xor_into(&mut a, &B);
        assert_eq!(a, C);

        xor_into(&mut a, &A);
        assert_eq!(a, B);
    }
}
