// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Common collection traits.
//!
//! Every stateful component of this crate is generic over its storage so
//! that the same code runs on heap-allocated collections (`alloc`) and on
//! fixed-capacity ones (`heapless`). These traits are the seam between
//! the two.

mod deque;
mod set;
mod vec;

pub use self::deque::*;
pub use self::set::*;
pub use self::vec::*;
