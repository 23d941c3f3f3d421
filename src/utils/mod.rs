//! Various unsorted logical helpers.

pub use self::bit_array::BitArray;

mod bit_array;
