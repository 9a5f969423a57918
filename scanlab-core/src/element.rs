//! Fixed-width element types
//!
//! Buffers hold plain little-endian integers with no header or padding,
//! the layout of a fixed-width column file.

use core::fmt::Debug;
use static_assertions::{assert_eq_size, const_assert};

assert_eq_size!(u8, [u8; 1]);
assert_eq_size!(i32, [u8; 4]);
assert_eq_size!(i64, [u8; 8]);

// Typed views over mapped column files reinterpret the bytes in place.
const_assert!(cfg!(target_endian = "little"));

/// A fixed-width integer that can live in a [`crate::buffer::Buffer`]
pub trait Element: Copy + Default + Ord + Debug + Send + Sync + 'static {
    /// Width in bytes
    const WIDTH: usize;

    /// Wrapping `self - rhs`
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// Widen for checksums
    fn to_i64(self) -> i64;

    /// Narrow a generated value, truncating like an `as` cast
    fn from_i64(value: i64) -> Self;

    /// Parity predicate used by conjunctive selections
    #[inline(always)]
    fn is_even(self) -> bool {
        self.to_i64() & 1 == 0
    }
}

macro_rules! impl_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();

                #[inline(always)]
                fn wrapping_sub(self, rhs: Self) -> Self {
                    <$ty>::wrapping_sub(self, rhs)
                }

                #[inline(always)]
                fn to_i64(self) -> i64 {
                    self as i64
                }

                #[inline(always)]
                fn from_i64(value: i64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_element!(u8, i32, i64);

/// Wrapping sum of a slice, the checksum every strategy reports
#[inline]
pub fn checksum<T: Element>(values: &[T]) -> i64 {
    values.iter().fold(0i64, |acc, v| acc.wrapping_add(v.to_i64()))
}
