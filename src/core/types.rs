/*!
 * Core Types
 * Common types used across the memory subsystem
 */

/// Address type for raw block locations
pub type Address = usize;

/// Size type for byte and element counts
pub type Size = usize;

/// Plain-old-data element that can live inside a pooled array or a raw heap block
///
/// # Safety
///
/// Implementors must accept every bit pattern as a valid value (in particular
/// the all-zero pattern) and must not have drop glue. Heap-backed handles
/// reinterpret raw allocator memory as `[Self]`, so a type with invalid bit
/// patterns (`bool`, `char`, references, enums) must never implement this.
pub unsafe trait Element: Copy + Send + Sync + 'static {
    /// The all-zero value
    const ZERO: Self;
}

macro_rules! impl_element {
    ($($ty:ty => $zero:expr),+ $(,)?) => {
        $(
            // SAFETY: primitive numeric types accept every bit pattern
            unsafe impl Element for $ty {
                const ZERO: Self = $zero;
            }
        )+
    };
}

impl_element! {
    u8 => 0, u16 => 0, u32 => 0, u64 => 0, u128 => 0, usize => 0,
    i8 => 0, i16 => 0, i32 => 0, i64 => 0, i128 => 0, isize => 0,
    f32 => 0.0, f64 => 0.0,
}

/// Byte length of `elements` values of `T`, checked for overflow
#[inline]
pub(crate) fn byte_len_of<T>(elements: Size) -> Option<Size> {
    elements
        .checked_mul(std::mem::size_of::<T>())
        .filter(|bytes| *bytes <= isize::MAX as usize)
}
