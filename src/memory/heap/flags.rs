/*!
 * Heap Creation Flags
 * Creation-time declarations passed to an unmanaged heap
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bit set of heap creation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeapCreationFlags(u32);

impl HeapCreationFlags {
    /// Default/no flags
    pub const NONE: Self = Self(0);
    /// Zero every allocation before returning it
    pub const GLOBAL_ZERO: Self = Self(0x01);
    /// The allocator serializes concurrent alloc/resize/free calls itself
    pub const USE_SYNCHRONIZATION: Self = Self(0x02);
    /// The heap is the shared process heap
    pub const IS_SHARED: Self = Self(0x04);
    /// The heap can resize blocks
    pub const SUPPORTS_REALLOC: Self = Self(0x08);

    const ALL: u32 = 0x0f;

    /// Build from raw bits, dropping unknown bits
    #[inline]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for HeapCreationFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for HeapCreationFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for HeapCreationFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }

        let names = [
            (Self::GLOBAL_ZERO, "GLOBAL_ZERO"),
            (Self::USE_SYNCHRONIZATION, "USE_SYNCHRONIZATION"),
            (Self::IS_SHARED, "IS_SHARED"),
            (Self::SUPPORTS_REALLOC, "SUPPORTS_REALLOC"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Heap configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    /// Requested creation flags
    pub flags: HeapCreationFlags,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            flags: HeapCreationFlags::SUPPORTS_REALLOC,
        }
    }
}

impl HeapConfig {
    /// The shared process heap, resizable
    pub const fn shared() -> Self {
        Self {
            flags: HeapCreationFlags::IS_SHARED.union(HeapCreationFlags::SUPPORTS_REALLOC),
        }
    }

    /// A private heap that serializes its own calls
    pub const fn private_synchronized() -> Self {
        Self {
            flags: HeapCreationFlags::USE_SYNCHRONIZATION
                .union(HeapCreationFlags::SUPPORTS_REALLOC),
        }
    }

    /// Set or clear `GLOBAL_ZERO`
    pub const fn with_global_zero(mut self, enabled: bool) -> Self {
        self.flags = if enabled {
            self.flags.union(HeapCreationFlags::GLOBAL_ZERO)
        } else {
            self.flags.difference(HeapCreationFlags::GLOBAL_ZERO)
        };
        self
    }

    /// Flags the heap actually runs with
    ///
    /// The shared heap is already thread safe, so it never takes its own lock.
    pub const fn effective_flags(&self) -> HeapCreationFlags {
        if self.flags.contains(HeapCreationFlags::IS_SHARED) {
            self.flags.difference(HeapCreationFlags::USE_SYNCHRONIZATION)
        } else {
            self.flags
        }
    }
}
