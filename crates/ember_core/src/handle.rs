//! Generational Handles
//!
//! A [`Handle`] is a packed 64-bit `(generation, index)` pair:
//!
//! ```text
//!  63      56 55      48 47                  24 23                   0
//! +----------+----------+----------------------+----------------------+
//! | free tag | unused   |     generation       |        index         |
//! +----------+----------+----------------------+----------------------+
//! ```
//!
//! Both index and generation are limited to 24 bits. The top byte is only ever
//! set inside a [`SlotMap`](crate::SlotMap) to mark free slots; a handle handed
//! out to callers never carries it. The all-zero value is the null handle.
//!
//! Typed keys for individual pools are declared with [`define_handle!`](crate::define_handle).

use std::fmt;

/// Largest index (and generation) representable in a handle.
pub const MAX_INDEX: u32 = 0x00FF_FFFF;

pub(crate) const INDEX_BITS: u32 = 24;
pub(crate) const FREE_FLAG: u64 = 0xFF00_0000_0000_0000;
const INDEX_MASK: u64 = MAX_INDEX as u64;
const GENERATION_MASK: u64 = INDEX_MASK << INDEX_BITS;

/// Opaque generational reference into a slot map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Handle(u64);

impl Handle {
    /// The null handle. Never contained in any slot map.
    pub const NULL: Self = Self(0);

    #[inline]
    pub(crate) const fn pack(index: u32, generation: u32) -> Self {
        Self(((generation as u64 & INDEX_MASK) << INDEX_BITS) | (index as u64 & INDEX_MASK))
    }

    /// Slot index encoded in the lower 24 bits.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        (self.0 & INDEX_MASK) as u32
    }

    /// Generation encoded in bits 24..48.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        ((self.0 & GENERATION_MASK) >> INDEX_BITS) as u32
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Raw packed value, e.g. for handing across an FFI boundary.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Handle(null)")
        } else {
            write!(f, "Handle({}v{})", self.index(), self.generation())
        }
    }
}

/// Key types usable with [`Pool`](crate::Pool).
///
/// Implemented by [`Handle`] itself and by every type declared with
/// [`define_handle!`](crate::define_handle).
pub trait Key: Copy + Eq + fmt::Debug + From<Handle> + Into<Handle> {}

impl Key for Handle {}

/// Declares strongly typed handle newtypes, one per pool.
///
/// ```rust
/// ember_core::define_handle! {
///     /// Handle to a transform node.
///     pub struct NodeId;
/// }
///
/// let id = NodeId::NULL;
/// assert!(id.is_null());
/// ```
#[macro_export]
macro_rules! define_handle {
    ( $( $(#[$outer:meta])* $vis:vis struct $name:ident; )* ) => { $(
        $(#[$outer])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[repr(transparent)]
        $vis struct $name($crate::Handle);

        impl $name {
            pub const NULL: Self = Self($crate::Handle::NULL);

            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0.is_null()
            }

            #[inline]
            #[must_use]
            pub const fn handle(self) -> $crate::Handle {
                self.0
            }

            #[inline]
            #[must_use]
            pub const fn to_bits(self) -> u64 {
                self.0.to_bits()
            }
        }

        impl From<$crate::Handle> for $name {
            #[inline]
            fn from(handle: $crate::Handle) -> Self {
                Self(handle)
            }
        }

        impl From<$name> for $crate::Handle {
            #[inline]
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl $crate::Key for $name {}

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                if self.0.is_null() {
                    write!(f, "{}(null)", stringify!($name))
                } else {
                    write!(f, "{}({}v{})", stringify!($name), self.0.index(), self.0.generation())
                }
            }
        }
    )* };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_handle! {
        struct TestId;
    }

    #[test]
    fn pack_roundtrips_fields() {
        let h = Handle::pack(0x12_3456, 0xAB_CDEF);
        assert_eq!(h.index(), 0x12_3456);
        assert_eq!(h.generation(), 0xAB_CDEF);
        assert_eq!(h.to_bits() & FREE_FLAG, 0);
    }

    #[test]
    fn null_is_zero() {
        assert!(Handle::NULL.is_null());
        assert!(!Handle::pack(0, 1).is_null());
        assert_eq!(Handle::default(), Handle::NULL);
    }

    #[test]
    fn typed_handle_converts() {
        let raw = Handle::pack(7, 3);
        let typed = TestId::from(raw);
        assert_eq!(typed.handle(), raw);
        assert_eq!(Handle::from(typed), raw);
        assert_eq!(format!("{typed:?}"), "TestId(7v3)");
        assert_eq!(format!("{:?}", TestId::NULL), "TestId(null)");
    }
}
