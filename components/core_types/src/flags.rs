//! Property attribute flags.
//!
//! The bit layout matches the masks accepted by `ASSetPropFlags`, so a
//! script-supplied mask can be applied without translation.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Attribute bits attached to every property.
///
/// # Example
///
/// ```
/// use core_types::PropFlags;
///
/// let flags = PropFlags::DONT_ENUM | PropFlags::ONLY_SWF6_UP;
/// assert!(!flags.is_visible(5));
/// assert!(flags.is_visible(6));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PropFlags(u32);

impl PropFlags {
    /// No attributes set.
    pub const NONE: PropFlags = PropFlags(0);
    /// Skipped by enumeration.
    pub const DONT_ENUM: PropFlags = PropFlags(1 << 0);
    /// Refuses deletion.
    pub const DONT_DELETE: PropFlags = PropFlags(1 << 1);
    /// Writes are ignored.
    pub const READ_ONLY: PropFlags = PropFlags(1 << 2);
    /// Setter is invoked even when inherited.
    pub const STATIC: PropFlags = PropFlags(1 << 3);
    /// Hidden below SWF5.
    pub const ONLY_SWF5_UP: PropFlags = PropFlags(1 << 6);
    /// Hidden below SWF6.
    pub const ONLY_SWF6_UP: PropFlags = PropFlags(1 << 7);
    /// Hidden in SWF6 exactly.
    pub const IGNORE_SWF6: PropFlags = PropFlags(1 << 8);
    /// Hidden below SWF7.
    pub const ONLY_SWF7_UP: PropFlags = PropFlags(1 << 10);
    /// Hidden below SWF8.
    pub const ONLY_SWF8_UP: PropFlags = PropFlags(1 << 12);
    /// Hidden below SWF9.
    pub const ONLY_SWF9_UP: PropFlags = PropFlags(1 << 13);
    /// Flags can no longer be changed.
    pub const PROTECTED: PropFlags = PropFlags(1 << 16);

    /// Flags used for members created by script assignment.
    pub const DEFAULT: PropFlags = PropFlags::NONE;

    /// Flags used for members installed by native initialisation.
    pub const NATIVE_DEFAULT: PropFlags = PropFlags(Self::DONT_ENUM.0 | Self::DONT_DELETE.0);

    const VERSION_MASK: u32 = Self::ONLY_SWF5_UP.0
        | Self::ONLY_SWF6_UP.0
        | Self::IGNORE_SWF6.0
        | Self::ONLY_SWF7_UP.0
        | Self::ONLY_SWF8_UP.0
        | Self::ONLY_SWF9_UP.0;

    /// Builds flags from a raw bit mask.
    pub const fn from_bits(bits: u32) -> Self {
        PropFlags(bits)
    }

    /// Raw bit mask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: PropFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the bits of `other`.
    pub fn insert(&mut self, other: PropFlags) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`.
    pub fn remove(&mut self, other: PropFlags) {
        self.0 &= !other.0;
    }

    /// Shorthand for `contains(DONT_ENUM)`.
    pub const fn is_dont_enum(self) -> bool {
        self.contains(Self::DONT_ENUM)
    }

    /// Shorthand for `contains(DONT_DELETE)`.
    pub const fn is_dont_delete(self) -> bool {
        self.contains(Self::DONT_DELETE)
    }

    /// Shorthand for `contains(READ_ONLY)`.
    pub const fn is_read_only(self) -> bool {
        self.contains(Self::READ_ONLY)
    }

    /// Shorthand for `contains(STATIC)`.
    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    /// Shorthand for `contains(PROTECTED)`.
    pub const fn is_protected(self) -> bool {
        self.contains(Self::PROTECTED)
    }

    /// Whether a property carrying these flags exists for scripts of
    /// the given version.
    ///
    /// # Arguments
    ///
    /// * `version` - SWF version of the running code
    pub const fn is_visible(self, version: u8) -> bool {
        if self.contains(Self::ONLY_SWF5_UP) && version < 5 {
            return false;
        }
        if self.contains(Self::ONLY_SWF6_UP) && version < 6 {
            return false;
        }
        if self.contains(Self::IGNORE_SWF6) && version == 6 {
            return false;
        }
        if self.contains(Self::ONLY_SWF7_UP) && version < 7 {
            return false;
        }
        if self.contains(Self::ONLY_SWF8_UP) && version < 8 {
            return false;
        }
        if self.contains(Self::ONLY_SWF9_UP) && version < 9 {
            return false;
        }
        true
    }

    /// Drops the version gates that would hide the property from `version`.
    ///
    /// Assigning to a hidden property from newer code makes it visible.
    pub fn clear_visible(&mut self, version: u8) {
        if version >= 5 {
            self.remove(Self::ONLY_SWF5_UP);
        }
        if version >= 6 {
            self.remove(Self::ONLY_SWF6_UP);
            self.remove(Self::IGNORE_SWF6);
            if version >= 7 {
                self.remove(Self::ONLY_SWF7_UP);
            }
            if version >= 8 {
                self.remove(Self::ONLY_SWF8_UP);
            }
            if version >= 9 {
                self.remove(Self::ONLY_SWF9_UP);
            }
        }
    }

    /// Whether any version gate is set.
    pub const fn is_version_gated(self) -> bool {
        self.0 & Self::VERSION_MASK != 0
    }

    /// Applies a set/clear mask pair.
    ///
    /// Bits in `set_false` are cleared before bits in `set_true` are set.
    ///
    /// # Returns
    ///
    /// `false` when the flags are protected and were left untouched.
    pub fn apply(&mut self, set_true: PropFlags, set_false: PropFlags) -> bool {
        if self.is_protected() {
            return false;
        }
        self.0 &= !set_false.0;
        self.0 |= set_true.0;
        true
    }
}

impl BitOr for PropFlags {
    type Output = PropFlags;

    fn bitor(self, rhs: PropFlags) -> PropFlags {
        PropFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for PropFlags {
    fn bitor_assign(&mut self, rhs: PropFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for PropFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(PropFlags, &str); 11] = [
            (PropFlags::DONT_ENUM, "dontEnum"),
            (PropFlags::DONT_DELETE, "dontDelete"),
            (PropFlags::READ_ONLY, "readOnly"),
            (PropFlags::STATIC, "static"),
            (PropFlags::ONLY_SWF5_UP, "onlySWF5Up"),
            (PropFlags::ONLY_SWF6_UP, "onlySWF6Up"),
            (PropFlags::IGNORE_SWF6, "ignoreSWF6"),
            (PropFlags::ONLY_SWF7_UP, "onlySWF7Up"),
            (PropFlags::ONLY_SWF8_UP, "onlySWF8Up"),
            (PropFlags::ONLY_SWF9_UP, "onlySWF9Up"),
            (PropFlags::PROTECTED, "protected"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES.iter() {
            if self.contains(*flag) {
                set.entry(&format_args!("{}", name));
            }
        }
        set.finish()
    }
}
