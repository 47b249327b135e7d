//! Unit tests for PropFlags version gates

use core_types::PropFlags;

#[cfg(test)]
mod flag_tests {
    use super::*;

    #[test]
    fn test_swf7_gate() {
        let flags = PropFlags::ONLY_SWF7_UP;
        assert!(!flags.is_visible(6));
        assert!(flags.is_visible(7));
        assert!(flags.is_version_gated());
    }

    #[test]
    fn test_native_default_flags() {
        let flags = PropFlags::NATIVE_DEFAULT;
        assert!(flags.is_dont_enum());
        assert!(flags.is_dont_delete());
        assert!(!flags.is_read_only());
    }

    #[test]
    fn test_raw_mask_round_trip() {
        let flags = PropFlags::from_bits(0x87);
        assert!(flags.is_dont_enum());
        assert!(flags.is_dont_delete());
        assert!(flags.is_read_only());
        assert!(flags.contains(PropFlags::ONLY_SWF6_UP));
        assert_eq!(flags.bits(), 0x87);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut flags = PropFlags::DEFAULT;
        flags.insert(PropFlags::READ_ONLY);
        assert!(flags.is_read_only());
        flags.remove(PropFlags::READ_ONLY);
        assert_eq!(flags, PropFlags::DEFAULT);
    }
}
