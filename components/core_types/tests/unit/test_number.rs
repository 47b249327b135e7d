//! Unit tests for number formatting and integer wrapping

use core_types::{number_to_string, string_to_number, to_int32};

#[cfg(test)]
mod number_format_tests {
    use super::*;

    #[test]
    fn test_fifteen_significant_digits() {
        assert_eq!(number_to_string(0.1 + 0.2), "0.3");
        assert_eq!(number_to_string(3.141592653589793), "3.14159265358979");
    }

    #[test]
    fn test_large_values_use_exponent() {
        assert_eq!(number_to_string(1e16), "1e+16");
        assert_eq!(number_to_string(123456789012345680000.0), "1.23456789012346e+20");
    }

    #[test]
    fn test_small_values_use_exponent_below_fixed_window() {
        assert_eq!(number_to_string(0.000001), "1e-6");
    }
}

#[cfg(test)]
mod number_parse_tests {
    use super::*;

    #[test]
    fn test_version_five_rejects_hex() {
        assert!(string_to_number("0x00FF00", 5).is_nan());
        assert_eq!(string_to_number("0x00FF00", 6), 65280.0);
    }

    #[test]
    fn test_negative_and_exponent() {
        assert_eq!(string_to_number("-2.5", 7), -2.5);
        assert_eq!(string_to_number("1e3", 7), 1000.0);
    }
}

#[cfg(test)]
mod integer_wrap_tests {
    use super::*;

    #[test]
    fn test_wraps_modulo_two_to_the_32() {
        assert_eq!(to_int32(4294967295.0), -1);
        assert_eq!(to_int32(4294967296.0), 0);
        assert_eq!(to_int32(3.9), 3);
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(to_int32(f64::NEG_INFINITY), 0);
        assert_eq!(to_int32(f64::NAN), 0);
    }
}
