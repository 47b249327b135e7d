//! Number formatting and parsing rules of the AVM1 language.

/// Formats a number the way `String(n)` does in scripts.
///
/// Up to 15 significant digits are kept. Magnitudes in `[1e-5, 1e-4)`
/// are written in fixed notation, very small or very large magnitudes in
/// exponent notation (`1e+16`, `1.5e-7`). NaN is written `NaN`, infinities
/// `Infinity` and `-Infinity`.
///
/// # Examples
///
/// ```
/// use core_types::number_to_string;
///
/// assert_eq!(number_to_string(0.1 + 0.2), "0.3");
/// assert_eq!(number_to_string(1e16), "1e+16");
/// assert_eq!(number_to_string(-0.0), "0");
/// ```
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if (1e-5..1e-4).contains(&abs) {
        return trim_fraction(format!("{:.19}", n));
    }

    // `{:.14e}` rounds to 15 significant digits and reports the exponent
    // of the rounded value, which is what decides the notation.
    let sci = format!("{:.14e}", n);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if !(-5..15).contains(&exp) {
        let mantissa = trim_fraction(mantissa.to_string());
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{}", mantissa, sign, exp.abs());
    }

    let decimals = (14 - exp).max(0) as usize;
    trim_fraction(format!("{:.*}", decimals, n))
}

fn trim_fraction(mut s: String) -> String {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

/// Formats the integer part of a number in the given radix.
///
/// Used by `Number.prototype.toString(radix)`. Radix 10 and radices
/// outside `2..=36` fall back to [`number_to_string`], as do non-finite
/// values.
///
/// # Examples
///
/// ```
/// use core_types::number_to_string_radix;
///
/// assert_eq!(number_to_string_radix(255.0, 16), "ff");
/// assert_eq!(number_to_string_radix(-5.0, 2), "-101");
/// ```
pub fn number_to_string_radix(n: f64, radix: u32) -> String {
    if radix == 10 || !(2..=36).contains(&radix) || !n.is_finite() {
        return number_to_string(n);
    }

    let negative = n < 0.0;
    let mut value = n.abs().trunc();
    if value == 0.0 {
        return "0".to_string();
    }

    let base = radix as f64;
    let mut digits = Vec::new();
    while value >= 1.0 {
        let digit = (value % base) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        value = (value / base).trunc();
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

/// Parses a string into a number under the rules of the given version.
///
/// * SWF4 and below parse the longest numeric prefix, yielding `0` when
///   there is none.
/// * SWF6 and up additionally accept an 8-character `0xRRGGBB` colour
///   literal.
/// * Otherwise the whole (whitespace-trimmed) string must be a decimal
///   literal or the result is NaN. The empty string is `0`.
pub fn string_to_number(s: &str, version: u8) -> f64 {
    if version <= 4 {
        return parse_numeric_prefix(s).unwrap_or(0.0);
    }

    if version >= 6 && s.len() == 8 && (s.starts_with("0x") || s.starts_with("0X")) {
        let digits = &s[2..];
        if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            if let Ok(rgb) = u32::from_str_radix(digits, 16) {
                return rgb as f64;
            }
        }
    }

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match numeric_prefix_len(trimmed) {
        Some(len) if len == trimmed.len() => trimmed.parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn parse_numeric_prefix(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let len = numeric_prefix_len(trimmed)?;
    trimmed[..len].parse::<f64>().ok()
}

/// Length of the decimal literal at the start of `s`, if any.
fn numeric_prefix_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some(i)
}

/// Wraps a number into a 32-bit signed integer.
///
/// The value is reduced modulo 2^32 and reinterpreted as two's
/// complement. NaN and infinities map to 0.
///
/// # Examples
///
/// ```
/// use core_types::to_int32;
///
/// assert_eq!(to_int32(4294967296.0 + 5.0), 5);
/// assert_eq!(to_int32(2147483648.0), i32::MIN);
/// assert_eq!(to_int32(-1.5), -1);
/// assert_eq!(to_int32(f64::NAN), 0);
/// ```
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// Wraps a number into a 32-bit unsigned integer.
pub fn to_uint32(n: f64) -> u32 {
    const TWO_32: f64 = 4_294_967_296.0;
    if !n.is_finite() {
        return 0;
    }
    if n < 0.0 {
        let m = (-n) % TWO_32;
        (m as u32).wrapping_neg()
    } else {
        (n % TWO_32) as u32
    }
}
