//! Lenient numeric prefix parsing.
//!
//! Parses the longest numeric prefix of a string, in the manner of C's
//! `strtol`/`strtod`. A parse that consumes nothing yields zero and reports
//! `consumed == 0` so callers can log it instead of failing.

/// Result of a prefix parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prefix<T> {
    /// Parsed value, or zero when nothing was consumed.
    pub value: T,
    /// Number of bytes consumed, including leading whitespace and sign.
    pub consumed: usize,
    /// True if the digits did not fit and the value was saturated.
    pub overflow: bool,
}

impl<T> Prefix<T> {
    /// Returns true if no numeric characters were consumed.
    pub fn is_empty(&self) -> bool {
        self.consumed == 0
    }
}

/// Parses a base-10 integer prefix.
pub fn leading_integer(input: &str) -> Prefix<i64> {
    let bytes = input.as_bytes();
    let start = skip_whitespace(bytes);
    let mut pos = start;

    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let digits_start = pos;
    pos += count_digits(&bytes[pos..]);
    if pos == digits_start {
        return Prefix {
            value: 0,
            consumed: 0,
            overflow: false,
        };
    }

    let text = &input[start..pos];
    match text.parse::<i64>() {
        Ok(value) => Prefix {
            value,
            consumed: pos,
            overflow: false,
        },
        Err(_) => Prefix {
            value: if negative { i64::MIN } else { i64::MAX },
            consumed: pos,
            overflow: true,
        },
    }
}

/// Parses a decimal floating point prefix, including `inf` and `nan`.
pub fn leading_float(input: &str) -> Prefix<f64> {
    let bytes = input.as_bytes();
    let start = skip_whitespace(bytes);
    let mut pos = start;

    if matches!(bytes.get(pos), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    let rest = &bytes[pos..];
    for word in ["infinity", "inf", "nan"] {
        if rest
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word.as_bytes()))
        {
            let end = pos + word.len();
            return finish_float(input, start, end);
        }
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = count_digits(&bytes[pos + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return Prefix {
            value: 0.0,
            consumed: 0,
            overflow: false,
        };
    }

    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp..]);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    finish_float(input, start, pos)
}

fn finish_float(input: &str, start: usize, end: usize) -> Prefix<f64> {
    match input[start..end].parse::<f64>() {
        Ok(value) => Prefix {
            value,
            consumed: end,
            overflow: value.is_infinite() && !input[start..end].to_ascii_lowercase().contains("inf"),
        },
        Err(_) => Prefix {
            value: 0.0,
            consumed: 0,
            overflow: false,
        },
    }
}

fn skip_whitespace(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_whitespace()).count()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
