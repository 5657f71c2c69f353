//! Lenient integer parsing for dataset strings.
//!
//! Dataset values are free-form strings written by the generator scripts
//! ("2", "16MB" once trimmed, "0x9000"). Parsing reads the leading integer and
//! ignores trailing garbage, the way the viewer has always interpreted them.

/// Parse the leading integer of `text`.
///
/// Leading whitespace and a single sign are accepted. A `0x`/`0X` prefix
/// switches to hexadecimal. Parsing stops at the first character that is not
/// a digit of the active radix. Returns `None` if no digit was read or the
/// value overflows.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        value = value
            .checked_mul(i64::from(radix))?
            .checked_add(i64::from(digit))?;
        seen_digit = true;
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Parse a partition offset or size. Negative or unparsable values are 0.
pub fn parse_partition_number(text: &str) -> u64 {
    parse_leading_int(text)
        .and_then(|value| u64::try_from(value).ok())
        .unwrap_or(0)
}
