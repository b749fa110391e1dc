use crate::error::Result;
use crate::events::EventState;
use crate::page::Page;

pub(crate) fn clamp_quantity(page: &mut Page, event: &mut EventState) -> Result<()> {
    let input = event.current_target;
    let min = bound(
        page.dom.attr(input, "min").as_deref(),
        page.conventions.quantity_default_min,
    );
    let max = bound(
        page.dom.attr(input, "max").as_deref(),
        page.conventions.quantity_default_max,
    );
    let value = page.dom.value(input)?;
    let mut quantity = nonzero(parse_int_prefix(&value)).unwrap_or(min);

    if quantity < min {
        quantity = min;
    }
    if quantity > max {
        quantity = max;
    }
    page.dom.set_value(input, &quantity.to_string())?;
    Ok(())
}

fn bound(raw: Option<&str>, fallback: i64) -> i64 {
    nonzero(raw.and_then(parse_int_prefix)).unwrap_or(fallback)
}

fn nonzero(value: Option<i64>) -> Option<i64> {
    value.filter(|value| *value != 0)
}

/// Integer prefix of `src`: optional whitespace, optional sign, then decimal digits
/// (or hex after `0x`). Trailing text is ignored. `None` when no digit is present.
pub(crate) fn parse_int_prefix(src: &str) -> Option<i64> {
    let trimmed = src.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, body) = match unsigned.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("0x") => (16, &unsigned[2..]),
        _ => (10, unsigned),
    };

    let digits_end = body
        .char_indices()
        .find(|(_, ch)| !ch.is_digit(radix))
        .map(|(idx, _)| idx)
        .unwrap_or(body.len());
    let digits = &body[..digits_end];
    if digits.is_empty() {
        return None;
    }

    let mut magnitude: i64 = 0;
    for ch in digits.chars() {
        let digit = i64::from(ch.to_digit(radix)?);
        magnitude = magnitude.saturating_mul(i64::from(radix)).saturating_add(digit);
    }
    Some(if negative { -magnitude } else { magnitude })
}
