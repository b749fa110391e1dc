//! Order total helpers shared by the admin screens.

use num_traits::{Num, ToPrimitive};

/// Line total for `quantity` units at `unit_price`. No rounding is applied.
///
/// Integer arithmetic follows `T`, so pick a type wide enough for the total
/// (`i64`, `u64` or `f64`); `i32` overflows past about 2.1 billion.
pub fn calculate_price<T: Num>(unit_price: T, quantity: T) -> T {
    unit_price * quantity
}

/// Rupee amount in Indian digit grouping, e.g. `₹1,25,000` or `₹12,345.679`.
///
/// At most three fraction digits are kept (rounded half away from zero) and
/// trailing zeros are dropped.
pub fn format_currency<T: ToPrimitive>(amount: T) -> String {
    let value = amount.to_f64().unwrap_or(f64::NAN);
    format!("₹{}", format_en_in(value))
}

fn format_en_in(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value.is_infinite() {
        return format!("{sign}∞");
    }

    let (int_digits, frac_digits) = round_to_thousandths(value.abs());
    let mut out = String::from(sign);
    out.push_str(&group_indian(&int_digits));
    let frac = frac_digits.trim_end_matches('0');
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

// Returns the integer digits and exactly three fraction digits.
fn round_to_thousandths(abs: f64) -> (String, String) {
    let sixteenths = abs * 16.0;
    // Only multiples of 1/16 can sit exactly on a half-thousandth, and `{:.3}`
    // breaks those ties to even.
    if sixteenths.fract() == 0.0 && sixteenths < 2f64.powi(100) {
        if let Some(m) = sixteenths.to_u128() {
            let scaled = m * 125;
            let thousandths = scaled / 2 + scaled % 2;
            return (
                (thousandths / 1000).to_string(),
                format!("{:03}", thousandths % 1000),
            );
        }
    }
    let text = format!("{abs:.3}");
    match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), frac_part.to_string()),
        None => (text, "000".into()),
    }
}

// Last three digits, then groups of two: 12345678 -> 1,23,45,678.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_plain_product() {
        assert_eq!(calculate_price(250, 3), 750);
        assert_eq!(calculate_price(0.5_f64, 3.0), 1.5);
        assert_eq!(calculate_price(-2_i64, 4), -8);
        assert!(calculate_price(f64::NAN, 2.0).is_nan());
        assert_eq!(calculate_price(50_000_i64, 50_000), 2_500_000_000);
        assert_eq!(calculate_price(50_000.0_f64, 50_000.0), 2.5e9);
    }

    #[test]
    fn groups_digits_the_indian_way() {
        assert_eq!(format_currency(125000), "₹1,25,000");
        assert_eq!(format_currency(0), "₹0");
        assert_eq!(format_currency(999), "₹999");
        assert_eq!(format_currency(1000), "₹1,000");
        assert_eq!(format_currency(12345678_u64), "₹1,23,45,678");
        assert_eq!(format_currency(-1500), "₹-1,500");
    }

    #[test]
    fn keeps_at_most_three_fraction_digits() {
        assert_eq!(format_currency(12345.6789), "₹12,345.679");
        assert_eq!(format_currency(99.5), "₹99.5");
        assert_eq!(format_currency(10.10), "₹10.1");
        assert_eq!(format_currency(0.0004), "₹0");
        assert_eq!(format_currency(1.9999), "₹2");
    }

    #[test]
    fn exact_halves_round_away_from_zero() {
        assert_eq!(format_currency(0.0625), "₹0.063");
        assert_eq!(format_currency(-0.0625), "₹-0.063");
        assert_eq!(format_currency(2.5), "₹2.5");
    }

    #[test]
    fn non_finite_amounts() {
        assert_eq!(format_currency(f64::NAN), "₹NaN");
        assert_eq!(format_currency(f64::INFINITY), "₹∞");
        assert_eq!(format_currency(f64::NEG_INFINITY), "₹-∞");
    }
}
