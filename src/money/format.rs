//! Short-scale display for HUD numbers

use super::Money;

/// Highest tier that still gets a letter suffix (`ax`)
const MAX_SUFFIX_TIER: i64 = 27;
/// First tier using the two-letter alphabet (`aa` = 1e12)
const FIRST_LETTER_TIER: i64 = 4;

/// Format a value for compact display.
///
/// `999 → "999"`, `1500 → "1.50k"`, `1e12 → "1.00aa"`, `1e15 → "1.00ab"`,
/// then `"1.00e84"` once the letter suffixes run out.
pub fn format_short(value: &Money) -> String {
    if value.is_zero_or_less() {
        return "0".to_string();
    }

    let magnitude = value.exponent();
    if magnitude < 3 {
        return format!("{}", value.to_f64().floor() as u64);
    }

    let tier = magnitude / 3;
    // Mantissa scaled into [1, 1000) for this tier
    let scaled = value.mantissa() * 10f64.powi((magnitude - tier * 3) as i32);

    match tier {
        1 => format!("{scaled:.2}k"),
        2 => format!("{scaled:.2}M"),
        3 => format!("{scaled:.2}B"),
        FIRST_LETTER_TIER..=MAX_SUFFIX_TIER => {
            let index = (tier - FIRST_LETTER_TIER) as u8;
            let first = (b'a' + index / 26) as char;
            let second = (b'a' + index % 26) as char;
            format!("{scaled:.2}{first}{second}")
        }
        _ => format!("{:.2}e{}", value.mantissa(), magnitude),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(text: &str) -> String {
        format_short(&text.parse::<Money>().unwrap())
    }

    #[test]
    fn test_small_values() {
        assert_eq!(fmt("0"), "0");
        assert_eq!(fmt("-5"), "0");
        assert_eq!(fmt("999"), "999");
        assert_eq!(fmt("42.9"), "42");
        assert_eq!(fmt("0.5"), "0");
    }

    #[test]
    fn test_named_suffixes() {
        assert_eq!(fmt("1000"), "1.00k");
        assert_eq!(fmt("1500"), "1.50k");
        assert_eq!(fmt("250000"), "250.00k");
        assert_eq!(fmt("1000000"), "1.00M");
        assert_eq!(fmt("1e9"), "1.00B");
    }

    #[test]
    fn test_letter_suffixes() {
        assert_eq!(fmt("1e12"), "1.00aa");
        assert_eq!(fmt("2.5e13"), "25.00aa");
        assert_eq!(fmt("1e15"), "1.00ab");
        assert_eq!(fmt("1e81"), "1.00ax");
    }

    #[test]
    fn test_scientific_beyond_letters() {
        assert_eq!(fmt("1e84"), "1.00e84");
        assert_eq!(fmt("3.5e400"), "3.50e400");
    }

    #[test]
    fn test_formatting_does_not_mutate() {
        let value: Money = "123456".parse().unwrap();
        let before = value;
        let _ = format_short(&value);
        assert_eq!(value, before);
    }
}
