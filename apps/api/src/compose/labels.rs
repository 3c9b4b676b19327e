//! Display labels: roman numerals, shared-attribute hoisting, number formatting.

use serde::Serialize;

use crate::compose::spec_calc::SkidClass;
use crate::models::quotation::{SupportSystem, TankGroup};

const ROMAN: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Subtractive roman numeral for 1..=3999. Out-of-range input falls back to decimal.
pub fn to_roman(n: u32) -> String {
    if n == 0 || n > 3999 {
        return n.to_string();
    }
    let mut rest = n;
    let mut out = String::new();
    for (value, symbol) in ROMAN {
        while rest >= value {
            out.push_str(symbol);
            rest -= value;
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Hoisting
// ────────────────────────────────────────────────────────────────────────────

/// Attributes shared by every option in the quotation, shown once in the summary row.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CommonElements {
    pub tank_type: Option<String>,
    pub skid: Option<String>,
    pub support: Option<SupportSystem>,
}

/// Returns `Some(first)` when every item equals the first.
fn all_equal<T: PartialEq + Clone>(mut items: impl Iterator<Item = T>) -> Option<T> {
    let first = items.next()?;
    items.all(|x| x == first).then_some(first)
}

/// Decides which attributes are hoisted into the summary row.
///
/// `skids` must be in the same group/option order as `groups`.
pub fn find_common_elements(groups: &[TankGroup], skids: &[SkidClass]) -> CommonElements {
    let options = || groups.iter().flat_map(|g| g.options.iter());

    let tank_type = all_equal(options().map(|o| o.tank_type.clone()));
    let skid = all_equal(skids.iter().map(|s| s.label().to_string())).filter(|s| !s.is_empty());
    let support = all_equal(options().map(|o| o.support));

    CommonElements {
        tank_type,
        skid,
        support,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Numbers
// ────────────────────────────────────────────────────────────────────────────

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn with_sign(negative: bool, body: String) -> String {
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// `12345.678` → `12,345.68`.
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let negative = value < 0.0 && fixed != "0.00";
    with_sign(negative, format!("{}.{}", group_thousands(int_part), frac_part))
}

/// Rounds half away from zero and groups thousands: `12345.5` → `12,346`.
pub fn format_whole(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    with_sign(rounded < 0.0, group_thousands(&digits))
}

/// Quantities print without a trailing `.0` when whole.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{value}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quotation::TankOption;

    fn group(types: &[&str]) -> TankGroup {
        TankGroup {
            options: types
                .iter()
                .map(|t| TankOption {
                    tank_type: t.to_string(),
                    ..TankOption::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_to_roman_known_values() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(9), "IX");
        assert_eq!(to_roman(40), "XL");
        assert_eq!(to_roman(1994), "MCMXCIV");
        assert_eq!(to_roman(3999), "MMMCMXCIX");
    }

    #[test]
    fn test_to_roman_out_of_range() {
        assert_eq!(to_roman(0), "0");
        assert_eq!(to_roman(4000), "4000");
    }

    #[test]
    fn test_hoisting_identical_type_across_groups() {
        let groups = vec![group(&["GRP", "GRP"]), group(&["GRP"])];
        let skids = vec![SkidClass::IBeam; 3];
        let common = find_common_elements(&groups, &skids);
        assert_eq!(common.tank_type.as_deref(), Some("GRP"));
        assert_eq!(common.skid.as_deref(), Some("SKID BASE - I BEAM SKID"));
        assert_eq!(common.support, Some(SupportSystem::Internal));
    }

    #[test]
    fn test_hoisting_disabled_by_one_difference() {
        let groups = vec![group(&["GRP", "GRP"]), group(&["STEEL"])];
        let skids = vec![SkidClass::IBeam, SkidClass::IBeam, SkidClass::WithoutSkid];
        let common = find_common_elements(&groups, &skids);
        assert_eq!(common.tank_type, None);
        assert_eq!(common.skid, None);
    }

    #[test]
    fn test_empty_skid_never_hoisted() {
        let groups = vec![group(&["GRP", "GRP"])];
        let skids = vec![SkidClass::Unclassified; 2];
        assert_eq!(find_common_elements(&groups, &skids).skid, None);
    }

    #[test]
    fn test_mixed_support_not_common() {
        let mut g = group(&["GRP", "GRP"]);
        g.options[1].support = SupportSystem::External;
        let common = find_common_elements(&[g], &[SkidClass::IBeam; 2]);
        assert_eq!(common.support, None);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(999.5), "999.50");
        assert_eq!(format_money(1234.5), "1,234.50");
        assert_eq!(format_money(1234567.891), "1,234,567.89");
        assert_eq!(format_money(-1500.0), "-1,500.00");
    }

    #[test]
    fn test_format_whole_rounds_half_away_from_zero() {
        assert_eq!(format_whole(12345.5), "12,346");
        assert_eq!(format_whole(12345.49), "12,345");
        assert_eq!(format_whole(-2.5), "-3");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(1.5), "1.5");
    }
}
