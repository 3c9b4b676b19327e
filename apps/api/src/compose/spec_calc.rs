//! Per-option engineering and commercial values.
//!
//! Pure functions only. Dimensions arrive as display strings (`"2(1+1)"` means a
//! 2 m side split into two compartments) and are parsed here.

use serde::Serialize;

use crate::compose::error::{CompositionError, MissingDimension, OptionLoc};
use crate::models::quotation::{GallonUnit, TankOption};

/// Free board applied when none (or an unreadable size) is given.
pub const DEFAULT_FREE_BOARD_M: f64 = 0.3;

// ────────────────────────────────────────────────────────────────────────────
// Skid classification
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkidClass {
    /// Height in [2.0, 3.0].
    HollowSection,
    /// Height in [1.0, 1.5).
    WithoutSkid,
    /// Height above 3.0.
    IBeam,
    /// Any other height, or height missing.
    Unclassified,
}

impl SkidClass {
    pub fn for_height(height: Option<f64>) -> Self {
        match height {
            Some(h) if (2.0..=3.0).contains(&h) => SkidClass::HollowSection,
            Some(h) if (1.0..1.5).contains(&h) => SkidClass::WithoutSkid,
            Some(h) if h > 3.0 => SkidClass::IBeam,
            _ => SkidClass::Unclassified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkidClass::HollowSection => "SKID BASE - HDG HOLLOW SECTION 50 X 50 X 3 MM (SQUARE TUBE)",
            SkidClass::WithoutSkid => "WITHOUT SKID",
            SkidClass::IBeam => "SKID BASE - I BEAM SKID",
            SkidClass::Unclassified => "",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Derived values
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedValues {
    pub length_m: Option<f64>,
    pub width_m: Option<f64>,
    pub height_m: Option<f64>,
    pub volume_m3: f64,
    pub capacity_gallons: f64,
    pub free_board_m: f64,
    pub net_volume_m3: f64,
    pub net_gallons: f64,
    pub skid: SkidClass,
    pub line_total: f64,
}

/// Parses a dimension string.
///
/// Spaces are ignored and anything from the first `(` on is partition notation.
/// Returns `Ok(None)` for an empty value and `Err` for text that is present but
/// not a finite number.
pub fn parse_dimension(raw: &str) -> Result<Option<f64>, String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(None);
    }
    let numeric = match compact.find('(') {
        Some(idx) => &compact[..idx],
        None => compact.as_str(),
    };
    let value: f64 = numeric
        .parse()
        .map_err(|_| format!("not a number: '{}'", raw.trim()))?;
    if !value.is_finite() {
        return Err(format!("not a finite number: '{}'", raw.trim()));
    }
    Ok(Some(value))
}

/// Free board in metres. Only an enabled, readable centimetre size overrides the default.
pub fn free_board_m(enabled: bool, size_cm: &str) -> f64 {
    if !enabled {
        return DEFAULT_FREE_BOARD_M;
    }
    match size_cm.trim().parse::<f64>() {
        Ok(cm) if cm.is_finite() => cm / 100.0,
        _ => DEFAULT_FREE_BOARD_M,
    }
}

/// Computes every derived value for one option.
///
/// Empty dimensions are pushed onto `missing` and zero the dependent geometry;
/// malformed ones are rejected.
pub fn derive(
    option: &TankOption,
    unit: GallonUnit,
    loc: OptionLoc,
    missing: &mut Vec<MissingDimension>,
) -> Result<DerivedValues, CompositionError> {
    let mut dim = |field: &'static str, raw: &str| -> Result<Option<f64>, CompositionError> {
        let value = parse_dimension(raw).map_err(|msg| loc.invalid(field, msg))?;
        if value.is_none() {
            missing.push(MissingDimension {
                group: loc.group,
                option: loc.option,
                field,
            });
        }
        Ok(value)
    };

    let length_m = dim("length", &option.length)?;
    let width_m = dim("width", &option.width)?;
    let height_m = dim("height", &option.height)?;

    if !option.quantity.is_finite() {
        return Err(loc.invalid("quantity", "not a finite number"));
    }
    if !option.unit_price.is_finite() {
        return Err(loc.invalid("unit price", "not a finite number"));
    }
    if let Some(discount) = option.discount_total {
        if !discount.is_finite() {
            return Err(loc.invalid("discounted total", "not a finite number"));
        }
    }

    let free_board = free_board_m(option.free_board_enabled, &option.free_board_cm);

    let (volume_m3, net_volume_m3) = match (length_m, width_m, height_m) {
        (Some(l), Some(w), Some(h)) => (l * w * h, l * w * (h - free_board)),
        _ => (0.0, 0.0),
    };

    Ok(DerivedValues {
        length_m,
        width_m,
        height_m,
        volume_m3,
        capacity_gallons: volume_m3 * unit.factor(),
        free_board_m: free_board,
        net_volume_m3,
        net_gallons: net_volume_m3 * unit.factor(),
        skid: SkidClass::for_height(height_m),
        line_total: line_total(option),
    })
}

/// A supplied discount total wins over `quantity * unit_price`.
pub fn line_total(option: &TankOption) -> f64 {
    option
        .discount_total
        .unwrap_or(option.quantity * option.unit_price)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn option(l: &str, w: &str, h: &str) -> TankOption {
        TankOption {
            name: "Tank".to_string(),
            length: l.to_string(),
            width: w.to_string(),
            height: h.to_string(),
            quantity: 1.0,
            unit_price: 100.0,
            ..TankOption::default()
        }
    }

    const LOC: OptionLoc = OptionLoc { group: 1, option: 1 };

    #[test]
    fn test_parse_dimension_partition_notation() {
        assert_eq!(parse_dimension("2(1+1)"), Ok(Some(2.0)));
        assert_eq!(parse_dimension(" 4 (2 + 2) "), Ok(Some(4.0)));
        assert_eq!(parse_dimension("2.5"), Ok(Some(2.5)));
    }

    #[test]
    fn test_parse_dimension_empty_is_missing() {
        assert_eq!(parse_dimension(""), Ok(None));
        assert_eq!(parse_dimension("   "), Ok(None));
    }

    #[test]
    fn test_parse_dimension_rejects_garbage() {
        assert!(parse_dimension("abc").is_err());
        assert!(parse_dimension("(1+1)").is_err());
        assert!(parse_dimension("inf").is_err());
        assert!(parse_dimension("NaN").is_err());
    }

    #[test]
    fn test_volume_and_gallons_usg() {
        let mut missing = Vec::new();
        let d = derive(&option("2", "2", "2"), GallonUnit::Usg, LOC, &mut missing).unwrap();
        assert_eq!(d.volume_m3, 8.0);
        assert!((d.capacity_gallons - 2113.376).abs() < 1e-9);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_volume_and_gallons_img() {
        let mut missing = Vec::new();
        let d = derive(&option("2", "2", "2"), GallonUnit::Img, LOC, &mut missing).unwrap();
        assert!((d.capacity_gallons - 1759.752).abs() < 1e-9);
    }

    #[test]
    fn test_net_volume_uses_default_free_board() {
        let mut missing = Vec::new();
        let d = derive(&option("2", "2", "2"), GallonUnit::Usg, LOC, &mut missing).unwrap();
        assert_eq!(d.free_board_m, 0.3);
        assert!((d.net_volume_m3 - 6.8).abs() < 1e-9);
    }

    #[test]
    fn test_net_volume_with_custom_free_board() {
        let mut opt = option("2", "2", "2");
        opt.free_board_enabled = true;
        opt.free_board_cm = "50".to_string();
        let mut missing = Vec::new();
        let d = derive(&opt, GallonUnit::Usg, LOC, &mut missing).unwrap();
        assert!((d.free_board_m - 0.5).abs() < 1e-12);
        assert!((d.net_volume_m3 - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_free_board_unreadable_size_falls_back() {
        assert_eq!(free_board_m(true, "abc"), DEFAULT_FREE_BOARD_M);
        assert_eq!(free_board_m(true, ""), DEFAULT_FREE_BOARD_M);
        assert_eq!(free_board_m(false, "50"), DEFAULT_FREE_BOARD_M);
    }

    #[test]
    fn test_skid_bands() {
        assert_eq!(SkidClass::for_height(Some(2.0)), SkidClass::HollowSection);
        assert_eq!(SkidClass::for_height(Some(3.0)), SkidClass::HollowSection);
        assert_eq!(SkidClass::for_height(Some(1.2)), SkidClass::WithoutSkid);
        assert_eq!(SkidClass::for_height(Some(1.5)), SkidClass::Unclassified);
        assert_eq!(SkidClass::for_height(Some(3.5)), SkidClass::IBeam);
        assert_eq!(SkidClass::for_height(Some(0.5)), SkidClass::Unclassified);
        assert_eq!(SkidClass::for_height(None), SkidClass::Unclassified);
        assert_eq!(SkidClass::Unclassified.label(), "");
    }

    #[test]
    fn test_missing_dimension_is_soft() {
        let mut missing = Vec::new();
        let d = derive(&option("", "", ""), GallonUnit::Usg, LOC, &mut missing).unwrap();
        assert_eq!(d.volume_m3, 0.0);
        assert_eq!(d.capacity_gallons, 0.0);
        assert_eq!(d.net_volume_m3, 0.0);
        assert_eq!(d.skid, SkidClass::Unclassified);
        assert_eq!(missing.len(), 3);
        assert_eq!(missing[0].field, "length");
    }

    #[test]
    fn test_malformed_dimension_names_option() {
        let mut missing = Vec::new();
        let loc = OptionLoc { group: 2, option: 3 };
        let err = derive(&option("2", "x", "2"), GallonUnit::Usg, loc, &mut missing).unwrap_err();
        match err {
            CompositionError::Validation {
                group,
                option,
                field,
                ..
            } => {
                assert_eq!((group, option, field), (2, 3, "width"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_discount_total_takes_precedence() {
        let mut opt = option("1", "1", "1");
        opt.quantity = 2.0;
        opt.unit_price = 500.0;
        assert_eq!(line_total(&opt), 1000.0);
        opt.discount_total = Some(900.0);
        assert_eq!(line_total(&opt), 900.0);
    }
}
