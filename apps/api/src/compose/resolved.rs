//! The immutable, fully-derived view of one quotation.
//!
//! `resolve` runs every pure phase (calculation, hoisting, totals, section
//! resolution) once. The assembler only ever reads the result.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::compose::error::{CompositionError, MissingDimension, OptionLoc};
use crate::compose::header::estimate_pages;
use crate::compose::labels::{find_common_elements, to_roman, CommonElements};
use crate::compose::sections::{resolve_sections, ResolvedSection};
use crate::compose::spec_calc::{derive, DerivedValues, SkidClass};
use crate::models::quotation::{
    Brand, QuotationHeader, QuotationInput, TankOption, TemplateAsset, TotalsPolicy,
};

/// VAT rate applied to the subtotal.
pub const TAX_RATE: f64 = 0.05;

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedOption {
    pub loc: OptionLoc,
    pub roman: String,
    pub option: TankOption,
    pub derived: DerivedValues,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedGroup {
    pub sl_no: usize,
    pub options: Vec<ResolvedOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: f64,
    /// Always computed, whether or not it is displayed.
    pub tax: f64,
    pub grand_total: f64,
    /// Any line carries a discounted total.
    pub discounted: bool,
}

impl Totals {
    pub fn from_lines<'a>(options: impl Iterator<Item = &'a ResolvedOption>) -> Self {
        let mut subtotal = 0.0;
        let mut discounted = false;
        for opt in options {
            subtotal += opt.derived.line_total;
            discounted |= opt.option.discount_total.is_some();
        }
        let tax = subtotal * TAX_RATE;
        Totals {
            subtotal,
            tax,
            grand_total: subtotal + tax,
            discounted,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedQuotation {
    pub header: QuotationHeader,
    /// `DD/MM/YYYY` when the input date parses, otherwise the input verbatim.
    pub display_date: String,
    pub brand: Brand,
    pub company_name: String,
    pub product_brand: String,
    pub currency: String,
    pub groups: Vec<ResolvedGroup>,
    pub common: CommonElements,
    pub totals: Totals,
    pub totals_policy: TotalsPolicy,
    pub sections: Vec<ResolvedSection>,
    pub missing: Vec<MissingDimension>,
    pub page_estimate: u32,
    pub template: TemplateAsset,
}

/// Normalises `DD/MM/YY` and `DD/MM/YYYY` to `DD/MM/YYYY`.
pub fn display_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed = NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .ok()
        .filter(|_| raw.rsplit('/').next().map(|y| y.len() == 4).unwrap_or(false))
        .or_else(|| NaiveDate::parse_from_str(raw, "%d/%m/%y").ok())?;
    Some(parsed.format("%d/%m/%Y").to_string())
}

/// Builds the immutable quotation view from caller input.
pub fn resolve(input: &QuotationInput) -> Result<ResolvedQuotation, CompositionError> {
    let unit = input.header.gallon_unit;
    let mut missing = Vec::new();
    let mut groups = Vec::with_capacity(input.groups.len());

    for (gi, group) in input.groups.iter().enumerate() {
        let mut options = Vec::with_capacity(group.options.len());
        for (oi, option) in group.options.iter().enumerate() {
            let loc = OptionLoc {
                group: gi + 1,
                option: oi + 1,
            };
            if input.require_names && option.name.trim().is_empty() {
                return Err(loc.invalid("tank name", "a tank name is required"));
            }
            let derived = derive(option, unit, loc, &mut missing)?;
            options.push(ResolvedOption {
                loc,
                roman: to_roman((oi + 1) as u32),
                option: option.clone(),
                derived,
            });
        }
        groups.push(ResolvedGroup {
            sl_no: gi + 1,
            options,
        });
    }

    if !missing.is_empty() {
        warn!(count = missing.len(), "quotation has missing tank dimensions");
    }

    let skids: Vec<SkidClass> = groups
        .iter()
        .flat_map(|g| g.options.iter().map(|o| o.derived.skid))
        .collect();
    let common = find_common_elements(&input.groups, &skids);
    let totals = Totals::from_lines(groups.iter().flat_map(|g| g.options.iter()));

    let company_name = input.company_name();
    let sections = resolve_sections(&input.sections, &input.content, &company_name)?;

    let display_date = display_date(&input.header.date).unwrap_or_else(|| input.header.date.clone());
    let page_estimate = estimate_pages(input.option_count());

    debug!(
        groups = groups.len(),
        options = input.option_count(),
        sections = sections.len(),
        page_estimate,
        "quotation resolved"
    );

    Ok(ResolvedQuotation {
        header: input.header.clone(),
        display_date,
        brand: input.brand,
        company_name,
        product_brand: input.product_brand(),
        currency: input.currency.clone(),
        groups,
        common,
        totals,
        totals_policy: input.totals,
        sections,
        missing,
        page_estimate,
        template: input
            .template
            .clone()
            .unwrap_or_else(|| TemplateAsset::builtin(input.brand)),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Test fixtures (shared with sibling modules)
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::models::quotation::*;

    pub fn option(name: &str, l: &str, w: &str, h: &str, qty: f64, price: f64) -> TankOption {
        TankOption {
            name: name.to_string(),
            tank_type: "PANEL TYPE".to_string(),
            partitioned: false,
            length: l.to_string(),
            width: w.to_string(),
            height: h.to_string(),
            unit: "NOS".to_string(),
            quantity: qty,
            unit_price: price,
            ..TankOption::default()
        }
    }

    pub fn input(groups: Vec<TankGroup>) -> QuotationInput {
        QuotationInput {
            header: QuotationHeader {
                recipient_name: "Mr. Ahmed - Purchase Manager".to_string(),
                recipient_company: "M/S. Desert Builders".to_string(),
                recipient_location: "Dubai".to_string(),
                recipient_phone: "Phone: 050 000 0000".to_string(),
                recipient_email: "Email: buyer@example.com".to_string(),
                quote_number: "GRPT/2501/VM/104".to_string(),
                date: "15/01/25".to_string(),
                subject: "SUPPLY OF GRP WATER TANK".to_string(),
                project: "VILLA G+1, AL KHAWANEEJ".to_string(),
                extra_details: Vec::new(),
                gallon_unit: GallonUnit::Usg,
            },
            groups,
            sections: SectionConfig::with(&[SectionKey::Closing, SectionKey::ThankYou]),
            content: BTreeMap::new(),
            totals: TotalsPolicy::default(),
            brand: Brand::GrpTanks,
            company: None,
            template: None,
            require_names: false,
            currency: "AED".to_string(),
        }
    }

    pub fn single_tank_input() -> QuotationInput {
        input(vec![TankGroup {
            options: vec![option("WATER TANK", "4(2+2)", "2", "2", 1.0, 10000.0)],
        }])
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::quotation::TankGroup;

    #[test]
    fn test_display_date_two_and_four_digit_years() {
        assert_eq!(display_date("15/01/25").as_deref(), Some("15/01/2025"));
        assert_eq!(display_date("15/01/2025").as_deref(), Some("15/01/2025"));
        assert_eq!(display_date("not a date"), None);
    }

    #[test]
    fn test_resolve_numbers_groups_and_options() {
        let q = resolve(&input(vec![
            TankGroup {
                options: vec![
                    option("A", "2", "2", "2", 1.0, 100.0),
                    option("B", "3", "2", "2", 1.0, 200.0),
                ],
            },
            TankGroup {
                options: vec![option("C", "1", "1", "1", 2.0, 50.0)],
            },
        ]))
        .unwrap();
        assert_eq!(q.groups[0].sl_no, 1);
        assert_eq!(q.groups[1].sl_no, 2);
        assert_eq!(q.groups[0].options[1].roman, "II");
        assert_eq!(q.groups[1].options[0].loc, OptionLoc { group: 2, option: 1 });
    }

    #[test]
    fn test_totals_with_tax() {
        let q = resolve(&input(vec![TankGroup {
            options: vec![
                option("A", "2", "2", "2", 2.0, 1000.0),
                option("B", "2", "2", "2", 1.0, 500.0),
            ],
        }]))
        .unwrap();
        assert_eq!(q.totals.subtotal, 2500.0);
        assert_eq!(q.totals.tax, 125.0);
        assert_eq!(q.totals.grand_total, 2625.0);
        assert!(!q.totals.discounted);
    }

    #[test]
    fn test_tax_computed_even_when_hidden() {
        let mut inp = single_tank_input();
        inp.totals = TotalsPolicy {
            show_subtotal: false,
            show_tax: false,
            show_grand_total: true,
        };
        let q = resolve(&inp).unwrap();
        assert_eq!(q.totals.tax, 500.0);
    }

    #[test]
    fn test_missing_dimensions_reported_without_error() {
        let q = resolve(&input(vec![TankGroup {
            options: vec![
                option("A", "", "", "", 1.0, 100.0),
                option("B", "2", "2", "2", 1.0, 100.0),
            ],
        }]))
        .unwrap();
        assert_eq!(q.missing.len(), 3);
        assert!(q.missing.iter().all(|m| m.group == 1 && m.option == 1));
        assert_eq!(q.groups[0].options[0].derived.volume_m3, 0.0);
        assert_eq!(q.groups[0].options[1].derived.volume_m3, 8.0);
    }

    #[test]
    fn test_require_names_rejects_blank_name() {
        let mut inp = input(vec![TankGroup {
            options: vec![option("  ", "2", "2", "2", 1.0, 100.0)],
        }]);
        inp.require_names = true;
        assert!(matches!(
            resolve(&inp),
            Err(CompositionError::Validation { field: "tank name", .. })
        ));
    }

    #[test]
    fn test_builtin_template_used_by_default() {
        let q = resolve(&single_tank_input()).unwrap();
        assert_eq!(q.template, TemplateAsset::builtin(Brand::GrpTanks));
        assert_eq!(q.display_date, "15/01/2025");
    }
}
