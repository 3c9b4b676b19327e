//! Quotation form payload and its mapping onto `QuotationInput`.
//!
//! The form is what the quotation UI posts. Mapping builds the quote number,
//! prefixes recipient fields and derives section enablement from the `terms`
//! entries. No rendering decisions are made here.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::compose::error::{CompositionError, OptionLoc};
use crate::config::Config;
use crate::models::quotation::{
    Brand, GallonUnit, QuotationHeader, QuotationInput, SectionConfig, SectionContent, SectionKey,
    Signatory, SignatureBlock, SupportSystem, TankGroup, TankOption, TotalsPolicy,
};

/// Sales code used when the sales person carries no `(CODE)` suffix.
const OFFICE_SALES_CODE: &str = "OFC";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankOptionForm {
    #[serde(default)]
    pub tank_name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub has_partition: bool,
    #[serde(default)]
    pub tank_type: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub width: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub need_free_board: Option<bool>,
    #[serde(default)]
    pub free_board_size: Option<String>,
    #[serde(default)]
    pub support_system: Option<String>,
    #[serde(default)]
    pub discounted_total_price: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankData {
    #[serde(default)]
    pub options: Vec<TankOptionForm>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermSection {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub custom: Vec<String>,
}

impl TermSection {
    fn is_yes(&self) -> bool {
        self.action.trim().eq_ignore_ascii_case("yes")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRequest {
    pub from_company: String,
    pub recipient_name: String,
    #[serde(default)]
    pub role: Option<String>,
    pub company_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub quotation_date: String,
    #[serde(default)]
    pub quotation_from: String,
    #[serde(default)]
    pub sales_person_name: Option<String>,
    pub quotation_number: String,
    pub subject: String,
    #[serde(default)]
    pub project_location: String,
    #[serde(default)]
    pub gallon_type: String,
    #[serde(default = "yes")]
    pub show_sub_total: bool,
    #[serde(default = "yes")]
    pub show_vat: bool,
    #[serde(default = "yes")]
    pub show_grand_total: bool,
    #[serde(default)]
    pub tanks: Vec<TankData>,
    #[serde(default)]
    pub terms: HashMap<String, TermSection>,
}

fn yes() -> bool {
    true
}

// ────────────────────────────────────────────────────────────────────────────
// Quote number
// ────────────────────────────────────────────────────────────────────────────

/// `YYMM` from a `DD/MM/YY` (or `DD/MM/YYYY`) date; `0000` when not three parts.
pub fn year_month(date: &str) -> String {
    let date = date.trim();
    let parsed = NaiveDate::parse_from_str(date, "%d/%m/%y")
        .ok()
        .filter(|_| date.rsplit('/').next().map(|y| y.len() == 2).unwrap_or(false))
        .or_else(|| NaiveDate::parse_from_str(date, "%d/%m/%Y").ok());
    if let Some(d) = parsed {
        return d.format("%y%m").to_string();
    }
    let parts: Vec<&str> = date.split('/').collect();
    match parts.as_slice() {
        [_, mm, yy] => format!("{yy}{mm}"),
        _ => "0000".to_string(),
    }
}

/// The code between parentheses in `"Name (VM)"`, else `OFC`.
pub fn sales_code(sales_person: Option<&str>) -> String {
    sales_person
        .and_then(|name| name.split_once('('))
        .map(|(_, rest)| rest.split(')').next().unwrap_or(rest).trim().to_string())
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| OFFICE_SALES_CODE.to_string())
}

pub fn quote_number(brand: Brand, date: &str, sales_person: Option<&str>, number: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        brand.quote_code(),
        year_month(date),
        sales_code(sales_person),
        number.trim()
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Mapping
// ────────────────────────────────────────────────────────────────────────────

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_amount(raw: &str, loc: OptionLoc, field: &'static str) -> Result<Option<f64>, CompositionError> {
    let raw = raw.trim().replace(',', "");
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(loc.invalid(field, format!("not a number: '{raw}'"))),
    }
}

fn map_option(form: &TankOptionForm, loc: OptionLoc) -> Result<TankOption, CompositionError> {
    if !form.quantity.is_finite() || form.quantity < 0.0 {
        return Err(loc.invalid("quantity", format!("must be a non-negative number, got {}", form.quantity)));
    }
    let unit_price = parse_amount(&form.unit_price, loc, "unit price")?.unwrap_or(0.0);
    let discount_total = match form.discounted_total_price.as_deref() {
        Some(raw) => parse_amount(raw, loc, "discounted total")?,
        None => None,
    };
    Ok(TankOption {
        name: form.tank_name.trim().to_string(),
        tank_type: form.tank_type.trim().to_string(),
        partitioned: form.has_partition,
        length: form.length.clone(),
        width: form.width.clone(),
        height: form.height.clone(),
        unit: form.unit.trim().to_string(),
        quantity: form.quantity,
        unit_price,
        discount_total,
        free_board_enabled: form.need_free_board.unwrap_or(false),
        free_board_cm: form.free_board_size.clone().unwrap_or_default(),
        support: form
            .support_system
            .as_deref()
            .map(SupportSystem::parse)
            .unwrap_or_default(),
    })
}

/// Form `terms` keys and the sections they switch on. `extraNote` is on when absent.
const TERM_SECTIONS: [(&str, SectionKey, bool); 8] = [
    ("note", SectionKey::Note, false),
    ("materialSpecification", SectionKey::MaterialSpec, false),
    ("warrantyExclusions", SectionKey::Warranty, false),
    ("termsConditions", SectionKey::Terms, false),
    ("extraNote", SectionKey::ExtraNote, true),
    ("supplierScope", SectionKey::SupplierScope, false),
    ("customerScope", SectionKey::CustomerScope, false),
    ("finalNote", SectionKey::FinalNote, false),
];

impl QuotationRequest {
    fn signature(&self) -> Option<SignatureBlock> {
        let title = match self.quotation_from.trim() {
            "Sales" => "Sales Executive",
            "Office" => "Manager - Projects",
            _ => return None,
        };
        let name = self
            .sales_person_name
            .as_deref()
            .map(|n| n.split('(').next().unwrap_or(n).trim().to_string())
            .unwrap_or_default();
        Some(SignatureBlock {
            left: Signatory {
                name,
                title: title.to_string(),
                ..Signatory::default()
            },
            ..SignatureBlock::default()
        })
    }

    fn header(&self, brand: Brand) -> QuotationHeader {
        let recipient_name = match non_empty(self.role.as_ref()) {
            Some(role) => format!("{} - {role}", self.recipient_name.trim()),
            None => self.recipient_name.trim().to_string(),
        };
        QuotationHeader {
            recipient_name,
            recipient_company: format!("M/S. {}", self.company_name.trim()),
            recipient_location: non_empty(self.location.as_ref()).unwrap_or_default().to_string(),
            recipient_phone: non_empty(self.phone_number.as_ref())
                .map(|p| format!("Phone: {p}"))
                .unwrap_or_default(),
            recipient_email: non_empty(self.email.as_ref())
                .map(|e| format!("Email: {e}"))
                .unwrap_or_default(),
            quote_number: quote_number(
                brand,
                &self.quotation_date,
                self.sales_person_name.as_deref(),
                &self.quotation_number,
            ),
            date: self.quotation_date.trim().to_string(),
            subject: self.subject.trim().to_string(),
            project: self.project_location.trim().to_string(),
            extra_details: Vec::new(),
            gallon_unit: GallonUnit::parse(&self.gallon_type),
        }
    }

    /// Maps the form onto the composer input.
    pub fn into_input(&self, config: &Config) -> Result<QuotationInput, CompositionError> {
        let brand = Brand::from_company_name(&self.from_company);

        let mut groups = Vec::with_capacity(self.tanks.len());
        for (gi, tank) in self.tanks.iter().enumerate() {
            let options = tank
                .options
                .iter()
                .enumerate()
                .map(|(oi, form)| {
                    map_option(
                        form,
                        OptionLoc {
                            group: gi + 1,
                            option: oi + 1,
                        },
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(TankGroup { options });
        }

        let mut enabled = vec![SectionKey::Closing, SectionKey::ThankYou];
        let mut content = BTreeMap::new();
        for (form_key, key, default_on) in TERM_SECTIONS {
            match self.terms.get(form_key) {
                Some(term) if term.is_yes() => {
                    enabled.push(key);
                    content.insert(
                        key,
                        SectionContent::Items {
                            preset: term.details.clone(),
                            custom: term.custom.clone(),
                        },
                    );
                }
                Some(_) => {}
                None if default_on => enabled.push(key),
                None => {}
            }
        }
        if let Some(block) = self.signature() {
            enabled.push(SectionKey::Signature);
            content.insert(SectionKey::Signature, SectionContent::Signature(block));
        }

        Ok(QuotationInput {
            header: self.header(brand),
            groups,
            sections: SectionConfig::with(&enabled),
            content,
            totals: TotalsPolicy {
                show_subtotal: self.show_sub_total,
                show_tax: self.show_vat,
                show_grand_total: self.show_grand_total,
            },
            brand,
            company: None,
            template: None,
            require_names: config.require_tank_names,
            currency: config.currency.clone(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod tests {
    use super::*;
    use serde_json::json;

    pub fn sample_form() -> serde_json::Value {
        json!({
            "fromCompany": "GRP PIPECO TANKS TRADING L.L.C",
            "recipientName": "Mr. Ahmed",
            "role": "Procurement",
            "companyName": "ACME CONTRACTING",
            "location": "Dubai",
            "phoneNumber": "+971 50 000 0000",
            "email": "",
            "quotationDate": "15/01/25",
            "quotationFrom": "Sales",
            "salesPersonName": "Viwin Varghese (VM)",
            "quotationNumber": "104",
            "subject": "SUPPLY OF GRP WATER TANK",
            "projectLocation": "Villa, Jumeirah",
            "gallonType": "USG",
            "showSubTotal": true,
            "showVat": true,
            "showGrandTotal": true,
            "tanks": [{
                "tankNumber": 1,
                "optionEnabled": false,
                "optionNumbers": 1,
                "options": [{
                    "tankName": "WATER TANK",
                    "quantity": 1,
                    "hasPartition": true,
                    "tankType": "PANEL TYPE",
                    "length": "4(2+2)",
                    "width": "2",
                    "height": "2",
                    "unit": "NOS",
                    "unitPrice": "10,000",
                    "needFreeBoard": false,
                    "freeBoardSize": ""
                }]
            }],
            "terms": {
                "termsConditions": {
                    "action": "yes",
                    "details": ["Payment: 50% advance", "Delivery: 2 weeks"],
                    "custom": ["Prices valid for 30 days"]
                },
                "note": { "action": "no", "details": [], "custom": [] }
            }
        })
    }

    fn request() -> QuotationRequest {
        serde_json::from_value(sample_form()).unwrap()
    }

    #[test]
    fn test_quote_number_construction() {
        assert_eq!(
            quote_number(Brand::GrpTanks, "15/01/25", Some("Viwin Varghese (VM)"), "104"),
            "GRPT/2501/VM/104"
        );
        assert_eq!(
            quote_number(Brand::Colex, "03/11/2024", None, "7"),
            "CLX/2411/OFC/7"
        );
        assert_eq!(quote_number(Brand::GrpPipeco, "soon", Some(""), "1"), "GRPPT/0000/OFC/1");
    }

    #[test]
    fn test_year_month_falls_back_to_raw_parts() {
        assert_eq!(year_month("31/02/25"), "2502");
        assert_eq!(year_month("15-01-25"), "0000");
    }

    #[test]
    fn test_sales_code() {
        assert_eq!(sales_code(Some("Name (AB)")), "AB");
        assert_eq!(sales_code(Some("Name")), "OFC");
        assert_eq!(sales_code(Some("Name ()")), "OFC");
        assert_eq!(sales_code(None), "OFC");
    }

    #[test]
    fn test_header_mapping() {
        let input = request().into_input(&Config::default()).unwrap();
        let h = &input.header;
        assert_eq!(input.brand, Brand::GrpPipeco);
        assert_eq!(h.quote_number, "GRPPT/2501/VM/104");
        assert_eq!(h.recipient_name, "Mr. Ahmed - Procurement");
        assert_eq!(h.recipient_company, "M/S. ACME CONTRACTING");
        assert_eq!(h.recipient_phone, "Phone: +971 50 000 0000");
        assert_eq!(h.recipient_email, "");
        assert_eq!(h.gallon_unit, GallonUnit::Usg);
        assert_eq!(input.currency, "AED");
    }

    #[test]
    fn test_section_enablement() {
        let input = request().into_input(&Config::default()).unwrap();
        let s = &input.sections;
        assert!(s.is_enabled(SectionKey::Terms));
        assert!(s.is_enabled(SectionKey::ExtraNote), "extra note defaults on");
        assert!(s.is_enabled(SectionKey::Closing));
        assert!(s.is_enabled(SectionKey::ThankYou));
        assert!(s.is_enabled(SectionKey::Signature));
        assert!(!s.is_enabled(SectionKey::Note));
        assert!(!s.is_enabled(SectionKey::Warranty));
        assert!(!input.content.contains_key(&SectionKey::ExtraNote));
    }

    #[test]
    fn test_signature_from_sales_person() {
        let input = request().into_input(&Config::default()).unwrap();
        match input.content.get(&SectionKey::Signature) {
            Some(SectionContent::Signature(block)) => {
                assert_eq!(block.left.name, "Viwin Varghese");
                assert_eq!(block.left.title, "Sales Executive");
                assert_eq!(block.right, Signatory::default());
            }
            other => panic!("unexpected signature content: {other:?}"),
        }
    }

    #[test]
    fn test_no_signature_for_other_sources() {
        let mut form = sample_form();
        form["quotationFrom"] = json!("Online");
        let req: QuotationRequest = serde_json::from_value(form).unwrap();
        let input = req.into_input(&Config::default()).unwrap();
        assert!(!input.sections.is_enabled(SectionKey::Signature));
    }

    #[test]
    fn test_option_mapping() {
        let input = request().into_input(&Config::default()).unwrap();
        let opt = &input.groups[0].options[0];
        assert_eq!(opt.unit_price, 10000.0);
        assert!(opt.partitioned);
        assert_eq!(opt.length, "4(2+2)");
        assert_eq!(opt.support, SupportSystem::Internal);
        assert_eq!(opt.discount_total, None);
    }

    #[test]
    fn test_bad_price_is_validation_error() {
        let mut form = sample_form();
        form["tanks"][0]["options"][0]["unitPrice"] = json!("ten");
        let req: QuotationRequest = serde_json::from_value(form).unwrap();
        match req.into_input(&Config::default()) {
            Err(CompositionError::Validation {
                group,
                option,
                field,
                ..
            }) => {
                assert_eq!((group, option, field), (1, 1, "unit price"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_discount_and_support_mapping() {
        let mut form = sample_form();
        form["tanks"][0]["options"][0]["discountedTotalPrice"] = json!("9500");
        form["tanks"][0]["options"][0]["supportSystem"] = json!("External");
        let req: QuotationRequest = serde_json::from_value(form).unwrap();
        let input = req.into_input(&Config::default()).unwrap();
        let opt = &input.groups[0].options[0];
        assert_eq!(opt.discount_total, Some(9500.0));
        assert_eq!(opt.support, SupportSystem::External);
    }

    #[test]
    fn test_require_names_flag_follows_config() {
        let config = Config {
            require_tank_names: true,
            ..Config::default()
        };
        let input = request().into_input(&config).unwrap();
        assert!(input.require_names);
    }
}
