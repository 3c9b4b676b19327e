use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::compose::document::{Align, Rgb};

// ────────────────────────────────────────────────────────────────────────────
// Brand / company
// ────────────────────────────────────────────────────────────────────────────

/// The trading company a quotation is issued under.
///
/// Resolved once when the input is built; everything brand-specific (header colour,
/// quote-number code, letterhead) hangs off this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Brand {
    GrpTanks,
    GrpPipeco,
    Colex,
}

impl Brand {
    /// Maps the company display name to a brand. Unknown names fall back to GRP Tanks.
    pub fn from_company_name(name: &str) -> Self {
        match name.trim() {
            "GRP PIPECO TANKS TRADING L.L.C" => Brand::GrpPipeco,
            "COLEX TANKS TRADING L.L.C" => Brand::Colex,
            _ => Brand::GrpTanks,
        }
    }

    pub fn company_name(&self) -> &'static str {
        match self {
            Brand::GrpTanks => "GRP TANKS TRADING L.L.C",
            Brand::GrpPipeco => "GRP PIPECO TANKS TRADING L.L.C",
            Brand::Colex => "COLEX TANKS TRADING L.L.C",
        }
    }

    /// Short product brand shown in the table summary row.
    pub fn product_brand(&self) -> &'static str {
        match self {
            Brand::Colex => "COLEX KOREA",
            Brand::GrpTanks | Brand::GrpPipeco => "PIPECO TANKS® MALAYSIA",
        }
    }

    /// Code used in the constructed quotation number.
    pub fn quote_code(&self) -> &'static str {
        match self {
            Brand::GrpTanks => "GRPT",
            Brand::GrpPipeco => "GRPPT",
            Brand::Colex => "CLX",
        }
    }

    /// Fill colour of the line-item table header row.
    pub fn header_fill(&self) -> Rgb {
        match self {
            Brand::Colex => Rgb::from_hex(0xA3B463),
            Brand::GrpTanks | Brand::GrpPipeco => Rgb::from_hex(0x5F9EA0),
        }
    }
}

/// Optional company record overriding the brand defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyOverride {
    pub full_name: Option<String>,
    pub product_brand: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tanks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GallonUnit {
    #[serde(rename = "USG")]
    Usg,
    #[serde(rename = "IMG")]
    Img,
}

impl GallonUnit {
    /// Anything other than `USG` is treated as imperial gallons.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("USG") {
            GallonUnit::Usg
        } else {
            GallonUnit::Img
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            GallonUnit::Usg => 264.172,
            GallonUnit::Img => 219.969,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GallonUnit::Usg => "USG",
            GallonUnit::Img => "IMG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportSystem {
    #[default]
    Internal,
    External,
}

impl SupportSystem {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("external") {
            SupportSystem::External
        } else {
            SupportSystem::Internal
        }
    }

    pub fn descriptor(&self) -> &'static str {
        match self {
            SupportSystem::External => "EXTERNAL REINFORCEMENT SYSTEM",
            SupportSystem::Internal => "INTERNAL SS 316 AND EXTERNAL HDG SUPPORT SYSTEM",
        }
    }
}

/// One priced variant of a tank. Dimensions stay as the caller typed them;
/// they are parsed during calculation so the raw text can still be displayed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TankOption {
    pub name: String,
    pub tank_type: String,
    pub partitioned: bool,
    pub length: String,
    pub width: String,
    pub height: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Replaces `quantity * unit_price` when present.
    pub discount_total: Option<f64>,
    pub free_board_enabled: bool,
    /// Free-board size in centimetres.
    pub free_board_cm: String,
    pub support: SupportSystem,
}

/// Options sharing one serial number in the line-item table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TankGroup {
    pub options: Vec<TankOption>,
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationHeader {
    pub recipient_name: String,
    pub recipient_company: String,
    pub recipient_location: String,
    pub recipient_phone: String,
    pub recipient_email: String,
    pub quote_number: String,
    /// `DD/MM/YY` or `DD/MM/YYYY`.
    pub date: String,
    pub subject: String,
    pub project: String,
    /// Extra key/value rows printed under Subject/Project, in order.
    pub extra_details: Vec<(String, String)>,
    pub gallon_unit: GallonUnit,
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Narrative sections, declared in their fixed document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Note,
    Closing,
    Signature,
    MaterialSpec,
    Warranty,
    Terms,
    SupplierScope,
    CustomerScope,
    ExtraNote,
    FinalNote,
    ThankYou,
}

impl SectionKey {
    pub const ORDER: [SectionKey; 11] = [
        SectionKey::Note,
        SectionKey::Closing,
        SectionKey::Signature,
        SectionKey::MaterialSpec,
        SectionKey::Warranty,
        SectionKey::Terms,
        SectionKey::SupplierScope,
        SectionKey::CustomerScope,
        SectionKey::ExtraNote,
        SectionKey::FinalNote,
        SectionKey::ThankYou,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Note => "note",
            SectionKey::Closing => "closing",
            SectionKey::Signature => "signature",
            SectionKey::MaterialSpec => "material_spec",
            SectionKey::Warranty => "warranty",
            SectionKey::Terms => "terms",
            SectionKey::SupplierScope => "supplier_scope",
            SectionKey::CustomerScope => "customer_scope",
            SectionKey::ExtraNote => "extra_note",
            SectionKey::FinalNote => "final_note",
            SectionKey::ThankYou => "thank_you",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionConfig {
    pub enabled: BTreeSet<SectionKey>,
}

impl SectionConfig {
    pub fn with(keys: &[SectionKey]) -> Self {
        Self {
            enabled: keys.iter().copied().collect(),
        }
    }

    pub fn is_enabled(&self, key: SectionKey) -> bool {
        self.enabled.contains(&key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signatory {
    pub name: String,
    pub title: String,
    pub mobile: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub left: Signatory,
    pub right: Signatory,
    /// Reference to a signature image. The composer reserves a slot for it;
    /// image bytes are never loaded here.
    pub signature_image: Option<String>,
}

/// Caller-supplied content for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionContent {
    /// Preset entries followed by custom entries. Terms entries may be `key: value`.
    Items { preset: Vec<String>, custom: Vec<String> },
    Text { text: String },
    Signature(SignatureBlock),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsPolicy {
    pub show_subtotal: bool,
    pub show_tax: bool,
    pub show_grand_total: bool,
}

impl Default for TotalsPolicy {
    fn default() -> Self {
        Self {
            show_subtotal: true,
            show_tax: true,
            show_grand_total: true,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template asset
// ────────────────────────────────────────────────────────────────────────────

/// One element of a branded page header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateElement {
    Text {
        text: String,
        size: f32,
        bold: bool,
        color: Rgb,
        align: Align,
    },
    Rule {
        color: Rgb,
        width: f32,
    },
    /// Tabular element baked into the template. Never shown on the first page.
    Table {
        cells: Vec<String>,
        border: Rgb,
    },
}

/// Read-only branding input: letterhead elements and footer lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateAsset {
    pub header: Vec<TemplateElement>,
    pub footer: Vec<String>,
}

impl TemplateAsset {
    /// Letterhead used when the caller supplies no template.
    pub fn builtin(brand: Brand) -> Self {
        let accent = match brand {
            Brand::Colex => Rgb::from_hex(0x6B7A2A),
            Brand::GrpTanks | Brand::GrpPipeco => Rgb::from_hex(0x002060),
        };
        Self {
            header: vec![
                TemplateElement::Text {
                    text: brand.company_name().to_string(),
                    size: 14.0,
                    bold: true,
                    color: accent,
                    align: Align::Left,
                },
                TemplateElement::Text {
                    text: "GRP SECTIONAL WATER TANKS".to_string(),
                    size: 8.0,
                    bold: false,
                    color: Rgb::GRAY,
                    align: Align::Left,
                },
                TemplateElement::Rule {
                    color: accent,
                    width: 1.0,
                },
            ],
            footer: vec![format!("{} | {}", brand.company_name(), brand.product_brand())],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Input root
// ────────────────────────────────────────────────────────────────────────────

/// Everything the composer needs to render one quotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationInput {
    pub header: QuotationHeader,
    pub groups: Vec<TankGroup>,
    pub sections: SectionConfig,
    pub content: BTreeMap<SectionKey, SectionContent>,
    pub totals: TotalsPolicy,
    pub brand: Brand,
    pub company: Option<CompanyOverride>,
    pub template: Option<TemplateAsset>,
    /// Reject options without a tank name.
    pub require_names: bool,
    pub currency: String,
}

impl QuotationInput {
    pub fn company_name(&self) -> String {
        self.company
            .as_ref()
            .and_then(|c| c.full_name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.brand.company_name().to_string())
    }

    pub fn product_brand(&self) -> String {
        self.company
            .as_ref()
            .and_then(|c| c.product_brand.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.brand.product_brand().to_string())
    }

    pub fn option_count(&self) -> usize {
        self.groups.iter().map(|g| g.options.len()).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
