//! Fixed-order document assembly and the single hand-off to the output adapter.
//!
//! Order: title, recipient block, subject lines, greeting, line-item table, then
//! the enabled narrative sections in `SectionKey::ORDER`.

use bytes::Bytes;
use tracing::{debug, error, info};

use crate::compose::boilerplate::{
    self, terms_key_spacing, GREETING, INTRO_PREFIX, INTRO_SUFFIX, YOURS_TRULY,
};
use crate::compose::document::{
    Align, Block, Borders, Cell, ComposedDocument, PagePlaceholder, Paragraph, ParagraphStyle,
    Rgb, Run, Table, TableRow,
};
use crate::compose::error::{CompositionError, MissingDimension};
use crate::compose::header::build_headers;
use crate::compose::resolved::{resolve, ResolvedQuotation};
use crate::compose::sections::{ResolvedSection, SectionBody};
use crate::compose::table::build_line_item_table;
use crate::layout::{render_pdf, PageConfig};
use crate::models::quotation::{QuotationInput, SectionKey, SignatureBlock, Signatory};

const BULLET: &str = "➢  ";
/// Left indent and hanging offset for bulleted section items (0.5in / 0.25in).
const BULLET_INDENT: f32 = 36.0;
const BULLET_HANG: f32 = -18.0;
const SIGNATURE_SLOT_HEIGHT: f32 = 40.0;

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderedQuotation {
    pub bytes: Bytes,
    pub page_count: u32,
    pub page_estimate: u32,
    pub missing_dimensions: Vec<MissingDimension>,
}

// ────────────────────────────────────────────────────────────────────────────
// Paragraph helpers
// ────────────────────────────────────────────────────────────────────────────

fn para(runs: Vec<Run>) -> Paragraph {
    Paragraph::of_runs(runs, ParagraphStyle::default())
}

fn heading(text: &str) -> Paragraph {
    Paragraph::of_runs(
        vec![Run::bold(text)],
        ParagraphStyle {
            space_after: 6.0,
            keep_with_next: true,
            ..ParagraphStyle::default()
        },
    )
}

fn bullet(runs: Vec<Run>) -> Paragraph {
    let mut all = Vec::with_capacity(runs.len() + 1);
    let bold = runs.first().map(|r| r.bold).unwrap_or(false);
    all.push(Run {
        bold,
        ..Run::plain(BULLET)
    });
    all.extend(runs);
    Paragraph::of_runs(
        all,
        ParagraphStyle {
            left_indent: BULLET_INDENT,
            first_line_indent: BULLET_HANG,
            ..ParagraphStyle::default()
        },
    )
}

fn bullet_list(items: &[String], bold: bool) -> Vec<Block> {
    items
        .iter()
        .map(|item| {
            let mut run = Run::plain(item.clone());
            run.bold = bold;
            Block::Paragraph(bullet(vec![run]))
        })
        .collect()
}

/// Bullet whose first occurrence of `company` is set in bold.
fn company_bullet(item: &str, company: &str) -> Paragraph {
    match item.split_once(company) {
        Some((before, after)) if !company.is_empty() => bullet(vec![
            Run::plain(before),
            Run::bold(company),
            Run::plain(after),
        ]),
        _ => bullet(vec![Run::plain(item)]),
    }
}

fn items_of(body: &SectionBody) -> &[String] {
    match body {
        SectionBody::Items { items } => items.as_slice(),
        SectionBody::Terms { plain, .. } => plain.as_slice(),
        _ => &[],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Assembler
// ────────────────────────────────────────────────────────────────────────────

/// Stateless: holds only the page geometry it renders onto.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    page: PageConfig,
}

impl DocumentAssembler {
    pub fn new(page: PageConfig) -> Self {
        Self { page }
    }

    /// Builds the format-neutral document.
    pub fn compose(&self, q: &ResolvedQuotation) -> ComposedDocument {
        let headers = build_headers(q, self.page.content_width_in());
        let mut body = Vec::new();

        self.push_opening(q, &mut body);
        body.push(Block::Table(build_line_item_table(q).table));
        for section in &q.sections {
            body.extend(self.section_blocks(q, section));
        }

        ComposedDocument {
            title: format!("Quotation {}", q.header.quote_number),
            first_header: headers.first,
            continuation_header: headers.continuation,
            footer: headers.footer,
            body,
        }
    }

    /// Composes and hands the document to the PDF adapter.
    pub fn render(&self, q: &ResolvedQuotation) -> Result<RenderedQuotation, CompositionError> {
        let doc = self.compose(q);
        debug!(blocks = doc.body.len(), "document composed");

        let output = render_pdf(&doc, &self.page).map_err(|e| {
            error!(error = %e, "pdf adapter failed");
            CompositionError::Failure(e.to_string())
        })?;

        info!(
            pages = output.page_count,
            estimate = q.page_estimate,
            bytes = output.bytes.len(),
            "quotation rendered"
        );

        Ok(RenderedQuotation {
            bytes: Bytes::from(output.bytes),
            page_count: output.page_count,
            page_estimate: q.page_estimate,
            missing_dimensions: q.missing.clone(),
        })
    }

    fn push_opening(&self, q: &ResolvedQuotation, body: &mut Vec<Block>) {
        let h = &q.header;

        body.push(Block::Paragraph(Paragraph::of_runs(
            vec![Run::bold("QUOTATION").italic().underlined().colored(Rgb::NAVY)],
            ParagraphStyle {
                font_size: 14.0,
                align: Align::Center,
                space_after: 6.0,
                ..ParagraphStyle::default()
            },
        )));
        body.push(Block::Paragraph(para(vec![Run::bold("To.")])));

        let recipient: Vec<Paragraph> = [
            &h.recipient_name,
            &h.recipient_company,
            &h.recipient_location,
            &h.recipient_phone,
            &h.recipient_email,
        ]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| para(vec![Run::bold(s.trim())]))
        .collect();

        let meta = vec![
            para(vec![Run::bold("Date : "), Run::bold(q.display_date.clone())]),
            para(vec![Run::bold("Page : ")])
                .field(PagePlaceholder::CurrentPage, true, None)
                .run(Run::bold("/"))
                .field(PagePlaceholder::TotalPages, true, None),
            para(vec![Run::bold("Quote No. : "), Run::bold(h.quote_number.clone())]),
        ];

        let mut block = Table::new(vec![5.0, 2.5], Borders::None);
        block.cell_padding = 1.0;
        block.rows.push(TableRow {
            cells: vec![Cell::new(0, recipient), Cell::new(1, meta)],
        });
        body.push(Block::Table(block));
        body.push(Block::Spacer(6.0));

        let labelled = |label: String, value: &str| {
            Block::Paragraph(para(vec![
                Run::bold(label),
                Run::bold(value.trim()).underlined(),
            ]))
        };
        body.push(labelled("Subject : ".to_string(), h.subject.as_str()));
        if !h.project.trim().is_empty() {
            body.push(labelled("Project : ".to_string(), h.project.as_str()));
        }
        for (key, value) in &h.extra_details {
            body.push(labelled(format!("{key:<18}: "), value.as_str()));
        }

        body.push(Block::Spacer(6.0));
        body.push(Block::Paragraph(para(vec![Run::plain(GREETING)])));
        body.push(Block::Paragraph(Paragraph::of_runs(
            vec![
                Run::plain(INTRO_PREFIX),
                Run::bold(h.subject.trim()),
                Run::plain(INTRO_SUFFIX),
            ],
            ParagraphStyle {
                space_after: 6.0,
                ..ParagraphStyle::default()
            },
        )));
    }

    fn section_blocks(&self, q: &ResolvedQuotation, section: &ResolvedSection) -> Vec<Block> {
        let mut out = Vec::new();
        let body = &section.body;
        match section.key {
            SectionKey::Note => {
                out.push(Block::Spacer(6.0));
                out.push(Block::Paragraph(heading(boilerplate::NOTE_HEADING)));
                for (i, note) in items_of(body).iter().enumerate() {
                    out.push(Block::Paragraph(Paragraph::of_runs(
                        vec![Run::bold(format!("{}. {}", i + 1, note.trim()))],
                        ParagraphStyle {
                            font_size: 9.0,
                            ..ParagraphStyle::default()
                        },
                    )));
                }
            }
            SectionKey::Closing | SectionKey::ThankYou => {
                if let SectionBody::Text { text } = body {
                    out.extend(text_section(section.key, text));
                }
            }
            SectionKey::Signature => {
                if let SectionBody::Signature(block) = body {
                    out.extend(signature_blocks(&q.company_name, block));
                }
            }
            SectionKey::MaterialSpec => {
                out.push(Block::Spacer(12.0));
                out.push(Block::Paragraph(heading(boilerplate::MATERIAL_SPEC_HEADING)));
                out.extend(bullet_list(items_of(body), true));
            }
            SectionKey::Warranty => {
                out.push(Block::Spacer(12.0));
                out.push(Block::Paragraph(heading(boilerplate::WARRANTY_HEADING)));
                out.extend(bullet_list(items_of(body), false));
            }
            SectionKey::Terms => {
                out.push(Block::Spacer(12.0));
                out.push(Block::Paragraph(heading(boilerplate::TERMS_HEADING)));
                if let SectionBody::Terms { pairs, .. } = body {
                    for (key, value) in pairs {
                        let line = format!("{key}{}: {value}", terms_key_spacing(key));
                        out.push(Block::Paragraph(bullet(vec![Run::plain(line)])));
                    }
                }
                out.extend(bullet_list(items_of(body), false));
            }
            SectionKey::SupplierScope => {
                out.push(Block::Spacer(12.0));
                out.push(Block::Paragraph(heading(boilerplate::SUPPLIER_SCOPE_HEADING)));
                out.extend(bullet_list(items_of(body), false));
            }
            SectionKey::CustomerScope => {
                out.push(Block::Spacer(12.0));
                out.push(Block::Paragraph(heading(boilerplate::CUSTOMER_SCOPE_HEADING)));
                out.extend(bullet_list(items_of(body), false));
            }
            SectionKey::ExtraNote => {
                out.push(Block::Spacer(12.0));
                out.push(Block::Paragraph(heading(boilerplate::NOTE_HEADING)));
                for item in items_of(body) {
                    out.push(Block::Paragraph(company_bullet(item, &q.company_name)));
                }
            }
            SectionKey::FinalNote => {
                out.push(Block::Spacer(12.0));
                out.push(Block::Paragraph(heading(boilerplate::FINAL_NOTE_HEADING)));
                for item in items_of(body) {
                    out.push(Block::Paragraph(company_bullet(item, &q.company_name)));
                }
            }
        }
        out
    }
}

fn text_section(key: SectionKey, text: &str) -> Vec<Block> {
    if key == SectionKey::ThankYou {
        return vec![Block::Paragraph(Paragraph::of_runs(
            vec![Run::bold(text).colored(Rgb::NAVY)],
            ParagraphStyle {
                font_size: 12.0,
                align: Align::Center,
                space_before: 24.0,
                ..ParagraphStyle::default()
            },
        ))];
    }
    vec![
        Block::Spacer(6.0),
        Block::Paragraph(para(vec![Run::plain(text)])),
    ]
}

fn signatory_cell(col: usize, s: &Signatory) -> Cell {
    let mut content = Vec::new();
    if !s.name.is_empty() {
        content.push(para(vec![Run::bold(s.name.clone())]));
    }
    if !s.title.is_empty() {
        content.push(para(vec![Run::bold(s.title.clone())]));
    }
    if !s.mobile.is_empty() {
        content.push(para(vec![Run::bold(format!("MOB: {}", s.mobile))]));
    }
    if !s.email.is_empty() {
        content.push(para(vec![
            Run::bold("EMAIL: "),
            Run::plain(s.email.clone()).underlined().colored(Rgb::LINK_BLUE),
        ]));
    }
    Cell::new(col, content)
}

fn signature_blocks(company: &str, block: &SignatureBlock) -> Vec<Block> {
    let keep = ParagraphStyle {
        keep_with_next: true,
        ..ParagraphStyle::default()
    };
    let mut out = vec![
        Block::Spacer(12.0),
        Block::Paragraph(Paragraph::of_runs(vec![Run::plain(YOURS_TRULY)], keep.clone())),
        Block::Paragraph(Paragraph::of_runs(
            vec![Run::bold(format!("For {company}")).italic()],
            keep.clone(),
        )),
    ];
    match block.signature_image.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(reference) => out.push(Block::ImageSlot {
            height: SIGNATURE_SLOT_HEIGHT,
            reference: reference.to_string(),
        }),
        None => {
            for _ in 0..3 {
                out.push(Block::Paragraph(Paragraph::new(keep.clone())));
            }
        }
    }

    let mut table = Table::new(vec![5.0, 2.5], Borders::None);
    table.cell_padding = 1.0;
    table.rows.push(TableRow {
        cells: vec![signatory_cell(0, &block.left), signatory_cell(1, &block.right)],
    });
    out.push(Block::Table(table));
    out
}

/// Resolves and renders in one call.
pub fn render_quotation(
    input: &QuotationInput,
    page: &PageConfig,
) -> Result<RenderedQuotation, CompositionError> {
    let resolved = resolve(input)?;
    DocumentAssembler::new(page.clone()).render(&resolved)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::resolved::fixtures::*;
    use crate::layout::default_page_config;
    use crate::models::quotation::{CompanyOverride, SectionConfig, SectionContent, TankGroup};

    fn all_text(doc: &ComposedDocument) -> String {
        let mut out = String::new();
        fn walk(block: &Block, out: &mut String) {
            match block {
                Block::Paragraph(p) => {
                    out.push_str(&p.plain_text());
                    out.push('\n');
                }
                Block::Table(t) => {
                    for row in &t.rows {
                        for cell in &row.cells {
                            for p in &cell.content {
                                out.push_str(&p.plain_text());
                                out.push('\n');
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        for b in &doc.body {
            walk(b, &mut out);
        }
        out
    }

    fn assembler() -> DocumentAssembler {
        DocumentAssembler::new(default_page_config())
    }

    #[test]
    fn test_opening_order() {
        let q = resolve(&single_tank_input()).unwrap();
        let doc = assembler().compose(&q);
        let text = all_text(&doc);
        let title = text.find("QUOTATION").unwrap();
        let to = text.find("To.").unwrap();
        let subject = text.find("Subject : ").unwrap();
        let greeting = text.find("Dear Sir,").unwrap();
        let table = text.find("ITEM DESCRIPTION").unwrap();
        assert!(title < to && to < subject && subject < greeting && greeting < table);
        assert!(text.contains("Date : 15/01/2025"));
        assert!(text.contains("Page : {page}/{pages}"));
        assert!(text.contains("offer for SUPPLY OF GRP WATER TANK as follows"));
    }

    #[test]
    fn test_sections_follow_fixed_order_regardless_of_input() {
        let mut inp = single_tank_input();
        inp.sections = SectionConfig::with(&[
            SectionKey::ThankYou,
            SectionKey::CustomerScope,
            SectionKey::Terms,
            SectionKey::Note,
        ]);
        let q = resolve(&inp).unwrap();
        let text = all_text(&assembler().compose(&q));
        let note = text.find("NOTE:").unwrap();
        let terms = text.find("TERMS AND CONDITIONS: -").unwrap();
        let customer = text.find("CUSTOMER SCOPE: -").unwrap();
        let thanks = text.find("THANK YOU FOR YOUR BUSINESS").unwrap();
        assert!(note < terms && terms < customer && customer < thanks);
    }

    #[test]
    fn test_terms_lines_use_key_spacing() {
        let mut inp = single_tank_input();
        inp.sections = SectionConfig::with(&[SectionKey::Terms]);
        inp.content.insert(
            SectionKey::Terms,
            SectionContent::Items {
                preset: vec!["Price: Fixed".into()],
                custom: vec!["No negotiation".into()],
            },
        );
        let q = resolve(&inp).unwrap();
        let text = all_text(&assembler().compose(&q));
        assert!(text.contains("➢  Price         : Fixed"));
        assert!(text.contains("➢  No negotiation"));
    }

    #[test]
    fn test_extra_note_bolds_company() {
        let mut inp = single_tank_input();
        inp.sections = SectionConfig::with(&[SectionKey::ExtraNote]);
        let q = resolve(&inp).unwrap();
        let doc = assembler().compose(&q);
        let bolded = doc.body.iter().any(|b| match b {
            Block::Paragraph(p) => p.inlines.iter().any(|i| {
                matches!(i, crate::compose::document::Inline::Text(r)
                    if r.bold && r.text == "GRP TANKS TRADING L.L.C")
            }),
            _ => false,
        });
        assert!(bolded);
    }

    #[test]
    fn test_signature_reserves_image_slot() {
        let mut inp = single_tank_input();
        inp.sections = SectionConfig::with(&[SectionKey::Signature]);
        inp.content.insert(
            SectionKey::Signature,
            SectionContent::Signature(SignatureBlock {
                left: Signatory {
                    name: "John Mathew".into(),
                    title: "Sales Executive".into(),
                    mobile: "050 123 4567".into(),
                    email: "john@example.com".into(),
                },
                right: Signatory::default(),
                signature_image: Some("signatures/john.png".into()),
            }),
        );
        let q = resolve(&inp).unwrap();
        let doc = assembler().compose(&q);
        assert!(doc
            .body
            .iter()
            .any(|b| matches!(b, Block::ImageSlot { reference, .. } if reference == "signatures/john.png")));
        let text = all_text(&doc);
        assert!(text.contains("For GRP TANKS TRADING L.L.C"));
        assert!(text.contains("MOB: 050 123 4567"));
        assert!(text.contains("EMAIL: john@example.com"));
    }

    #[test]
    fn test_company_override_flows_into_note_signature_and_summary() {
        let mut inp = single_tank_input();
        inp.company = Some(CompanyOverride {
            full_name: Some("AL NOOR WATER SYSTEMS L.L.C".into()),
            product_brand: Some("NOOR TANKS UAE".into()),
        });
        inp.sections = SectionConfig::with(&[SectionKey::ExtraNote, SectionKey::Signature]);
        inp.content.insert(
            SectionKey::Signature,
            SectionContent::Signature(SignatureBlock {
                left: Signatory {
                    name: "John Mathew".into(),
                    title: "Sales Executive".into(),
                    ..Signatory::default()
                },
                ..SignatureBlock::default()
            }),
        );
        let q = resolve(&inp).unwrap();
        let doc = assembler().compose(&q);
        let text = all_text(&doc);

        assert!(text.contains(
            "Until receiving the final settlement from the client, AL NOOR WATER SYSTEMS L.L.C has reserved"
        ));
        assert!(text.contains("For AL NOOR WATER SYSTEMS L.L.C"));
        assert!(text.contains("NOOR TANKS UAE"));
        assert!(!text.contains("GRP TANKS TRADING L.L.C"));
        assert!(!text.contains("PIPECO TANKS® MALAYSIA"));

        let bolded = doc.body.iter().any(|b| match b {
            Block::Paragraph(p) => p.inlines.iter().any(|i| {
                matches!(i, crate::compose::document::Inline::Text(r)
                    if r.bold && r.text == "AL NOOR WATER SYSTEMS L.L.C")
            }),
            _ => false,
        });
        assert!(bolded);
    }

    #[test]
    fn test_render_produces_pdf() {
        let rendered = render_quotation(&single_tank_input(), &default_page_config()).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF-"));
        assert!(rendered.page_count >= 1);
        assert_eq!(rendered.page_estimate, 1);
        assert!(rendered.missing_dimensions.is_empty());
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render_quotation(&single_tank_input(), &default_page_config()).unwrap();
        let b = render_quotation(&single_tank_input(), &default_page_config()).unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn test_render_reports_missing_dimension_and_continues() {
        let inp = input(vec![TankGroup {
            options: vec![
                option("A", "", "", "", 1.0, 100.0),
                option("B", "2", "2", "2", 1.0, 100.0),
            ],
        }]);
        let rendered = render_quotation(&inp, &default_page_config()).unwrap();
        assert_eq!(rendered.missing_dimensions.len(), 3);
    }

    #[test]
    fn test_render_extracted_text() {
        let mut inp = single_tank_input();
        inp.sections = SectionConfig::with(&[SectionKey::Terms, SectionKey::ThankYou]);
        let rendered = render_quotation(&inp, &default_page_config()).unwrap();
        let text = pdf_extract::extract_text_from_mem(&rendered.bytes).unwrap();
        assert!(text.contains("QUOTATION"));
        assert!(text.contains("TERMS"));
        assert!(text.contains("BUSINESS"));
    }

    #[test]
    fn test_multi_page_render_resolves_page_fields() {
        let groups = (0..9)
            .map(|i| TankGroup {
                options: vec![option(&format!("TANK {i}"), "4", "3", "2", 1.0, 5000.0)],
            })
            .collect();
        let rendered = render_quotation(&input(groups), &default_page_config()).unwrap();
        assert!(rendered.page_count >= 2);
        assert_eq!(rendered.page_estimate, 3);

        let text = pdf_extract::extract_text_from_mem(&rendered.bytes).unwrap();
        let compact: String = text.split_whitespace().collect();
        let total = rendered.page_count;
        assert!(compact.contains(&format!("Page:1/{total}")), "first page indicator");
        assert!(compact.contains(&format!("PAGENO:2/{total}")), "continuation indicator");
        assert!(compact.contains("QUOTENO:"));
    }
}
