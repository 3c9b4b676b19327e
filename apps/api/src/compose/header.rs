//! First-page and continuation page headers.
//!
//! The first page carries only template branding: any tabular element from the
//! template is stripped. Continuation pages add the bordered quote box with a
//! live `PAGE NO` field.

use serde::Serialize;

use crate::compose::document::{
    Align, Block, Borders, Cell, PageFurniture, PagePlaceholder, Paragraph, ParagraphStyle, Rgb,
    Run, Table, TableRow, VAlign,
};
use crate::compose::resolved::ResolvedQuotation;
use crate::models::quotation::{TemplateAsset, TemplateElement};

/// Options laid out per page when estimating the page count.
pub const OPTIONS_PER_PAGE: usize = 3;

/// Best-effort page count used before real pagination is known.
pub fn estimate_pages(option_count: usize) -> u32 {
    option_count.div_ceil(OPTIONS_PER_PAGE).max(1) as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Quote box sizing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxMetrics {
    pub chars_per_unit: f32,
    pub min_width: f32,
    pub available: f32,
}

impl BoxMetrics {
    /// 9 characters per inch, 1.5 inch minimum per field.
    pub fn inches(available_in: f32) -> Self {
        Self {
            chars_per_unit: 9.0,
            min_width: 1.5,
            available: available_in,
        }
    }
}

/// Field widths proportional to their text, scaled to exactly fill `available`.
///
/// Each field wants `max(min_width, chars / chars_per_unit)`. If the wants overflow
/// they shrink proportionally; otherwise the slack is handed out proportionally.
pub fn size_fields(texts: &[&str], metrics: BoxMetrics) -> Vec<f32> {
    let wants: Vec<f32> = texts
        .iter()
        .map(|t| (t.chars().count() as f32 / metrics.chars_per_unit).max(metrics.min_width))
        .collect();
    let total: f32 = wants.iter().sum();
    if total <= 0.0 {
        return wants;
    }
    if total > metrics.available {
        let scale = metrics.available / total;
        wants.iter().map(|w| w * scale).collect()
    } else {
        let extra = metrics.available - total;
        wants.iter().map(|w| w + extra * (w / total)).collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Headers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PageHeaders {
    pub first: PageFurniture,
    pub continuation: PageFurniture,
    pub footer: PageFurniture,
}

fn template_block(element: &TemplateElement) -> Block {
    match element {
        TemplateElement::Text {
            text,
            size,
            bold,
            color,
            align,
        } => {
            let mut run = Run::plain(text.clone()).colored(*color);
            run.bold = *bold;
            Block::Paragraph(Paragraph::of_runs(
                vec![run],
                ParagraphStyle {
                    font_size: *size,
                    align: *align,
                    ..ParagraphStyle::default()
                },
            ))
        }
        TemplateElement::Rule { color, width } => Block::Rule {
            color: *color,
            width: *width,
        },
        TemplateElement::Table { cells, border } => {
            let mut table = Table::new(
                vec![1.0; cells.len().max(1)],
                Borders::Single {
                    color: *border,
                    width: 0.75,
                },
            );
            table.rows.push(TableRow {
                cells: cells
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        Cell::new(
                            i,
                            vec![Paragraph::of_runs(
                                vec![Run::plain(text.clone())],
                                ParagraphStyle::default(),
                            )],
                        )
                    })
                    .collect(),
            });
            Block::Table(table)
        }
    }
}

/// First-page header: branding only, tables removed.
pub fn first_page_header(template: &TemplateAsset) -> PageFurniture {
    PageFurniture {
        blocks: template
            .header
            .iter()
            .filter(|e| !matches!(e, TemplateElement::Table { .. }))
            .map(template_block)
            .collect(),
    }
}

fn box_paragraph(label: &str, value: Option<&str>) -> Paragraph {
    let style = ParagraphStyle {
        align: Align::Center,
        ..ParagraphStyle::default()
    };
    let mut p = Paragraph::new(style).run(Run::bold(label));
    if let Some(v) = value {
        p = p.run(Run::bold(v));
    }
    p
}

/// The bordered QUOTE NO / DATE / PAGE NO strip.
pub fn quote_box(quote_number: &str, date: &str, page_estimate: u32, available_in: f32) -> Table {
    let quote_text = format!("QUOTE NO : {quote_number}");
    let date_text = format!("DATE : {date}");
    // Reserve room for the page field using the estimate.
    let page_text = format!("PAGE NO : {page_estimate}/{page_estimate}");
    let widths = size_fields(
        &[&quote_text, &date_text, &page_text],
        BoxMetrics::inches(available_in),
    );

    let page_paragraph = box_paragraph("PAGE NO : ", None)
        .field(PagePlaceholder::CurrentPage, true, Some(Rgb::SKY_BLUE))
        .run(Run::bold("/").colored(Rgb::SKY_BLUE))
        .field(PagePlaceholder::TotalPages, true, Some(Rgb::SKY_BLUE));

    let mut table = Table::new(
        widths,
        Borders::Single {
            color: Rgb::SKY_BLUE,
            width: 1.0,
        },
    );
    table.rows.push(TableRow {
        cells: vec![
            Cell::new(0, vec![box_paragraph("QUOTE NO : ", Some(quote_number))]).v_align(VAlign::Center),
            Cell::new(1, vec![box_paragraph("DATE : ", Some(date))]).v_align(VAlign::Center),
            Cell::new(2, vec![page_paragraph]).v_align(VAlign::Center),
        ],
    });
    table
}

/// Continuation header: full template plus the quote box.
pub fn continuation_header(q: &ResolvedQuotation, available_in: f32) -> PageFurniture {
    let mut blocks: Vec<Block> = q.template.header.iter().map(template_block).collect();
    blocks.push(Block::Spacer(4.0));
    blocks.push(Block::Table(quote_box(
        &q.header.quote_number,
        &q.display_date,
        q.page_estimate,
        available_in,
    )));
    blocks.push(Block::Spacer(6.0));
    PageFurniture { blocks }
}

pub fn footer(template: &TemplateAsset) -> PageFurniture {
    PageFurniture {
        blocks: template
            .footer
            .iter()
            .map(|line| {
                Block::Paragraph(Paragraph::of_runs(
                    vec![Run::plain(line.clone()).colored(Rgb::GRAY)],
                    ParagraphStyle {
                        font_size: 7.0,
                        align: Align::Center,
                        ..ParagraphStyle::default()
                    },
                ))
            })
            .collect(),
    }
}

/// Builds all page furniture once per document.
pub fn build_headers(q: &ResolvedQuotation, available_in: f32) -> PageHeaders {
    PageHeaders {
        first: first_page_header(&q.template),
        continuation: continuation_header(q, available_in),
        footer: footer(&q.template),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::document::Inline;
    use crate::compose::resolved::{fixtures, resolve};

    #[test]
    fn test_estimate_pages() {
        assert_eq!(estimate_pages(0), 1);
        assert_eq!(estimate_pages(1), 1);
        assert_eq!(estimate_pages(3), 1);
        assert_eq!(estimate_pages(4), 2);
        assert_eq!(estimate_pages(7), 3);
    }

    #[test]
    fn test_size_fields_distributes_slack() {
        let widths = size_fields(&["a", "b", "c"], BoxMetrics::inches(7.5));
        assert_eq!(widths.len(), 3);
        for w in &widths {
            assert!((w - 2.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_size_fields_proportional_to_text() {
        let long = "x".repeat(27); // 3.0 in
        let widths = size_fields(&[long.as_str(), "b"], BoxMetrics::inches(6.0));
        // wants 3.0 + 1.5 = 4.5, slack 1.5 split 2:1
        assert!((widths[0] - 4.0).abs() < 1e-5);
        assert!((widths[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_size_fields_scales_down_on_overflow() {
        let long = "x".repeat(54); // 6.0 in
        let widths = size_fields(&[long.as_str(), long.as_str()], BoxMetrics::inches(7.5));
        let sum: f32 = widths.iter().sum();
        assert!((sum - 7.5).abs() < 1e-4);
        assert!((widths[0] - widths[1]).abs() < 1e-6);
    }

    #[test]
    fn test_first_page_header_strips_tables() {
        let mut template = TemplateAsset::builtin(crate::models::quotation::Brand::GrpTanks);
        template.header.push(TemplateElement::Table {
            cells: vec!["QUOTE".into()],
            border: Rgb::BLACK,
        });
        let first = first_page_header(&template);
        assert!(!first.blocks.iter().any(|b| matches!(b, Block::Table(_))));
        assert_eq!(first.blocks.len(), template.header.len() - 1);
    }

    #[test]
    fn test_continuation_header_has_live_page_fields() {
        let q = resolve(&fixtures::single_tank_input()).unwrap();
        let header = continuation_header(&q, 7.5);
        let table = header
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .expect("quote box present");
        let page_cell = table.find_cell(0, 2).unwrap();
        let fields: Vec<PagePlaceholder> = page_cell.content[0]
            .inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Field { placeholder, .. } => Some(*placeholder),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![PagePlaceholder::CurrentPage, PagePlaceholder::TotalPages]
        );
        let sum: f32 = table.columns.iter().sum();
        assert!((sum - 7.5).abs() < 1e-4);
    }
}
