//! Line-item table: header, summary, one row per option, totals footer.
//!
//! Produces a logical `Table` with explicit row/column spans. Which rows exist
//! and how cells merge is decided here; drawing is the adapter's job.

use serde::Serialize;

use crate::compose::boilerplate::SUMMARY_PREFIX;
use crate::compose::document::{
    Align, Borders, Cell, Edges, Paragraph, ParagraphStyle, Rgb, Run, Table, TableRow, VAlign,
};
use crate::compose::labels::{format_money, format_quantity, format_whole};
use crate::compose::resolved::{ResolvedOption, ResolvedQuotation};

/// Relative column widths: SL, description, unit, qty, unit price, total.
pub const COLUMN_WEIGHTS: [f32; 6] = [0.6, 9.625, 1.1, 1.0, 1.4, 1.4];

const COL_SL: usize = 0;
const COL_DESC: usize = 1;
const COL_UNIT: usize = 2;
const COL_QTY: usize = 3;
const COL_PRICE: usize = 4;
const COL_TOTAL: usize = 5;

const TABLE_FONT: f32 = 9.0;
/// Tab stops for `LABEL : value` lines in the description column (1.05in, 1.25in).
const DESC_TAB_STOPS: [f32; 2] = [75.6, 90.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterKind {
    Subtotal,
    Tax,
    GrandTotal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowKind {
    Header,
    Summary,
    Option { sl_no: usize, option: usize },
    Footer { footer: FooterKind },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItemTable {
    pub kinds: Vec<RowKind>,
    pub table: Table,
}

#[cfg(test)]
impl LineItemTable {
    pub fn footer_rows(&self) -> usize {
        self.kinds
            .iter()
            .filter(|k| matches!(k, RowKind::Footer { .. }))
            .count()
    }

    pub fn first_footer_row(&self) -> Option<usize> {
        self.kinds
            .iter()
            .position(|k| matches!(k, RowKind::Footer { .. }))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cell helpers
// ────────────────────────────────────────────────────────────────────────────

fn style(align: Align) -> ParagraphStyle {
    ParagraphStyle {
        font_size: TABLE_FONT,
        align,
        ..ParagraphStyle::default()
    }
}

fn text_cell(col: usize, run: Run, align: Align) -> Cell {
    Cell::new(col, vec![Paragraph::of_runs(vec![run], style(align))])
}

/// Bold `LABEL <tab> : <tab> value` with a hanging indent at the second stop.
fn labelled_line(label: &str, value: String) -> Paragraph {
    Paragraph::new(ParagraphStyle {
        tab_stops: DESC_TAB_STOPS.to_vec(),
        left_indent: DESC_TAB_STOPS[1],
        first_line_indent: -DESC_TAB_STOPS[1],
        ..style(Align::Left)
    })
    .run(Run::bold(label))
    .tab()
    .run(Run::bold(":"))
    .tab()
    .run(Run::bold(value))
}

// ────────────────────────────────────────────────────────────────────────────
// Rows
// ────────────────────────────────────────────────────────────────────────────

fn header_row(q: &ResolvedQuotation) -> TableRow {
    let total_caption = if q.totals.discounted {
        format!("DISCOUNTED TOTAL PRICE\n({})", q.currency)
    } else {
        format!("TOTAL PRICE\n({})", q.currency)
    };
    let captions = [
        "SL.\nNO.".to_string(),
        "ITEM DESCRIPTION".to_string(),
        "UNIT".to_string(),
        "QTY".to_string(),
        format!("UNIT PRICE\n({})", q.currency),
        total_caption,
    ];
    let fill = q.brand.header_fill();
    TableRow {
        cells: captions
            .into_iter()
            .enumerate()
            .map(|(col, caption)| {
                text_cell(col, Run::bold(caption), Align::Center)
                    .fill(fill)
                    .v_align(VAlign::Bottom)
            })
            .collect(),
    }
}

fn summary_row(q: &ResolvedQuotation) -> TableRow {
    let mut text = format!("{SUMMARY_PREFIX} - {}", q.product_brand);
    if let Some(support) = q.common.support {
        text.push_str(" - ");
        text.push_str(support.descriptor());
    }
    if let Some(tank_type) = q.common.tank_type.as_deref().filter(|t| !t.is_empty()) {
        text.push('\n');
        text.push_str(tank_type);
    }
    if let Some(skid) = &q.common.skid {
        text.push('\n');
        text.push_str(skid);
    }
    TableRow {
        cells: vec![text_cell(COL_SL, Run::bold(text), Align::Center).span(COLUMN_WEIGHTS.len(), 1)],
    }
}

/// Description column paragraphs for one option.
pub fn option_description(q: &ResolvedQuotation, opt: &ResolvedOption, group_size: usize) -> Vec<Paragraph> {
    let mut out = Vec::new();
    let support_mixed = q.common.support.is_none();
    let support = opt.option.support.descriptor();

    if group_size > 1 {
        let mut label = format!("OPTION {}", opt.roman);
        if support_mixed {
            label.push_str(" - ");
            label.push_str(support);
        }
        out.push(Paragraph::of_runs(vec![Run::bold(label).underlined()], style(Align::Left)));
    } else if support_mixed {
        out.push(Paragraph::of_runs(vec![Run::bold(support)], style(Align::Left)));
    }

    let skid = opt.derived.skid.label();
    let show_skid = q.common.skid.is_none() && !skid.is_empty();
    let name = opt.option.name.trim();
    let mut title = String::new();
    if !name.is_empty() {
        title.push_str(name);
        if opt.option.partitioned {
            title.push_str(" (WITH PARTITION)");
        }
        if show_skid {
            title.push_str(&format!(" ({skid})"));
        }
    } else if show_skid {
        title.push_str(skid);
    }
    if !title.is_empty() {
        out.push(Paragraph::of_runs(vec![Run::bold(title).underlined()], style(Align::Left)));
    }

    if q.common.tank_type.is_none() && !opt.option.tank_type.trim().is_empty() {
        out.push(labelled_line("Type", opt.option.tank_type.trim().to_string()));
    }

    let (length, width, height) = (
        opt.option.length.trim(),
        opt.option.width.trim(),
        opt.option.height.trim(),
    );
    if [length, width, height].iter().any(|d| !d.is_empty()) {
        out.push(labelled_line(
            "SIZE",
            format!("{length} M (L) X {width} M (W) X {height} M (H)"),
        ));
    }

    let d = &opt.derived;
    if d.volume_m3 > 0.0 {
        let unit = q.header.gallon_unit.label();
        out.push(labelled_line(
            "TOTAL CAPACITY",
            format!("{:.2} M³ ({} {unit})", d.volume_m3, format_whole(d.capacity_gallons)),
        ));
        if opt.option.free_board_enabled {
            out.push(labelled_line(
                "NET VOLUME",
                format!("{:.2} M³ ({} {unit})", d.net_volume_m3, format_whole(d.net_gallons)),
            ));
            out.push(labelled_line(
                "FREE BOARD",
                format!("{:.0} cm ({:.2} M)", d.free_board_m * 100.0, d.free_board_m),
            ));
        }
    }
    out
}

fn option_row(q: &ResolvedQuotation, opt: &ResolvedOption, sl_no: usize, group_size: usize) -> TableRow {
    let mut cells = Vec::with_capacity(6);
    // SL spans the whole group; later options leave the slot covered.
    if opt.loc.option == 1 {
        cells.push(
            text_cell(COL_SL, Run::plain(sl_no.to_string()), Align::Center)
                .span(1, group_size)
                .v_align(VAlign::Center),
        );
    }
    cells.push(Cell::new(COL_DESC, option_description(q, opt, group_size)));
    cells.push(text_cell(COL_UNIT, Run::plain(opt.option.unit.clone()), Align::Center).v_align(VAlign::Center));
    cells.push(
        text_cell(COL_QTY, Run::plain(format_quantity(opt.option.quantity)), Align::Center)
            .v_align(VAlign::Center),
    );
    cells.push(
        text_cell(COL_PRICE, Run::plain(format_money(opt.option.unit_price)), Align::Right)
            .v_align(VAlign::Center),
    );
    cells.push(
        text_cell(COL_TOTAL, Run::bold(format_money(opt.derived.line_total)), Align::Right)
            .v_align(VAlign::Center),
    );
    TableRow { cells }
}

/// Enabled footer rows, in display order.
pub fn footer_plan(q: &ResolvedQuotation) -> Vec<(FooterKind, String, String)> {
    let policy = q.totals_policy;
    let mut rows = Vec::new();
    if policy.show_subtotal {
        let label = if q.totals.discounted {
            "DISCOUNTED SUB TOTAL:"
        } else {
            "SUB TOTAL:"
        };
        rows.push((FooterKind::Subtotal, label.to_string(), format_money(q.totals.subtotal)));
    }
    if policy.show_tax {
        rows.push((FooterKind::Tax, "VAT 5%:".to_string(), format_money(q.totals.tax)));
    }
    if policy.show_grand_total {
        rows.push((
            FooterKind::GrandTotal,
            "GRAND TOTAL:".to_string(),
            format_whole(q.totals.grand_total),
        ));
    }
    rows
}

fn footer_rows(q: &ResolvedQuotation) -> Vec<(FooterKind, TableRow)> {
    let plan = footer_plan(q);
    let span = plan.len();
    plan.into_iter()
        .enumerate()
        .map(|(i, (kind, label, amount))| {
            let mut cells = Vec::with_capacity(4);
            if i == 0 {
                // One label region across SL + description for every footer row.
                cells.push(Cell::new(COL_SL, vec![]).span(2, span).edges(Edges {
                    top: true,
                    left: false,
                    bottom: false,
                    right: true,
                }));
            }
            cells.push(text_cell(COL_UNIT, Run::bold(label), Align::Right).span(2, 1));
            cells.push(text_cell(COL_PRICE, Run::bold(q.currency.clone()), Align::Center));
            cells.push(text_cell(COL_TOTAL, Run::bold(amount), Align::Right));
            (kind, TableRow { cells })
        })
        .collect()
}

/// Builds the complete line-item table.
pub fn build_line_item_table(q: &ResolvedQuotation) -> LineItemTable {
    let mut table = Table::new(
        COLUMN_WEIGHTS.to_vec(),
        Borders::Single {
            color: Rgb::BLACK,
            width: 0.5,
        },
    );
    table.header_rows = 1;
    let mut kinds = Vec::new();

    table.rows.push(header_row(q));
    kinds.push(RowKind::Header);

    table.rows.push(summary_row(q));
    kinds.push(RowKind::Summary);

    for group in &q.groups {
        for opt in &group.options {
            table
                .rows
                .push(option_row(q, opt, group.sl_no, group.options.len()));
            kinds.push(RowKind::Option {
                sl_no: group.sl_no,
                option: opt.loc.option,
            });
        }
    }

    for (footer, row) in footer_rows(q) {
        table.rows.push(row);
        kinds.push(RowKind::Footer { footer });
    }

    LineItemTable { kinds, table }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
