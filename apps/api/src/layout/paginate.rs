//! Page breaking.
//!
//! Turns a composed document into positioned drawing operations per page.
//! Coordinates here run top-down from the page's top-left corner; the PDF
//! writer flips them. Page-number fields are left unresolved until the page
//! count is known.

use crate::compose::document::{Block, Borders, Cell, ComposedDocument, PageFurniture, Rgb, Table, VAlign};
use crate::layout::flow::{layout_paragraph, FragmentContent, Line, ParagraphLayout};
use crate::layout::font_metrics::{FontFace, PageConfig};
use crate::layout::LayoutError;

/// Smallest body area accepted between header and footer.
const MIN_BODY_HEIGHT_PT: f32 = 72.0;
/// Gap kept above the footer.
const FOOTER_GAP_PT: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        face: FontFace,
        size: f32,
        color: Rgb,
        content: FragmentContent,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgb,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub ops: Vec<DrawOp>,
}

impl PageLayout {
    /// Literal text on the page in drawing order, fields shown as `#`.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { content, .. } => Some(match content {
                    FragmentContent::Text(t) => t.clone(),
                    FragmentContent::Field(_) => "#".to_string(),
                }),
                _ => None,
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Drawing primitives
// ────────────────────────────────────────────────────────────────────────────

fn draw_line(ops: &mut Vec<DrawOp>, line: &Line, x0: f32, top: f32) {
    let baseline = top + line.baseline;
    for frag in &line.fragments {
        let x = x0 + frag.x;
        ops.push(DrawOp::Text {
            x,
            y: baseline,
            face: frag.face,
            size: frag.size,
            color: frag.color,
            content: frag.content.clone(),
        });
        if frag.underline {
            let uy = baseline + frag.size * 0.12;
            ops.push(DrawOp::Line {
                from: (x, uy),
                to: (x + frag.width, uy),
                width: (frag.size * 0.06).max(0.4),
                color: frag.color,
            });
        }
    }
}

/// Draws a paragraph without page breaks; returns the new cursor.
fn draw_paragraph(ops: &mut Vec<DrawOp>, layout: &ParagraphLayout, x0: f32, top: f32) -> f32 {
    let mut y = top + layout.space_before;
    for line in &layout.lines {
        draw_line(ops, line, x0, y);
        y += line.height;
    }
    y + layout.space_after
}

fn rule_height(width: f32) -> f32 {
    width + 4.0
}

fn draw_rule(ops: &mut Vec<DrawOp>, x0: f32, x1: f32, top: f32, color: Rgb, width: f32) {
    let y = top + 2.0 + width / 2.0;
    ops.push(DrawOp::Line {
        from: (x0, y),
        to: (x1, y),
        width,
        color,
    });
}

// ────────────────────────────────────────────────────────────────────────────
// Table geometry
// ────────────────────────────────────────────────────────────────────────────

struct CellBox<'a> {
    row: usize,
    x: f32,
    width: f32,
    cell: &'a Cell,
    layouts: Vec<ParagraphLayout>,
    content_height: f32,
}

struct TableGeometry<'a> {
    table: &'a Table,
    cells: Vec<CellBox<'a>>,
    row_heights: Vec<f32>,
}

impl TableGeometry<'_> {
    fn rows_height(&self, rows: std::ops::Range<usize>) -> f32 {
        self.row_heights[rows].iter().sum()
    }

    fn total_height(&self) -> f32 {
        self.row_heights.iter().sum()
    }

    fn header_rows(&self) -> usize {
        self.table.header_rows.min(self.row_heights.len())
    }

    /// Row ranges that must stay on one page: rows linked by vertical spans.
    fn units(&self) -> Vec<std::ops::Range<usize>> {
        let n = self.row_heights.len();
        let mut units = Vec::new();
        let mut r = self.header_rows();
        while r < n {
            let mut end = r + 1;
            let mut k = r;
            while k < end {
                for cell in &self.table.rows[k].cells {
                    end = end.max(k + cell.row_span);
                }
                k += 1;
            }
            let end = end.min(n);
            units.push(r..end);
            r = end;
        }
        units
    }
}

fn measure_table<'a>(
    table: &'a Table,
    x0: f32,
    width: f32,
    config: &PageConfig,
) -> Result<TableGeometry<'a>, LayoutError> {
    let total_weight: f32 = table.columns.iter().sum();
    if table.columns.is_empty() || total_weight <= 0.0 {
        return Err(LayoutError::Table("table has no column widths".into()));
    }
    let mut col_x = Vec::with_capacity(table.columns.len() + 1);
    let mut acc = 0.0;
    col_x.push(x0);
    for w in &table.columns {
        acc += w;
        col_x.push(x0 + acc / total_weight * width);
    }

    let pad = table.cell_padding;
    let n = table.rows.len();
    let mut cells = Vec::new();
    for (row, tr) in table.rows.iter().enumerate() {
        for cell in &tr.cells {
            if cell.col >= table.columns.len() {
                return Err(LayoutError::Table(format!(
                    "cell in row {row} starts at column {} of {}",
                    cell.col,
                    table.columns.len()
                )));
            }
            let end_col = (cell.col + cell.col_span).min(table.columns.len());
            let x = col_x[cell.col];
            let cell_width = col_x[end_col] - x;
            let inner = (cell_width - 2.0 * pad).max(1.0);
            let layouts: Vec<ParagraphLayout> = cell
                .content
                .iter()
                .map(|p| layout_paragraph(p, inner, config))
                .collect();
            let content_height = layouts.iter().map(|l| l.height()).sum();
            cells.push(CellBox {
                row,
                x,
                width: cell_width,
                cell,
                layouts,
                content_height,
            });
        }
    }

    let mut row_heights = vec![2.0 * pad; n];
    for b in cells.iter().filter(|b| b.cell.row_span == 1) {
        row_heights[b.row] = row_heights[b.row].max(b.content_height + 2.0 * pad);
    }
    // Spanning cells grow their last row when the spanned rows are too short.
    for b in cells.iter().filter(|b| b.cell.row_span > 1) {
        let end = (b.row + b.cell.row_span).min(n);
        let spanned: f32 = row_heights[b.row..end].iter().sum();
        let needed = b.content_height + 2.0 * pad;
        if needed > spanned {
            row_heights[end - 1] += needed - spanned;
        }
    }

    Ok(TableGeometry {
        table,
        cells,
        row_heights,
    })
}

/// Where each row landed: `(page index, top)`.
type RowPlacement = Vec<Option<(usize, f32)>>;

fn draw_cell_content(ops: &mut Vec<DrawOp>, b: &CellBox<'_>, top: f32, height: f32, pad: f32) {
    let offset = match b.cell.v_align {
        VAlign::Top => pad,
        VAlign::Center => (height - b.content_height) / 2.0,
        VAlign::Bottom => height - pad - b.content_height,
    };
    let mut y = top + offset.max(0.0);
    for layout in &b.layouts {
        y = draw_paragraph(ops, layout, b.x + pad, y);
    }
}

fn draw_cell_edges(ops: &mut Vec<DrawOp>, b: &CellBox<'_>, top: f32, height: f32, borders: Borders) {
    let Borders::Single { color, width } = borders else {
        return;
    };
    let (x0, x1, y0, y1) = (b.x, b.x + b.width, top, top + height);
    let edges = b.cell.edges;
    let mut edge = |from: (f32, f32), to: (f32, f32)| {
        ops.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        })
    };
    if edges.top {
        edge((x0, y0), (x1, y0));
    }
    if edges.bottom {
        edge((x0, y1), (x1, y1));
    }
    if edges.left {
        edge((x0, y0), (x0, y1));
    }
    if edges.right {
        edge((x1, y0), (x1, y1));
    }
}

/// Draws every placed cell. A spanning cell covers only the spanned rows that
/// landed on the same page as its first row.
fn draw_table(
    pages: &mut [PageLayout],
    geo: &TableGeometry<'_>,
    rows: &RowPlacement,
    header_repeats: &[(usize, f32)],
) {
    let pad = geo.table.cell_padding;
    let n = geo.row_heights.len();
    let mut boxes: Vec<(usize, f32, f32, &CellBox<'_>)> = Vec::new();

    for b in &geo.cells {
        let Some((page, top)) = rows[b.row] else {
            continue;
        };
        let end = (b.row + b.cell.row_span).min(n);
        let height: f32 = (b.row..end)
            .filter(|r| matches!(rows[*r], Some((p, _)) if p == page))
            .map(|r| geo.row_heights[r])
            .sum();
        boxes.push((page, top, height, b));
    }
    for &(page, top) in header_repeats {
        let mut row_top = top;
        let mut tops = Vec::new();
        for r in 0..geo.header_rows() {
            tops.push(row_top);
            row_top += geo.row_heights[r];
        }
        for b in geo.cells.iter().filter(|b| b.row < geo.header_rows()) {
            let end = (b.row + b.cell.row_span).min(geo.header_rows());
            boxes.push((page, tops[b.row], geo.rows_height(b.row..end), b));
        }
    }

    for &(page, top, height, b) in &boxes {
        if let Some(color) = b.cell.fill {
            pages[page].ops.push(DrawOp::FillRect {
                x: b.x,
                y: top,
                width: b.width,
                height,
                color,
            });
        }
    }
    for &(page, top, height, b) in &boxes {
        draw_cell_content(&mut pages[page].ops, b, top, height, pad);
    }
    for &(page, top, height, b) in &boxes {
        draw_cell_edges(&mut pages[page].ops, b, top, height, geo.table.borders);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Furniture
// ────────────────────────────────────────────────────────────────────────────

fn furniture_height(f: &PageFurniture, width: f32, config: &PageConfig) -> Result<f32, LayoutError> {
    let mut h = 0.0;
    for block in &f.blocks {
        h += match block {
            Block::Paragraph(p) => layout_paragraph(p, width, config).height(),
            Block::Table(t) => measure_table(t, 0.0, width, config)?.total_height(),
            Block::Spacer(s) => *s,
            Block::Rule { width, .. } => rule_height(*width),
            Block::ImageSlot { height, .. } => *height,
        };
    }
    Ok(h)
}

/// Places header or footer blocks on one page with no breaking.
fn place_furniture(
    pages: &mut [PageLayout],
    page: usize,
    f: &PageFurniture,
    top: f32,
    config: &PageConfig,
) -> Result<(), LayoutError> {
    let x0 = config.margin_left_pt;
    let width = config.content_width_pt();
    let mut y = top;
    for block in &f.blocks {
        match block {
            Block::Paragraph(p) => {
                let layout = layout_paragraph(p, width, config);
                y = draw_paragraph(&mut pages[page].ops, &layout, x0, y);
            }
            Block::Table(t) => {
                let geo = measure_table(t, x0, width, config)?;
                let mut rows = Vec::with_capacity(geo.row_heights.len());
                for h in &geo.row_heights {
                    rows.push(Some((page, y)));
                    y += h;
                }
                draw_table(pages, &geo, &rows, &[]);
            }
            Block::Spacer(s) => y += s,
            Block::Rule { color, width: w } => {
                draw_rule(&mut pages[page].ops, x0, x0 + width, y, *color, *w);
                y += rule_height(*w);
            }
            Block::ImageSlot { height, .. } => y += height,
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Body pagination
// ────────────────────────────────────────────────────────────────────────────

struct Paginator<'a> {
    config: &'a PageConfig,
    pages: Vec<PageLayout>,
    page: usize,
    y: f32,
    /// Nothing from the body has been placed on the current page yet.
    at_top: bool,
    continuation_top: f32,
    bottom: f32,
}

impl Paginator<'_> {
    fn x0(&self) -> f32 {
        self.config.margin_left_pt
    }

    fn width(&self) -> f32 {
        self.config.content_width_pt()
    }

    fn ops(&mut self) -> &mut Vec<DrawOp> {
        &mut self.pages[self.page].ops
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.page = self.pages.len() - 1;
        self.y = self.continuation_top;
        self.at_top = true;
    }

    fn body_height(&self) -> f32 {
        self.bottom - self.continuation_top
    }

    /// Starts a new page unless `height` fits below the cursor.
    fn ensure_room(&mut self, height: f32) {
        if !self.at_top && self.y + height > self.bottom + 0.01 {
            self.new_page();
        }
    }

    fn block_height(&self, block: &Block) -> Result<f32, LayoutError> {
        Ok(match block {
            Block::Paragraph(p) => layout_paragraph(p, self.width(), self.config).height(),
            Block::Table(t) => measure_table(t, 0.0, self.width(), self.config)?.total_height(),
            Block::Spacer(h) => *h,
            Block::Rule { width, .. } => rule_height(*width),
            Block::ImageSlot { height, .. } => *height,
        })
    }

    /// Height of the part of a block that must follow a keep-with-next chain.
    fn lead_height(&self, block: &Block) -> Result<f32, LayoutError> {
        Ok(match block {
            Block::Paragraph(p) => {
                let layout = layout_paragraph(p, self.width(), self.config);
                layout.space_before + layout.lines.first().map(|l| l.height).unwrap_or(0.0)
            }
            Block::Table(t) => {
                let geo = measure_table(t, 0.0, self.width(), self.config)?;
                let header = geo.rows_height(0..geo.header_rows());
                header + geo.units().first().map(|u| geo.rows_height(u.clone())).unwrap_or(0.0)
            }
            other => self.block_height(other)?,
        })
    }

    fn keep_chain_height(&self, blocks: &[Block], start: usize) -> Result<f32, LayoutError> {
        let mut h = 0.0;
        let mut i = start;
        while i < blocks.len() && (blocks[i].keeps_with_next() || matches!(blocks[i], Block::Spacer(_))) {
            h += self.block_height(&blocks[i])?;
            i += 1;
        }
        if let Some(next) = blocks.get(i) {
            h += self.lead_height(next)?;
        }
        Ok(h)
    }

    fn place_paragraph(&mut self, layout: &ParagraphLayout) {
        if !self.at_top {
            self.y += layout.space_before;
        }
        for line in &layout.lines {
            self.ensure_room(line.height);
            let (x0, y) = (self.x0(), self.y);
            draw_line(self.ops(), line, x0, y);
            self.y += line.height;
            self.at_top = false;
        }
        self.y += layout.space_after;
    }

    fn place_header_rows(&mut self, geo: &TableGeometry<'_>, rows: &mut RowPlacement) {
        for r in 0..geo.header_rows() {
            rows[r] = Some((self.page, self.y));
            self.y += geo.row_heights[r];
        }
    }

    fn place_table(&mut self, table: &Table) -> Result<(), LayoutError> {
        let geo = measure_table(table, self.x0(), self.width(), self.config)?;
        let n = geo.row_heights.len();
        if n == 0 {
            return Ok(());
        }
        let header_h = geo.rows_height(0..geo.header_rows());
        let units = geo.units();
        let mut rows: RowPlacement = vec![None; n];
        let mut repeats: Vec<(usize, f32)> = Vec::new();

        let lead = header_h + units.first().map(|u| geo.rows_height(u.clone())).unwrap_or(0.0);
        if lead <= self.body_height() {
            self.ensure_room(lead);
        }
        self.place_header_rows(&geo, &mut rows);
        self.at_top = false;
        // True while only header rows sit on the current page.
        let mut fresh = true;

        for unit in units {
            let unit_h = geo.rows_height(unit.clone());
            if !fresh && self.y + unit_h > self.bottom + 0.01 && header_h + unit_h <= self.body_height() {
                self.new_page();
                repeats.push((self.page, self.y));
                self.y += header_h;
                self.at_top = false;
                fresh = true;
            }
            for r in unit {
                let h = geo.row_heights[r];
                if !fresh && self.y + h > self.bottom + 0.01 {
                    self.new_page();
                    repeats.push((self.page, self.y));
                    self.y += header_h;
                    self.at_top = false;
                }
                rows[r] = Some((self.page, self.y));
                self.y += h;
                fresh = false;
            }
        }

        draw_table(&mut self.pages, &geo, &rows, &repeats);
        Ok(())
    }

    fn place(&mut self, blocks: &[Block]) -> Result<(), LayoutError> {
        for (i, block) in blocks.iter().enumerate() {
            if block.keeps_with_next() {
                let chain = self.keep_chain_height(blocks, i)?;
                if chain <= self.body_height() {
                    self.ensure_room(chain);
                }
            }
            match block {
                Block::Paragraph(p) => {
                    let layout = layout_paragraph(p, self.width(), self.config);
                    self.place_paragraph(&layout);
                }
                Block::Table(t) => self.place_table(t)?,
                Block::Spacer(h) => {
                    if !self.at_top {
                        self.y += h;
                    }
                }
                Block::Rule { color, width } => {
                    let h = rule_height(*width);
                    self.ensure_room(h);
                    let (x0, x1, y) = (self.x0(), self.x0() + self.width(), self.y);
                    draw_rule(self.ops(), x0, x1, y, *color, *width);
                    self.y += h;
                    self.at_top = false;
                }
                Block::ImageSlot { height, .. } => {
                    self.ensure_room(*height);
                    self.y += height;
                    self.at_top = false;
                }
            }
        }
        Ok(())
    }
}

/// Lays out the whole document. Page-number fields stay unresolved.
pub fn paginate(doc: &ComposedDocument, config: &PageConfig) -> Result<Vec<PageLayout>, LayoutError> {
    let width = config.content_width_pt();
    if width <= 0.0 {
        return Err(LayoutError::Geometry(format!(
            "margins leave {width:.1}pt of text width"
        )));
    }

    let gap = |h: f32| if h > 0.0 { h + config.header_gap_pt } else { 0.0 };
    let first_h = furniture_height(&doc.first_header, width, config)?;
    let cont_h = furniture_height(&doc.continuation_header, width, config)?;
    let footer_h = furniture_height(&doc.footer, width, config)?;

    let first_top = config.margin_top_pt + gap(first_h);
    let continuation_top = config.margin_top_pt + gap(cont_h);
    let footer_top = config.height_pt - config.margin_bottom_pt - footer_h;
    let bottom = if footer_h > 0.0 {
        footer_top - FOOTER_GAP_PT
    } else {
        footer_top
    };
    let body = bottom - first_top.max(continuation_top);
    if body < MIN_BODY_HEIGHT_PT {
        return Err(LayoutError::Geometry(format!(
            "header and footer leave {body:.1}pt for the body"
        )));
    }

    let mut p = Paginator {
        config,
        pages: vec![PageLayout::default()],
        page: 0,
        y: first_top,
        at_top: true,
        continuation_top,
        bottom,
    };
    p.place(&doc.body)?;

    let mut pages = p.pages;
    for i in 0..pages.len() {
        let header = if i == 0 {
            &doc.first_header
        } else {
            &doc.continuation_header
        };
        place_furniture(&mut pages, i, header, config.margin_top_pt, config)?;
        place_furniture(&mut pages, i, &doc.footer, footer_top, config)?;
    }
    Ok(pages)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
