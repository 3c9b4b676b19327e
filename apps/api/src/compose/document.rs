//! Format-neutral document model produced by the composer.
//!
//! Blocks carry only logical formatting (runs, spans, borders, live page fields).
//! The `layout` module turns a `ComposedDocument` into pages.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Primitives
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GRAY: Rgb = Rgb(96, 96, 96);
    pub const NAVY: Rgb = Rgb(0x00, 0x20, 0x60);
    pub const SKY_BLUE: Rgb = Rgb(20, 123, 197);
    pub const LINK_BLUE: Rgb = Rgb(0, 0, 255);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// A live page field. Its value is only known once the adapter has paginated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagePlaceholder {
    CurrentPage,
    TotalPages,
}

// ────────────────────────────────────────────────────────────────────────────
// Inline content
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<Rgb>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Self::default()
        }
    }

    pub fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn colored(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

/// Inline content of a paragraph. `\n` inside run text is a hard line break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Text(Run),
    Tab,
    Field {
        placeholder: PagePlaceholder,
        bold: bool,
        color: Option<Rgb>,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Paragraphs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    pub font_size: f32,
    pub align: Align,
    pub space_before: f32,
    pub space_after: f32,
    /// Left edge of every line after the first, in points.
    pub left_indent: f32,
    /// Offset of the first line relative to `left_indent`; negative for a hanging indent.
    pub first_line_indent: f32,
    /// Tab stops in points from the paragraph's left edge.
    pub tab_stops: Vec<f32>,
    pub keep_with_next: bool,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            align: Align::Left,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
            first_line_indent: 0.0,
            tab_stops: Vec::new(),
            keep_with_next: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
    pub style: ParagraphStyle,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            inlines: Vec::new(),
            style,
        }
    }

    pub fn of_runs(runs: Vec<Run>, style: ParagraphStyle) -> Self {
        Self {
            inlines: runs.into_iter().map(Inline::Text).collect(),
            style,
        }
    }

    pub fn run(mut self, run: Run) -> Self {
        self.inlines.push(Inline::Text(run));
        self
    }

    pub fn tab(mut self) -> Self {
        self.inlines.push(Inline::Tab);
        self
    }

    pub fn field(mut self, placeholder: PagePlaceholder, bold: bool, color: Option<Rgb>) -> Self {
        self.inlines.push(Inline::Field {
            placeholder,
            bold,
            color,
        });
        self
    }

    /// Concatenated visible text with fields rendered as `{page}` / `{pages}`.
    #[cfg(test)]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text(run) => out.push_str(&run.text),
                Inline::Tab => out.push('\t'),
                Inline::Field { placeholder, .. } => out.push_str(match placeholder {
                    PagePlaceholder::CurrentPage => "{page}",
                    PagePlaceholder::TotalPages => "{pages}",
                }),
            }
        }
        out
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tables
// ────────────────────────────────────────────────────────────────────────────

/// Which edges of a cell are drawn. Only meaningful when the table has borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edges {
    pub top: bool,
    pub left: bool,
    pub bottom: bool,
    pub right: bool,
}

impl Edges {
    pub const ALL: Edges = Edges {
        top: true,
        left: true,
        bottom: true,
        right: true,
    };
}

impl Default for Edges {
    fn default() -> Self {
        Edges::ALL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// First grid column covered by this cell.
    pub col: usize,
    pub col_span: usize,
    pub row_span: usize,
    pub content: Vec<Paragraph>,
    pub fill: Option<Rgb>,
    pub v_align: VAlign,
    pub edges: Edges,
}

impl Cell {
    pub fn new(col: usize, content: Vec<Paragraph>) -> Self {
        Self {
            col,
            col_span: 1,
            row_span: 1,
            content,
            fill: None,
            v_align: VAlign::Top,
            edges: Edges::ALL,
        }
    }

    pub fn span(mut self, cols: usize, rows: usize) -> Self {
        self.col_span = cols.max(1);
        self.row_span = rows.max(1);
        self
    }

    pub fn fill(mut self, color: Rgb) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn v_align(mut self, v_align: VAlign) -> Self {
        self.v_align = v_align;
        self
    }

    pub fn edges(mut self, edges: Edges) -> Self {
        self.edges = edges;
        self
    }
}

/// A row lists only the cells that start in it; grid slots covered by a span
/// from an earlier row or column are simply absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Borders {
    None,
    Single { color: Rgb, width: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Relative column weights; scaled to the available width by the adapter.
    pub columns: Vec<f32>,
    pub rows: Vec<TableRow>,
    pub borders: Borders,
    /// Leading rows repeated at the top of every page the table continues on.
    pub header_rows: usize,
    pub cell_padding: f32,
}

impl Table {
    pub fn new(columns: Vec<f32>, borders: Borders) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            borders,
            header_rows: 0,
            cell_padding: 3.0,
        }
    }

    #[cfg(test)]
    pub fn find_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.cells.iter().find(|c| c.col == col)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Blocks / document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Vertical gap in points.
    Spacer(f32),
    /// Horizontal rule across the text width.
    Rule { color: Rgb, width: f32 },
    /// Blank reserved area for an image that is placed out of band.
    ImageSlot { height: f32, reference: String },
}

impl Block {
    pub fn keeps_with_next(&self) -> bool {
        match self {
            Block::Paragraph(p) => p.style.keep_with_next,
            Block::ImageSlot { .. } => true,
            _ => false,
        }
    }
}

/// Header/footer content for one page variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageFurniture {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedDocument {
    pub title: String,
    pub first_header: PageFurniture,
    pub continuation_header: PageFurniture,
    pub footer: PageFurniture,
    pub body: Vec<Block>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex(0x002060), Rgb(0, 0x20, 0x60));
    }

    #[test]
    fn test_plain_text_renders_fields() {
        let p = Paragraph::default()
            .run(Run::plain("PAGE NO : "))
            .field(PagePlaceholder::CurrentPage, true, None)
            .run(Run::plain("/"))
            .field(PagePlaceholder::TotalPages, true, None);
        assert_eq!(p.plain_text(), "PAGE NO : {page}/{pages}");
    }

    #[test]
    fn test_cell_span_clamps_to_one() {
        let cell = Cell::new(0, vec![]).span(0, 0);
        assert_eq!((cell.col_span, cell.row_span), (1, 1));
    }
}
