//! Paragraph line layout.
//!
//! Greedy word-wrap over styled pieces, with tab stops, hanging indents, hard
//! breaks and page-number fields. Break opportunities exist only at spaces, so
//! adjacent runs without whitespace between them (`M/S.` + name) stay together.

use crate::compose::document::{Align, Inline, PagePlaceholder, Paragraph, Rgb};
use crate::layout::font_metrics::{get_metrics, FontFace, PageConfig};

/// Text reserved for a page field while its value is still unknown.
const FIELD_RESERVE: &str = "99";

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentContent {
    Text(String),
    Field(PagePlaceholder),
}

/// A positioned piece of text inside a line. `x` is relative to the paragraph box.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub x: f32,
    pub width: f32,
    pub content: FragmentContent,
    pub face: FontFace,
    pub size: f32,
    pub color: Rgb,
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub fragments: Vec<Fragment>,
    pub height: f32,
    /// Distance from the top of the line to the text baseline.
    pub baseline: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphLayout {
    pub lines: Vec<Line>,
    pub space_before: f32,
    pub space_after: f32,
}

impl ParagraphLayout {
    pub fn lines_height(&self) -> f32 {
        self.lines.iter().map(|l| l.height).sum()
    }

    pub fn height(&self) -> f32 {
        self.space_before + self.lines_height() + self.space_after
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tokenising
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct PieceStyle {
    face: FontFace,
    color: Rgb,
    underline: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Word(String, PieceStyle),
    Space(String, PieceStyle),
    Field(PagePlaceholder, PieceStyle),
    Tab,
    Break,
}

fn tokenize(p: &Paragraph) -> Vec<Piece> {
    let mut pieces = Vec::new();
    for inline in &p.inlines {
        match inline {
            Inline::Tab => pieces.push(Piece::Tab),
            Inline::Field {
                placeholder,
                bold,
                color,
            } => pieces.push(Piece::Field(
                *placeholder,
                PieceStyle {
                    face: FontFace::select(*bold, false),
                    color: color.unwrap_or(Rgb::BLACK),
                    underline: false,
                },
            )),
            Inline::Text(run) => {
                let style = PieceStyle {
                    face: FontFace::select(run.bold, run.italic),
                    color: run.color.unwrap_or(Rgb::BLACK),
                    underline: run.underline,
                };
                let mut word = String::new();
                let mut space = String::new();
                let flush = |word: &mut String, space: &mut String, pieces: &mut Vec<Piece>| {
                    if !word.is_empty() {
                        pieces.push(Piece::Word(std::mem::take(word), style));
                    }
                    if !space.is_empty() {
                        pieces.push(Piece::Space(std::mem::take(space), style));
                    }
                };
                for c in run.text.chars() {
                    match c {
                        '\n' => {
                            flush(&mut word, &mut space, &mut pieces);
                            pieces.push(Piece::Break);
                        }
                        '\t' => {
                            flush(&mut word, &mut space, &mut pieces);
                            pieces.push(Piece::Tab);
                        }
                        ' ' => {
                            if !word.is_empty() {
                                pieces.push(Piece::Word(std::mem::take(&mut word), style));
                            }
                            space.push(' ');
                        }
                        '\r' => {}
                        _ => {
                            if !space.is_empty() {
                                pieces.push(Piece::Space(std::mem::take(&mut space), style));
                            }
                            word.push(c);
                        }
                    }
                }
                flush(&mut word, &mut space, &mut pieces);
            }
        }
    }
    pieces
}

// ────────────────────────────────────────────────────────────────────────────
// Line building
// ────────────────────────────────────────────────────────────────────────────

struct Builder<'a> {
    size: f32,
    width: f32,
    left_indent: f32,
    tab_stops: &'a [f32],
    line_height: f32,
    lines: Vec<Line>,
    current: Vec<Fragment>,
    x: f32,
    /// Spaces seen since the last placed content; dropped at a wrap.
    pending: Vec<(String, PieceStyle)>,
    line_started: bool,
}

impl<'a> Builder<'a> {
    fn measure(&self, text: &str, face: FontFace) -> f32 {
        get_metrics(face).measure_pt(text, self.size)
    }

    fn push_line(&mut self) {
        let fragments = std::mem::take(&mut self.current);
        self.lines.push(Line {
            fragments,
            height: self.line_height,
            baseline: self.line_height * 0.78,
        });
        self.x = self.left_indent;
        self.pending.clear();
        self.line_started = false;
    }

    fn pending_width(&self) -> f32 {
        self.pending
            .iter()
            .map(|(s, style)| self.measure(s, style.face))
            .sum()
    }

    fn flush_pending(&mut self) {
        for (text, style) in std::mem::take(&mut self.pending) {
            let w = self.measure(&text, style.face);
            self.emit(FragmentContent::Text(text), style, w);
        }
    }

    fn emit(&mut self, content: FragmentContent, style: PieceStyle, width: f32) {
        self.current.push(Fragment {
            x: self.x,
            width,
            content,
            face: style.face,
            size: self.size,
            color: style.color,
            underline: style.underline,
        });
        self.x += width;
        self.line_started = true;
    }

    fn piece_width(&self, piece: &Piece) -> f32 {
        match piece {
            Piece::Word(text, style) => self.measure(text, style.face),
            Piece::Field(_, style) => self.measure(FIELD_RESERVE, style.face),
            _ => 0.0,
        }
    }

    /// Places a run of pieces with no break opportunity between them.
    fn place_cluster(&mut self, cluster: &[Piece]) {
        let cluster_w: f32 = cluster.iter().map(|p| self.piece_width(p)).sum();
        let fits = self.x + self.pending_width() + cluster_w <= self.width + 0.01;
        if !fits && self.line_started {
            self.push_line();
        }
        self.flush_pending();

        if self.x + cluster_w <= self.width + 0.01 {
            for piece in cluster {
                self.place_piece(piece);
            }
            return;
        }
        // Wider than a whole line: break between characters.
        for piece in cluster {
            match piece {
                Piece::Word(text, style) => {
                    let mut chunk = String::new();
                    for c in text.chars() {
                        let cw = self.measure(&c.to_string(), style.face);
                        let chunk_w = self.measure(&chunk, style.face);
                        if self.x + chunk_w + cw > self.width && (self.line_started || !chunk.is_empty()) {
                            if !chunk.is_empty() {
                                let w = self.measure(&chunk, style.face);
                                self.emit(FragmentContent::Text(std::mem::take(&mut chunk)), *style, w);
                            }
                            self.push_line();
                        }
                        chunk.push(c);
                    }
                    if !chunk.is_empty() {
                        let w = self.measure(&chunk, style.face);
                        self.emit(FragmentContent::Text(chunk), *style, w);
                    }
                }
                other => self.place_piece(other),
            }
        }
    }

    fn place_piece(&mut self, piece: &Piece) {
        match piece {
            Piece::Word(text, style) => {
                let w = self.measure(text, style.face);
                self.emit(FragmentContent::Text(text.clone()), *style, w);
            }
            Piece::Field(placeholder, style) => {
                let w = self.measure(FIELD_RESERVE, style.face);
                self.emit(FragmentContent::Field(*placeholder), *style, w);
            }
            _ => {}
        }
    }

    fn tab(&mut self) {
        self.pending.clear();
        let space = get_metrics(FontFace::Regular).space_width * self.size;
        let next = self
            .tab_stops
            .iter()
            .copied()
            .find(|stop| *stop > self.x + 0.01)
            .unwrap_or(self.x + space);
        self.x = next.min(self.width);
        self.line_started = true;
    }
}

fn align_lines(lines: &mut [Line], align: Align, width: f32) {
    if align == Align::Left {
        return;
    }
    for line in lines.iter_mut() {
        let Some(first) = line.fragments.first() else {
            continue;
        };
        let start = first.x;
        let end = line
            .fragments
            .iter()
            .rev()
            .find(|f| !matches!(&f.content, FragmentContent::Text(t) if t.trim().is_empty()))
            .map(|f| f.x + f.width)
            .unwrap_or(start);
        let free = (width - end).max(0.0);
        let shift = match align {
            Align::Center => (free - start) / 2.0,
            Align::Right => free,
            Align::Left => 0.0,
        };
        for f in &mut line.fragments {
            f.x += shift;
        }
    }
}

/// Lays out a paragraph into lines no wider than `width` points.
pub fn layout_paragraph(p: &Paragraph, width: f32, config: &PageConfig) -> ParagraphLayout {
    let style = &p.style;
    let size = style.font_size;
    let first_x = (style.left_indent + style.first_line_indent).max(0.0);
    let mut b = Builder {
        size,
        width: width.max(1.0),
        left_indent: style.left_indent.max(0.0),
        tab_stops: &style.tab_stops,
        line_height: size * config.line_height,
        lines: Vec::new(),
        current: Vec::new(),
        x: first_x,
        pending: Vec::new(),
        line_started: false,
    };

    let pieces = tokenize(p);
    let mut i = 0;
    while i < pieces.len() {
        match &pieces[i] {
            Piece::Break => {
                b.push_line();
                i += 1;
            }
            Piece::Tab => {
                b.tab();
                i += 1;
            }
            Piece::Space(text, style) => {
                if b.line_started {
                    b.pending.push((text.clone(), *style));
                }
                i += 1;
            }
            Piece::Word(..) | Piece::Field(..) => {
                let start = i;
                while i < pieces.len() && matches!(pieces[i], Piece::Word(..) | Piece::Field(..)) {
                    i += 1;
                }
                b.place_cluster(&pieces[start..i]);
            }
        }
    }
    b.push_line();

    let mut lines = b.lines;
    align_lines(&mut lines, style.align, width);

    ParagraphLayout {
        lines,
        space_before: style.space_before,
        space_after: style.space_after,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
