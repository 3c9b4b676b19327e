//! Static font-metric tables for the standard Helvetica faces, plus page geometry.
//!
//! Character widths are in em units (AFM widths / 1000). Oblique faces share the
//! upright widths. All tables cover ASCII 0x20..=0x7E (95 printable characters);
//! the few non-ASCII glyphs quotations use are listed separately.
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl FontFace {
    pub const ALL: [FontFace; 4] = [
        FontFace::Regular,
        FontFace::Bold,
        FontFace::Oblique,
        FontFace::BoldOblique,
    ];

    pub fn select(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontFace::Regular,
            (true, false) => FontFace::Bold,
            (false, true) => FontFace::Oblique,
            (true, true) => FontFace::BoldOblique,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, FontFace::Bold | FontFace::BoldOblique)
    }

    /// PostScript name of the base-14 font.
    pub fn base_font(&self) -> &'static [u8] {
        match self {
            FontFace::Regular => b"Helvetica",
            FontFace::Bold => b"Helvetica-Bold",
            FontFace::Oblique => b"Helvetica-Oblique",
            FontFace::BoldOblique => b"Helvetica-BoldOblique",
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            FontFace::Regular => b"F1",
            FontFace::Bold => b"F2",
            FontFace::Oblique => b"F3",
            FontFace::BoldOblique => b"F4",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    Letter,
}

impl PaperSize {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A4" => Some(PaperSize::A4),
            "LETTER" => Some(PaperSize::Letter),
            _ => None,
        }
    }

    /// (width, height) in points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::Letter => (612.0, 792.0),
        }
    }
}

/// Page geometry for the quotation layout. All lengths are in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub paper: PaperSize,
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_left_pt: f32,
    pub margin_right_pt: f32,
    pub margin_top_pt: f32,
    pub margin_bottom_pt: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Gap between the page header and the body.
    pub header_gap_pt: f32,
}

impl PageConfig {
    pub fn content_width_pt(&self) -> f32 {
        self.width_pt - self.margin_left_pt - self.margin_right_pt
    }

    pub fn content_width_in(&self) -> f32 {
        self.content_width_pt() / 72.0
    }
}

/// Half-inch side margins, as quotations are printed.
pub fn page_config(paper: PaperSize) -> PageConfig {
    let (width_pt, height_pt) = paper.dimensions_pt();
    PageConfig {
        paper,
        width_pt,
        height_pt,
        margin_left_pt: 36.0,
        margin_right_pt: 36.0,
        margin_top_pt: 30.0,
        margin_bottom_pt: 36.0,
        line_height: 1.2,
        header_gap_pt: 8.0,
    }
}

#[cfg(test)]
pub fn default_page_config() -> PageConfig {
    page_config(PaperSize::A4)
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for characters outside the table.
    pub average_char_width: f32,
    pub space_width: f32,
    bold: bool,
}

impl FontMetricTable {
    fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        match c {
            '➢' | '•' => 0.35,
            '–' => 0.556,
            '—' => 1.0,
            '³' | '²' => 0.333,
            '®' => 0.737,
            '’' | '‘' => {
                if self.bold {
                    0.278
                } else {
                    0.222
                }
            }
            '″' | '“' | '”' => 0.5,
            _ => self.average_char_width,
        }
    }

    /// Width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Width of a string in points at `size_pt`.
    pub fn measure_pt(&self, s: &str, size_pt: f32) -> f32 {
        self.measure_str(s) * size_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
    bold: false,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
    bold: true,
};

/// Returns the static metric table for a face.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    if face.is_bold() {
        &HELVETICA_BOLD_TABLE
    } else {
        &HELVETICA_TABLE
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
