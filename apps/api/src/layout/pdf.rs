//! PDF serialisation of paginated layouts.
//!
//! Uses the base-14 Helvetica faces with WinAnsi encoding, so no font files are
//! embedded. Output carries no timestamps: the same layout always yields the
//! same bytes.

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::compose::document::{PagePlaceholder, Rgb};
use crate::layout::flow::FragmentContent;
use crate::layout::font_metrics::{FontFace, PageConfig};
use crate::layout::paginate::{DrawOp, PageLayout};

/// Maps a character to its WinAnsi byte. Unmappable characters become `?`.
pub fn win_ansi_byte(c: char) -> u8 {
    match c {
        '€' => 0x80,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' | '➢' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '″' => b'"',
        '™' => 0x99,
        c if (c as u32) < 0x80 => c as u8,
        c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
        _ => b'?',
    }
}

pub fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars().map(win_ansi_byte).collect()
}

fn fill(content: &mut Content, c: Rgb) {
    content.set_fill_rgb(c.0 as f32 / 255.0, c.1 as f32 / 255.0, c.2 as f32 / 255.0);
}

fn stroke(content: &mut Content, c: Rgb) {
    content.set_stroke_rgb(c.0 as f32 / 255.0, c.1 as f32 / 255.0, c.2 as f32 / 255.0);
}

/// Resolves a page field for page `index` (0-based) of `total`.
fn field_text(placeholder: PagePlaceholder, index: usize, total: usize) -> String {
    match placeholder {
        PagePlaceholder::CurrentPage => (index + 1).to_string(),
        PagePlaceholder::TotalPages => total.to_string(),
    }
}

fn page_content(page: &PageLayout, index: usize, total: usize, height: f32) -> Vec<u8> {
    let mut content = Content::new();
    for op in &page.ops {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height: h,
                color,
            } => {
                content.save_state();
                fill(&mut content, *color);
                content.rect(*x, height - y - h, *width, *h);
                content.fill_nonzero();
                content.restore_state();
            }
            DrawOp::Line {
                from,
                to,
                width,
                color,
            } => {
                content.save_state();
                stroke(&mut content, *color);
                content.set_line_width(*width);
                content.move_to(from.0, height - from.1);
                content.line_to(to.0, height - to.1);
                content.stroke();
                content.restore_state();
            }
            DrawOp::Text {
                x,
                y,
                face,
                size,
                color,
                content: text,
            } => {
                let bytes = match text {
                    FragmentContent::Text(t) => encode_win_ansi(t),
                    FragmentContent::Field(p) => encode_win_ansi(&field_text(*p, index, total)),
                };
                if bytes.iter().all(|b| *b == b' ') {
                    continue;
                }
                content.begin_text();
                fill(&mut content, *color);
                content.set_font(Name(face.resource_name()), *size);
                content.next_line(*x, height - y);
                content.show(Str(&bytes));
                content.end_text();
            }
        }
    }
    content.finish()
}

/// Writes the pages to PDF bytes, resolving page-number fields.
pub fn write_pdf(pages: &[PageLayout], config: &PageConfig, title: &str) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();
    let font_ids: Vec<(FontFace, Ref)> = FontFace::ALL.iter().map(|f| (*f, alloc())).collect();

    for (face, id) in &font_ids {
        pdf.type1_font(*id)
            .base_font(Name(face.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in pages.iter().enumerate() {
        let raw = page_content(page, i, n, config.height_pt);
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, config.width_pt, config.height_pt))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        for (face, id) in &font_ids {
            fonts.pair(Name(face.resource_name()), *id);
        }
    }

    pdf.document_info(info_id).title(TextStr(title));
    pdf.finish()
}
