//! Pagination — flows styled text lines onto fixed-size pages.
//!
//! Each input line is word-wrapped at its own font size, then stacked top to
//! bottom. When the next wrapped line no longer fits, a new page starts.
//!
//! # Rules
//! - Vertical space before a line is dropped at the top of a page
//! - A heading never ends a page: it moves to the next page together with the
//!   first line that follows it
//! - Content taller than one page always spans several pages; nothing is scaled

use serde::Serialize;

use crate::layout::font_metrics::PageConfig;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// The candidate's name.
    Title,
    /// Section heading.
    Heading,
    /// Entry headline (position, degree, certificate name).
    Subheading,
    Body,
    /// Dates, places, contact details.
    Meta,
}

impl LineStyle {
    pub fn font_size_pt(&self) -> f32 {
        match self {
            LineStyle::Title => 20.0,
            LineStyle::Heading => 13.0,
            LineStyle::Subheading => 11.0,
            LineStyle::Body => 10.0,
            LineStyle::Meta => 9.0,
        }
    }

    pub fn line_height_pt(&self) -> f32 {
        self.font_size_pt() * 1.3
    }

    pub fn space_before_pt(&self) -> f32 {
        match self {
            LineStyle::Title => 0.0,
            LineStyle::Heading => 14.0,
            LineStyle::Subheading => 6.0,
            LineStyle::Body | LineStyle::Meta => 0.0,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            LineStyle::Title | LineStyle::Heading | LineStyle::Subheading
        )
    }
}

/// One logical line of rendered output, before wrapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledLine {
    pub style: LineStyle,
    pub text: String,
}

impl StyledLine {
    pub fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// A wrapped line fixed on a page. `baseline_pt` is measured from the top edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub style: LineStyle,
    pub text: String,
    pub x_pt: f32,
    pub baseline_pt: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
    /// Height consumed below the top margin.
    pub used_height_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub content_height_pt: f32,
    pub page_height_pt: f32,
    pub text_height_pt: f32,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Fraction of the text area used on the last page (0.0 when there are no pages).
    pub fn last_page_fill(&self) -> f32 {
        self.pages
            .last()
            .map(|p| (p.used_height_pt / self.text_height_pt).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core
// ────────────────────────────────────────────────────────────────────────────

struct Block {
    style: LineStyle,
    rows: Vec<String>,
}

/// Lays `lines` out on pages of the given geometry. Rows are wrapped with the
/// widths of the face each line is drawn in.
pub fn paginate(lines: &[StyledLine], config: &PageConfig) -> Pagination {
    let available = config.text_height_pt();

    let blocks: Vec<Block> = lines
        .iter()
        .map(|line| Block {
            style: line.style,
            rows: config
                .font
                .face(line.style.is_bold())
                .metrics()
                .wrap(&line.text, config.text_width_em(line.style.font_size_pt())),
        })
        .filter(|block| !block.rows.is_empty())
        .collect();

    let mut pages: Vec<Page> = Vec::new();
    let mut page = Page::default();
    let mut content_height_pt = 0.0_f32;

    for (index, block) in blocks.iter().enumerate() {
        let line_height = block.style.line_height_pt();

        if block.style == LineStyle::Heading && !page.lines.is_empty() {
            // Keep the heading with the first row of whatever follows it.
            let follow = blocks
                .get(index + 1)
                .map(|next| next.style.space_before_pt() + next.style.line_height_pt())
                .unwrap_or(0.0);
            let needed = block.style.space_before_pt() + line_height + follow;
            if page.used_height_pt + needed > available {
                pages.push(std::mem::take(&mut page));
            }
        }

        for (row_index, row) in block.rows.iter().enumerate() {
            let space_before = if row_index == 0 && !page.lines.is_empty() {
                block.style.space_before_pt()
            } else {
                0.0
            };

            if !page.lines.is_empty() && page.used_height_pt + space_before + line_height > available
            {
                pages.push(std::mem::take(&mut page));
            }

            let space_before = if page.lines.is_empty() { 0.0 } else { space_before };
            let top = page.used_height_pt + space_before;
            page.lines.push(PlacedLine {
                style: block.style,
                text: row.clone(),
                x_pt: config.margin_pt,
                baseline_pt: config.margin_pt + top + block.style.font_size_pt(),
            });
            page.used_height_pt = top + line_height;
            content_height_pt += space_before + line_height;
        }
    }

    if !page.lines.is_empty() {
        pages.push(page);
    }

    Pagination {
        pages,
        content_height_pt,
        page_height_pt: config.height_pt,
        text_height_pt: available,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
