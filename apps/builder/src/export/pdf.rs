//! PDF export — paginates the rendered resume onto A4 pages and writes a
//! PDF 1.4 file using standard Type 1 faces.
//!
//! # Layout
//! Line wrapping and page breaks come from `layout::paginate`. The sans
//! families are drawn in Helvetica and Garamond in Times, and rows are
//! measured with those same faces. Headings are drawn in the accent colour
//! with a rule underneath.
//!
//! # Files
//! `resume_YYYY-MM-DD.pdf` (UTC date) in the export directory. The bytes go to a temp
//! file in the same directory first and are then renamed into place; a
//! second export on the same day replaces the first.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info};

use crate::errors::ExportError;
use crate::export::{ExportCollaborator, ExportReceipt, RenderedSnapshot};
use crate::layout::{a4_page_config, paginate, LineStyle, PageConfig, Pagination};

pub struct PdfExporter {
    dir: PathBuf,
}

impl PdfExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("resume_{}.pdf", date.format("%Y-%m-%d"))
}

/// The calendar date a capture is filed under, in UTC.
pub fn export_date(captured_at: DateTime<Local>) -> NaiveDate {
    captured_at.with_timezone(&Utc).date_naive()
}

#[async_trait]
impl ExportCollaborator for PdfExporter {
    fn name(&self) -> &str {
        "pdf"
    }

    async fn export(&self, snapshot: RenderedSnapshot) -> Result<ExportReceipt, ExportError> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || write_snapshot(&dir, &snapshot))
            .await
            .map_err(|e| ExportError::Aborted(format!("spawn_blocking failed in PDF export: {e}")))?
    }
}

fn write_snapshot(dir: &Path, snapshot: &RenderedSnapshot) -> Result<ExportReceipt, ExportError> {
    let style = &snapshot.view().style;
    let config = a4_page_config(style.font_family);
    let pagination = paginate(&snapshot.lines(), &config);
    debug!(
        "Paginated revision {} onto {} page(s), last page {:.0}% full",
        snapshot.revision(),
        pagination.page_count(),
        pagination.last_page_fill() * 100.0
    );

    let title = snapshot.view().header.full_name.clone();
    let body = render_pdf(&pagination, &config, style.color_theme.accent_rgb(), &title);

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(export_date(snapshot.captured_at())));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&body)?;
    tmp.persist(&path)?;

    info!("Wrote {} ({} bytes)", path.display(), body.len());
    Ok(ExportReceipt {
        path,
        pages: pagination.page_count(),
        bytes: body.len() as u64,
        revision: snapshot.revision(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// PDF writer
// ────────────────────────────────────────────────────────────────────────────

const REGULAR_FONT: u32 = 3;
const BOLD_FONT: u32 = 4;
const INFO: u32 = 5;
const FIRST_PAGE: u32 = 6;

/// Serializes the pages. Object layout: 1 catalog, 2 page tree, 3-4 fonts,
/// 5 info, then a page object and a content stream per page.
pub fn render_pdf(
    pagination: &Pagination,
    config: &PageConfig,
    accent: (f32, f32, f32),
    title: &str,
) -> Vec<u8> {
    let page_width_pt = config.width_pt;
    let page_height = pagination.page_height_pt;
    let page_count = pagination.pages.len().max(1) as u32;
    let page_ids: Vec<u32> = (0..page_count).map(|i| FIRST_PAGE + i * 2).collect();

    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

    let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
            kids.join(" ")
        )
        .into_bytes(),
    );
    objects.push(font_object(config.font.face(false).base_name()));
    objects.push(font_object(config.font.face(true).base_name()));
    objects.push(format!("<< /Title ({}) /Producer (builder) >>", escape_text(title)).into_bytes());

    for (index, page_id) in page_ids.iter().enumerate() {
        let content = match pagination.pages.get(index) {
            Some(page) => page_content(page, page_width_pt, page_height, accent),
            None => String::new(),
        };
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_width_pt:.2} {page_height:.2}] \
                 /Resources << /Font << /F1 {REGULAR_FONT} 0 R /F2 {BOLD_FONT} 0 R >> >> \
                 /Contents {} 0 R >>",
                page_id + 1
            )
            .into_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content.as_bytes());
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(object);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

fn font_object(base: &str) -> Vec<u8> {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
        .into_bytes()
}

fn page_content(
    page: &crate::layout::Page,
    page_width_pt: f32,
    page_height_pt: f32,
    (r, g, b): (f32, f32, f32),
) -> String {
    let mut content = String::new();
    for line in &page.lines {
        let font = if line.style.is_bold() { "F2" } else { "F1" };
        let size = line.style.font_size_pt();
        let y = page_height_pt - line.baseline_pt;
        let colour = match line.style {
            LineStyle::Heading => format!("{r:.3} {g:.3} {b:.3} rg"),
            LineStyle::Meta => "0.35 0.35 0.35 rg".to_string(),
            _ => "0 0 0 rg".to_string(),
        };
        let _ = writeln!(
            content,
            "BT /{font} {size:.1} Tf {colour} {:.2} {y:.2} Td ({}) Tj ET",
            line.x_pt,
            escape_text(&line.text)
        );

        if line.style == LineStyle::Heading {
            let rule_y = y - 4.0;
            let _ = writeln!(
                content,
                "{r:.3} {g:.3} {b:.3} RG 0.8 w {:.2} {rule_y:.2} m {:.2} {rule_y:.2} l S",
                line.x_pt,
                page_width_pt - line.x_pt
            );
        }
    }
    content
}

/// Escapes a string for a PDF literal, mapping to WinAnsi. Characters the
/// encoding lacks become '?'.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\t' | '\n' | '\r' => out.push(' '),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", ch as u32);
            }
            _ => match win_ansi_extra(ch) {
                Some(code) => {
                    let _ = write!(out, "\\{code:03o}");
                }
                None => out.push('?'),
            },
        }
    }
    out
}

fn win_ansi_extra(ch: char) -> Option<u8> {
    Some(match ch {
        '\u{20ac}' => 0x80,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::forms::Forms;
    use crate::layout::{FontFamily, StyledLine};
    use crate::models::{Experience, PersonalInfoPatch};
    use crate::store::DocumentStore;

    fn snapshot_with_experience(count: usize) -> RenderedSnapshot {
        let mut store = DocumentStore::new();
        store.update_personal_info(PersonalInfoPatch {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            ..PersonalInfoPatch::default()
        });
        for i in 0..count {
            store.add_entry(Experience {
                company: format!("Company {i}"),
                position: "Engineer".to_string(),
                start_date: "2020-01".to_string(),
                current: true,
                description: "Built things (carefully)\nShipped more things".to_string(),
                ..Experience::default()
            });
        }
        RenderedSnapshot::capture(&store.snapshot(), &mut Forms::new()).unwrap()
    }

    fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle.as_bytes())
            .count()
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a (b) \\c"), "a \\(b\\) \\\\c");
        assert_eq!(escape_text("café"), "caf\\351");
        assert_eq!(escape_text("2019 – 2020"), "2019 \\226 2020");
        assert_eq!(escape_text("日本"), "??");
    }

    #[test]
    fn test_file_name_uses_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "resume_2024-03-07.pdf");
    }

    #[test]
    fn test_file_date_is_utc() {
        let late = Utc
            .with_ymd_and_hms(2024, 3, 7, 23, 30, 0)
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(export_date(late), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    }

    #[test]
    fn test_garamond_is_drawn_in_times() {
        let config = a4_page_config(FontFamily::Garamond);
        let lines = vec![StyledLine::new(LineStyle::Body, "Rust")];
        let body = render_pdf(&paginate(&lines, &config), &config, (0.0, 0.0, 0.0), "");
        assert_eq!(count(&body, "/BaseFont /Times-Roman "), 1);
        assert_eq!(count(&body, "/BaseFont /Times-Bold "), 1);
        assert_eq!(count(&body, "Helvetica"), 0);
    }

    #[test]
    fn test_pdf_structure() {
        let config = a4_page_config(FontFamily::Inter);
        let lines = vec![
            StyledLine::new(LineStyle::Title, "Ada Lovelace"),
            StyledLine::new(LineStyle::Heading, "Skills"),
            StyledLine::new(LineStyle::Body, "Technical: Rust (4/4)"),
        ];
        let pagination = paginate(&lines, &config);
        let body = render_pdf(&pagination, &config, (0.0, 0.0, 1.0), "Ada Lovelace");

        assert!(body.starts_with(b"%PDF-1.4\n"));
        assert!(body.ends_with(b"%%EOF\n"));
        assert_eq!(count(&body, "/Type /Page "), 1);
        assert_eq!(count(&body, "(Ada Lovelace) Tj"), 1);
        assert_eq!(count(&body, " l S"), 1);

        // startxref must point at the xref keyword.
        let text = String::from_utf8_lossy(&body);
        let start: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(body[start..].starts_with(b"xref"));
    }

    #[test]
    fn test_no_pages_still_yields_a_valid_document() {
        let config = a4_page_config(FontFamily::Lato);
        let pagination = paginate(&[], &config);
        let body = render_pdf(&pagination, &config, (0.0, 0.0, 0.0), "");
        assert_eq!(count(&body, "/Type /Page "), 1);
        assert_eq!(count(&body, "/Count 1"), 1);
    }

    #[tokio::test]
    async fn test_export_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = PdfExporter::new(dir.path().join("exports"));
        let snapshot = snapshot_with_experience(1);
        let expected = export_file_name(export_date(snapshot.captured_at()));

        let receipt = exporter.export(snapshot).await.unwrap();

        assert_eq!(receipt.path, dir.path().join("exports").join(expected));
        assert_eq!(receipt.pages, 1);
        let body = std::fs::read(&receipt.path).unwrap();
        assert_eq!(body.len() as u64, receipt.bytes);
        assert_eq!(count(&body, "(Present)"), 0);
        assert_eq!(count(&body, "Jan 2020 - Present"), 1);
        assert_eq!(count(&body, "Built things \\(carefully\\)"), 1);
    }

    #[tokio::test]
    async fn test_long_resume_spans_several_pages() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = PdfExporter::new(dir.path());
        let receipt = exporter.export(snapshot_with_experience(40)).await.unwrap();
        assert!(receipt.pages > 1);
        let body = std::fs::read(&receipt.path).unwrap();
        assert_eq!(count(&body, "/Type /Page "), receipt.pages);
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let exporter = PdfExporter::new(blocker.join("exports"));
        let err = exporter.export(snapshot_with_experience(1)).await.unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
