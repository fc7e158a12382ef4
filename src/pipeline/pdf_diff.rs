// src/pipeline/pdf_diff.rs

//! Structural change sets between two PDF versions, rendered as one
//! annotated raster image.
//!
//! Text is extracted per page with `lopdf`, page texts are line-diffed
//! with `similar`, and the result is drawn as a schematic sheet: pages
//! stacked vertically, one bar per line, with strike / underline / box
//! markup on removed / added / replaced lines. The sheet deliberately
//! draws no glyphs; bar widths follow line lengths, which is enough to
//! see where a document changed.

use image::{Rgba, RgbaImage};
use lopdf::Document;
use similar::{ChangeTag, DiffOp, TextDiff};

use crate::error::Result;
use crate::models::DiffConfig;

/// Markup applied to one line of the rendered sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMark {
    Unchanged,
    /// Present only in the old version; drawn struck through.
    Removed,
    /// Present only in the new version; drawn underlined.
    Added,
    /// Old/new line pair at the same position; drawn boxed.
    Replaced,
}

/// One line slot of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedLine {
    pub text: String,
    pub mark: LineMark,
}

/// Line-level changes of one page position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChanges {
    /// 1-based page number
    pub number: usize,
    pub lines: Vec<MarkedLine>,
}

impl PageChanges {
    pub fn changed_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.mark != LineMark::Unchanged)
            .count()
    }
}

/// Page-by-page change set between two PDF documents.
#[derive(Debug)]
pub struct PdfChangeSet {
    pub pages: Vec<PageChanges>,
}

impl PdfChangeSet {
    /// Diff two page-text vectors. Pages are paired by position; a
    /// version with fewer pages contributes empty text for the rest.
    pub fn compute(old: &[Vec<String>], new: &[Vec<String>]) -> Self {
        let count = old.len().max(new.len());
        let empty: Vec<String> = Vec::new();
        let mut pages = Vec::with_capacity(count);

        for index in 0..count {
            let old_text = old.get(index).unwrap_or(&empty).join("\n");
            let new_text = new.get(index).unwrap_or(&empty).join("\n");
            pages.push(PageChanges {
                number: index + 1,
                lines: diff_page(&old_text, &new_text),
            });
        }

        Self { pages }
    }

    pub fn has_changes(&self) -> bool {
        self.pages.iter().any(|p| p.changed_lines() > 0)
    }
}

/// Extract and diff both documents in one step.
pub fn changes_between(old_pdf: &[u8], new_pdf: &[u8]) -> Result<PdfChangeSet> {
    let old_pages = extract_pages(old_pdf)?;
    let new_pages = extract_pages(new_pdf)?;
    Ok(PdfChangeSet::compute(&old_pages, &new_pages))
}

/// Per-page text lines of a PDF document. A page whose text cannot be
/// extracted contributes an empty page rather than failing the diff.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();
    let mut result = Vec::with_capacity(pages.len());
    for (i, _) in pages.iter().enumerate() {
        let text = doc.extract_text(&[(i + 1) as u32]).unwrap_or_default();
        result.push(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        );
    }
    Ok(result)
}

fn diff_page(old_text: &str, new_text: &str) -> Vec<MarkedLine> {
    let diff = TextDiff::from_lines(old_text, new_text);
    let mut lines = Vec::new();

    for op in diff.ops() {
        let replace = matches!(op, DiffOp::Replace { .. });
        for change in diff.iter_changes(op) {
            let text = change.value().trim_end_matches('\n').to_string();
            let mark = match change.tag() {
                ChangeTag::Equal => LineMark::Unchanged,
                ChangeTag::Delete if replace => LineMark::Replaced,
                ChangeTag::Delete => LineMark::Removed,
                ChangeTag::Insert if replace => LineMark::Replaced,
                ChangeTag::Insert => LineMark::Added,
            };
            lines.push(MarkedLine { text, mark });
        }
    }
    lines
}

/// Rendering options for PDF change sheets.
///
/// Built once from configuration; fields are read-only afterwards.
#[derive(Debug, Clone)]
pub struct PdfRenderOptions {
    /// Pixel width of the rendered sheet
    pub render_width: u32,

    /// Strike bars through removed lines
    pub strike_removed: bool,

    /// Underline added lines
    pub underline_added: bool,

    /// Box replaced lines
    pub box_replaced: bool,
}

impl Default for PdfRenderOptions {
    fn default() -> Self {
        Self {
            render_width: 1920,
            strike_removed: true,
            underline_added: true,
            box_replaced: true,
        }
    }
}

impl PdfRenderOptions {
    pub fn from_config(config: &DiffConfig) -> Self {
        Self {
            render_width: config.render_width,
            ..Self::default()
        }
    }
}

const MARGIN: u32 = 40;
const LINE_HEIGHT: u32 = 28;
const BAR_HEIGHT: u32 = 12;
const PAGE_HEADER: u32 = 24;
const PAGE_GAP: u32 = 36;
const CHAR_WIDTH: u32 = 9;
const MIN_BAR_WIDTH: u32 = 24;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PAGE_RULE: Rgba<u8> = Rgba([55, 62, 71, 255]);
const UNCHANGED_BAR: Rgba<u8> = Rgba([225, 228, 232, 255]);
const REMOVED_BAR: Rgba<u8> = Rgba([255, 205, 210, 255]);
const STRIKE: Rgba<u8> = Rgba([179, 38, 30, 255]);
const ADDED_BAR: Rgba<u8> = Rgba([200, 230, 201, 255]);
const UNDERLINE: Rgba<u8> = Rgba([27, 94, 32, 255]);
const REPLACED_BAR: Rgba<u8> = Rgba([255, 224, 178, 255]);
const BOX: Rgba<u8> = Rgba([230, 81, 0, 255]);

/// Draw the change set as one vertical sheet.
pub fn render_change_image(set: &PdfChangeSet, options: &PdfRenderOptions) -> RgbaImage {
    let width = options.render_width.max(MARGIN * 2 + MIN_BAR_WIDTH);
    let content_width = width - MARGIN * 2;

    let body: u32 = set
        .pages
        .iter()
        .map(|p| PAGE_HEADER + p.lines.len() as u32 * LINE_HEIGHT)
        .sum::<u32>()
        + PAGE_GAP * (set.pages.len().saturating_sub(1)) as u32;
    let height = (MARGIN * 2 + body).max(MARGIN * 2 + BAR_HEIGHT);

    let mut img = RgbaImage::from_pixel(width, height, WHITE);
    let mut y = MARGIN;

    for (i, page) in set.pages.iter().enumerate() {
        if i > 0 {
            y += PAGE_GAP;
        }

        // Page separator rule
        fill_rect(&mut img, MARGIN, y, content_width, 2, PAGE_RULE);
        y += PAGE_HEADER;

        for line in &page.lines {
            let chars = line.text.chars().count() as u32;
            let bar_width = (chars * CHAR_WIDTH).clamp(MIN_BAR_WIDTH, content_width);
            let bar_y = y + (LINE_HEIGHT - BAR_HEIGHT) / 2;

            let bar_color = match line.mark {
                LineMark::Unchanged => UNCHANGED_BAR,
                LineMark::Removed => REMOVED_BAR,
                LineMark::Added => ADDED_BAR,
                LineMark::Replaced => REPLACED_BAR,
            };
            fill_rect(&mut img, MARGIN, bar_y, bar_width, BAR_HEIGHT, bar_color);

            match line.mark {
                LineMark::Removed if options.strike_removed => {
                    fill_rect(
                        &mut img,
                        MARGIN,
                        bar_y + BAR_HEIGHT / 2 - 1,
                        bar_width,
                        2,
                        STRIKE,
                    );
                }
                LineMark::Added if options.underline_added => {
                    fill_rect(&mut img, MARGIN, bar_y + BAR_HEIGHT + 2, bar_width, 2, UNDERLINE);
                }
                LineMark::Replaced if options.box_replaced => {
                    outline_rect(
                        &mut img,
                        MARGIN.saturating_sub(3),
                        bar_y.saturating_sub(3),
                        bar_width + 6,
                        BAR_HEIGHT + 6,
                        BOX,
                    );
                }
                _ => {}
            }

            y += LINE_HEIGHT;
        }
    }

    img
}

/// Fill a rectangle, clipped to the image bounds.
fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    for dy in 0..h {
        for dx in 0..w {
            let px = x + dx;
            let py = y + dy;
            if px < img.width() && py < img.height() {
                img.put_pixel(px, py, color);
            }
        }
    }
}

/// Draw a 2px rectangle outline, clipped to the image bounds.
fn outline_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    fill_rect(img, x, y, w, 2, color);
    fill_rect(img, x, y + h.saturating_sub(2), w, 2, color);
    fill_rect(img, x, y, 2, h, color);
    fill_rect(img, x + w.saturating_sub(2), y, 2, h, color);
}

/// Build a minimal single-page PDF showing the given lines. Shared by
/// tests across the pipeline that need real PDF bytes.
#[cfg(test)]
pub(crate) fn sample_pdf(text_lines: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![50.into(), 700.into()]),
    ];
    for line in text_lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn compute_marks_replacement() {
        let old = vec![lines(&["alpha", "beta"])];
        let new = vec![lines(&["alpha", "gamma"])];

        let set = PdfChangeSet::compute(&old, &new);
        assert!(set.has_changes());
        assert_eq!(set.pages.len(), 1);

        let marks: Vec<_> = set.pages[0].lines.iter().map(|l| l.mark).collect();
        assert_eq!(
            marks,
            vec![LineMark::Unchanged, LineMark::Replaced, LineMark::Replaced]
        );
    }

    #[test]
    fn compute_marks_pure_removal_and_addition() {
        let removed = PdfChangeSet::compute(
            &[lines(&["keep", "drop"])],
            &[lines(&["keep"])],
        );
        assert!(
            removed.pages[0]
                .lines
                .iter()
                .any(|l| l.mark == LineMark::Removed)
        );

        let added = PdfChangeSet::compute(&[lines(&["keep"])], &[lines(&["keep", "fresh"])]);
        assert!(added.pages[0].lines.iter().any(|l| l.mark == LineMark::Added));
    }

    #[test]
    fn compute_pairs_missing_pages_as_empty() {
        let set = PdfChangeSet::compute(
            &[lines(&["one"])],
            &[lines(&["one"]), lines(&["second page"])],
        );
        assert_eq!(set.pages.len(), 2);
        assert_eq!(set.pages[1].number, 2);
        assert!(
            set.pages[1]
                .lines
                .iter()
                .all(|l| l.mark == LineMark::Added)
        );
    }

    #[test]
    fn identical_pages_have_no_changes() {
        let pages = vec![lines(&["same", "text"])];
        let set = PdfChangeSet::compute(&pages, &pages);
        assert!(!set.has_changes());
        assert_eq!(set.pages[0].changed_lines(), 0);
    }

    #[test]
    fn extract_pages_reads_generated_pdf() {
        let bytes = sample_pdf(&["Hello World", "Second Line"]);
        let pages = extract_pages(&bytes).unwrap();

        assert_eq!(pages.len(), 1);
        let joined = pages[0].join("\n");
        assert!(joined.contains("Hello"), "extracted: {joined:?}");
    }

    #[test]
    fn extract_pages_rejects_garbage() {
        assert!(extract_pages(b"not a pdf").is_err());
    }

    #[test]
    fn changes_between_generated_pdfs() {
        let old = sample_pdf(&["Hello World"]);
        let new = sample_pdf(&["Hello Changed World"]);

        let set = changes_between(&old, &new).unwrap();
        assert!(set.has_changes());
    }

    #[test]
    fn render_uses_configured_width_and_marks() {
        let set = PdfChangeSet::compute(
            &[lines(&["context", "removed line"])],
            &[lines(&["context", "added line", "extra"])],
        );
        let options = PdfRenderOptions::default();
        let img = render_change_image(&set, &options);

        assert_eq!(img.width(), 1920);
        assert!(img.height() > MARGIN * 2);
        // Some non-background markup must be present.
        assert!(img.pixels().any(|p| *p != WHITE));
    }

    #[test]
    fn render_strikes_removed_lines() {
        let set = PdfChangeSet::compute(&[lines(&["gone"])], &[Vec::new()]);
        let img = render_change_image(&set, &PdfRenderOptions::default());
        assert!(img.pixels().any(|p| *p == STRIKE));

        let plain = render_change_image(
            &set,
            &PdfRenderOptions {
                strike_removed: false,
                ..PdfRenderOptions::default()
            },
        );
        assert!(!plain.pixels().any(|p| *p == STRIKE));
    }

    #[test]
    fn render_empty_set_is_blank_sheet() {
        let set = PdfChangeSet { pages: Vec::new() };
        let img = render_change_image(&set, &PdfRenderOptions::default());
        assert_eq!(img.width(), 1920);
        assert!(img.pixels().all(|p| *p == WHITE));
    }
}
