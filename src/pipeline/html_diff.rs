// src/pipeline/html_diff.rs

//! Static HTML comparison pages for changed text documents.
//!
//! Uses the `similar` crate (Myers diff algorithm) to group changes
//! into hunks with context, then renders a standalone page with inline
//! styling. The page is self-contained so published artifacts need no
//! assets next to them.

use similar::{ChangeTag, TextDiff};

use crate::models::DiffConfig;

/// Rendering options for HTML diff pages.
///
/// Built once from configuration and passed by reference; fields are
/// read-only after construction.
#[derive(Debug, Clone)]
pub struct HtmlDiffOptions {
    /// Unchanged lines kept around each change group
    pub context_lines: usize,

    /// Hard wrap column for long diff lines; `None` leaves lines as-is
    pub wrap_width: Option<usize>,

    /// Theme class embedded in the page body
    pub theme: String,

    /// Include per-hunk addition/removal counts in hunk headers
    pub verbose: bool,
}

impl Default for HtmlDiffOptions {
    fn default() -> Self {
        Self {
            context_lines: 3,
            wrap_width: None,
            theme: "vs".to_string(),
            verbose: false,
        }
    }
}

impl HtmlDiffOptions {
    pub fn from_config(config: &DiffConfig) -> Self {
        Self {
            context_lines: config.context_lines,
            theme: config.theme.clone(),
            ..Self::default()
        }
    }
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    old_no: Option<usize>,
    new_no: Option<usize>,
    kind: RowKind,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Context,
    Added,
    Removed,
}

impl RowKind {
    fn class(self) -> &'static str {
        match self {
            Self::Context => "ctx",
            Self::Added => "add",
            Self::Removed => "del",
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Self::Context => " ",
            Self::Added => "+",
            Self::Removed => "-",
        }
    }
}

/// A contiguous change group with its unified-diff coordinates.
#[derive(Debug)]
struct Hunk {
    old_start: usize,
    old_count: usize,
    new_start: usize,
    new_count: usize,
    rows: Vec<Row>,
}

/// Group changed lines into hunks with surrounding context.
fn collect_hunks(old: &str, new: &str, context_lines: usize) -> Vec<Hunk> {
    let diff = TextDiff::from_lines(old, new);
    let mut hunks = Vec::new();

    for group in diff.grouped_ops(context_lines) {
        let mut rows = Vec::new();
        let mut old_start = 0usize;
        let mut new_start = 0usize;
        let mut old_count = 0usize;
        let mut new_count = 0usize;
        let mut first = true;

        for op in &group {
            if first {
                old_start = op.old_range().start + 1;
                new_start = op.new_range().start + 1;
                first = false;
            }

            for change in diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                let kind = match change.tag() {
                    ChangeTag::Equal => {
                        old_count += 1;
                        new_count += 1;
                        RowKind::Context
                    }
                    ChangeTag::Delete => {
                        old_count += 1;
                        RowKind::Removed
                    }
                    ChangeTag::Insert => {
                        new_count += 1;
                        RowKind::Added
                    }
                };
                rows.push(Row {
                    old_no: change.old_index().map(|i| i + 1),
                    new_no: change.new_index().map(|i| i + 1),
                    kind,
                    text,
                });
            }
        }

        hunks.push(Hunk {
            old_start,
            old_count,
            new_start,
            new_count,
            rows,
        });
    }

    hunks
}

/// Render a standalone comparison page for old and new extracted text.
pub fn render_page(
    title: &str,
    date: &str,
    old: &str,
    new: &str,
    options: &HtmlDiffOptions,
) -> String {
    let hunks = collect_hunks(old, new, options.context_lines);

    let mut body = String::new();
    if hunks.is_empty() {
        body.push_str("<p class=\"empty\">No textual changes.</p>\n");
    }
    for hunk in &hunks {
        body.push_str("<tbody class=\"hunk\">\n");
        let mut header = format!(
            "@@ -{},{} +{},{} @@",
            hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
        );
        if options.verbose {
            let added = hunk.rows.iter().filter(|r| r.kind == RowKind::Added).count();
            let removed = hunk
                .rows
                .iter()
                .filter(|r| r.kind == RowKind::Removed)
                .count();
            header.push_str(&format!(" (+{added} / -{removed})"));
        }
        body.push_str(&format!(
            "<tr class=\"head\"><td colspan=\"4\">{}</td></tr>\n",
            escape_html(&header)
        ));

        for row in &hunk.rows {
            let pieces = match options.wrap_width {
                Some(width) => wrap_line(&row.text, width),
                None => vec![row.text.clone()],
            };
            for (i, piece) in pieces.iter().enumerate() {
                let (old_no, new_no) = if i == 0 {
                    (cell(row.old_no), cell(row.new_no))
                } else {
                    (String::new(), String::new())
                };
                body.push_str(&format!(
                    "<tr class=\"{}\"><td class=\"no\">{}</td><td class=\"no\">{}</td>\
                     <td class=\"mark\">{}</td><td class=\"text\">{}</td></tr>\n",
                    row.kind.class(),
                    old_no,
                    new_no,
                    row.kind.marker(),
                    escape_html(piece)
                ));
            }
        }
        body.push_str("</tbody>\n");
    }

    let table = if hunks.is_empty() {
        body
    } else {
        format!("<table class=\"diff\">\n{body}</table>\n")
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} {date}</title>\n<style>\n{STYLE}\n</style>\n</head>\n\
         <body class=\"theme-{theme}\">\n<h1>Changes: {title} ({date})</h1>\n{table}</body>\n</html>\n",
        title = escape_html(title),
        date = escape_html(date),
        theme = escape_html(&options.theme),
        table = table,
    )
}

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1.5em; }
table.diff { border-collapse: collapse; width: 100%; font-family: monospace; }
td { padding: 0 6px; vertical-align: top; white-space: pre-wrap; }
td.no { color: #888; text-align: right; user-select: none; width: 3em; }
td.mark { user-select: none; width: 1em; }
tr.add td.text, tr.add td.mark { background: #e6ffec; }
tr.del td.text, tr.del td.mark { background: #ffebe9; }
tr.head td { background: #f0f1f3; color: #57606a; padding: 4px 6px; }
p.empty { color: #57606a; }";

/// Escape text for placement inside an HTML element.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn cell(no: Option<usize>) -> String {
    no.map(|n| n.to_string()).unwrap_or_default()
}

/// Split a line into chunks of at most `width` characters.
fn wrap_line(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.chars().count() <= width {
        return vec![text.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    for (i, ch) in text.chars().enumerate() {
        if i > 0 && i % width == 0 {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
