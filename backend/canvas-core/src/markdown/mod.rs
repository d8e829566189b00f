//! Restricted Markdown to structural markup.
//!
//! This is deliberately not a CommonMark parser. The server pushes a small
//! Markdown dialect (headings, lists, fenced code, bold/italic/inline code)
//! and this module converts it in a single forward pass over lines. Raw text
//! is entity-escaped before any other processing, so untrusted input cannot
//! smuggle markup through; only tags generated here reach the output.
//!
//! Known simplification: inline formatting is applied bold, then italic, then
//! inline code on the whole line with non-greedy matches. Pathological inputs
//! with interleaved markers can produce non-minimal nesting. That tradeoff is
//! accepted; rendering stays total and deterministic.

use once_cell::sync::Lazy;
use regex::Regex;

const CODE_FENCE: &str = "```";

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").expect("heading pattern"));
static UNORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-\s+").expect("unordered marker pattern"));
static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+").expect("ordered marker pattern"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("italic pattern"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.+?)`").expect("code pattern"));

/// Which list element is currently open, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn open_tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "<ul>",
            ListKind::Ordered => "<ol>",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "</ul>",
            ListKind::Ordered => "</ol>",
        }
    }
}

/// State threaded through the line scan.
#[derive(Default)]
struct LineScan {
    in_code_block: bool,
    list: Option<ListKind>,
}

impl LineScan {
    fn close_list(&mut self, out: &mut String) {
        if let Some(kind) = self.list.take() {
            out.push_str(kind.close_tag());
        }
    }
}

/// Convert restricted Markdown into structural markup.
///
/// Total: malformed input degrades into paragraphs or literal code text, it
/// never fails. Rendering the same input twice yields byte-identical output.
pub fn render(markdown: &str) -> String {
    let mut out = String::new();
    let mut scan = LineScan::default();

    for line in markdown.split('\n') {
        // Fence toggles code mode; everything inside is emitted verbatim.
        if line.trim().starts_with(CODE_FENCE) {
            if scan.in_code_block {
                out.push_str("</code></pre>");
                scan.in_code_block = false;
            } else {
                scan.close_list(&mut out);
                out.push_str("<pre><code>");
                scan.in_code_block = true;
            }
            continue;
        }

        if scan.in_code_block {
            out.push_str(&escape_text(line));
            out.push('\n');
            continue;
        }

        if let Some(captures) = HEADING.captures(line) {
            scan.close_list(&mut out);
            let level = captures[1].len();
            let text = apply_inline(&escape_text(&captures[2]));
            out.push_str(&format!("<h{level}>{text}</h{level}>"));
            continue;
        }

        let unordered = UNORDERED_MARKER.is_match(line);
        let ordered = ORDERED_MARKER.is_match(line);
        if unordered || ordered {
            let kind = if unordered {
                ListKind::Unordered
            } else {
                ListKind::Ordered
            };
            // A kind switch closes the open list; same-kind items accumulate.
            if scan.list != Some(kind) {
                scan.close_list(&mut out);
            }
            if scan.list.is_none() {
                out.push_str(kind.open_tag());
                scan.list = Some(kind);
            }
            let item = if unordered {
                UNORDERED_MARKER.replace(line, "")
            } else {
                ORDERED_MARKER.replace(line, "")
            };
            out.push_str("<li>");
            out.push_str(&apply_inline(&escape_text(&item)));
            out.push_str("</li>");
            continue;
        }

        scan.close_list(&mut out);

        if line.trim().is_empty() {
            out.push_str("<br />");
        } else {
            let text = apply_inline(&escape_text(line));
            out.push_str(&format!("<p>{text}</p>"));
        }
    }

    // An unterminated fence is closed implicitly; buffered text stays emitted.
    if scan.in_code_block {
        out.push_str("</code></pre>");
    }
    scan.close_list(&mut out);

    out
}

/// Entity-escape raw text. Applied to input content only, never to markup
/// this module generates.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn apply_inline(text: &str) -> String {
    let bolded = BOLD.replace_all(text, "<strong>$1</strong>");
    let emphasized = ITALIC.replace_all(&bolded, "<em>$1</em>");
    INLINE_CODE
        .replace_all(&emphasized, "<code>$1</code>")
        .into_owned()
}
