//! Dialogue text layout: page splitting and positional templates
//!
//! Raw dialogue strings are cut into pages that fit the NPC text box. A page
//! holds at most `max_lines_per_page` lines of `max_chars_per_line` characters;
//! the page-break sentinel forces a new page early.

use serde::{Deserialize, Serialize};

use crate::error::{NpcError, NpcResult};

/// Character that forces a page break inside authored dialogue
pub const PAGE_BREAK: char = '¢';

/// Text box geometry used for pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub max_chars_per_line: usize,
    pub max_lines_per_page: usize,
    pub page_break: char,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            max_chars_per_line: 35,
            max_lines_per_page: 3,
            page_break: PAGE_BREAK,
        }
    }
}

impl PageLayout {
    pub fn new(max_chars_per_line: usize, max_lines_per_page: usize) -> Self {
        Self {
            max_chars_per_line,
            max_lines_per_page,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> NpcResult<()> {
        if self.max_chars_per_line == 0 || self.max_lines_per_page == 0 {
            return Err(NpcError::InvalidArgument(format!(
                "page layout must be at least 1x1, got {}x{}",
                self.max_chars_per_line, self.max_lines_per_page
            )));
        }
        Ok(())
    }
}

/// Split raw dialogue into text box pages.
///
/// Literal newlines are dropped and lines are re-wrapped by character count.
/// The last page is only kept when at least one page break happened before
/// it, so a short text without a sentinel produces no pages at all. Once a
/// break has happened the last page is kept even when empty, so a trailing
/// sentinel leaves an empty page behind.
pub fn paginate(raw: Option<&str>, layout: &PageLayout) -> NpcResult<Vec<String>> {
    let raw = raw.ok_or_else(|| NpcError::InvalidArgument("cannot paginate absent text".into()))?;
    layout.validate()?;

    let mut pages = Vec::new();
    let mut page = String::new();
    let mut line_len = 0;
    let mut lines_left = layout.max_lines_per_page;

    for c in raw.chars() {
        if c == '\n' {
            continue;
        }

        if c == layout.page_break {
            pages.push(std::mem::take(&mut page));
            line_len = 0;
            lines_left = layout.max_lines_per_page;
            continue;
        }

        if line_len == layout.max_chars_per_line {
            line_len = 0;
            lines_left -= 1;
            if lines_left == 0 {
                pages.push(std::mem::take(&mut page));
                lines_left = layout.max_lines_per_page;
            } else {
                page.push('\n');
            }
        }

        page.push(c);
        line_len += 1;
    }

    if !pages.is_empty() {
        pages.push(page);
    }
    Ok(pages)
}

/// Join authored lines, fill `{n}` placeholders from `args`, and split again.
///
/// With no arguments the text is passed through untouched.
pub fn format_template(lines: Option<&[String]>, args: &[String]) -> NpcResult<Vec<String>> {
    let lines = lines.ok_or_else(|| NpcError::InvalidArgument("cannot format absent text".into()))?;
    let joined = lines.join("\n");
    let formatted = if args.is_empty() {
        joined
    } else {
        substitute(&joined, args)?
    };
    Ok(formatted.split('\n').map(str::to_string).collect())
}

/// Replace `{0}`, `{1}`, ... with the matching argument. `{{` and `}}` escape braces.
pub fn substitute(template: &str, args: &[String]) -> NpcResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        Some(other) => {
                            return Err(NpcError::Template(format!(
                                "unexpected '{}' in placeholder of \"{}\"",
                                other, template
                            )))
                        }
                        None => {
                            return Err(NpcError::Template(format!(
                                "unclosed placeholder in \"{}\"",
                                template
                            )))
                        }
                    }
                }
                let index: usize = digits.parse().map_err(|_| {
                    NpcError::Template(format!("empty placeholder in \"{}\"", template))
                })?;
                let arg = args.get(index).ok_or_else(|| {
                    NpcError::Template(format!(
                        "placeholder {{{}}} but only {} argument(s)",
                        index,
                        args.len()
                    ))
                })?;
                out.push_str(arg);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(NpcError::Template(format!(
                    "stray '}}' in \"{}\"",
                    template
                )))
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}
