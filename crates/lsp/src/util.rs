use crosscope_core::source;
use std::path::Path;
use tower_lsp::lsp_types::{Position, Range};

/// Lightweight container for document state
pub struct Document {
    pub content: String,
    pub language: String,
    pub version: i32,
}

impl Document {
    pub fn new(content: String, language: String, version: i32) -> Self {
        Self {
            content,
            language,
            version,
        }
    }
}

/// Language id derived from the file name, overriding whatever generic id
/// the client guessed for files it does not know.
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    if name.ends_with(".ebuild") || name.ends_with(".eclass") {
        return Some("ebuild");
    }
    match path.extension()?.to_str()? {
        "gn" | "gni" => Some("gn"),
        "c" | "h" => Some("c"),
        "cc" | "cpp" | "cxx" | "hh" | "hpp" => Some("cpp"),
        _ => None,
    }
}

fn line_str(content: &str, line: u32) -> &str {
    content.lines().nth(line as usize).unwrap_or("")
}

/// LSP positions count UTF-16 code units; parser positions count Unicode
/// scalar values. The two only differ outside the BMP, but clangd-adjacent
/// tooling is strict about this, so convert at the boundary.
pub fn to_core_position(content: &str, position: Position) -> source::Position {
    let mut utf16 = 0u32;
    let mut chars = 0u32;
    for c in line_str(content, position.line).chars() {
        if utf16 >= position.character {
            break;
        }
        utf16 += c.len_utf16() as u32;
        chars += 1;
    }
    source::Position::new(position.line, chars)
}

pub fn to_lsp_position(content: &str, position: source::Position) -> Position {
    let utf16: u32 = line_str(content, position.line)
        .chars()
        .take(position.character as usize)
        .map(|c| c.len_utf16() as u32)
        .sum();
    Position::new(position.line, utf16)
}

pub fn to_lsp_range(content: &str, range: source::Range) -> Range {
    Range::new(
        to_lsp_position(content, range.start),
        to_lsp_position(content, range.end),
    )
}

/// The identifier-ish word covering `position`, with its range.
pub fn word_at(content: &str, position: source::Position) -> Option<(String, source::Range)> {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    let chars: Vec<char> = line_str(content, position.line).chars().collect();
    let col = position.character as usize;
    if col >= chars.len() || !is_ident(chars[col]) {
        return None;
    }

    let mut start = col;
    while start > 0 && is_ident(chars[start - 1]) {
        start -= 1;
    }
    let mut end = col;
    while end < chars.len() && is_ident(chars[end]) {
        end += 1;
    }

    let word: String = chars[start..end].iter().collect();
    let range = source::Range::new(
        source::Position::new(position.line, start as u32),
        source::Position::new(position.line, end as u32),
    );
    Some((word, range))
}
