// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Line-level markdown classification.
//!
//! This module turns markdown meeting notes into a flat list of [`Block`]s,
//! one per source line. Only the constructs that map onto Google Docs
//! paragraph formatting are recognized; everything else is plain text.
//!
//! # Recognized Lines
//!
//! - `#` through `######` headings (at column 0, followed by a space)
//! - `- [ ]` / `- [x]` checklist items, optionally indented
//! - `-`, `*` and `+` bullets, optionally indented
//! - footer lines such as `Meeting recorded by: ...`
//! - horizontal rules (`---`, `***`, `___`), kept as spacer lines
//! - blank lines and plain paragraphs
//!
//! # Example
//!
//! ```
//! use md2gdoc::parser::{parse_markdown, BlockKind, ParseOptions};
//!
//! let md = "# Sync\n- Ship it @alice\n  - [x] Tests\n";
//! let blocks = parse_markdown(md, &ParseOptions::default());
//!
//! assert_eq!(blocks.len(), 3);
//! assert_eq!(blocks[0].kind, BlockKind::Heading(1));
//! assert_eq!(blocks[1].text, "Ship it @alice");
//! assert_eq!(blocks[2].kind, BlockKind::Checkbox { checked: true });
//! assert_eq!(blocks[2].level, 1);
//! ```

/// Deepest heading level Google Docs has a named style for.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Footer prefixes used when none are configured.
pub const DEFAULT_FOOTER_PREFIXES: [&str; 2] = ["Meeting recorded by:", "Duration:"];

/// The kind of construct a source line was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// A heading with its level (1-6).
    Heading(u8),

    /// A bulleted list item.
    Bullet,

    /// A checklist item.
    Checkbox {
        /// Whether the item was written as `[x]` or `[X]`.
        checked: bool,
    },

    /// A footer line, styled smaller and muted.
    Footer,

    /// Plain text.
    Paragraph,

    /// An empty line. Horizontal rules also become blank spacer lines.
    Blank,
}

/// A single classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// What the line was classified as.
    pub kind: BlockKind,

    /// The line content with list and heading markers removed and
    /// surrounding whitespace trimmed.
    pub text: String,

    /// List nesting depth. Always 0 for non-list blocks.
    pub level: usize,
}

impl Block {
    /// Creates a non-list block.
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            level: 0,
        }
    }

    /// Creates an empty spacer block.
    #[must_use]
    pub const fn blank() -> Self {
        Self {
            kind: BlockKind::Blank,
            text: String::new(),
            level: 0,
        }
    }

    /// Creates a list block (bullet or checklist item) at the given depth.
    pub fn list_item(kind: BlockKind, text: impl Into<String>, level: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            level,
        }
    }

    /// Returns `true` for bullets and checklist items.
    #[must_use]
    pub const fn is_list_item(&self) -> bool {
        matches!(self.kind, BlockKind::Bullet | BlockKind::Checkbox { .. })
    }
}

/// Options controlling line classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Number of indentation columns per list nesting level.
    ///
    /// A leading tab counts as one full level. Must be non-zero.
    pub indent_width: usize,

    /// Line prefixes that mark footer lines.
    pub footer_prefixes: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            footer_prefixes: DEFAULT_FOOTER_PREFIXES.map(str::to_owned).to_vec(),
        }
    }
}

/// Parses markdown text into one [`Block`] per line.
///
/// Both `\n` and `\r\n` line endings are accepted. A trailing newline does
/// not produce an extra block.
#[must_use]
pub fn parse_markdown(text: &str, opts: &ParseOptions) -> Vec<Block> {
    text.lines().map(|line| classify_line(line, opts)).collect()
}

/// Classifies a single line.
///
/// Checks run in a fixed order and the first match wins: blank, heading,
/// checklist item, bullet, footer, horizontal rule, paragraph.
#[must_use]
pub fn classify_line(line: &str, opts: &ParseOptions) -> Block {
    if line.trim().is_empty() {
        return Block::blank();
    }

    if let Some((level, text)) = heading(line) {
        return Block::new(BlockKind::Heading(level), text);
    }

    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    if let Some((checked, text)) = checkbox(body) {
        return Block::list_item(
            BlockKind::Checkbox { checked },
            text,
            nesting_level(indent, opts.indent_width),
        );
    }

    if let Some(text) = bullet(body) {
        return Block::list_item(
            BlockKind::Bullet,
            text,
            nesting_level(indent, opts.indent_width),
        );
    }

    if opts
        .footer_prefixes
        .iter()
        .any(|prefix| line.starts_with(prefix.as_str()))
    {
        return Block::new(BlockKind::Footer, line.trim());
    }

    if is_horizontal_rule(line.trim()) {
        return Block::blank();
    }

    Block::new(BlockKind::Paragraph, line.trim())
}

/// Matches `#{1,6} text` at the start of the line.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    let level = u8::try_from(hashes)
        .ok()
        .filter(|level| (1..=MAX_HEADING_LEVEL).contains(level))?;
    let text = line[hashes..].strip_prefix(' ')?;
    Some((level, text.trim()))
}

/// Matches `- [ ] text` or `- [x] text` with indentation already removed.
///
/// Exactly one whitespace character separates the dash from the brackets,
/// and at least one must follow them.
fn checkbox(body: &str) -> Option<(bool, &str)> {
    let mut chars = body.strip_prefix('-')?.chars();
    if !chars.next()?.is_whitespace() {
        return None;
    }
    let rest = chars.as_str();

    let (checked, rest) = if let Some(rest) = rest.strip_prefix("[ ]") {
        (false, rest)
    } else if let Some(rest) = rest
        .strip_prefix("[x]")
        .or_else(|| rest.strip_prefix("[X]"))
    {
        (true, rest)
    } else {
        return None;
    };

    rest.starts_with(char::is_whitespace)
        .then(|| (checked, rest.trim()))
}

/// Matches `- text`, `* text` or `+ text` with indentation already removed.
fn bullet(body: &str) -> Option<&str> {
    let rest = body.strip_prefix(['-', '*', '+'])?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

/// Converts leading indentation into a nesting depth.
fn nesting_level(indent: &str, indent_width: usize) -> usize {
    let width = indent_width.max(1);
    let columns: usize = indent
        .chars()
        .map(|c| if c == '\t' { width } else { 1 })
        .sum();
    columns / width
}

/// Returns `true` for `---`, `***`, `___` and longer runs of one of them.
fn is_horizontal_rule(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    matches!(first, '-' | '*' | '_') && trimmed.len() >= 3 && chars.all(|c| c == first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(md: &str) -> Vec<Block> {
        parse_markdown(md, &ParseOptions::default())
    }

    fn single(line: &str) -> Block {
        classify_line(line, &ParseOptions::default())
    }

    #[test]
    fn parses_empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn trailing_newline_adds_no_block() {
        assert_eq!(parse("Hello\n").len(), 1);
        assert_eq!(parse("Hello\r\nWorld\r\n").len(), 2);
    }

    #[test]
    fn classifies_headings() {
        assert_eq!(single("# Title"), Block::new(BlockKind::Heading(1), "Title"));
        assert_eq!(single("## Agenda"), Block::new(BlockKind::Heading(2), "Agenda"));
        assert_eq!(single("### Notes  "), Block::new(BlockKind::Heading(3), "Notes"));
        assert_eq!(single("###### Deep").kind, BlockKind::Heading(6));
    }

    #[test]
    fn too_many_hashes_is_paragraph() {
        let block = single("####### Seven");
        assert_eq!(block.kind, BlockKind::Paragraph);
        assert_eq!(block.text, "####### Seven");
    }

    #[test]
    fn heading_requires_space_and_column_zero() {
        assert_eq!(single("#hashtag").kind, BlockKind::Paragraph);
        assert_eq!(single("  # Indented").kind, BlockKind::Paragraph);
    }

    #[test]
    fn heading_with_no_text() {
        assert_eq!(single("# "), Block::new(BlockKind::Heading(1), ""));
    }

    #[test]
    fn classifies_bullets() {
        for line in ["- item", "* item", "+ item", "-   item  "] {
            assert_eq!(
                single(line),
                Block::list_item(BlockKind::Bullet, "item", 0),
                "line: {line:?}"
            );
        }
    }

    #[test]
    fn bullet_nesting_follows_indent_width() {
        let blocks = parse("- top\n  - second\n    - third\n   - odd");
        let levels: Vec<usize> = blocks.iter().map(|b| b.level).collect();
        assert_eq!(levels, [0, 1, 2, 1]);
    }

    #[test]
    fn custom_indent_width() {
        let opts = ParseOptions {
            indent_width: 4,
            ..Default::default()
        };
        let blocks = parse_markdown("  - shallow\n    - nested\n        - deeper", &opts);
        let levels: Vec<usize> = blocks.iter().map(|b| b.level).collect();
        assert_eq!(levels, [0, 1, 2]);
    }

    #[test]
    fn tab_counts_as_one_level() {
        assert_eq!(single("\t- tabbed").level, 1);
        assert_eq!(single("\t\t- [ ] tabbed task").level, 2);
    }

    #[test]
    fn dash_without_space_is_not_a_bullet() {
        assert_eq!(single("-item").kind, BlockKind::Paragraph);
        assert_eq!(single("*emphasis*").kind, BlockKind::Paragraph);
    }

    #[test]
    fn classifies_checkboxes() {
        assert_eq!(
            single("- [ ] Write docs"),
            Block::list_item(BlockKind::Checkbox { checked: false }, "Write docs", 0)
        );
        assert_eq!(
            single("- [x] Ship"),
            Block::list_item(BlockKind::Checkbox { checked: true }, "Ship", 0)
        );
        assert_eq!(
            single("  - [X] Nested"),
            Block::list_item(BlockKind::Checkbox { checked: true }, "Nested", 1)
        );
    }

    #[test]
    fn checkbox_needs_whitespace_after_bracket() {
        // Falls through to a bullet whose text keeps the brackets.
        let block = single("- [ ]");
        assert_eq!(block.kind, BlockKind::Bullet);
        assert_eq!(block.text, "[ ]");

        let block = single("- [x]done");
        assert_eq!(block.kind, BlockKind::Bullet);
        assert_eq!(block.text, "[x]done");
    }

    #[test]
    fn checkbox_with_empty_text() {
        let block = single("- [ ] ");
        assert_eq!(block.kind, BlockKind::Checkbox { checked: false });
        assert!(block.text.is_empty());
    }

    #[test]
    fn star_checkbox_is_a_bullet() {
        let block = single("* [ ] task");
        assert_eq!(block.kind, BlockKind::Bullet);
        assert_eq!(block.text, "[ ] task");
    }

    #[test]
    fn unknown_box_marker_is_a_bullet() {
        let block = single("- [~] maybe");
        assert_eq!(block.kind, BlockKind::Bullet);
        assert_eq!(block.text, "[~] maybe");
    }

    #[test]
    fn classifies_footers() {
        assert_eq!(
            single("Meeting recorded by: Sam  "),
            Block::new(BlockKind::Footer, "Meeting recorded by: Sam")
        );
        assert_eq!(single("Duration: 45 minutes").kind, BlockKind::Footer);
    }

    #[test]
    fn indented_footer_prefix_is_paragraph() {
        assert_eq!(single("  Duration: 5m").kind, BlockKind::Paragraph);
    }

    #[test]
    fn custom_footer_prefixes() {
        let opts = ParseOptions {
            footer_prefixes: vec!["Notes taken by".into()],
            ..Default::default()
        };
        assert_eq!(
            classify_line("Notes taken by Pat", &opts).kind,
            BlockKind::Footer
        );
        assert_eq!(
            classify_line("Duration: 30m", &opts).kind,
            BlockKind::Paragraph
        );
    }

    #[test]
    fn horizontal_rules_become_blank() {
        for line in ["---", "***", "___", "-----", "  ---  "] {
            assert_eq!(single(line), Block::blank(), "line: {line:?}");
        }
    }

    #[test]
    fn spaced_rule_is_a_bullet() {
        // Bullets are checked before rules.
        assert_eq!(single("- - -"), Block::list_item(BlockKind::Bullet, "- -", 0));
        assert_eq!(single("* * *"), Block::list_item(BlockKind::Bullet, "* *", 0));
    }

    #[test]
    fn mixed_rule_characters_are_paragraphs() {
        assert_eq!(single("-*-").kind, BlockKind::Paragraph);
        assert_eq!(single("--").kind, BlockKind::Paragraph);
    }

    #[test]
    fn whitespace_only_lines_are_blank() {
        assert_eq!(single("   "), Block::blank());
        assert_eq!(single("\t"), Block::blank());
    }

    #[test]
    fn paragraphs_are_trimmed() {
        assert_eq!(
            single("   Just some text   "),
            Block::new(BlockKind::Paragraph, "Just some text")
        );
    }

    #[test]
    fn non_list_blocks_have_level_zero() {
        let blocks = parse("# H\n    plain\nDuration: 1h\n");
        assert!(blocks.iter().all(|b| b.level == 0));
    }

    #[test]
    fn parses_meeting_notes() {
        let md = "\
# Product Team Sync

## Action Items
- [ ] @sarah to draft the spec
  - [x] Collect feedback
* Review roadmap

---
Meeting recorded by: Alex
Duration: 30 minutes
";
        let kinds: Vec<BlockKind> = parse(md).iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            [
                BlockKind::Heading(1),
                BlockKind::Blank,
                BlockKind::Heading(2),
                BlockKind::Checkbox { checked: false },
                BlockKind::Checkbox { checked: true },
                BlockKind::Bullet,
                BlockKind::Blank,
                BlockKind::Blank,
                BlockKind::Footer,
                BlockKind::Footer,
            ]
        );
    }

    #[test]
    fn list_item_predicate() {
        assert!(Block::list_item(BlockKind::Bullet, "x", 0).is_list_item());
        assert!(Block::list_item(BlockKind::Checkbox { checked: false }, "x", 2).is_list_item());
        assert!(!Block::new(BlockKind::Paragraph, "x").is_list_item());
        assert!(!Block::blank().is_list_item());
    }
}
