// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Google Docs batch-update request generation.
//!
//! This module turns parsed [`Block`]s into the body of a
//! `documents.batchUpdate` call. The whole document text is inserted with a
//! single request, then paragraph and text styles are layered on top using
//! the index ranges each block occupies.
//!
//! # Request Order
//!
//! 1. `insertText` with the full document text at index 1
//! 2. heading paragraph styles and footer text styles
//! 3. bullet and checklist presets, plus indentation for nested items
//! 4. bold text styles over `@mentions`
//!
//! Indices count UTF-16 code units, matching how the Docs API addresses
//! document positions.
//!
//! # Example
//!
//! ```
//! use md2gdoc::parser::{parse_markdown, ParseOptions};
//! use md2gdoc::requests::{build_requests, BuildOptions, Request};
//!
//! let blocks = parse_markdown("# Sync\n- Ask @sam\n", &ParseOptions::default());
//! let batch = build_requests(&blocks, &BuildOptions::default());
//!
//! assert!(matches!(batch.requests[0], Request::InsertText(_)));
//! assert_eq!(batch.requests.len(), 4);
//!
//! let json = batch.to_json(false).unwrap();
//! assert!(json.contains("\"namedStyleType\":\"HEADING_1\""));
//! ```

use crate::parser::{Block, BlockKind};
use serde::Serialize;
use snafu::prelude::*;
use std::ops;

/// Index of the first insertable position in a new document's body.
pub const BODY_START_INDEX: usize = 1;

/// Error type for request serialization failures.
#[derive(Debug, Snafu)]
pub enum RequestError {
    /// Failed to serialize the requests as JSON.
    #[snafu(display("failed to serialize requests: {source}"))]
    Serialize {
        /// The underlying JSON serialization error.
        source: serde_json::Error,
    },
}

/// The body of a `documents.batchUpdate` call.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchUpdate {
    /// Requests applied in order.
    pub requests: Vec<Request>,
}

impl BatchUpdate {
    /// Serializes the batch as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<String, RequestError> {
        if pretty {
            serde_json::to_string_pretty(self).context(SerializeSnafu)
        } else {
            serde_json::to_string(self).context(SerializeSnafu)
        }
    }
}

/// A single Docs API request.
///
/// Serializes with the API's external tagging, e.g.
/// `{"insertText": {"location": {"index": 1}, "text": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    /// Inserts text at a location.
    InsertText(InsertText),
    /// Updates paragraph-level styling over a range.
    UpdateParagraphStyle(UpdateParagraphStyle),
    /// Updates character-level styling over a range.
    UpdateTextStyle(UpdateTextStyle),
    /// Turns the paragraphs in a range into list items.
    CreateParagraphBullets(CreateParagraphBullets),
}

impl Request {
    /// Creates an `insertText` request.
    pub fn insert_text(index: usize, text: impl Into<String>) -> Self {
        Self::InsertText(InsertText {
            location: Location { index },
            text: text.into(),
        })
    }

    /// Creates an `updateParagraphStyle` request whose field mask covers
    /// exactly the properties set in `style`.
    #[must_use]
    pub fn paragraph_style(range: Range, style: ParagraphStyle) -> Self {
        let fields = style.fields();
        Self::UpdateParagraphStyle(UpdateParagraphStyle {
            range,
            paragraph_style: style,
            fields,
        })
    }

    /// Creates an `updateTextStyle` request whose field mask covers exactly
    /// the properties set in `style`.
    #[must_use]
    pub fn text_style(range: Range, style: TextStyle) -> Self {
        let fields = style.fields();
        Self::UpdateTextStyle(UpdateTextStyle {
            range,
            text_style: style,
            fields,
        })
    }

    /// Creates a `createParagraphBullets` request.
    #[must_use]
    pub const fn bullets(range: Range, bullet_preset: BulletPreset) -> Self {
        Self::CreateParagraphBullets(CreateParagraphBullets {
            range,
            bullet_preset,
        })
    }
}

/// Payload of an `insertText` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertText {
    /// Where to insert.
    pub location: Location,
    /// The text to insert.
    pub text: String,
}

/// Payload of an `updateParagraphStyle` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyle {
    /// The affected range.
    pub range: Range,
    /// The style to apply.
    pub paragraph_style: ParagraphStyle,
    /// Comma-separated field mask.
    pub fields: String,
}

/// Payload of an `updateTextStyle` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    /// The affected range.
    pub range: Range,
    /// The style to apply.
    pub text_style: TextStyle,
    /// Comma-separated field mask.
    pub fields: String,
}

/// Payload of a `createParagraphBullets` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParagraphBullets {
    /// The affected range.
    pub range: Range,
    /// Which glyph preset to use.
    pub bullet_preset: BulletPreset,
}

/// A position in the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    /// UTF-16 offset into the body.
    pub index: usize,
}

/// A half-open range of the document body, in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    /// Inclusive start.
    pub start_index: usize,
    /// Exclusive end.
    pub end_index: usize,
}

impl Range {
    /// Creates a range from `start` to `end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start_index: start,
            end_index: end,
        }
    }
}

/// Bullet glyph presets used for list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulletPreset {
    /// Disc, circle and square glyphs for successive nesting levels.
    BulletDiscCircleSquare,
    /// Checklist boxes.
    BulletCheckbox,
}

/// A magnitude in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimension {
    /// The size.
    pub magnitude: f64,
    /// Always `"PT"`.
    pub unit: &'static str,
}

impl Dimension {
    /// Creates a dimension measured in points.
    #[must_use]
    pub const fn pt(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: "PT",
        }
    }
}

/// Paragraph properties this tool sets.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    /// A named style such as `HEADING_1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_style_type: Option<String>,

    /// Left indentation of the paragraph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_start: Option<Dimension>,
}

impl ParagraphStyle {
    /// Field mask listing the set properties.
    fn fields(&self) -> String {
        let mut fields = Vec::new();
        if self.named_style_type.is_some() {
            fields.push("namedStyleType");
        }
        if self.indent_start.is_some() {
            fields.push("indentStart");
        }
        fields.join(",")
    }
}

/// Character properties this tool sets.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Bold weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    /// Italic slant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    /// Line through the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,

    /// Font size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,

    /// Text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<OptionalColor>,
}

impl TextStyle {
    /// Field mask listing the set properties.
    fn fields(&self) -> String {
        let mut fields = Vec::new();
        if self.bold.is_some() {
            fields.push("bold");
        }
        if self.italic.is_some() {
            fields.push("italic");
        }
        if self.strikethrough.is_some() {
            fields.push("strikethrough");
        }
        if self.font_size.is_some() {
            fields.push("fontSize");
        }
        if self.foreground_color.is_some() {
            fields.push("foregroundColor");
        }
        fields.join(",")
    }
}

/// Wrapper the API uses for colors that may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionalColor {
    /// The color.
    pub color: Color,
}

/// A solid color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    /// RGB components.
    pub rgb_color: RgbColor,
}

/// RGB components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RgbColor {
    /// Red component.
    pub red: f64,
    /// Green component.
    pub green: f64,
    /// Blue component.
    pub blue: f64,
}

impl OptionalColor {
    /// Creates a neutral gray at the given intensity.
    #[must_use]
    pub const fn gray(level: f64) -> Self {
        Self {
            color: Color {
                rgb_color: RgbColor {
                    red: level,
                    green: level,
                    blue: level,
                },
            },
        }
    }
}

/// Configuration options for request generation.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Extra left indentation per list nesting level, in points.
    pub nest_indent_pt: f64,

    /// Font size for footer lines, in points.
    pub footer_font_pt: f64,

    /// Gray level (`0.0` black to `1.0` white) for footer text.
    pub footer_gray: f64,

    /// Whether to strike through checked checklist items.
    ///
    /// The Docs API cannot set a checklist item's checked state, so this is
    /// the closest visual equivalent.
    pub strike_checked: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            nest_indent_pt: 18.0,
            footer_font_pt: 10.0,
            footer_gray: 0.4,
            strike_checked: false,
        }
    }
}

/// Where a block lands in the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    /// The block.
    pub block: &'a Block,
    /// Index of the block's first character.
    pub start: usize,
    /// Index just past the block's trailing newline.
    pub end: usize,
}

impl Span<'_> {
    /// The span's full range, including the trailing newline.
    #[must_use]
    pub const fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }
}

/// Returns the text that the `insertText` request would insert.
#[must_use]
pub fn plain_text(blocks: &[Block]) -> String {
    layout(blocks).0
}

/// Concatenates block texts, one per line, and records where each lands.
///
/// The first block starts at [`BODY_START_INDEX`].
#[must_use]
pub fn layout(blocks: &[Block]) -> (String, Vec<Span<'_>>) {
    let mut text = String::new();
    let mut spans = Vec::with_capacity(blocks.len());
    let mut cursor = BODY_START_INDEX;

    for block in blocks {
        let start = cursor;
        text.push_str(&block.text);
        text.push('\n');
        cursor += utf16_len(&block.text) + 1;
        spans.push(Span {
            block,
            start,
            end: cursor,
        });
    }

    (text, spans)
}

/// Builds the full batch update for a parsed document.
///
/// Returns an empty batch when there are no blocks.
#[must_use]
pub fn build_requests(blocks: &[Block], opts: &BuildOptions) -> BatchUpdate {
    let (text, spans) = layout(blocks);
    let mut requests = Vec::new();

    if spans.is_empty() {
        return BatchUpdate { requests };
    }

    requests.push(Request::insert_text(BODY_START_INDEX, text));

    for span in &spans {
        push_block_style(&mut requests, span, opts);
    }

    for span in &spans {
        push_list_requests(&mut requests, span, opts);
    }

    for span in &spans {
        push_mention_styles(&mut requests, span);
    }

    BatchUpdate { requests }
}

/// Heading paragraph styles and footer text styles.
fn push_block_style(requests: &mut Vec<Request>, span: &Span<'_>, opts: &BuildOptions) {
    match span.block.kind {
        BlockKind::Heading(level) => requests.push(Request::paragraph_style(
            span.range(),
            ParagraphStyle {
                named_style_type: Some(format!("HEADING_{level}")),
                ..Default::default()
            },
        )),
        BlockKind::Footer => requests.push(Request::text_style(
            span.range(),
            TextStyle {
                italic: Some(true),
                font_size: Some(Dimension::pt(opts.footer_font_pt)),
                foreground_color: Some(OptionalColor::gray(opts.footer_gray)),
                ..Default::default()
            },
        )),
        _ => {}
    }
}

/// Bullet presets, nesting indentation and checked-item strikethrough.
fn push_list_requests(requests: &mut Vec<Request>, span: &Span<'_>, opts: &BuildOptions) {
    let block = span.block;
    let preset = match block.kind {
        BlockKind::Bullet => BulletPreset::BulletDiscCircleSquare,
        BlockKind::Checkbox { .. } => BulletPreset::BulletCheckbox,
        _ => return,
    };

    requests.push(Request::bullets(span.range(), preset));

    if block.level > 0 {
        requests.push(Request::paragraph_style(
            span.range(),
            ParagraphStyle {
                indent_start: Some(Dimension::pt(nest_indent(opts.nest_indent_pt, block.level))),
                ..Default::default()
            },
        ));
    }

    if opts.strike_checked
        && matches!(block.kind, BlockKind::Checkbox { checked: true })
        && !block.text.is_empty()
    {
        requests.push(Request::text_style(
            Range::new(span.start, span.start + utf16_len(&block.text)),
            TextStyle {
                strikethrough: Some(true),
                ..Default::default()
            },
        ));
    }
}

/// Bold styling over every mention in the block's text.
fn push_mention_styles(requests: &mut Vec<Request>, span: &Span<'_>) {
    let text = &span.block.text;
    for mention in find_mentions(text) {
        let start = span.start + utf16_len(&text[..mention.start]);
        let end = span.start + utf16_len(&text[..mention.end]);
        requests.push(Request::text_style(
            Range::new(start, end),
            TextStyle {
                bold: Some(true),
                ..Default::default()
            },
        ));
    }
}

#[allow(clippy::cast_precision_loss)]
fn nest_indent(per_level: f64, level: usize) -> f64 {
    per_level * level as f64
}

/// Finds `@name` mentions, returning byte ranges into `text`.
///
/// A mention is `@` followed by one or more word characters (alphanumerics
/// or `_`). Matches never overlap.
///
/// # Example
///
/// ```
/// use md2gdoc::requests::find_mentions;
///
/// let text = "Ping @alice and @bob_2.";
/// let names: Vec<&str> = find_mentions(text).into_iter().map(|r| &text[r]).collect();
/// assert_eq!(names, ["@alice", "@bob_2"]);
/// ```
#[must_use]
pub fn find_mentions(text: &str) -> Vec<ops::Range<usize>> {
    let mut mentions = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if !is_word_char(next) {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        if end > start + 1 {
            mentions.push(start..end);
        }
    }

    mentions
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Length of `s` in UTF-16 code units.
fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}
