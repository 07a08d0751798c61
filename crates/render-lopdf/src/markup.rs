//! Turns a sanitized HTML fragment into a flat list of styled blocks.
//!
//! The input is the serialization produced by the sanitizer: well-formed
//! apart from HTML void elements (`<br>`, `<hr>`, `<img>`), which are
//! treated as self-closing.

use itertools::Itertools;
use mdpress_render_core::RenderError;
use mdpress_style::TextStyle;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

const VOID_ELEMENTS: &[&[u8]] = &[
    b"br", b"hr", b"img", b"input", b"wbr", b"col", b"area", b"source",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
    Preformatted,
    TableRow { header: bool },
    Rule,
}

/// A styled piece of inline text. `"\n"` forces a line break.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub style: TextStyle,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<Run>,
    /// Nesting depth of lists and block quotes, in levels.
    pub list_depth: usize,
    pub quote_depth: usize,
    /// Bullet or ordinal drawn in the gutter of a list item.
    pub marker: Option<String>,
}

impl Block {
    fn new(kind: BlockKind, list_depth: usize, quote_depth: usize) -> Self {
        Self {
            kind,
            runs: Vec::new(),
            list_depth,
            quote_depth,
            marker: None,
        }
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).join("")
    }

    fn has_content(&self) -> bool {
        self.kind == BlockKind::Rule || self.runs.iter().any(|r| !r.text.trim().is_empty())
    }
}

struct ListFrame {
    ordered: bool,
    next: u32,
}

struct InlineFrame {
    tag: Vec<u8>,
    style: TextStyle,
    href: Option<String>,
}

#[derive(Default)]
struct MarkupParser {
    blocks: Vec<Block>,
    current: Option<Block>,
    inline: Vec<InlineFrame>,
    lists: Vec<ListFrame>,
    quote_depth: usize,
    pre_depth: usize,
    table_header: bool,
}

/// Parses `html` into blocks in document order.
pub fn parse_blocks(html: &str) -> Result<Vec<Block>, RenderError> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut parser = MarkupParser::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_ascii_lowercase();
                let attrs = attributes(&reader, &e);
                if VOID_ELEMENTS.contains(&name.as_slice()) {
                    parser.void_element(&name, &attrs);
                } else {
                    parser.open(&name, &attrs);
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.local_name().as_ref().to_ascii_lowercase();
                let attrs = attributes(&reader, &e);
                if VOID_ELEMENTS.contains(&name.as_slice()) {
                    parser.void_element(&name, &attrs);
                } else {
                    parser.open(&name, &attrs);
                    parser.close(&name);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name().as_ref().to_ascii_lowercase();
                if !VOID_ELEMENTS.contains(&name.as_slice()) {
                    parser.close(&name);
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape_with(html_entity)
                    .map_err(|e| RenderError::Markup(format!("at byte {}: {}", reader.buffer_position(), e)))?;
                parser.text(&text);
            }
            Ok(Event::CData(c)) => {
                let raw = c.into_inner();
                parser.text(&String::from_utf8_lossy(&raw));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(RenderError::Markup(format!(
                    "at byte {}: {}",
                    reader.error_position(),
                    e
                )));
            }
        }
    }
    parser.flush();
    Ok(parser.blocks)
}

fn attributes(reader: &Reader<&[u8]>, e: &BytesStart) -> Vec<(Vec<u8>, String)> {
    e.attributes()
        .filter_map(|a| a.ok())
        .map(|attr| {
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (attr.key.local_name().as_ref().to_ascii_lowercase(), value)
        })
        .collect()
}

fn attr<'a>(attrs: &'a [(Vec<u8>, String)], key: &[u8]) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.as_slice() == key)
        .map(|(_, v)| v.as_str())
}

/// Named entities the sanitizer's serializer may emit.
fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{a0}"),
        "copy" => Some("\u{a9}"),
        "reg" => Some("\u{ae}"),
        "hellip" => Some("\u{2026}"),
        "mdash" => Some("\u{2014}"),
        "ndash" => Some("\u{2013}"),
        _ => None,
    }
}

impl MarkupParser {
    fn style(&self) -> TextStyle {
        self.inline.last().map(|f| f.style).unwrap_or_default()
    }

    fn href(&self) -> Option<String> {
        self.inline.iter().rev().find_map(|f| f.href.clone())
    }

    fn start_block(&mut self, kind: BlockKind) {
        self.flush();
        self.current = Some(Block::new(kind, self.lists.len(), self.quote_depth));
    }

    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            if block.kind != BlockKind::Preformatted {
                trim_runs(&mut block.runs);
            }
            if block.has_content() {
                self.blocks.push(block);
            }
        }
    }

    fn push_inline(&mut self, tag: &[u8], style: TextStyle, href: Option<String>) {
        self.inline.push(InlineFrame {
            tag: tag.to_vec(),
            style,
            href,
        });
    }

    fn open(&mut self, name: &[u8], attrs: &[(Vec<u8>, String)]) {
        let style = self.style();
        match name {
            b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6" => {
                let level = name[1] - b'0';
                self.start_block(BlockKind::Heading(level));
                self.push_inline(name, style.bold(), None);
            }
            b"p" => {
                // The first paragraph of a loose list item continues the item.
                let continues_item = matches!(
                    &self.current,
                    Some(b) if b.kind == BlockKind::ListItem && !b.has_content()
                );
                if !continues_item {
                    self.start_block(BlockKind::Paragraph);
                }
            }
            b"ul" | b"ol" => {
                self.flush();
                let next = attr(attrs, b"start")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                self.lists.push(ListFrame {
                    ordered: name == b"ol",
                    next,
                });
            }
            b"li" => {
                self.start_block(BlockKind::ListItem);
                let marker = match self.lists.last_mut() {
                    Some(list) if list.ordered => {
                        let n = list.next;
                        list.next += 1;
                        format!("{}.", n)
                    }
                    _ => "\u{2022}".to_string(),
                };
                if let Some(block) = self.current.as_mut() {
                    block.marker = Some(marker);
                }
            }
            b"blockquote" => {
                self.flush();
                self.quote_depth += 1;
            }
            b"pre" => {
                self.start_block(BlockKind::Preformatted);
                self.pre_depth += 1;
                self.push_inline(name, style.mono(), None);
            }
            b"thead" => self.table_header = true,
            b"tbody" | b"table" => self.table_header = false,
            b"tr" => self.start_block(BlockKind::TableRow {
                header: self.table_header,
            }),
            b"th" | b"td" => {
                let separator_needed = matches!(&self.current, Some(b) if !b.runs.is_empty());
                if separator_needed {
                    self.append(" | ".to_string(), style, None);
                }
                let cell_style = if name == b"th" { style.bold() } else { style };
                self.push_inline(name, cell_style, None);
            }
            b"strong" | b"b" => self.push_inline(name, style.bold(), None),
            b"em" | b"i" => self.push_inline(name, style.italic(), None),
            b"code" | b"kbd" | b"samp" | b"tt" => self.push_inline(name, style.mono(), None),
            b"a" => {
                let href = attr(attrs, b"href").map(str::to_string);
                self.push_inline(name, style, href);
            }
            _ => self.push_inline(name, style, None),
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6" | b"pre" => {
                self.pop_inline(name);
                if name == b"pre" {
                    self.pre_depth = self.pre_depth.saturating_sub(1);
                }
                self.flush();
            }
            b"p" | b"li" | b"tr" => self.flush(),
            b"ul" | b"ol" => {
                self.flush();
                self.lists.pop();
            }
            b"blockquote" => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            b"thead" => self.table_header = false,
            b"table" | b"tbody" => {}
            _ => self.pop_inline(name),
        }
    }

    fn pop_inline(&mut self, name: &[u8]) {
        if let Some(pos) = self.inline.iter().rposition(|f| f.tag == name) {
            self.inline.truncate(pos);
        }
    }

    fn void_element(&mut self, name: &[u8], attrs: &[(Vec<u8>, String)]) {
        match name {
            b"br" => self.append("\n".to_string(), self.style(), None),
            b"hr" => {
                self.start_block(BlockKind::Rule);
                self.flush();
            }
            b"img" => {
                let alt = attr(attrs, b"alt").unwrap_or("image");
                self.append(format!("[{}]", alt), self.style(), self.href());
            }
            b"input" if attr(attrs, b"type") == Some("checkbox") => {
                let mark = if attr(attrs, b"checked").is_some() { "[x] " } else { "[ ] " };
                self.append(mark.to_string(), self.style().mono(), None);
            }
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        let text = if self.pre_depth > 0 {
            raw.to_string()
        } else {
            collapse_whitespace(raw)
        };
        if text.is_empty() {
            return;
        }
        if self.current.is_none() {
            if text.trim().is_empty() {
                return;
            }
            // Loose text after a nested list continues the enclosing item.
            self.current = Some(Block::new(
                BlockKind::Paragraph,
                self.lists.len(),
                self.quote_depth,
            ));
        }
        self.append(text, self.style(), self.href());
    }

    fn append(&mut self, text: String, style: TextStyle, href: Option<String>) {
        let block = self.current.get_or_insert_with(|| {
            Block::new(BlockKind::Paragraph, self.lists.len(), self.quote_depth)
        });
        match block.runs.last_mut() {
            Some(last) if last.style == style && last.href == href && text != "\n" && last.text != "\n" => {
                last.text.push_str(&text);
            }
            _ => block.runs.push(Run { text, style, href }),
        }
    }
}

fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.chars() {
        // Non-breaking spaces are kept as-is.
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn trim_runs(runs: &mut Vec<Run>) {
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start_matches(' ').to_string();
    }
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end_matches(' ').to_string();
    }
    runs.retain(|r| !r.text.is_empty());
}
