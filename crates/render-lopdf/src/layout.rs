//! Line breaking and pagination of parsed blocks.
//!
//! Everything here is measured in CSS pixels relative to the top-left
//! corner of the printable area. Conversion to PDF points happens when the
//! pages are written.

use crate::markup::{Block, BlockKind, Run};
use mdpress_style::TextStyle;

/// One CSS pixel in PDF points.
pub const PX_TO_PT: f32 = 0.75;

const BASE_FONT_PX: f32 = 16.0;
const CODE_FONT_PX: f32 = 13.6;
const LIST_INDENT_PX: f32 = 24.0;
const QUOTE_INDENT_PX: f32 = 16.0;
pub const QUOTE_BAR_PX: f32 = 3.0;
const CODE_PADDING_PX: f32 = 8.0;
const MARKER_OFFSET_PX: f32 = 18.0;
const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct LayoutSettings {
    pub content_width: f32,
    pub content_height: f32,
    pub raster_scale: f32,
}

impl LayoutSettings {
    /// Settings for a printable area given in points.
    pub fn from_points(content_width_pt: f32, content_height_pt: f32, raster_scale: f32) -> Self {
        Self {
            content_width: content_width_pt / PX_TO_PT,
            content_height: content_height_pt / PX_TO_PT,
            raster_scale,
        }
    }

    fn snap(&self, v: f32) -> f32 {
        (v * self.raster_scale).round() / self.raster_scale
    }
}

/// A positioned run of text. `baseline` is measured from the top of the
/// printable area.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub x: f32,
    pub baseline: f32,
    pub width: f32,
    pub size: f32,
    pub text: String,
    pub style: TextStyle,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoration {
    /// Horizontal rule.
    Rule { x: f32, y: f32, width: f32 },
    /// Light background behind preformatted text.
    Shade { x: f32, y: f32, width: f32, height: f32 },
    /// Left border of a block quote.
    QuoteBar { x: f32, y: f32, height: f32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub fragments: Vec<Fragment>,
    pub decorations: Vec<Decoration>,
}

impl PageLayout {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.decorations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Piece {
    text: String,
    style: TextStyle,
    href: Option<String>,
}

type Line = Vec<Piece>;

fn font_size(kind: BlockKind) -> f32 {
    match kind {
        BlockKind::Heading(1) => 32.0,
        BlockKind::Heading(2) => 24.0,
        BlockKind::Heading(3) => 20.0,
        BlockKind::Heading(4) => 16.0,
        BlockKind::Heading(5) => 14.0,
        BlockKind::Heading(_) => 13.6,
        BlockKind::Preformatted => CODE_FONT_PX,
        _ => BASE_FONT_PX,
    }
}

fn line_height(kind: BlockKind) -> f32 {
    match kind {
        BlockKind::Heading(_) => font_size(kind) * 1.25,
        _ => font_size(kind) * 1.5,
    }
}

fn space_before(kind: BlockKind) -> f32 {
    match kind {
        BlockKind::Heading(_) => 24.0,
        _ => 0.0,
    }
}

fn space_after(kind: BlockKind) -> f32 {
    match kind {
        BlockKind::Heading(_) | BlockKind::Paragraph | BlockKind::Preformatted => 16.0,
        BlockKind::ListItem => 4.0,
        BlockKind::TableRow { .. } => 6.0,
        BlockKind::Rule => 24.0,
    }
}

pub fn text_width(text: &str, style: TextStyle, size: f32) -> f32 {
    text.chars().count() as f32 * style.average_advance() * size
}

struct Paginator<'a> {
    settings: &'a LayoutSettings,
    pages: Vec<PageLayout>,
    page: PageLayout,
    cursor: f32,
}

impl<'a> Paginator<'a> {
    fn new(settings: &'a LayoutSettings) -> Self {
        Self {
            settings,
            pages: Vec::new(),
            page: PageLayout::default(),
            cursor: 0.0,
        }
    }

    fn has_content(&self) -> bool {
        !self.page.is_empty()
    }

    fn remaining(&self) -> f32 {
        self.settings.content_height - self.cursor
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.page);
        self.pages.push(page);
        self.cursor = 0.0;
    }

    /// Starts a new page unless `height` fits or the current page is blank.
    fn reserve(&mut self, height: f32) {
        if self.has_content() && height > self.remaining() {
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if self.has_content() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

/// Lays `blocks` out on as many pages as needed. Always yields at least
/// one page.
pub fn layout_blocks(blocks: &[Block], settings: &LayoutSettings) -> Vec<PageLayout> {
    let mut pager = Paginator::new(settings);

    for (index, block) in blocks.iter().enumerate() {
        let kind = block.kind;
        let before = if pager.has_content() { space_before(kind) } else { 0.0 };

        if kind == BlockKind::Rule {
            pager.reserve(before + space_after(kind));
            let y = settings.snap(pager.cursor + before + space_after(kind) / 2.0);
            pager.page.decorations.push(Decoration::Rule {
                x: 0.0,
                y,
                width: settings.content_width,
            });
            pager.cursor += before + space_after(kind);
            continue;
        }

        let indent = block.list_depth as f32 * LIST_INDENT_PX + block.quote_depth as f32 * QUOTE_INDENT_PX;
        let size = font_size(kind);
        let lh = line_height(kind);
        let (text_x, available) = if kind == BlockKind::Preformatted {
            (
                indent + CODE_PADDING_PX,
                settings.content_width - indent - 2.0 * CODE_PADDING_PX,
            )
        } else {
            (indent, settings.content_width - indent)
        };
        let available = available.max(size);

        let lines = if kind == BlockKind::Preformatted {
            break_preformatted(&block.runs, available, size)
        } else {
            break_lines(&block.runs, available, size)
        };
        if lines.is_empty() {
            continue;
        }

        if let BlockKind::Heading(_) = kind {
            // Keep the heading on the same page as the first line after it.
            let next_line = blocks
                .get(index + 1)
                .map(|b| line_height(b.kind))
                .unwrap_or(0.0);
            pager.reserve(before + lh * lines.len() as f32 + next_line);
        }

        let mut gap = before;
        for (line_no, line) in lines.iter().enumerate() {
            pager.reserve(gap + lh);
            if pager.cursor == 0.0 {
                gap = 0.0;
            }
            let top = pager.cursor + gap;
            place_line(&mut pager.page, settings, line, text_x, top, size, lh);

            if line_no == 0 {
                if let Some(marker) = &block.marker {
                    pager.page.fragments.push(Fragment {
                        x: settings.snap(indent - MARKER_OFFSET_PX),
                        baseline: settings.snap(baseline(top, size, lh)),
                        width: text_width(marker, TextStyle::default(), size),
                        size,
                        text: marker.clone(),
                        style: TextStyle::default(),
                        href: None,
                    });
                }
            }
            if kind == BlockKind::Preformatted {
                pager.page.decorations.push(Decoration::Shade {
                    x: settings.snap(indent),
                    y: settings.snap(top),
                    width: settings.content_width - indent,
                    height: lh,
                });
            }
            for depth in 0..block.quote_depth {
                pager.page.decorations.push(Decoration::QuoteBar {
                    x: settings.snap(depth as f32 * QUOTE_INDENT_PX + block.list_depth as f32 * LIST_INDENT_PX),
                    y: settings.snap(top),
                    height: lh,
                });
            }
            pager.cursor = top + lh;
            gap = 0.0;
        }

        if let BlockKind::TableRow { header: true } = kind {
            pager.page.decorations.push(Decoration::Rule {
                x: settings.snap(indent),
                y: settings.snap(pager.cursor + 1.0),
                width: settings.content_width - indent,
            });
        }
        pager.cursor += space_after(kind);
    }

    pager.finish()
}

fn baseline(top: f32, size: f32, lh: f32) -> f32 {
    top + (lh - size) / 2.0 + size * 0.8
}

fn place_line(
    page: &mut PageLayout,
    settings: &LayoutSettings,
    line: &Line,
    x: f32,
    top: f32,
    size: f32,
    lh: f32,
) {
    let base = settings.snap(baseline(top, size, lh));
    let mut cursor = x;
    for piece in line {
        let width = text_width(&piece.text, piece.style, size);
        if !piece.text.trim().is_empty() {
            page.fragments.push(Fragment {
                x: settings.snap(cursor),
                baseline: base,
                width,
                size,
                text: piece.text.clone(),
                style: piece.style,
                href: piece.href.clone(),
            });
        }
        cursor += width;
    }
}

fn push_piece(line: &mut Line, text: &str, style: TextStyle, href: &Option<String>) {
    match line.last_mut() {
        Some(last) if last.style == style && &last.href == href => last.text.push_str(text),
        _ => line.push(Piece {
            text: text.to_string(),
            style,
            href: href.clone(),
        }),
    }
}

/// Greedy word wrapping. Words wider than the line are split by character.
fn break_lines(runs: &[Run], available: f32, size: f32) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut line: Line = Vec::new();
    let mut width = 0.0;
    let mut pending_space = false;

    for run in runs {
        if run.text == "\n" {
            lines.push(std::mem::take(&mut line));
            width = 0.0;
            pending_space = false;
            continue;
        }
        let mut rest = run.text.as_str();
        while !rest.is_empty() {
            if let Some(stripped) = rest.strip_prefix(' ') {
                pending_space = true;
                rest = stripped;
                continue;
            }
            let end = rest.find(' ').unwrap_or(rest.len());
            let word = &rest[..end];
            rest = &rest[end..];

            let space = if pending_space && !line.is_empty() {
                text_width(" ", run.style, size)
            } else {
                0.0
            };
            let word_width = text_width(word, run.style, size);
            if !line.is_empty() && width + space + word_width > available {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            } else if space > 0.0 {
                push_piece(&mut line, " ", run.style, &run.href);
                width += space;
            }
            pending_space = false;

            if word_width > available {
                for chunk in split_to_width(word, run.style, size, available) {
                    if !line.is_empty() && width + text_width(&chunk, run.style, size) > available {
                        lines.push(std::mem::take(&mut line));
                        width = 0.0;
                    }
                    width += text_width(&chunk, run.style, size);
                    push_piece(&mut line, &chunk, run.style, &run.href);
                }
            } else {
                width += word_width;
                push_piece(&mut line, word, run.style, &run.href);
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.retain(|l| l.iter().any(|p| !p.text.trim().is_empty()) || l.is_empty());
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Splits `word` into chunks of at most `available` width.
fn split_to_width(word: &str, style: TextStyle, size: f32, available: f32) -> Vec<String> {
    let per_char = style.average_advance() * size;
    let full = 1usize.max((available / per_char).floor() as usize);
    let mut chunks = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        if current.chars().count() >= full {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Preformatted text keeps its line breaks and hard-wraps overlong lines.
fn break_preformatted(runs: &[Run], available: f32, size: f32) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut line: Line = Vec::new();
    let mut width = 0.0;

    for run in runs {
        let text = run.text.replace('\t', &" ".repeat(TAB_WIDTH));
        let per_char = run.style.average_advance() * size;
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            for c in segment.chars() {
                if !line.is_empty() && width + per_char > available {
                    lines.push(std::mem::take(&mut line));
                    width = 0.0;
                }
                width += per_char;
                let mut buf = [0u8; 4];
                push_piece(&mut line, c.encode_utf8(&mut buf), run.style, &run.href);
            }
        }
    }
    lines.push(line);
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    // Blank lines inside a code block still take vertical space.
    for l in lines.iter_mut().filter(|l| l.is_empty()) {
        l.push(Piece {
            text: String::new(),
            style: TextStyle::default().mono(),
            href: None,
        });
    }
    lines
}
