use crate::layout::{Decoration, Fragment, PX_TO_PT, PageLayout, QUOTE_BAR_PX};
use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use mdpress_render_core::RenderError;
use mdpress_render_core::utils::flip_y;
use mdpress_style::{PageGeometry, TextStyle};

const LINK_COLOR: [f32; 3] = [0.035, 0.412, 0.855];
const SHADE_COLOR: [f32; 3] = [0.965, 0.973, 0.98];
const BORDER_COLOR: [f32; 3] = [0.82, 0.843, 0.871];
const RULE_WIDTH_PT: f32 = 1.5;

/// Document-level metadata written to the trailer's `/Info` dictionary.
pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub producer: &'a str,
}

/// Maps a string onto WinAnsiEncoding. Characters outside the encoding
/// are replaced with `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{201a}' => 0x82,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            _ => b'?',
        })
        .collect()
}

fn color(op: &str, rgb: [f32; 3]) -> Operation {
    Operation::new(op, rgb.iter().map(|&c| c.into()).collect())
}

/// Page-space transform from layout pixels to PDF points.
struct PageSpace<'a> {
    geometry: &'a PageGeometry,
}

impl PageSpace<'_> {
    fn x(&self, x: f32) -> f32 {
        self.geometry.margins.left + x * PX_TO_PT
    }

    fn y(&self, y: f32) -> f32 {
        flip_y(self.geometry.margins.top + y * PX_TO_PT, self.geometry.height)
    }
}

fn decoration_ops(space: &PageSpace, decoration: &Decoration, ops: &mut Vec<Operation>) {
    ops.push(Operation::new("q", vec![]));
    match *decoration {
        Decoration::Rule { x, y, width } => {
            ops.push(color("RG", BORDER_COLOR));
            ops.push(Operation::new("w", vec![RULE_WIDTH_PT.into()]));
            ops.push(Operation::new("m", vec![space.x(x).into(), space.y(y).into()]));
            ops.push(Operation::new("l", vec![space.x(x + width).into(), space.y(y).into()]));
            ops.push(Operation::new("S", vec![]));
        }
        Decoration::Shade { x, y, width, height } => {
            ops.push(color("rg", SHADE_COLOR));
            ops.push(Operation::new(
                "re",
                vec![
                    space.x(x).into(),
                    space.y(y + height).into(),
                    (width * PX_TO_PT).into(),
                    (height * PX_TO_PT).into(),
                ],
            ));
            ops.push(Operation::new("f", vec![]));
        }
        Decoration::QuoteBar { x, y, height } => {
            ops.push(color("rg", BORDER_COLOR));
            ops.push(Operation::new(
                "re",
                vec![
                    space.x(x).into(),
                    space.y(y + height).into(),
                    (QUOTE_BAR_PX * PX_TO_PT).into(),
                    (height * PX_TO_PT).into(),
                ],
            ));
            ops.push(Operation::new("f", vec![]));
        }
    }
    ops.push(Operation::new("Q", vec![]));
}

fn text_ops(space: &PageSpace, fragment: &Fragment, colored: bool, ops: &mut Vec<Operation>) {
    if colored {
        ops.push(Operation::new("q", vec![]));
    }
    ops.push(Operation::new("BT", vec![]));
    if colored {
        ops.push(color("rg", LINK_COLOR));
    }
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(fragment.style.resource_name().into_bytes()),
            (fragment.size * PX_TO_PT).into(),
        ],
    ));
    ops.push(Operation::new(
        "Td",
        vec![space.x(fragment.x).into(), space.y(fragment.baseline).into()],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(&fragment.text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
    if colored {
        ops.push(Operation::new("Q", vec![]));
    }
}

/// Only external targets become annotations; in-document anchors have no
/// destination in the output.
fn link_target(fragment: &Fragment) -> Option<&str> {
    fragment
        .href
        .as_deref()
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
}

fn link_annotation(space: &PageSpace, fragment: &Fragment, uri: &str) -> Dictionary {
    let size = fragment.size;
    let x1 = space.x(fragment.x);
    let x2 = space.x(fragment.x + fragment.width);
    let y1 = space.y(fragment.baseline + size * 0.2);
    let y2 = space.y(fragment.baseline - size * 0.8);
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![x1.into(), y1.into(), x2.into(), y2.into()],
        "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
        "A" => dictionary! {
            "Type" => "Action",
            "S" => "URI",
            "URI" => Object::String(uri.as_bytes().to_vec(), StringFormat::Literal),
        },
    }
}

fn font_resources(doc: &mut Document) -> ObjectId {
    let mut fonts = Dictionary::new();
    for style in TextStyle::ALL {
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => style.postscript_name(),
            "Encoding" => "WinAnsiEncoding",
        };
        fonts.set(style.resource_name().into_bytes(), Object::Dictionary(font));
    }
    doc.add_object(dictionary! { "Font" => fonts })
}

fn creation_date() -> String {
    let now = Local::now();
    let offset = now.format("%:z").to_string().replace(':', "'");
    format!("{}{}'", now.format("D:%Y%m%d%H%M%S"), offset)
}

/// Writes laid-out pages into a complete PDF file.
pub fn write_document(
    pages: &[PageLayout],
    geometry: &PageGeometry,
    info: &DocumentInfo,
    enable_links: bool,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let resources_id = font_resources(&mut doc);
    let space = PageSpace { geometry };

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let mut operations = Vec::new();
        for decoration in &page.decorations {
            decoration_ops(&space, decoration, &mut operations);
        }
        let mut annotations = Vec::new();
        for fragment in &page.fragments {
            let target = link_target(fragment).filter(|_| enable_links);
            text_ops(&space, fragment, fragment.href.is_some(), &mut operations);
            if let Some(uri) = target {
                annotations.push(doc.add_object(link_annotation(&space, fragment, uri)));
            }
        }

        let content = Content { operations };
        let encoded = content.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), geometry.width.into(), geometry.height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        };
        if !annotations.is_empty() {
            page_dict.set(
                "Annots",
                Object::Array(annotations.into_iter().map(Object::Reference).collect()),
            );
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
    };
    doc.objects.insert(pages_id, pages_dict.into());

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(info.title), StringFormat::Literal),
        "Producer" => Object::String(encode_win_ansi(info.producer), StringFormat::Literal),
        "CreationDate" => Object::String(creation_date().into_bytes(), StringFormat::Literal),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(bytes)
}
