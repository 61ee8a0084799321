use bytes::Bytes;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};
use tracing::debug;

use crate::errors::AppError;
use crate::layout::document::{ImageSlice, LaidOutDocument, PageItem, Rule, TextLine};
use crate::layout::font_metrics::{encode_win_ansi, FontStyle};
use crate::layout::geometry::PageGeometry;

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;
const RULE_WIDTH_PT: f32 = 0.5;

/// Converts layout coordinates (millimetres, origin top-left) into PDF user
/// space (points, origin bottom-left).
struct PageSpace {
    height_mm: f32,
}

impl PageSpace {
    fn x(&self, mm: f32) -> f32 {
        mm * PT_PER_MM
    }

    fn y(&self, mm_from_top: f32) -> f32 {
        (self.height_mm - mm_from_top) * PT_PER_MM
    }

    fn len(&self, mm: f32) -> f32 {
        mm * PT_PER_MM
    }
}

/// Writes `doc` as a PDF: one catalog, one page tree, the three Helvetica
/// faces as WinAnsi Type1 fonts, and a content stream per page.
pub fn encode_pdf(doc: &LaidOutDocument) -> Result<Bytes, AppError> {
    if doc.pages.is_empty() {
        return Err(AppError::ExportFailure("document has no pages".into()));
    }

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let fonts: Vec<(FontStyle, Ref)> = FontStyle::ALL
        .iter()
        .map(|style| (*style, alloc.bump()))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    for (style, id) in &fonts {
        pdf.type1_font(*id)
            .base_font(Name(style.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let space = PageSpace {
        height_mm: doc.geometry.page_height_mm,
    };
    let mut page_ids = Vec::with_capacity(doc.pages.len());

    for page in &doc.pages {
        let page_id = alloc.bump();
        let content_id = alloc.bump();
        let mut content = Content::new();
        let mut images: Vec<(String, Ref)> = Vec::new();

        for item in &page.items {
            match item {
                PageItem::Text(line) => write_text(&mut content, &space, line)?,
                PageItem::Rule(rule) => write_rule(&mut content, &space, rule),
                PageItem::Image(slice) => {
                    let image_id = alloc.bump();
                    let name = format!("Im{}", images.len() + 1);
                    write_image(&mut pdf, image_id, slice);
                    place_image(&mut content, &space, &name, slice);
                    images.push((name, image_id));
                }
            }
        }

        pdf.stream(content_id, &content.finish());
        write_page(&mut pdf, page_id, tree_id, content_id, &doc.geometry, &fonts, &images);
        page_ids.push(page_id);
    }

    let page_count = page_ids.len() as i32;
    pdf.pages(tree_id).kids(page_ids).count(page_count);

    let bytes = pdf.finish();
    debug!(pages = page_count, bytes = bytes.len(), "PDF encoded");
    Ok(Bytes::from(bytes))
}

fn write_text(content: &mut Content, space: &PageSpace, line: &TextLine) -> Result<(), AppError> {
    let encoded = encode_win_ansi(&line.text).map_err(|c| {
        AppError::ExportFailure(format!("character '{c}' cannot be written with the standard fonts"))
    })?;
    content.begin_text();
    content.set_font(Name(line.style.resource_name()), line.font_size_pt);
    content.next_line(space.x(line.x_mm), space.y(line.baseline_mm));
    content.show(Str(&encoded));
    content.end_text();
    Ok(())
}

fn write_rule(content: &mut Content, space: &PageSpace, rule: &Rule) {
    content.set_line_width(RULE_WIDTH_PT);
    content.move_to(space.x(rule.x1_mm), space.y(rule.y_mm));
    content.line_to(space.x(rule.x2_mm), space.y(rule.y_mm));
    content.stroke();
}

fn write_image(pdf: &mut Pdf, id: Ref, slice: &ImageSlice) {
    let mut image = pdf.image_xobject(id, &slice.jpeg);
    image.filter(Filter::DctDecode);
    image.width(slice.width_px as i32);
    image.height(slice.height_px as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();
}

fn place_image(content: &mut Content, space: &PageSpace, name: &str, slice: &ImageSlice) {
    let width = space.len(slice.width_mm);
    let height = space.len(slice.height_mm);
    // Image space is the unit square; scale it and move its bottom-left corner.
    let bottom = space.y(slice.y_mm + slice.height_mm);
    content.save_state();
    content.transform([width, 0.0, 0.0, height, space.x(slice.x_mm), bottom]);
    content.x_object(Name(name.as_bytes()));
    content.restore_state();
}

fn write_page(
    pdf: &mut Pdf,
    page_id: Ref,
    tree_id: Ref,
    content_id: Ref,
    geometry: &PageGeometry,
    fonts: &[(FontStyle, Ref)],
    images: &[(String, Ref)],
) {
    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(
        0.0,
        0.0,
        geometry.page_width_mm * PT_PER_MM,
        geometry.page_height_mm * PT_PER_MM,
    ));
    page.parent(tree_id);
    page.contents(content_id);

    let mut resources = page.resources();
    {
        let mut font_dict = resources.fonts();
        for (style, id) in fonts {
            font_dict.pair(Name(style.resource_name()), *id);
        }
    }
    if !images.is_empty() {
        let mut xobject_dict = resources.x_objects();
        for (name, id) in images {
            xobject_dict.pair(Name(name.as_bytes()), *id);
        }
    }
    resources.finish();
    page.finish();
}
