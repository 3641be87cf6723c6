//! # Free-Form Design Renderer
//!
//! Renders a user-designed `DocumentDesign` — absolutely positioned elements
//! on fixed pages — into the same draw-instruction stream the flow renderer
//! produces. Elements are emitted in list order, which is the paint order.
//! `Variable` elements are resolved against a runtime binding context.
//!
//! Resource failures (a missing image, an unresolvable QR payload) degrade
//! at the point of use: the element is skipped or rendered as its label, a
//! warning is recorded, and the rest of the page renders normally.

use std::collections::HashMap;

use chrono::Local;

use crate::error::MietwerkError;
use crate::image_loader::load_image_bytes;
use crate::layout::{DrawOp, RenderWarning, RenderedDocument, RenderedPage};
use crate::log::warn;
use crate::model::{
    CanvasElement, Color, DocumentDesign, ElementKind, FontWeight, HeaderFooterConfig, LineStyle,
    ListStyle, ObjectFit, PositionRect, TextAlign,
};
use crate::text::{wrap_text, TextMeasurer};

const A4_WIDTH_MM: f64 = 210.0;
const A4_HEIGHT_MM: f64 = 297.0;
const PT_TO_MM: f64 = 25.4 / 72.0;

/// Runtime values for `Variable` elements, keyed by variable key.
pub type BindingContext = HashMap<String, String>;

/// Render a design onto A4 pages. Pure given the bindings and measurer,
/// except that a date caption with no `date` binding falls back to the
/// system clock; table/element validation errors are fatal, resource
/// failures are not.
pub fn render_design(
    design: &DocumentDesign,
    bindings: &BindingContext,
    measurer: &dyn TextMeasurer,
) -> Result<RenderedDocument, MietwerkError> {
    let mut pages = Vec::with_capacity(design.pages.len());
    let mut warnings = Vec::new();
    let page_count = design.pages.len();

    for (page_index, page) in design.pages.iter().enumerate() {
        let mut ops = Vec::new();

        if page.background_color != Color::WHITE {
            ops.push(DrawOp::Rect {
                x: 0.0,
                y: 0.0,
                width: A4_WIDTH_MM,
                height: A4_HEIGHT_MM,
                fill: Some(page.background_color),
                stroke: None,
                stroke_width: 0.0,
            });
        }

        render_band(
            &design.header,
            0.0,
            design,
            page_index,
            page_count,
            bindings,
            measurer,
            &mut ops,
            &mut warnings,
        )?;

        for element in &page.elements {
            render_element(element, 0.0, bindings, measurer, &mut ops, &mut warnings)?;
        }

        render_band(
            &design.footer,
            A4_HEIGHT_MM - design.footer.height_mm,
            design,
            page_index,
            page_count,
            bindings,
            measurer,
            &mut ops,
            &mut warnings,
        )?;

        pages.push(RenderedPage {
            width_mm: A4_WIDTH_MM,
            height_mm: A4_HEIGHT_MM,
            ops,
        });
    }

    Ok(RenderedDocument {
        pages,
        placements: Vec::new(),
        warnings,
    })
}

/// Render a header/footer band at vertical offset `band_top`.
#[allow(clippy::too_many_arguments)]
fn render_band(
    band: &HeaderFooterConfig,
    band_top: f64,
    design: &DocumentDesign,
    page_index: usize,
    page_count: usize,
    bindings: &BindingContext,
    measurer: &dyn TextMeasurer,
    ops: &mut Vec<DrawOp>,
    warnings: &mut Vec<RenderWarning>,
) -> Result<(), MietwerkError> {
    if !band.enabled {
        return Ok(());
    }

    for element in &band.elements {
        render_element(element, band_top, bindings, measurer, ops, warnings)?;
    }

    let caption_y = band_top + band.height_mm - 4.0;
    let size_pt = 8.0;
    if band.show_document_name {
        ops.push(text_op(
            design.margins.left,
            caption_y,
            design.name.clone(),
            &design.default_font,
            size_pt,
            false,
            design.default_color,
        ));
    }
    if band.show_page_number {
        let label = format!("Seite {} von {}", page_index + 1, page_count);
        let width = measurer.measure(&label, &design.default_font, size_pt);
        ops.push(text_op(
            A4_WIDTH_MM - design.margins.right - width,
            caption_y,
            label,
            &design.default_font,
            size_pt,
            false,
            design.default_color,
        ));
    }
    if band.show_date {
        let label = bindings
            .get("date")
            .cloned()
            .unwrap_or_else(|| Local::now().format("%d.%m.%Y").to_string());
        let width = measurer.measure(&label, &design.default_font, size_pt);
        ops.push(text_op(
            (A4_WIDTH_MM - width) / 2.0,
            caption_y,
            label,
            &design.default_font,
            size_pt,
            false,
            design.default_color,
        ));
    }
    Ok(())
}

fn render_element(
    element: &CanvasElement,
    y_offset: f64,
    bindings: &BindingContext,
    measurer: &dyn TextMeasurer,
    ops: &mut Vec<DrawOp>,
    warnings: &mut Vec<RenderWarning>,
) -> Result<(), MietwerkError> {
    let frame = element.frame;
    let x = frame.x;
    let y = frame.y + y_offset;

    match &element.kind {
        ElementKind::Text {
            content,
            font,
            size,
            weight,
            color,
            align,
            line_height,
            ..
        } => {
            let line_h = size * line_height * PT_TO_MM;
            let lines = wrap_text(measurer, content, frame.width.max(1.0), font, *size);
            for (i, line) in lines.iter().enumerate() {
                let line_width = measurer.measure(line, font, *size);
                let line_x = match align {
                    TextAlign::Left | TextAlign::Justify => x,
                    TextAlign::Center => x + ((frame.width - line_width) / 2.0).max(0.0),
                    TextAlign::Right => x + (frame.width - line_width).max(0.0),
                };
                ops.push(text_op(
                    line_x,
                    y + (i + 1) as f64 * line_h - 1.0,
                    line.clone(),
                    font,
                    *size,
                    *weight == FontWeight::Bold,
                    *color,
                ));
            }
        }

        ElementKind::Image {
            src,
            alt_text,
            object_fit,
            ..
        } => match crate::image_loader::source_bytes(src)
            .and_then(|data| load_image_bytes(&data).map(|image| (data, image)))
        {
            Ok((data, image)) => {
                let placed = fit_frame(
                    PositionRect::new(x, y, frame.width, frame.height),
                    image.width_px,
                    image.height_px,
                    *object_fit,
                );
                ops.push(DrawOp::Image {
                    x: placed.x,
                    y: placed.y,
                    width: placed.width,
                    height: placed.height,
                    data,
                });
            }
            Err(e) => {
                warn!("image element {} skipped: {}", element.id, e);
                warnings.push(RenderWarning {
                    op_index: None,
                    message: format!(
                        "image element {:?} ({}) skipped: {}",
                        element.id, alt_text, e
                    ),
                });
            }
        },

        ElementKind::Table {
            rows,
            columns,
            cells,
            header_row,
            border_color,
            border_width,
            cell_padding,
        } => {
            if *rows == 0 || *columns == 0 || cells.len() != *rows
                || cells.iter().any(|row| row.len() != *columns)
            {
                return Err(MietwerkError::validation(format!(
                    "table {:?}: cell grid does not match {} x {}",
                    element.id, rows, columns
                )));
            }
            let col_w = frame.width / *columns as f64;
            let row_h = frame.height / *rows as f64;

            for r in 0..=*rows {
                let ly = y + r as f64 * row_h;
                ops.push(line_op(x, ly, x + frame.width, ly, *border_width, false, *border_color));
            }
            for c in 0..=*columns {
                let lx = x + c as f64 * col_w;
                ops.push(line_op(lx, y, lx, y + frame.height, *border_width, false, *border_color));
            }
            for (r, row) in cells.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if cell.is_empty() {
                        continue;
                    }
                    ops.push(text_op(
                        x + c as f64 * col_w + cell_padding,
                        y + (r + 1) as f64 * row_h - cell_padding,
                        cell.clone(),
                        "Helvetica",
                        9.0,
                        *header_row && r == 0,
                        Color::BLACK,
                    ));
                }
            }
        }

        ElementKind::Line {
            color,
            thickness,
            style,
        } => {
            let mid = y + frame.height / 2.0;
            ops.push(line_op(
                x,
                mid,
                x + frame.width,
                mid,
                *thickness,
                *style == LineStyle::Dashed,
                *color,
            ));
        }

        ElementKind::Box {
            background_color,
            border_color,
            border_width,
            opacity,
            ..
        } => {
            let mut fill = *background_color;
            fill.a *= opacity.clamp(0.0, 1.0);
            ops.push(DrawOp::Rect {
                x,
                y,
                width: frame.width,
                height: frame.height,
                fill: Some(fill),
                stroke: (*border_width > 0.0).then_some(*border_color),
                stroke_width: *border_width,
            });
        }

        ElementKind::List {
            items,
            list_style,
            font,
            size,
            color,
        } => {
            let line_h = size * 1.4 * PT_TO_MM;
            for (i, item) in items.iter().enumerate() {
                let prefix = match list_style {
                    ListStyle::Bullet => "• ".to_string(),
                    ListStyle::Numbered => format!("{}. ", i + 1),
                };
                ops.push(text_op(
                    x,
                    y + (i + 1) as f64 * line_h - 1.0,
                    format!("{}{}", prefix, item),
                    font,
                    *size,
                    false,
                    *color,
                ));
            }
        }

        ElementKind::Signature {
            label,
            show_date,
            show_line,
        } => {
            let rule_y = y + frame.height - 6.0;
            if *show_line {
                ops.push(line_op(x, rule_y, x + frame.width, rule_y, 0.3, false, Color::BLACK));
            }
            ops.push(text_op(
                x,
                rule_y + 4.0,
                label.clone(),
                "Helvetica",
                8.0,
                false,
                Color::BLACK,
            ));
            if *show_date {
                ops.push(text_op(
                    x,
                    y + 4.0,
                    "Datum:".to_string(),
                    "Helvetica",
                    8.0,
                    false,
                    Color::BLACK,
                ));
            }
        }

        ElementKind::QrCode {
            content,
            size,
            color,
            background_color,
        } => match crate::qr::qr_matrix(content) {
            Ok(matrix) => {
                ops.push(DrawOp::Rect {
                    x,
                    y,
                    width: *size,
                    height: *size,
                    fill: Some(*background_color),
                    stroke: None,
                    stroke_width: 0.0,
                });
                let module = size / matrix.len() as f64;
                for (r, row) in matrix.iter().enumerate() {
                    for (c, dark) in row.iter().enumerate() {
                        if *dark {
                            ops.push(DrawOp::Rect {
                                x: x + c as f64 * module,
                                y: y + r as f64 * module,
                                width: module,
                                height: module,
                                fill: Some(*color),
                                stroke: None,
                                stroke_width: 0.0,
                            });
                        }
                    }
                }
            }
            Err(e) => {
                warn!("QR element {} skipped: {}", element.id, e);
                warnings.push(RenderWarning {
                    op_index: None,
                    message: format!("QR element {:?} skipped: {}", element.id, e),
                });
            }
        },

        ElementKind::Variable {
            variable_key,
            variable_label,
            font,
            size,
            weight,
            color,
        } => {
            let text = match bindings.get(variable_key) {
                Some(value) => value.clone(),
                None => {
                    warnings.push(RenderWarning {
                        op_index: None,
                        message: format!(
                            "variable {:?} has no binding; rendering its label",
                            variable_key
                        ),
                    });
                    format!("[{}]", variable_label)
                }
            };
            ops.push(text_op(
                x,
                y + frame.height - 1.5,
                text,
                font,
                *size,
                *weight == FontWeight::Bold,
                *color,
            ));
        }
    }
    Ok(())
}

/// Place pixel dimensions into a frame. `Contain` scales to fit and centers;
/// `Cover` and `Fill` keep the full frame (cropping and stretching are the
/// encoder's job).
fn fit_frame(frame: PositionRect, width_px: u32, height_px: u32, fit: ObjectFit) -> PositionRect {
    if fit != ObjectFit::Contain || width_px == 0 || height_px == 0 {
        return frame;
    }
    let ratio = width_px as f64 / height_px as f64;
    let mut width = frame.width;
    let mut height = frame.width / ratio;
    if height > frame.height {
        height = frame.height;
        width = frame.height * ratio;
    }
    PositionRect::new(
        frame.x + (frame.width - width) / 2.0,
        frame.y + (frame.height - height) / 2.0,
        width,
        height,
    )
}

fn text_op(
    x: f64,
    y: f64,
    text: String,
    font: &str,
    size_pt: f64,
    bold: bool,
    color: Color,
) -> DrawOp {
    DrawOp::Text {
        x,
        y,
        text,
        font: font.to_string(),
        size_pt,
        bold,
        color,
    }
}

fn line_op(x1: f64, y1: f64, x2: f64, y2: f64, thickness: f64, dashed: bool, color: Color) -> DrawOp {
    DrawOp::Line {
        x1,
        y1,
        x2,
        y2,
        thickness,
        dashed,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentDesign, TextRole};
    use crate::session::{EditingSession, ElementPatch};
    use crate::text::BuiltinMetrics;

    fn render(design: &DocumentDesign, bindings: &BindingContext) -> RenderedDocument {
        render_design(design, bindings, &BuiltinMetrics).unwrap()
    }

    #[test]
    fn test_elements_render_in_z_order() {
        let mut session = EditingSession::new();
        session.add_box_element();
        let text = session.add_text_element(TextRole::Body);
        session.update_element(
            &text,
            &ElementPatch {
                content: Some("oben".to_string()),
                ..Default::default()
            },
        );

        let doc = render(session.design(), &BindingContext::new());
        let ops = &doc.pages[0].ops;
        let rect_pos = ops.iter().position(|o| matches!(o, DrawOp::Rect { .. })).unwrap();
        let text_pos = ops.iter().position(|o| matches!(o, DrawOp::Text { .. })).unwrap();
        assert!(rect_pos < text_pos, "later elements paint on top");
    }

    #[test]
    fn test_variable_resolves_against_bindings() {
        let mut session = EditingSession::new();
        session.add_variable_element("tenant.name", "Name des Mieters");

        let mut bindings = BindingContext::new();
        bindings.insert("tenant.name".to_string(), "Jonas Brand".to_string());
        let doc = render(session.design(), &bindings);
        assert!(doc.pages[0].ops.iter().any(
            |op| matches!(op, DrawOp::Text { text, .. } if text == "Jonas Brand")
        ));
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_unbound_variable_renders_label_with_warning() {
        let mut session = EditingSession::new();
        session.add_variable_element("landlord.iban", "IBAN");
        let doc = render(session.design(), &BindingContext::new());
        assert!(doc.pages[0].ops.iter().any(
            |op| matches!(op, DrawOp::Text { text, .. } if text == "[IBAN]")
        ));
        assert_eq!(doc.warnings.len(), 1);
    }

    #[test]
    fn test_broken_image_skips_with_warning() {
        let mut session = EditingSession::new();
        session.add_image_element("not-valid-base64!!");
        let doc = render(session.design(), &BindingContext::new());
        assert!(doc.pages[0].ops.is_empty());
        assert_eq!(doc.warnings.len(), 1);
    }

    #[test]
    fn test_qr_emits_module_rects() {
        let mut session = EditingSession::new();
        session.add_qr_code_element("https://example.org/v/1");
        let doc = render(session.design(), &BindingContext::new());
        let rects = doc.pages[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { .. }))
            .count();
        assert!(rects > 100, "a QR code is many dark modules, got {}", rects);
    }

    #[test]
    fn test_table_draws_grid_and_cells() {
        let mut session = EditingSession::new();
        let id = session.add_table_element(2, 3);
        session.update_element(&id, &ElementPatch::default());
        let doc = render(session.design(), &BindingContext::new());
        let lines = doc.pages[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count();
        // 3 horizontal + 4 vertical grid lines.
        assert_eq!(lines, 7);
    }

    #[test]
    fn test_mismatched_table_grid_is_fatal() {
        let mut session = EditingSession::new();
        session.add_table_element(2, 2);
        let mut design = session.design().clone();
        if let ElementKind::Table { cells, .. } = &mut design.pages[0].elements[0].kind {
            cells.pop();
        }
        let err = render_design(&design, &BindingContext::new(), &BuiltinMetrics).unwrap_err();
        assert!(matches!(err, MietwerkError::Validation { .. }));
    }

    #[test]
    fn test_footer_page_numbers() {
        let mut session = EditingSession::new();
        session.add_page();
        let mut design = session.design().clone();
        design.footer.enabled = true;
        design.footer.show_page_number = true;

        let doc = render(&design, &BindingContext::new());
        assert!(doc.pages[0].ops.iter().any(
            |op| matches!(op, DrawOp::Text { text, .. } if text == "Seite 1 von 2")
        ));
        assert!(doc.pages[1].ops.iter().any(
            |op| matches!(op, DrawOp::Text { text, .. } if text == "Seite 2 von 2")
        ));
    }

    #[test]
    fn test_footer_date_comes_from_bindings() {
        let mut design = DocumentDesign::new("design-1", "Mietvertrag");
        design.footer.enabled = true;
        design.footer.show_date = true;

        let mut bindings = BindingContext::new();
        bindings.insert("date".to_string(), "01.04.2026".to_string());
        let doc = render(&design, &bindings);
        assert!(doc.pages[0].ops.iter().any(
            |op| matches!(op, DrawOp::Text { text, .. } if text == "01.04.2026")
        ));

        // Identical inputs produce identical output when the date is bound.
        let again = render(&design, &bindings);
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            serde_json::to_string(&again).unwrap()
        );
    }

    fn png_data_uri() -> String {
        let mut png = image::RgbaImage::new(1, 1);
        png.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, png.as_raw(), 1, 1, image::ColorType::Rgba8)
            .unwrap();
        use base64::Engine;
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(buf)
        )
    }

    #[test]
    fn test_square_image_letterboxed_into_wide_frame() {
        let mut session = EditingSession::new();
        session.add_image_element(png_data_uri());
        let doc = render(session.design(), &BindingContext::new());
        // A 1:1 image in the default 60x45 frame at (20, 20): contain fit
        // gives a centered 45x45.
        match &doc.pages[0].ops[0] {
            DrawOp::Image {
                x,
                y,
                width,
                height,
                ..
            } => {
                assert_eq!((*width, *height), (45.0, 45.0));
                assert_eq!((*x, *y), (27.5, 20.0));
            }
            other => panic!("expected Image, got {:?}", other),
        }
    }
}
