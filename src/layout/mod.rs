//! # Flow / Pagination Renderer
//!
//! Converts a sequential content plan into placed draw instructions across
//! fixed-size pages. The page is the fundamental unit of layout: before any
//! operation is emitted, its required vertical space is computed and checked
//! against the remaining space on the current page; if it does not fit, a
//! new page is opened and the operation is placed there instead. Paragraphs
//! are the one breakable operation: their lines flow across the page
//! boundary, earlier content stays where it was placed.
//!
//! The whole pass is a single synchronous loop over the plan. Given the same
//! plan and the same measurement collaborator, the output is identical —
//! there is no hidden state between renders.

use serde::{Deserialize, Serialize};

use crate::error::MietwerkError;
use crate::log::warn;
use crate::model::{Color, Edges};
use crate::plan::{ContentOp, ContentPlan};
use crate::text::{wrap_text, TextMeasurer};

const PT_TO_MM: f64 = 25.4 / 72.0;

/// Physical page size and margin box, in millimeters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margins: Edges,
}

impl PageGeometry {
    /// A4 portrait with 20mm margins.
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margins: Edges::uniform(20.0),
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width_mm - self.margins.horizontal()
    }

    /// Lowest y a baseline block may still occupy.
    pub fn content_bottom(&self) -> f64 {
        self.height_mm - self.margins.bottom
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// One draw instruction for the external byte encoder. Coordinates are
/// page-absolute millimeters, y growing downward from the top edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        text: String,
        font: String,
        size_pt: f64,
        bold: bool,
        color: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        thickness: f64,
        #[serde(default)]
        dashed: bool,
        color: Color,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
    /// Encoded image bytes (JPEG/PNG), validated before emission.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        data: Vec<u8>,
    },
}

/// A fully placed page, ready for the encoder collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    pub width_mm: f64,
    pub height_mm: f64,
    pub ops: Vec<DrawOp>,
}

/// Where a content operation landed: page index and the vertical cursor
/// position at which its first line was placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpPlacement {
    pub op_index: usize,
    pub page: usize,
    pub y_mm: f64,
}

/// A non-fatal degradation reported alongside the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderWarning {
    pub op_index: Option<usize>,
    pub message: String,
}

/// The renderer output: pages of draw instructions, per-op placements, and
/// any degradation warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub pages: Vec<RenderedPage>,
    pub placements: Vec<OpPlacement>,
    pub warnings: Vec<RenderWarning>,
}

// Per-kind vertical metrics, all in millimeters. Headings reserve extra
// leading space before them (consumed only when not at the top of a page).
const TITLE_SIZE_PT: f64 = 16.0;
const SUBTITLE_SIZE_PT: f64 = 12.0;
const HEADING_SIZE_PT: f64 = 12.0;
const BODY_SIZE_PT: f64 = 10.0;
const LINE_HEIGHT_FACTOR: f64 = 1.4;

const TITLE_HEIGHT: f64 = 10.0;
const SUBTITLE_HEIGHT: f64 = 7.0;
const HEADING_HEIGHT: f64 = 8.0;
const HEADING_LEADING: f64 = 4.0;
const LABEL_VALUE_HEIGHT: f64 = 6.0;
const SEPARATOR_HEIGHT: f64 = 4.0;
const SIGNATURE_BLOCK_HEIGHT: f64 = 50.0;
const PARAGRAPH_SPACING: f64 = 2.0;
const TITLE_SPACING: f64 = 2.0;
const SUBTITLE_SPACING: f64 = 6.0;

/// Column-x (relative to the left margin) where label/value values start.
const VALUE_COLUMN_MM: f64 = 60.0;

fn line_height_mm(size_pt: f64) -> f64 {
    size_pt * LINE_HEIGHT_FACTOR * PT_TO_MM
}

/// Tracks the current page and vertical cursor during the flow pass.
struct FlowCursor {
    geometry: PageGeometry,
    y: f64,
    ops: Vec<DrawOp>,
    pages: Vec<RenderedPage>,
}

impl FlowCursor {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            y: geometry.margins.top,
            ops: Vec::new(),
            pages: Vec::new(),
        }
    }

    fn page_index(&self) -> usize {
        self.pages.len()
    }

    fn at_top(&self) -> bool {
        self.y <= self.geometry.margins.top
    }

    /// Open a new page if `required` millimeters no longer fit.
    fn ensure_fits(&mut self, required: f64) {
        if self.y + required > self.geometry.content_bottom() {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        self.pages.push(RenderedPage {
            width_mm: self.geometry.width_mm,
            height_mm: self.geometry.height_mm,
            ops: std::mem::take(&mut self.ops),
        });
        self.y = self.geometry.margins.top;
    }

    fn finish(mut self) -> Vec<RenderedPage> {
        self.pages.push(RenderedPage {
            width_mm: self.geometry.width_mm,
            height_mm: self.geometry.height_mm,
            ops: self.ops,
        });
        self.pages
    }
}

/// The flow/pagination renderer. Owns nothing but the page geometry and the
/// default font name used for the emitted text ops.
pub struct FlowRenderer {
    geometry: PageGeometry,
    font: String,
}

impl Default for FlowRenderer {
    fn default() -> Self {
        Self::new(PageGeometry::a4())
    }
}

impl FlowRenderer {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            font: "Helvetica".to_string(),
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Lay the plan onto pages. Pure and deterministic given the measurer.
    pub fn render(
        &self,
        plan: &ContentPlan,
        measurer: &dyn TextMeasurer,
    ) -> Result<RenderedDocument, MietwerkError> {
        let mut cursor = FlowCursor::new(self.geometry);
        let mut placements = Vec::with_capacity(plan.len());
        let mut warnings = Vec::new();

        for (index, op) in plan.iter().enumerate() {
            validate_op(index, op)?;
            let placement = self.place_op(index, op, &mut cursor, measurer, &mut warnings);
            placements.push(placement);
        }

        Ok(RenderedDocument {
            pages: cursor.finish(),
            placements,
            warnings,
        })
    }

    fn place_op(
        &self,
        index: usize,
        op: &ContentOp,
        cursor: &mut FlowCursor,
        measurer: &dyn TextMeasurer,
        warnings: &mut Vec<RenderWarning>,
    ) -> OpPlacement {
        let left = self.geometry.margins.left;
        let content_width = self.geometry.content_width();

        match op {
            ContentOp::Title { text } => {
                cursor.ensure_fits(TITLE_HEIGHT);
                let placed = self.record(index, cursor);
                let width = measurer.measure(text, &self.font, TITLE_SIZE_PT);
                cursor.ops.push(DrawOp::Text {
                    x: left + ((content_width - width) / 2.0).max(0.0),
                    y: cursor.y + TITLE_HEIGHT - 2.0,
                    text: text.clone(),
                    font: self.font.clone(),
                    size_pt: TITLE_SIZE_PT,
                    bold: true,
                    color: Color::BLACK,
                });
                cursor.y += TITLE_HEIGHT + TITLE_SPACING;
                placed
            }

            ContentOp::Subtitle { text } => {
                cursor.ensure_fits(SUBTITLE_HEIGHT);
                let placed = self.record(index, cursor);
                let width = measurer.measure(text, &self.font, SUBTITLE_SIZE_PT);
                cursor.ops.push(DrawOp::Text {
                    x: left + ((content_width - width) / 2.0).max(0.0),
                    y: cursor.y + SUBTITLE_HEIGHT - 2.0,
                    text: text.clone(),
                    font: self.font.clone(),
                    size_pt: SUBTITLE_SIZE_PT,
                    bold: false,
                    color: Color::BLACK,
                });
                cursor.y += SUBTITLE_HEIGHT + SUBTITLE_SPACING;
                placed
            }

            ContentOp::Heading { text } => {
                let leading = if cursor.at_top() { 0.0 } else { HEADING_LEADING };
                cursor.ensure_fits(leading + HEADING_HEIGHT);
                if !cursor.at_top() {
                    cursor.y += HEADING_LEADING;
                }
                let placed = self.record(index, cursor);
                cursor.ops.push(DrawOp::Text {
                    x: left,
                    y: cursor.y + HEADING_HEIGHT - 2.5,
                    text: text.clone(),
                    font: self.font.clone(),
                    size_pt: HEADING_SIZE_PT,
                    bold: true,
                    color: Color::BLACK,
                });
                cursor.y += HEADING_HEIGHT;
                placed
            }

            ContentOp::Paragraph { text, indent_mm } => {
                let line_height = line_height_mm(BODY_SIZE_PT);
                let width = (content_width - indent_mm).max(1.0);
                let lines = wrap_text(measurer, text, width, &self.font, BODY_SIZE_PT);

                // Break only when not even the first line fits; afterwards
                // lines flow across page boundaries individually, so earlier
                // content keeps its position.
                cursor.ensure_fits(line_height);
                let placed = self.record(index, cursor);
                for line in &lines {
                    cursor.ensure_fits(line_height);
                    cursor.ops.push(DrawOp::Text {
                        x: left + indent_mm,
                        y: cursor.y + line_height - 1.2,
                        text: line.clone(),
                        font: self.font.clone(),
                        size_pt: BODY_SIZE_PT,
                        bold: false,
                        color: Color::BLACK,
                    });
                    cursor.y += line_height;
                }
                cursor.y += PARAGRAPH_SPACING;
                placed
            }

            ContentOp::LabelValue {
                label,
                value,
                indent_mm,
            } => {
                cursor.ensure_fits(LABEL_VALUE_HEIGHT);
                let placed = self.record(index, cursor);
                let baseline = cursor.y + LABEL_VALUE_HEIGHT - 1.5;
                cursor.ops.push(DrawOp::Text {
                    x: left + indent_mm,
                    y: baseline,
                    text: label.clone(),
                    font: self.font.clone(),
                    size_pt: BODY_SIZE_PT,
                    bold: true,
                    color: Color::BLACK,
                });
                cursor.ops.push(DrawOp::Text {
                    x: left + indent_mm + VALUE_COLUMN_MM,
                    y: baseline,
                    text: value.clone(),
                    font: self.font.clone(),
                    size_pt: BODY_SIZE_PT,
                    bold: false,
                    color: Color::BLACK,
                });
                cursor.y += LABEL_VALUE_HEIGHT;
                placed
            }

            ContentOp::Separator => {
                cursor.ensure_fits(SEPARATOR_HEIGHT);
                let placed = self.record(index, cursor);
                let mid = cursor.y + SEPARATOR_HEIGHT / 2.0;
                cursor.ops.push(DrawOp::Line {
                    x1: left,
                    y1: mid,
                    x2: left + content_width,
                    y2: mid,
                    thickness: 0.3,
                    dashed: false,
                    color: Color::BLACK,
                });
                cursor.y += SEPARATOR_HEIGHT;
                placed
            }

            ContentOp::SignatureBlock { label, name, image } => {
                cursor.ensure_fits(SIGNATURE_BLOCK_HEIGHT);
                let placed = self.record(index, cursor);
                self.place_signature(index, label, name, image.as_deref(), cursor, warnings);
                placed
            }
        }
    }

    /// Signature block layout, top to bottom within its fixed 50mm: optional
    /// image, horizontal rule, label line, name line. A corrupt image is
    /// swallowed — the rule and labels still render.
    fn place_signature(
        &self,
        index: usize,
        label: &str,
        name: &str,
        image: Option<&[u8]>,
        cursor: &mut FlowCursor,
        warnings: &mut Vec<RenderWarning>,
    ) {
        let left = self.geometry.margins.left;
        let top = cursor.y;
        let rule_y = top + 30.0;

        if let Some(bytes) = image {
            match crate::image_loader::load_image_bytes(bytes) {
                Ok(loaded) => {
                    // Scale into the 50x20 slot, preserving the aspect ratio.
                    let mut width = 50.0;
                    let mut height = if loaded.width_px > 0 {
                        width * loaded.height_px as f64 / loaded.width_px as f64
                    } else {
                        20.0
                    };
                    if height > 20.0 {
                        width *= 20.0 / height;
                        height = 20.0;
                    }
                    cursor.ops.push(DrawOp::Image {
                        x: left,
                        y: rule_y - 2.0 - height,
                        width,
                        height,
                        data: bytes.to_vec(),
                    });
                }
                Err(e) => {
                    warn!("signature image skipped: {}", e);
                    warnings.push(RenderWarning {
                        op_index: Some(index),
                        message: format!("signature image skipped: {}", e),
                    });
                }
            }
        }

        cursor.ops.push(DrawOp::Line {
            x1: left,
            y1: rule_y,
            x2: left + 70.0,
            y2: rule_y,
            thickness: 0.3,
            dashed: false,
            color: Color::BLACK,
        });
        cursor.ops.push(DrawOp::Text {
            x: left,
            y: rule_y + 5.0,
            text: label.to_string(),
            font: self.font.clone(),
            size_pt: 8.0,
            bold: false,
            color: Color::BLACK,
        });
        cursor.ops.push(DrawOp::Text {
            x: left,
            y: rule_y + 10.0,
            text: name.to_string(),
            font: self.font.clone(),
            size_pt: BODY_SIZE_PT,
            bold: false,
            color: Color::BLACK,
        });

        cursor.y = top + SIGNATURE_BLOCK_HEIGHT;
    }

    fn record(&self, index: usize, cursor: &FlowCursor) -> OpPlacement {
        OpPlacement {
            op_index: index,
            page: cursor.page_index(),
            y_mm: cursor.y,
        }
    }
}

/// Malformed plan operations are programmer errors: fatal, reported with
/// the offending op index.
fn validate_op(index: usize, op: &ContentOp) -> Result<(), MietwerkError> {
    let indent = match op {
        ContentOp::Paragraph { indent_mm, .. } => Some(*indent_mm),
        ContentOp::LabelValue { indent_mm, .. } => Some(*indent_mm),
        _ => None,
    };
    if let Some(indent) = indent {
        if !indent.is_finite() || indent < 0.0 {
            return Err(MietwerkError::Plan {
                index,
                message: format!("indent must be a non-negative finite value, got {}", indent),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ContentOp;
    use crate::text::BuiltinMetrics;

    fn render(plan: ContentPlan) -> RenderedDocument {
        FlowRenderer::default()
            .render(&plan, &BuiltinMetrics)
            .unwrap()
    }

    #[test]
    fn test_empty_plan_yields_single_empty_page() {
        let doc = render(vec![]);
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].ops.is_empty());
    }

    #[test]
    fn test_title_is_centered() {
        let doc = render(vec![ContentOp::title("Mietvertrag")]);
        match &doc.pages[0].ops[0] {
            DrawOp::Text { x, bold, .. } => {
                assert!(*x > 20.0, "title should be centered, not at the margin");
                assert!(bold);
            }
            other => panic!("expected Text, got {:?}", other),
        }
    }

    #[test]
    fn test_label_value_columns() {
        let doc = render(vec![ContentOp::label_value("Kaltmiete", "750,00 €")]);
        let xs: Vec<f64> = doc.pages[0]
            .ops
            .iter()
            .map(|op| match op {
                DrawOp::Text { x, .. } => *x,
                _ => panic!("expected text ops"),
            })
            .collect();
        assert_eq!(xs, vec![20.0, 80.0]);
    }

    #[test]
    fn test_long_content_breaks_pages() {
        let para = "Der Mieter verpflichtet sich, die Wohnung pfleglich zu behandeln. ".repeat(8);
        let plan: ContentPlan = (0..40).map(|_| ContentOp::paragraph(para.clone())).collect();
        let doc = render(plan);
        assert!(doc.pages.len() > 1, "40 long paragraphs must overflow A4");
        // Placements are in document order with non-decreasing page indices.
        let mut prev = 0;
        for p in &doc.placements {
            assert!(p.page >= prev);
            prev = p.page;
        }
    }

    #[test]
    fn test_paragraph_splits_but_earlier_content_stays() {
        // Fill most of the first page, then a 500-char paragraph at 10pt in
        // the 170mm content width: wraps to several lines and splits.
        let mut plan: ContentPlan = (0..42)
            .map(|i| ContentOp::label_value(format!("Feld {}", i), "Wert"))
            .collect();
        let long = "Wohnung und Zubehör sind in vertragsgemäßem Zustand zu halten und bei Auszug besenrein zurückzugeben. ".repeat(5);
        assert!(long.chars().count() >= 500);
        plan.push(ContentOp::paragraph(long));

        let doc = render(plan);
        assert_eq!(doc.pages.len(), 2);
        // The label rows all stay on page 0.
        assert!(doc.placements[..42].iter().all(|p| p.page == 0));
        // The paragraph starts on page 0 and its overflow lines continue
        // on page 1.
        assert_eq!(doc.placements[42].page, 0);
        let page1_lines = doc.pages[1]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .count();
        assert!(page1_lines > 0, "remaining paragraph lines on the new page");
    }

    #[test]
    fn test_signature_block_reserves_fixed_height() {
        let doc = render(vec![
            ContentOp::signature("Vermieter", "Anna Ardelt"),
            ContentOp::label_value("Datum", "01.04.2026"),
        ]);
        let sig_y = doc.placements[0].y_mm;
        let after_y = doc.placements[1].y_mm;
        assert_eq!(after_y - sig_y, 50.0);
    }

    #[test]
    fn test_corrupt_signature_image_degrades_gracefully() {
        let plan = vec![ContentOp::SignatureBlock {
            label: "Mieter".to_string(),
            name: "Jonas Brand".to_string(),
            image: Some(vec![0x00, 0x01, 0x02, 0x03, 0x04]),
        }];
        let doc = render(plan);
        assert_eq!(doc.warnings.len(), 1);
        assert!(doc.warnings[0].message.contains("skipped"));
        // The rule and both text lines still render.
        let ops = &doc.pages[0].ops;
        assert!(ops.iter().any(|op| matches!(op, DrawOp::Line { .. })));
        assert_eq!(
            ops.iter().filter(|op| matches!(op, DrawOp::Text { .. })).count(),
            2
        );
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));
    }

    #[test]
    fn test_signature_image_embeds_with_aspect_ratio() {
        let mut png = image::RgbaImage::new(1, 1);
        png.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, png.as_raw(), 1, 1, image::ColorType::Rgba8)
            .unwrap();

        let plan = vec![ContentOp::SignatureBlock {
            label: "Mieter".to_string(),
            name: "Jonas Brand".to_string(),
            image: Some(buf),
        }];
        let doc = render(plan);
        assert!(doc.warnings.is_empty());
        // A square image is scaled to the 20mm slot height.
        match doc.pages[0]
            .ops
            .iter()
            .find(|op| matches!(op, DrawOp::Image { .. }))
        {
            Some(DrawOp::Image { width, height, .. }) => {
                assert_eq!((*width, *height), (20.0, 20.0));
            }
            _ => panic!("expected an embedded signature image"),
        }
    }

    #[test]
    fn test_negative_indent_is_fatal_with_op_index() {
        let plan = vec![
            ContentOp::title("Ok"),
            ContentOp::Paragraph {
                text: "x".to_string(),
                indent_mm: -1.0,
            },
        ];
        let err = FlowRenderer::default()
            .render(&plan, &BuiltinMetrics)
            .unwrap_err();
        match err {
            MietwerkError::Plan { index, .. } => assert_eq!(index, 1),
            other => panic!("expected Plan error, got {}", other),
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let plan: ContentPlan = vec![
            ContentOp::title("Betriebskostenabrechnung"),
            ContentOp::heading("§ 1 Abrechnungszeitraum"),
            ContentOp::paragraph("Die Abrechnung erfolgt jährlich. ".repeat(30)),
            ContentOp::Separator,
        ];
        let a = render(plan.clone());
        let b = render(plan);
        assert_eq!(
            serde_json::to_string(&a.pages).unwrap(),
            serde_json::to_string(&b.pages).unwrap()
        );
    }

    #[test]
    fn test_heading_reserves_leading_space_mid_page() {
        let doc = render(vec![
            ContentOp::label_value("A", "1"),
            ContentOp::heading("§ 2 Mietzins"),
        ]);
        let after_label = doc.placements[0].y_mm + 6.0;
        assert_eq!(doc.placements[1].y_mm, after_label + 4.0);
    }
}
