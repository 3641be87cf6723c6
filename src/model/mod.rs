//! # Document Model
//!
//! The element-based representation of a user-designed document. A design is
//! an ordered list of pages, each an ordered list of canvas elements. Element
//! order within a page *is* the paint order: the last element paints on top.
//!
//! Every element kind is a variant of one tagged union, so "exactly one shape
//! per kind" holds at compile time. This is designed to round-trip through
//! JSON unchanged, for external persistence collaborators.

use serde::{Deserialize, Serialize};

/// Identifier for a canvas element. Unique within a page for the lifetime of
/// an editing session; carries no ownership semantics.
pub type ElementId = String;

/// A rectangle in page-relative millimeters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PositionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PositionRect {
    /// Build a rect, clamping negative dimensions to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// Edge values (top, right, bottom, left) in millimeters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

impl Default for Edges {
    fn default() -> Self {
        Edges::uniform(20.0)
    }
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }
}

/// Text role presets for text elements.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TextRole {
    Headline,
    #[default]
    Body,
    Caption,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ObjectFit {
    #[default]
    Contain,
    Cover,
    Fill,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ListStyle {
    #[default]
    Bullet,
    Numbered,
}

/// A canvas element: a unique id, a frame on the page, and one variant of
/// kind-specific attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    pub id: ElementId,
    pub frame: PositionRect,
    pub kind: ElementKind,
}

/// The different kinds of canvas elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Text {
        content: String,
        role: TextRole,
        font: String,
        size: f64,
        weight: FontWeight,
        color: Color,
        align: TextAlign,
        /// Multiplier of font size.
        line_height: f64,
    },

    Image {
        /// Base64 data, data URI, or file path (see `image_loader`).
        src: String,
        alt_text: String,
        object_fit: ObjectFit,
        border_radius: f64,
    },

    /// A grid of text cells. `cells` is row-major and always `rows × columns`.
    Table {
        rows: usize,
        columns: usize,
        cells: Vec<Vec<String>>,
        header_row: bool,
        border_color: Color,
        border_width: f64,
        cell_padding: f64,
    },

    Line {
        color: Color,
        thickness: f64,
        style: LineStyle,
    },

    Box {
        background_color: Color,
        border_color: Color,
        border_width: f64,
        border_style: LineStyle,
        border_radius: f64,
        /// 0.0 - 1.0.
        opacity: f64,
    },

    List {
        items: Vec<String>,
        list_style: ListStyle,
        font: String,
        size: f64,
        color: Color,
    },

    /// A signature area: optional date line and signing rule.
    Signature {
        label: String,
        show_date: bool,
        show_line: bool,
    },

    QrCode {
        content: String,
        size: f64,
        color: Color,
        background_color: Color,
    },

    /// A placeholder resolved against a runtime data-binding context.
    Variable {
        variable_key: String,
        variable_label: String,
        font: String,
        size: f64,
        weight: FontWeight,
        color: Color,
    },
}

impl ElementKind {
    /// Human-readable variant name, for warnings and dev tools.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Text { .. } => "Text",
            ElementKind::Image { .. } => "Image",
            ElementKind::Table { .. } => "Table",
            ElementKind::Line { .. } => "Line",
            ElementKind::Box { .. } => "Box",
            ElementKind::List { .. } => "List",
            ElementKind::Signature { .. } => "Signature",
            ElementKind::QrCode { .. } => "QrCode",
            ElementKind::Variable { .. } => "Variable",
        }
    }
}

/// A single page: an ordered element list (z-order = list order) and a
/// background color.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub elements: Vec<CanvasElement>,
    pub background_color: Color,
}

impl Page {
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            elements: Vec::new(),
            background_color: Color::WHITE,
        }
    }
}

/// Where a logo sits in a header/footer band.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LogoPosition {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Configuration of the header or footer band of a design.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFooterConfig {
    pub enabled: bool,
    pub height_mm: f64,
    #[serde(default)]
    pub elements: Vec<CanvasElement>,
    pub show_page_number: bool,
    pub show_date: bool,
    pub show_document_name: bool,
    pub logo_position: LogoPosition,
}

impl Default for HeaderFooterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            height_mm: 15.0,
            elements: Vec::new(),
            show_page_number: false,
            show_date: false,
            show_document_name: false,
            logo_position: LogoPosition::None,
        }
    }
}

/// Visual preset for a design.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DesignVariant {
    Classic,
    Modern,
    Elegant,
    #[default]
    Custom,
}

/// A complete user-designed document. `pages` is never empty; the editing
/// session rejects deleting the last page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDesign {
    pub id: String,
    pub name: String,
    pub variant: DesignVariant,
    pub pages: Vec<Page>,
    #[serde(default)]
    pub header: HeaderFooterConfig,
    #[serde(default)]
    pub footer: HeaderFooterConfig,
    #[serde(default)]
    pub margins: Edges,
    pub default_font: String,
    pub default_font_size: f64,
    pub default_color: Color,
    pub accent_color: Color,
}

impl DocumentDesign {
    /// A fresh single-page design with standard defaults.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variant: DesignVariant::Custom,
            pages: vec![Page::empty("page-1")],
            header: HeaderFooterConfig::default(),
            footer: HeaderFooterConfig::default(),
            margins: Edges::default(),
            default_font: "Helvetica".to_string(),
            default_font_size: 11.0,
            default_color: Color::BLACK,
            accent_color: Color::hex("#1a3c6e"),
        }
    }
}

/// Element factory constructors. Each picks a default frame at (20, 20)
/// sized sensibly for the variant and inherits the owning design's defaults.
/// Creation never fails.
impl CanvasElement {
    pub fn new_text(id: ElementId, role: TextRole, design: &DocumentDesign) -> Self {
        let (size, weight, height) = match role {
            TextRole::Headline => (design.default_font_size + 7.0, FontWeight::Bold, 14.0),
            TextRole::Body => (design.default_font_size, FontWeight::Normal, 10.0),
            TextRole::Caption => (design.default_font_size - 3.0, FontWeight::Normal, 7.0),
        };
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 120.0, height),
            kind: ElementKind::Text {
                content: String::new(),
                role,
                font: design.default_font.clone(),
                size,
                weight,
                color: design.default_color,
                align: TextAlign::Left,
                line_height: 1.4,
            },
        }
    }

    pub fn new_image(id: ElementId, src: impl Into<String>) -> Self {
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 60.0, 45.0),
            kind: ElementKind::Image {
                src: src.into(),
                alt_text: String::new(),
                object_fit: ObjectFit::Contain,
                border_radius: 0.0,
            },
        }
    }

    /// Table height defaults to 8mm per row.
    pub fn new_table(id: ElementId, rows: usize, columns: usize, design: &DocumentDesign) -> Self {
        let rows = rows.max(1);
        let columns = columns.max(1);
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 150.0, rows as f64 * 8.0),
            kind: ElementKind::Table {
                rows,
                columns,
                cells: vec![vec![String::new(); columns]; rows],
                header_row: true,
                border_color: design.default_color,
                border_width: 0.3,
                cell_padding: 1.5,
            },
        }
    }

    pub fn new_line(id: ElementId, design: &DocumentDesign) -> Self {
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 120.0, 0.5),
            kind: ElementKind::Line {
                color: design.default_color,
                thickness: 0.5,
                style: LineStyle::Solid,
            },
        }
    }

    pub fn new_box(id: ElementId, design: &DocumentDesign) -> Self {
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 80.0, 40.0),
            kind: ElementKind::Box {
                background_color: Color::WHITE,
                border_color: design.default_color,
                border_width: 0.3,
                border_style: LineStyle::Solid,
                border_radius: 0.0,
                opacity: 1.0,
            },
        }
    }

    pub fn new_list(id: ElementId, design: &DocumentDesign) -> Self {
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 120.0, 30.0),
            kind: ElementKind::List {
                items: vec![String::new()],
                list_style: ListStyle::Bullet,
                font: design.default_font.clone(),
                size: design.default_font_size,
                color: design.default_color,
            },
        }
    }

    pub fn new_signature(id: ElementId, label: impl Into<String>) -> Self {
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 70.0, 25.0),
            kind: ElementKind::Signature {
                label: label.into(),
                show_date: true,
                show_line: true,
            },
        }
    }

    pub fn new_qr_code(id: ElementId, content: impl Into<String>) -> Self {
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 30.0, 30.0),
            kind: ElementKind::QrCode {
                content: content.into(),
                size: 30.0,
                color: Color::BLACK,
                background_color: Color::WHITE,
            },
        }
    }

    pub fn new_variable(
        id: ElementId,
        key: impl Into<String>,
        label: impl Into<String>,
        design: &DocumentDesign,
    ) -> Self {
        Self {
            id,
            frame: PositionRect::new(20.0, 20.0, 60.0, 8.0),
            kind: ElementKind::Variable {
                variable_key: key.into(),
                variable_label: label.into(),
                font: design.default_font.clone(),
                size: design.default_font_size,
                weight: FontWeight::Normal,
                color: design.default_color,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_clamps_negative_dimensions() {
        let r = PositionRect::new(5.0, 5.0, -10.0, -1.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
    }

    #[test]
    fn test_color_hex() {
        let c = Color::hex("#ff0000");
        assert!((c.r - 1.0).abs() < 1e-9);
        assert_eq!(c.g, 0.0);
        let short = Color::hex("fff");
        assert!((short.b - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_table_factory_cell_dimensions() {
        let design = DocumentDesign::new("d1", "Test");
        let el = CanvasElement::new_table("el-1".to_string(), 4, 3, &design);
        match &el.kind {
            ElementKind::Table {
                rows,
                columns,
                cells,
                ..
            } => {
                assert_eq!((*rows, *columns), (4, 3));
                assert_eq!(cells.len(), 4);
                assert!(cells.iter().all(|row| row.len() == 3));
            }
            _ => panic!("expected Table"),
        }
        assert_eq!(el.frame.height, 32.0); // 4 rows × 8mm
    }

    #[test]
    fn test_element_kind_round_trips_through_json() {
        let design = DocumentDesign::new("d1", "Test");
        let el = CanvasElement::new_text("el-1".to_string(), TextRole::Headline, &design);
        let json = serde_json::to_string(&el).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        let back: CanvasElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "el-1");
        assert!(matches!(back.kind, ElementKind::Text { .. }));
    }

    #[test]
    fn test_new_design_has_one_page() {
        let design = DocumentDesign::new("d1", "Mietvertrag");
        assert_eq!(design.pages.len(), 1);
        assert!(design.pages[0].elements.is_empty());
    }
}
