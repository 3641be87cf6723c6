//! # Document Editing Session
//!
//! A transient, process-local editing session. The session owns exactly one
//! `DocumentDesign` and is the only thing that mutates it: element factories,
//! patch-merge updates, z-order moves, page management, and view state. It is
//! an explicit passed-by-reference object with no global state; one session
//! per open document, discarded on close.
//!
//! Every mutating operation sets the dirty flag; `mark_as_saved` is the only
//! operation that clears it. Selection is page-scoped: element ids are only
//! guaranteed unique within a page for the lifetime of the session, so
//! switching pages never carries a selection forward.

use serde::{Deserialize, Serialize};

use crate::model::{
    CanvasElement, Color, DocumentDesign, ElementId, ElementKind, FontWeight, Page, TextAlign,
    TextRole,
};

pub const ZOOM_MIN: f64 = 25.0;
pub const ZOOM_MAX: f64 = 200.0;

/// A partial update merged into an element. Fields that do not apply to the
/// element's variant are ignored; the variant tag itself never changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Text content (Text), QR payload (QrCode).
    pub content: Option<String>,
    pub font: Option<String>,
    pub size: Option<f64>,
    pub weight: Option<FontWeight>,
    /// Primary/foreground color of the variant.
    pub color: Option<Color>,
    pub align: Option<TextAlign>,
    pub src: Option<String>,
    pub items: Option<Vec<String>>,
    /// Signature label or Variable display label.
    pub label: Option<String>,
    pub show_date: Option<bool>,
    pub show_line: Option<bool>,
    pub background_color: Option<Color>,
    pub opacity: Option<f64>,
    pub thickness: Option<f64>,
}

/// The editing session. See module docs.
#[derive(Debug, Clone)]
pub struct EditingSession {
    design: DocumentDesign,
    selected_element_id: Option<ElementId>,
    current_page_index: usize,
    zoom: f64,
    grid_visible: bool,
    snap_to_grid: bool,
    grid_size_mm: f64,
    dirty: bool,
    next_element_id: u64,
    next_page_id: u64,
}

impl EditingSession {
    /// Start a session on a fresh single-page design.
    pub fn new() -> Self {
        Self::with_design(DocumentDesign::new("design-1", "Unbenanntes Dokument"))
    }

    /// Start a session on a loaded design (freshly loaded = not dirty).
    pub fn with_design(design: DocumentDesign) -> Self {
        let (next_element_id, next_page_id) = seed_id_counters(&design);
        Self {
            design,
            selected_element_id: None,
            current_page_index: 0,
            zoom: 100.0,
            grid_visible: false,
            snap_to_grid: false,
            grid_size_mm: 5.0,
            dirty: false,
            next_element_id,
            next_page_id,
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn design(&self) -> &DocumentDesign {
        &self.design
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn selected_element_id(&self) -> Option<&ElementId> {
        self.selected_element_id.as_ref()
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn current_page(&self) -> &Page {
        &self.design.pages[self.current_page_index]
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    pub fn grid_size_mm(&self) -> f64 {
        self.grid_size_mm
    }

    fn current_page_mut(&mut self) -> &mut Page {
        &mut self.design.pages[self.current_page_index]
    }

    fn fresh_element_id(&mut self) -> ElementId {
        let id = format!("el-{}", self.next_element_id);
        self.next_element_id += 1;
        id
    }

    /// Append to the current page (top of z-order) and select. Creation
    /// always succeeds.
    fn push_element(&mut self, element: CanvasElement) -> ElementId {
        let id = element.id.clone();
        self.current_page_mut().elements.push(element);
        self.selected_element_id = Some(id.clone());
        self.dirty = true;
        id
    }

    // ── Element factories ───────────────────────────────────────

    pub fn add_text_element(&mut self, role: TextRole) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_text(id, role, &self.design);
        self.push_element(el)
    }

    pub fn add_image_element(&mut self, src: impl Into<String>) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_image(id, src);
        self.push_element(el)
    }

    pub fn add_table_element(&mut self, rows: usize, columns: usize) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_table(id, rows, columns, &self.design);
        self.push_element(el)
    }

    pub fn add_line_element(&mut self) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_line(id, &self.design);
        self.push_element(el)
    }

    pub fn add_box_element(&mut self) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_box(id, &self.design);
        self.push_element(el)
    }

    pub fn add_list_element(&mut self) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_list(id, &self.design);
        self.push_element(el)
    }

    pub fn add_signature_element(&mut self, label: impl Into<String>) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_signature(id, label);
        self.push_element(el)
    }

    pub fn add_qr_code_element(&mut self, content: impl Into<String>) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_qr_code(id, content);
        self.push_element(el)
    }

    pub fn add_variable_element(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
    ) -> ElementId {
        let id = self.fresh_element_id();
        let el = CanvasElement::new_variable(id, key, label, &self.design);
        self.push_element(el)
    }

    // ── Element mutation ────────────────────────────────────────

    /// Merge `patch` into the element matching `id` on the current page.
    /// Absent id: no mutation, no dirty flag.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) {
        let Some(element) = self
            .current_page_mut()
            .elements
            .iter_mut()
            .find(|e| e.id == id)
        else {
            return;
        };
        apply_patch(element, patch);
        self.dirty = true;
    }

    /// Remove the element from the current page. Clears the selection if the
    /// deleted element was selected.
    pub fn delete_element(&mut self, id: &str) {
        let page = self.current_page_mut();
        let before = page.elements.len();
        page.elements.retain(|e| e.id != id);
        if page.elements.len() == before {
            return;
        }
        if self.selected_element_id.as_deref() == Some(id) {
            self.selected_element_id = None;
        }
        self.dirty = true;
    }

    /// Move to the end of the element list (paints on top). No-op if absent
    /// or already frontmost.
    pub fn bring_to_front(&mut self, id: &str) {
        let page = self.current_page_mut();
        let Some(pos) = page.elements.iter().position(|e| e.id == id) else {
            return;
        };
        if pos + 1 == page.elements.len() {
            return;
        }
        let el = page.elements.remove(pos);
        page.elements.push(el);
        self.dirty = true;
    }

    /// Move to the start of the element list (paints underneath). No-op if
    /// absent or already backmost.
    pub fn send_to_back(&mut self, id: &str) {
        let page = self.current_page_mut();
        let Some(pos) = page.elements.iter().position(|e| e.id == id) else {
            return;
        };
        if pos == 0 {
            return;
        }
        let el = page.elements.remove(pos);
        page.elements.insert(0, el);
        self.dirty = true;
    }

    pub fn select_element(&mut self, id: Option<ElementId>) {
        self.selected_element_id = id;
    }

    // ── Page management ─────────────────────────────────────────

    /// Append an empty page and make it current.
    pub fn add_page(&mut self) {
        let id = format!("page-{}", self.next_page_id);
        self.next_page_id += 1;
        self.design.pages.push(Page::empty(id));
        self.current_page_index = self.design.pages.len() - 1;
        self.selected_element_id = None;
        self.dirty = true;
    }

    /// Remove a page. Rejected (no-op) while only one page remains or the
    /// index is out of range; afterwards the current page index is clamped.
    pub fn delete_page(&mut self, index: usize) {
        if self.design.pages.len() <= 1 || index >= self.design.pages.len() {
            return;
        }
        self.design.pages.remove(index);
        let max = self.design.pages.len() - 1;
        if self.current_page_index > max {
            self.current_page_index = max;
        }
        self.selected_element_id = None;
        self.dirty = true;
    }

    /// Switch pages, clamping into range. Always clears the selection.
    pub fn go_to_page(&mut self, index: usize) {
        self.current_page_index = index.min(self.design.pages.len() - 1);
        self.selected_element_id = None;
    }

    // ── View state ──────────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid_visible = visible;
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.snap_to_grid = snap;
    }

    pub fn set_grid_size_mm(&mut self, size: f64) {
        self.grid_size_mm = size.max(0.5);
    }

    // ── Metadata & lifecycle ────────────────────────────────────

    pub fn rename(&mut self, name: impl Into<String>) {
        self.design.name = name.into();
        self.dirty = true;
    }

    /// The only operation that clears the dirty flag.
    pub fn mark_as_saved(&mut self) {
        self.dirty = false;
    }

    /// Replace the document wholesale: page index back to 0, selection and
    /// dirty flag cleared (a freshly loaded document is unmodified).
    pub fn load_design(&mut self, design: DocumentDesign) {
        let (next_element_id, next_page_id) = seed_id_counters(&design);
        self.next_element_id = next_element_id;
        self.next_page_id = next_page_id;
        self.design = design;
        self.current_page_index = 0;
        self.selected_element_id = None;
        self.dirty = false;
    }
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters resume past the highest `el-<n>` / `page-<n>` already present,
/// so ids minted after a load never collide with existing ones.
fn seed_id_counters(design: &DocumentDesign) -> (u64, u64) {
    let elements = design
        .pages
        .iter()
        .flat_map(|page| page.elements.iter())
        .map(|element| element.id.as_str());
    let pages = design.pages.iter().map(|page| page.id.as_str());
    (
        highest_suffix(elements, "el-") + 1,
        highest_suffix(pages, "page-") + 1,
    )
}

fn highest_suffix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

fn apply_patch(element: &mut CanvasElement, patch: &ElementPatch) {
    if let Some(x) = patch.x {
        element.frame.x = x;
    }
    if let Some(y) = patch.y {
        element.frame.y = y;
    }
    if let Some(w) = patch.width {
        element.frame.width = w.max(0.0);
    }
    if let Some(h) = patch.height {
        element.frame.height = h.max(0.0);
    }

    match &mut element.kind {
        ElementKind::Text {
            content,
            font,
            size,
            weight,
            color,
            align,
            ..
        } => {
            merge(content, &patch.content);
            merge(font, &patch.font);
            merge(size, &patch.size);
            merge(weight, &patch.weight);
            merge(color, &patch.color);
            merge(align, &patch.align);
        }
        ElementKind::Image { src, .. } => {
            merge(src, &patch.src);
        }
        ElementKind::Table {
            border_color,
            border_width,
            ..
        } => {
            merge(border_color, &patch.color);
            merge(border_width, &patch.thickness);
        }
        ElementKind::Line {
            color, thickness, ..
        } => {
            merge(color, &patch.color);
            merge(thickness, &patch.thickness);
        }
        ElementKind::Box {
            background_color,
            border_color,
            opacity,
            ..
        } => {
            merge(background_color, &patch.background_color);
            merge(border_color, &patch.color);
            if let Some(o) = patch.opacity {
                *opacity = o.clamp(0.0, 1.0);
            }
        }
        ElementKind::List {
            items,
            font,
            size,
            color,
            ..
        } => {
            merge(items, &patch.items);
            merge(font, &patch.font);
            merge(size, &patch.size);
            merge(color, &patch.color);
        }
        ElementKind::Signature {
            label,
            show_date,
            show_line,
        } => {
            merge(label, &patch.label);
            merge(show_date, &patch.show_date);
            merge(show_line, &patch.show_line);
        }
        ElementKind::QrCode {
            content,
            size,
            color,
            background_color,
        } => {
            merge(content, &patch.content);
            merge(size, &patch.size);
            merge(color, &patch.color);
            merge(background_color, &patch.background_color);
        }
        ElementKind::Variable {
            variable_label,
            font,
            size,
            weight,
            color,
            ..
        } => {
            merge(variable_label, &patch.label);
            merge(font, &patch.font);
            merge(size, &patch.size);
            merge(weight, &patch.weight);
            merge(color, &patch.color);
        }
    }
}

fn merge<T: Clone>(target: &mut T, source: &Option<T>) {
    if let Some(v) = source {
        *target = v.clone();
    }
}
