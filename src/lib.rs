//! # Mietwerk
//!
//! A composition and calculation engine for German rental documents.
//!
//! Most document generators template their way to a PDF: a blob of HTML, a
//! handful of placeholders, and hope. That breaks down the moment the content
//! is legally load-bearing — a notice period computed from the wrong tenancy
//! duration, a deposit a few cents over the statutory cap, a paragraph split
//! so that half a clause lands on the wrong page.
//!
//! Mietwerk does the opposite: **documents are data, and the legal numbers
//! are computed, never typed.** A form record (tenancy agreement, termination
//! notice, handover protocol, utility statement) is composed into an ordered
//! content plan, and the plan flows deterministically into A4 pages. The same
//! input always yields the same pages.
//!
//! ## Architecture
//!
//! ```text
//! Form data (JSON/API)
//!       ↓
//!   [legal]    — Notice periods, deposit caps, escalation, cost allocation
//!       ↓
//!   [compose]  — Form record → ordered content plan
//!       ↓
//!   [layout]   — Deterministic flow across A4 pages
//!       ↓
//!   [render]   — Draw-op stream per page
//! ```
//!
//! Free-form designs built interactively (the [`session`] module) skip the
//! compose step and render element-by-element via [`render::render_design`].

pub mod error;
pub mod log;
pub mod model;
pub mod text;
pub mod legal;
pub mod forms;
pub mod plan;
pub mod compose;
pub mod layout;
pub mod render;
pub mod session;
pub mod image_loader;
pub mod qr;

pub use error::MietwerkError;
pub use layout::{FlowRenderer, PageGeometry, RenderedDocument};
pub use render::{render_design, BindingContext};
pub use text::{BuiltinMetrics, TextMeasurer};

use forms::{
    HandoverProtocolData, TenancyAgreementData, TerminationNoticeData, UtilityStatementData,
};
use plan::ContentPlan;

/// Render a content plan to pages of draw ops.
///
/// This is the primary entry point for plan-based documents. Composition
/// (building the plan from a form record) and rendering are separate so that
/// callers can inspect or amend the plan in between.
pub fn render_plan(
    plan: &ContentPlan,
    measurer: &dyn TextMeasurer,
) -> Result<RenderedDocument, MietwerkError> {
    let renderer = FlowRenderer::new(PageGeometry::a4());
    renderer.render(plan, measurer)
}

/// Compose and render a tenancy agreement described as JSON.
pub fn render_agreement_json(json: &str) -> Result<RenderedDocument, MietwerkError> {
    let data: TenancyAgreementData = serde_json::from_str(json)?;
    let plan = compose::tenancy_agreement_plan(&data)?;
    render_plan(&plan, &BuiltinMetrics)
}

/// Compose and render a termination notice described as JSON.
pub fn render_termination_json(json: &str) -> Result<RenderedDocument, MietwerkError> {
    let data: TerminationNoticeData = serde_json::from_str(json)?;
    let plan = compose::termination_notice_plan(&data)?;
    render_plan(&plan, &BuiltinMetrics)
}

/// Compose and render a handover protocol described as JSON.
pub fn render_handover_json(json: &str) -> Result<RenderedDocument, MietwerkError> {
    let data: HandoverProtocolData = serde_json::from_str(json)?;
    let plan = compose::handover_protocol_plan(&data)?;
    render_plan(&plan, &BuiltinMetrics)
}

/// Compose and render a utility cost statement described as JSON.
pub fn render_statement_json(json: &str) -> Result<RenderedDocument, MietwerkError> {
    let data: UtilityStatementData = serde_json::from_str(json)?;
    let plan = compose::utility_statement_plan(&data)?;
    render_plan(&plan, &BuiltinMetrics)
}
