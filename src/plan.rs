//! # Content Plan
//!
//! The renderer-agnostic, ordered sequence of document operations produced
//! from form data and legal-calculation output, consumed by the pagination
//! renderer. One tagged union, one layout pass.

use serde::{Deserialize, Serialize};

/// A single typed content operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentOp {
    /// The document title, centered and large.
    Title { text: String },
    /// Secondary title line under the title.
    Subtitle { text: String },
    /// A numbered or named section heading with extra leading space.
    Heading { text: String },
    /// Body text, word-wrapped to the content width.
    Paragraph {
        text: String,
        #[serde(default)]
        indent_mm: f64,
    },
    /// A "label: value" row on one line.
    LabelValue {
        label: String,
        value: String,
        #[serde(default)]
        indent_mm: f64,
    },
    /// A horizontal rule across the content width.
    Separator,
    /// A signature area: optional image, rule, then label and name lines.
    SignatureBlock {
        label: String,
        name: String,
        /// Raw image bytes of a captured signature, if one was supplied.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<Vec<u8>>,
    },
}

/// An ordered content plan. Nothing more than the op sequence; all placement
/// state lives in the renderer.
pub type ContentPlan = Vec<ContentOp>;

impl ContentOp {
    pub fn title(text: impl Into<String>) -> Self {
        ContentOp::Title { text: text.into() }
    }

    pub fn subtitle(text: impl Into<String>) -> Self {
        ContentOp::Subtitle { text: text.into() }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        ContentOp::Heading { text: text.into() }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentOp::Paragraph {
            text: text.into(),
            indent_mm: 0.0,
        }
    }

    pub fn label_value(label: impl Into<String>, value: impl Into<String>) -> Self {
        ContentOp::LabelValue {
            label: label.into(),
            value: value.into(),
            indent_mm: 0.0,
        }
    }

    pub fn signature(label: impl Into<String>, name: impl Into<String>) -> Self {
        ContentOp::SignatureBlock {
            label: label.into(),
            name: name.into(),
            image: None,
        }
    }
}
