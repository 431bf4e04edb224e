//! Frames: one screen of content or one question
//!
//! The `type` tag of an authored frame is a closed set. Whether a frame takes
//! an answer is decided by its kind, and callers reach answer-specific data
//! through [`AnswerableFrame`] rather than by checking tags by hand.

use serde::{Deserialize, Serialize};

use crate::types::{AnswerValue, Stage};

/// Every frame kind the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameKind {
    // Content
    What,
    WhyReal,
    Definition,
    Example,
    WorkedExample,
    Formula,
    Visual,
    Summary,

    // Answerable
    Mcq,
    Numerical,
    ShortExplain,
    ErrorDetect,
    Recall,

    // Support Lock only
    AceReteach,
    AceAck,
}

impl FrameKind {
    /// Kinds that take a learner answer and show a result afterwards
    pub fn is_answerable(self) -> bool {
        matches!(
            self,
            FrameKind::Mcq
                | FrameKind::Numerical
                | FrameKind::ShortExplain
                | FrameKind::ErrorDetect
                | FrameKind::Recall
        )
    }

    /// Kinds synthesized by the Support Lock; never authored
    pub fn is_support_lock_only(self) -> bool {
        matches!(self, FrameKind::AceReteach | FrameKind::AceAck)
    }

    /// Kinds whose wrong answers count toward remediation. Recall is excluded.
    pub fn counts_toward_remediation(self) -> bool {
        matches!(
            self,
            FrameKind::Mcq | FrameKind::Numerical | FrameKind::ErrorDetect | FrameKind::ShortExplain
        )
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            FrameKind::What => "what",
            FrameKind::WhyReal => "why-real",
            FrameKind::Definition => "definition",
            FrameKind::Example => "example",
            FrameKind::WorkedExample => "worked-example",
            FrameKind::Formula => "formula",
            FrameKind::Visual => "visual",
            FrameKind::Summary => "summary",
            FrameKind::Mcq => "mcq",
            FrameKind::Numerical => "numerical",
            FrameKind::ShortExplain => "short-explain",
            FrameKind::ErrorDetect => "error-detect",
            FrameKind::Recall => "recall",
            FrameKind::AceReteach => "ace-reteach",
            FrameKind::AceAck => "ace-ack",
        };
        write!(f, "{}", tag)
    }
}

/// Display and question payload of a frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<AnswerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One learning frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FrameKind,
    pub stage: Stage,
    /// Authoring metadata only; traversal follows array order
    #[serde(default)]
    pub order: i32,
    #[serde(flatten)]
    pub content: FrameContent,
}

impl Frame {
    /// Exact-match correctness. Frames without an answer key are vacuously correct.
    pub fn evaluate(&self, answer: &AnswerValue) -> bool {
        match &self.content.correct_answer {
            Some(key) => key == answer,
            None => true,
        }
    }

    /// Split the frame by capability
    pub fn view(&self) -> FrameView<'_> {
        if self.kind.is_answerable() {
            FrameView::Answerable(AnswerableFrame { frame: self })
        } else {
            FrameView::Content(ContentFrame { frame: self })
        }
    }

    pub fn as_answerable(&self) -> Option<AnswerableFrame<'_>> {
        match self.view() {
            FrameView::Answerable(answerable) => Some(answerable),
            FrameView::Content(_) => None,
        }
    }

    pub fn requires_answer(&self) -> bool {
        self.kind.is_answerable()
    }
}

/// A frame seen through its capability
#[derive(Debug, Clone, Copy)]
pub enum FrameView<'a> {
    Answerable(AnswerableFrame<'a>),
    Content(ContentFrame<'a>),
}

/// A frame that takes an answer
#[derive(Debug, Clone, Copy)]
pub struct AnswerableFrame<'a> {
    frame: &'a Frame,
}

impl<'a> AnswerableFrame<'a> {
    pub fn question(&self) -> Option<&'a str> {
        self.frame.content.question.as_deref()
    }

    pub fn options(&self) -> &'a [String] {
        self.frame.content.options.as_deref().unwrap_or(&[])
    }

    pub fn answer_key(&self) -> Option<&'a AnswerValue> {
        self.frame.content.correct_answer.as_ref()
    }

    pub fn hint(&self) -> Option<&'a str> {
        self.frame.content.hint.as_deref()
    }

    pub fn explanation(&self) -> Option<&'a str> {
        self.frame.content.explanation.as_deref()
    }

    /// Parse raw input into the shape of this frame's answer key
    pub fn parse_answer(&self, input: &str) -> AnswerValue {
        AnswerValue::parse_like(self.answer_key(), input)
    }
}

/// A frame that is only displayed
#[derive(Debug, Clone, Copy)]
pub struct ContentFrame<'a> {
    frame: &'a Frame,
}

impl<'a> ContentFrame<'a> {
    pub fn title(&self) -> Option<&'a str> {
        self.frame.content.title.as_deref()
    }

    pub fn body(&self) -> Option<&'a str> {
        self.frame.content.body.as_deref()
    }

    pub fn formula(&self) -> Option<&'a str> {
        self.frame.content.formula.as_deref()
    }

    pub fn image_url(&self) -> Option<&'a str> {
        self.frame.content.image_url.as_deref()
    }
}
