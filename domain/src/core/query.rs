//! Query value object and its request context.
//!
//! A [`Query`] is immutable for the duration of one orchestration run.

use crate::routing::provider::ProviderKind;
use serde::{Deserialize, Serialize};

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One turn of prior conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// Search modes explicitly enabled by the user for this request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchModes {
    pub web: bool,
    pub academic: bool,
}

impl SearchModes {
    pub fn any(&self) -> bool {
        self.web || self.academic
    }
}

/// Request context bundle travelling with a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Active document the user is studying (forces document retrieval)
    pub document_id: Option<String>,
    /// Explicitly enabled search modes
    pub search: SearchModes,
    /// Prior conversation, oldest first
    pub history: Vec<ChatTurn>,
    /// Per-user provider preference
    pub preferred_provider: Option<ProviderKind>,
    /// Subject or topic the question belongs to (e.g. "chemistry")
    pub subject: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn with_search(mut self, search: SearchModes) -> Self {
        self.search = search;
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.search.web = true;
        self
    }

    pub fn with_academic_search(mut self) -> Self {
        self.search.academic = true;
        self
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_preferred_provider(mut self, provider: ProviderKind) -> Self {
        self.preferred_provider = Some(provider);
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Whether a non-blank document id is attached.
    pub fn has_document(&self) -> bool {
        self.document_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}

/// Raw user text plus its request context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    text: String,
    context: RequestContext,
}

impl Query {
    pub fn new(text: impl Into<String>, context: RequestContext) -> Self {
        Self {
            text: text.into(),
            context,
        }
    }

    /// Query without any request context.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RequestContext::default())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.context.history
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn question_marks(&self) -> usize {
        self.text.matches('?').count()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
