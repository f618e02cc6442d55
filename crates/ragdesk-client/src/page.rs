//! Typed page output channel.
//!
//! Workflows never print or touch a UI toolkit. They emit [`PageEvent`]s
//! into an unbounded channel and the front end drains the receiver.

use tokio::sync::mpsc;

use crate::api::{format_similarity, FileRecord, Source};

/// Entry points a workflow can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Chat,
    Admin,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Chat => "chat",
            Route::Admin => "admin",
        }
    }
}

/// Interactive controls that are disabled while a call is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Login,
    ChatSubmit,
    Upload,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A rendered source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub file_name: String,
    /// One-decimal percentage, e.g. `82.3%`.
    pub similarity: String,
}

impl From<&Source> for SourceLine {
    fn from(source: &Source) -> Self {
        Self {
            file_name: source.file_name.clone(),
            similarity: format_similarity(source.similarity),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageEvent {
    ControlEnabled { control: Control, enabled: bool },
    Status { level: StatusLevel, text: String },
    UserMessage(String),
    Answer { text: String, sources: Vec<SourceLine> },
    FileTable(Vec<FileRecord>),
    Redirect(Route),
}

/// Sends the user to another entry point.
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: Route);
}

/// Sending half of the page channel.
#[derive(Debug, Clone)]
pub struct Page {
    tx: mpsc::UnboundedSender<PageEvent>,
}

impl Page {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: PageEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Page receiver dropped, event discarded");
        }
    }

    pub fn status(&self, level: StatusLevel, text: impl Into<String>) {
        self.emit(PageEvent::Status {
            level,
            text: text.into(),
        });
    }

    pub fn error(&self, text: impl Into<String>) {
        self.status(StatusLevel::Error, text);
    }

    pub fn set_enabled(&self, control: Control, enabled: bool) {
        self.emit(PageEvent::ControlEnabled { control, enabled });
    }
}

impl Navigator for Page {
    fn redirect(&self, route: Route) {
        self.emit(PageEvent::Redirect(route));
    }
}
