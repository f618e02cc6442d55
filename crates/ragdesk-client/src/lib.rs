//! Session lifecycle and authenticated gateway for the RAG document assistant.
//!
//! - [`session`]: who the current user is, backed by a Supabase GoTrue
//!   identity service and a pluggable session store
//! - [`gateway`]: bearer-authenticated calls to the RAG backend
//! - [`guard`]: point-in-time access checks for protected entry points
//! - [`workflow`]: chat, admin and login interactions rendered as
//!   [`page::PageEvent`]s

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod page;
pub mod result_ext;
pub mod session;
pub mod workflow;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, FALLBACK_ERROR_MESSAGE};
pub use gateway::{Gateway, RequestBody};
pub use guard::PageGuard;
pub use page::{Navigator, Page, PageEvent, Route};
pub use session::{FileStore, MemoryStore, SessionProvider, SessionStore};
pub use workflow::{Action, Outcome, WorkflowRegistry};
