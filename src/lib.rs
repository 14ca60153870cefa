//! Core engine for recording buyer communications against a hierarchical
//! real-estate catalog.
//!
//! The catalog lives in a remote board-based data service (Project →
//! Building → Apartment, plus optional Storage/Parking/Commercial units).
//! This crate owns the two parts with real correctness concerns:
//!
//! - [`cascade::SelectionCascade`] — dependent-selection resolution with
//!   descendant invalidation and a generation-token staleness guard.
//! - [`buyers::BuyerReconciler`] / [`submit::SubmissionOrchestrator`] —
//!   find-or-create buyer reconciliation by national ID, followed by
//!   creation of the communication record linking buyers to units.
//!
//! Rendering, host-session plumbing and transport authentication stay with
//! the embedding application; the engine consumes a [`api::Transport`]
//! capability and a [`notice::NoticeSender`] channel and nothing else.

pub mod api;
pub mod buyers;
pub mod cascade;
pub mod config;
pub mod error;
pub mod notice;
pub mod options;
pub mod resource;
pub mod submit;
pub mod validate;

pub use api::{CatalogClient, CatalogItem, HttpTransport, Transport};
pub use api::models::{BoardId, ColumnId, ItemId};
pub use buyers::{BuyerReconciler, BuyerRow, ReconciledBuyer, RequiredFields};
pub use cascade::{FetchOutcome, FetchRequest, FetchTicket, SelectionCascade, SelectionState};
pub use config::BoardsConfig;
pub use error::{DecodeError, RemoteError, SubmitError, ValidationError};
pub use notice::{LogNotices, Notice, NoticeKind, NoticeSender};
pub use options::{OptionItem, OptionSet};
pub use resource::Resource;
pub use submit::{FileHandle, FormSubmission, SubmissionOrchestrator, SubmissionReceipt};
