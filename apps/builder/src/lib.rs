// Resume builder: a single-owner document store for resume data, views bound
// to its snapshots, form buffers with required-field checks, and a PDF
// export collaborator. The binary drives it from scripted intents.

pub mod config;
pub mod errors;
pub mod export;
pub mod forms;
pub mod layout;
pub mod models;
pub mod persist;
pub mod photo;
pub mod preview;
pub mod session;
pub mod store;
pub mod theme;

pub use errors::AppError;
pub use session::{Intent, IntentOutcome, Session};
pub use store::{DocumentStore, EditOutcome, Snapshot};
