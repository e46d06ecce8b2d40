//! Session state: uploaded documents, results, and the two editors.
//!
//! - [`SessionModel`] registers sources and processed results.
//! - [`SplitEditor`] holds the page selection for the active document.
//! - [`MergePlan`] holds the ordered documents to concatenate.
//!
//! Nothing here talks to the transform engine or the history store; the
//! [`Workspace`](crate::workspace::Workspace) wires them together.

pub mod editor;
pub mod model;
pub mod plan;

pub use editor::SplitEditor;
pub use model::SessionModel;
pub use plan::MergePlan;
