pub mod document;
pub mod status;
pub mod task;

pub use document::{Document, Revision};
pub use status::TaskStatus;
pub use task::{Task, TaskDocumentError};
