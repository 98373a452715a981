pub mod changes;
pub mod document;
pub mod error;
pub mod link_index;
pub mod links;
pub mod session;

pub use changes::{CellChange, ChangeLog};
pub use document::{Document, Row};
pub use error::EngineError;
pub use link_index::LinkIndex;
pub use session::Session;
