//! Code fixes: turn findings into text edits and apply them.

mod edit;
mod rewrite;

pub use edit::{apply_edits, Edit, EditError};
pub use rewrite::Rewriter;
