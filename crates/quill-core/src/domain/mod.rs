//! Domain entities - the core business objects.

mod filter;
mod post;

pub use filter::{Page, PostFilter};
pub use post::{Post, PostDraft, PostFields, PostPatch};
