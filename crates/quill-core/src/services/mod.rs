//! Application services - business rules on top of the ports.

mod posts;

pub use posts::{DEFAULT_EXCERPT_LEN, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PostService};
