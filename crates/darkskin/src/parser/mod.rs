//! CSS block and declaration parsing.

mod block;
mod declaration;
pub(crate) mod scan;

pub use block::{CATCH_ALL_SELECTOR, CssNode, parse_blocks};
pub use declaration::{Declaration, parse_declarations, split_declarations};
pub use scan::strip_comments;
