//! Color representations and dark-mode remapping policies.

mod policy;
mod types;

pub use policy::{ColorPolicy, ColorTransformer};
pub use types::{Hsl, Rgb};
