//! Reading-order reconstruction.
//!
//! Two geometric operations over a page's fragments and images:
//! [`merge`] builds one vertically ordered sequence, and [`Locator`] finds
//! the text immediately above and below each image.

mod merge;
mod neighbors;

pub use merge::merge;
pub use neighbors::{locate, Locator};
