//! PDF page content reading.
//!
//! [`PageContentReader`] is the seam between the extraction pipeline and the
//! PDF library; [`LopdfReader`] implements it by interpreting page content
//! streams with lopdf.

mod backend;
mod content;
mod layout;
mod reader;

pub use backend::{decode_text_simple, PageContentReader};
pub use reader::LopdfReader;
