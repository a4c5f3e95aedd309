//! VerseKit Portable - Self-contained HTML output
//!
//! Rewrites local `<img src>` references into base64 data URIs so a page can
//! be opened or shared as a single file

pub mod inliner;
pub mod mime;

pub use inliner::*;
pub use mime::mime_type_for;
