//! Matching and formatting core for the Kamer chat service.
//!
//! This crate owns the static culture catalogue and the synchronous half of a
//! chat request: deciding which culture a question refers to and rendering the
//! canned answer as plain text and as escaped markup. It performs no network
//! I/O; translation and the HTTP surface live in `kamer-chat-host`.

pub mod catalogue;
pub mod formatter;
pub mod markup;
pub mod resolver;

pub use catalogue::{Catalogue, CatalogueError, CultureEntry};
pub use formatter::{Rendered, render, render_entry, render_fallback};
pub use markup::escape_markup;
pub use resolver::{detect_in_text, find_by_identifier, resolve};
