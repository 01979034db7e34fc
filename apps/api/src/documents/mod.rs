// Document Loader: plain text out of uploaded PDF / DOCX bytes.
// Parsing is CPU-bound and may panic on hostile input; callers run it
// inside tokio::task::spawn_blocking.

pub mod loader;

pub use loader::{load_text, DocumentError, DocumentFormat, RawDocument};
