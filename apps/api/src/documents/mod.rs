// Upload handling and text extraction for résumé files. Everything here is I/O glue in front of
// the matching core, which only ever sees plain text.

pub mod docx;
pub mod extract;
pub mod handlers;
pub mod upload;
