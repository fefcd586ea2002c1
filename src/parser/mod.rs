pub mod code;
pub mod docx;
pub mod plan;

pub use code::{extract_import_tokens, sanitize_generated};
pub use docx::extract_docx_text;
pub use plan::parse_plan;
