pub mod pdf_extract;
pub mod summary_request;
pub mod utils;

pub use pdf_extract::{extract_text, extract_text_from_pdf};
pub use summary_request::{build_prompt, parse_analysis_record, request_summary};
pub use utils::{GeminiClient, TextGenerator};
