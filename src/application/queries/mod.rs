mod extract_text;

pub use extract_text::{ExtractTextError, ExtractTextHandler, ExtractTextQuery, ExtractTextResult};
