pub mod auth;
pub mod encoding;
pub mod observability;
pub mod ocr;
pub mod storage;
