pub mod storage;
pub mod tokens;
