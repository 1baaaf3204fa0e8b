pub mod common;
pub mod generate;
pub mod validate;
pub mod variants;
