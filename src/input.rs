pub mod kv;
pub mod parser;

pub use parser::parse;
