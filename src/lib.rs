//! Japanese text to vocabulary: tokenization through the `morph` crate,
//! token repair, compound detection, dictionary resolution and example
//! sentence selection.

pub mod cache;
pub mod compound;
pub mod config;
pub mod deconjugate;
pub mod dictionary;
pub mod parser;
pub mod repair;
pub mod resolve;
pub mod sentence;
pub mod text;
pub mod token;

pub use parser::{ParsedText, Parser};
