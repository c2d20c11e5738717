pub mod document;
pub mod grid;
pub mod parse;
