//! SQL text helpers.
//!
//! - [`dialect`] - identifier quoting per warehouse
//! - [`text`] - indentation and column-list layout

pub mod dialect;
pub mod text;


pub use dialect::Dialect;
