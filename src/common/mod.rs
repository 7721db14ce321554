//! Common types and utilities shared by the package engine and the
//! presentation layer.

pub mod color;
pub mod unit;
pub mod xml;

pub use color::RGBColor;
