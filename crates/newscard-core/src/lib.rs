//! Newscard Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Newscard
//! headline engine. It includes:
//!
//! - **Colors**: CSS color parsing and RGBA conversion ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Text**: Font handles and the measuring / rasterizing contracts the
//!   layout engine and compositor consume ([`text`] module)

pub mod color;
pub mod geometry;
pub mod text;
