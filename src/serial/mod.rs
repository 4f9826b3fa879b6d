//! Serialization.
//!
//! This module renders a `Document` tree back to indented XML text. Output
//! re-parses to the same tree, apart from the whitespace-only text that
//! indentation adds or removes between tags.

pub mod xml;

pub use xml::{render, render_with_options, RenderOptions};
