//! Circuit diagrams for the visualization tools.

mod mermaid;
mod text;

pub use mermaid::to_mermaid;
pub use text::to_text;
