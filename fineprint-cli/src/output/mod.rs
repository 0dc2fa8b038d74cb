//! Output formatting for CLI.

mod json;
mod text;

pub use json::{AnchorScoreOutput, JsonFormatter};
pub use text::TextFormatter;
