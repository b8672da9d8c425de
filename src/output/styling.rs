use console::{style, StyledObject};
use std::fmt::Display;

/// Styling helpers for terminal output
pub fn success(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn warning(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn failure(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn project(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan().bold()
}

pub fn dim(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn banner(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
