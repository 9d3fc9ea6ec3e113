//! Small formatting helpers shared by everything the binary prints:
//! an accent highlight for argument-like text and a uniform
//! `[source] message` shape for status and error lines.

use colored::Colorize;

use crate::cli::colors::GRANARY_GOLD;

pub fn highlight_argument(argument: &str) -> String {
    //! Render a fragment in the accent color so it stands out
    //! inside a longer line.

    format!("{}", argument.color(GRANARY_GOLD))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! Prefix `message` with a padded, bold source tag (like 'error')
    //! so all status lines share one shape.

    let source_formatted = format!("{:7}", source_name.color(GRANARY_GOLD).bold());

    format!("[{}] {}", source_formatted, message)
}
