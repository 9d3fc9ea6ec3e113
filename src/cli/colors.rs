//! Theme constants for the command line output. Every colored piece of
//! text goes through one of these so the palette stays in one place.
//!
//! - GRANARY_GOLD: the accent color

use colored::Color;

pub(crate) const GRANARY_GOLD: Color = Color::TrueColor {
    r: 218,
    g: 165,
    b: 32,
};
