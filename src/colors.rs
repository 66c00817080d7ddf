//! Global colors.

use nu_ansi_term::Color;

/// The attention color.
pub(crate) const ATTENTION_COLOR: Color = Color::Red;

/// The information color (versions, runtimes, etc.).
pub(crate) const INFO_COLOR: Color = Color::Cyan;

/// The color used to colorise the name of an installation.
pub(crate) const NAME_COLOR: Color = Color::Green;

/// The color used to colorise the path.
pub(crate) const PATH_COLOR: Color = Color::LightBlue;
