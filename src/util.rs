//! Util.
//!
//! This module contains things that don't fit elsewhere.

use crate::error::{LauncherError, Result};
use std::path::{Component, Path};

/// Ensures the given name can be used as a single file name below a directory and as a single line of a record.
pub(crate) fn validate_name(name: &str) -> Result<&str> {
    if name.chars().any(char::is_control) {
        return Err(LauncherError::InvalidName(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) if component == name => Ok(name),
        _ => Err(LauncherError::InvalidName(name.to_string())),
    }
}
