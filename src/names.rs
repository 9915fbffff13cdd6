//! Player display name validation
//!
//! Names are trimmed, length checked, and run through a content filter
//! before a player record is created. A player that joins without a name
//! gets a generated pet name instead.

use heck::ToTitleCase;
use rustrict::CensorStr;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during name validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

/// Generates a random title-cased pet name such as "Happy Otter"
pub fn generate() -> String {
    loop {
        if let Some(name) = petname::petname(crate::constants::names::GENERATED_WORDS, " ") {
            return name.to_title_case();
        }
    }
}

/// Turns a requested name into the display name a player is registered with
///
/// # Errors
///
/// * `Error::TooLong` - Name exceeds [`crate::constants::names::MAX_LENGTH`] characters
/// * `Error::Sinful` - Name contains inappropriate content
pub fn resolve(name: &str) -> Result<String, Error> {
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Ok(generate());
    }
    if name.chars().count() > crate::constants::names::MAX_LENGTH {
        return Err(Error::TooLong);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(name.to_owned())
}
