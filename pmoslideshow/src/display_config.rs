//! Display record: which folder to show and how to present it

use crate::transition::TransitionMode;
use serde::{Deserialize, Deserializer, Serialize};

/// Title shown when the record has none
pub const DEFAULT_MAIN_TITLE: &str = "Photo Gallery";

const FOLDER_ID_MARKER: &str = "folders/";

/// Settings chosen by the administrator, persisted in the config store.
///
/// Every field is optional in storage; a missing record behaves like
/// `DisplayConfig::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    #[serde(deserialize_with = "empty_if_null")]
    pub folder_id: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub main_title: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "none_if_blank"
    )]
    pub sub_title: Option<String>,
    pub transition_mode: TransitionMode,
}

impl DisplayConfig {
    pub fn main_title_or_default(&self) -> &str {
        if self.main_title.trim().is_empty() {
            DEFAULT_MAIN_TITLE
        } else {
            &self.main_title
        }
    }

    /// Caption pinned for the whole session, if a sub-title is set
    pub fn fixed_caption(&self) -> Option<&str> {
        self.sub_title.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Copy with the folder reference reduced to a bare id
    pub fn normalized(&self) -> Self {
        Self {
            folder_id: normalize_folder_id(&self.folder_id),
            ..self.clone()
        }
    }
}

// A null or missing text field reads as unset
fn empty_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn none_if_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Extracts the folder id from whatever the administrator pasted.
///
/// Accepts a bare id or a share link: the id is what follows `folders/`,
/// cut at the first `?`.
pub fn normalize_folder_id(input: &str) -> String {
    let trimmed = input.trim();
    match trimmed.split_once(FOLDER_ID_MARKER) {
        Some((_, rest)) => {
            let rest = rest.split(FOLDER_ID_MARKER).next().unwrap_or(rest);
            rest.split('?').next().unwrap_or(rest).to_string()
        }
        None => trimmed.to_string(),
    }
}
