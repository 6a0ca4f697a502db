use crate::clone::DEFAULT_COPY_SUFFIX;
use serde::{Deserialize, Serialize};

/// Editor behaviour that is configurable per project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Appended to the name of a user-visible duplicate
    pub copy_suffix: String,

    /// Maximum number of undo levels (0 = unlimited)
    pub undo_levels: usize,

    /// Log duplicate ids after each applied mutation
    pub warn_on_duplicates: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
            undo_levels: 100,
            warn_on_duplicates: true,
        }
    }
}
