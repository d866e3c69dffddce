//! Operator-supplied configuration inputs.

use serde::{Deserialize, Serialize};

/// Raw, still-encoded configuration options.
///
/// Both values are base64 text. An unset option and an empty string are
/// both treated as absent by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigInput {
    /// Console and device definitions for `conserver.cf`.
    #[serde(default)]
    pub config_file: Option<String>,

    /// Operator credential lines for `conserver.passwd`.
    #[serde(default)]
    pub passwd_file: Option<String>,
}

impl ConfigInput {
    /// Overlay non-empty values from `other` on top of `self`.
    pub fn merged_with(mut self, other: ConfigInput) -> Self {
        if other.config_file.is_some() {
            self.config_file = other.config_file;
        }
        if other.passwd_file.is_some() {
            self.passwd_file = other.passwd_file;
        }
        self
    }
}
