//! Configuration for the planning service module

use serde::Deserialize;

/// Planning service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Maximum attachment size in bytes
    #[serde(default = "default_max_attachment_size")]
    pub max_attachment_size: usize,

    /// Accepted attachment file extensions (lower case, without dot)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_attachment_size: default_max_attachment_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl Config {
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

fn default_max_attachment_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_allowed_extensions() -> Vec<String> {
    ["pdf", "doc", "docx", "xls", "xlsx", "csv", "png", "jpg", "jpeg"]
        .into_iter()
        .map(String::from)
        .collect()
}
