//! Output format selection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON envelope on stdout
    Json,
}

impl OutputFormat {
    /// `--json` on the command line wins over the configured format.
    pub fn from_json_flag(json: bool, configured: OutputFormat) -> Self {
        if json { OutputFormat::Json } else { configured }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}
