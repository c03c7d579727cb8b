//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Destination ssh_config (default: "~/.ssh/config")
    pub dest: String,

    /// Source patterns (default: none)
    pub sources: Vec<String>,

    /// Report what was written (default: false)
    pub verbose: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            dest: "~/.ssh/config".to_string(),
            sources: Vec::new(),
            verbose: false,
        }
    }
}
