use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Non-fatal conditions reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// `ant-launcher.jar` was not found under the tool home. The command is
    /// still built with the computed path.
    MissingArtifact { path: PathBuf, tool_home: PathBuf },
    /// A `name=value` entry did not split into exactly two segments.
    MalformedPropertyPair { pair: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingArtifact { path, tool_home } => write!(
                f,
                "'{}' calculated from ANT_HOME '{}' doesn't exist",
                path.display(),
                tool_home.display()
            ),
            Warning::MalformedPropertyPair { pair } => write!(
                f,
                "property `{pair}` is not in the correct format (name=value) and was ignored"
            ),
        }
    }
}

/// Ordered side channel for [`Warning`]s. Every push is also logged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
