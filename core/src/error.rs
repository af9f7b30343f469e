use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AntError>;

/// Conditions that stop the build step before (or while) the tool runs.
#[derive(Debug, Error)]
pub enum AntError {
    #[error(
        "the required property `{property}` for task `{task}` was not set or empty (set it in the configuration or via {env_var})"
    )]
    MissingRequiredProperty {
        property: &'static str,
        task: &'static str,
        env_var: &'static str,
    },

    #[error("unable to locate {executable} in {property} directory '{}' (looked for '{}')", home.display(), path.display())]
    ToolNotFound {
        executable: &'static str,
        property: &'static str,
        home: PathBuf,
        path: PathBuf,
    },

    #[error("failed to read config at {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config at {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid compiler warning pattern: {0}")]
    Pattern(#[from] regex_lite::Error),

    #[error("failed to spawn '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AntError {
    pub(crate) fn missing_property(property: &'static str, env_var: &'static str) -> Self {
        Self::MissingRequiredProperty {
            property,
            task: crate::TASK_NAME,
            env_var,
        }
    }
}
