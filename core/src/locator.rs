use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

use path_absolutize::Absolutize as _;

use crate::config::AntConfig;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Warning;
use crate::error::AntError;
use crate::error::Result;

pub const JAVA_HOME_ENV_VAR: &str = "JAVA_HOME";
pub const ANT_HOME_ENV_VAR: &str = "ANT_HOME";

const JAVA_HOME_PROPERTY: &str = "java_home";
const ANT_HOME_PROPERTY: &str = "ant_home";

#[cfg(windows)]
pub const JAVA_EXECUTABLE: &str = "java.exe";
#[cfg(not(windows))]
pub const JAVA_EXECUTABLE: &str = "java";

pub const LAUNCHER_ARTIFACT: &str = "ant-launcher.jar";

/// A resolved path and whether it existed when it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocation {
    pub path: PathBuf,
    pub exists: bool,
}

/// Finds the Java executable and the Ant launcher jar.
///
/// Homes come from the configuration first and fall back to `JAVA_HOME` /
/// `ANT_HOME`. Nothing is cached: every call checks the filesystem again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolLocator {
    java_home: Option<PathBuf>,
    ant_home: Option<PathBuf>,
}

impl ToolLocator {
    pub fn new(java_home: Option<PathBuf>, ant_home: Option<PathBuf>) -> Self {
        Self {
            java_home: java_home.filter(|p| !p.as_os_str().is_empty()),
            ant_home: ant_home.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    pub fn from_config(config: &AntConfig) -> Self {
        Self::from_config_with_env(config, |name| std::env::var_os(name))
    }

    pub fn from_config_with_env<F>(config: &AntConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let resolve = |configured: &Option<PathBuf>, env_var: &str| {
            configured
                .clone()
                .filter(|p| !p.as_os_str().is_empty())
                .or_else(|| lookup(env_var).map(PathBuf::from))
        };
        Self::new(
            resolve(&config.java_home, JAVA_HOME_ENV_VAR),
            resolve(&config.ant_home, ANT_HOME_ENV_VAR),
        )
    }

    pub fn java_home(&self) -> Option<&Path> {
        self.java_home.as_deref()
    }

    pub fn ant_home(&self) -> Option<&Path> {
        self.ant_home.as_deref()
    }

    /// `<java_home>/bin/java`. Fails if the home is unset or the file is
    /// missing; there is no `PATH` fallback.
    pub fn locate_runtime_executable(&self) -> Result<ToolLocation> {
        let java_home = self
            .java_home
            .as_deref()
            .ok_or_else(|| AntError::missing_property(JAVA_HOME_PROPERTY, JAVA_HOME_ENV_VAR))?;

        let path = absolute(&java_home.join("bin").join(JAVA_EXECUTABLE))?;
        if !path.is_file() {
            return Err(AntError::ToolNotFound {
                executable: JAVA_EXECUTABLE,
                property: JAVA_HOME_PROPERTY,
                home: java_home.to_path_buf(),
                path,
            });
        }

        Ok(ToolLocation { path, exists: true })
    }

    /// `<ant_home>/lib/ant-launcher.jar`. A missing jar only produces a
    /// warning since the JVM may still find Ant some other way.
    pub fn locate_launcher_artifact(&self, diagnostics: &mut Diagnostics) -> Result<ToolLocation> {
        let ant_home = self
            .ant_home
            .as_deref()
            .ok_or_else(|| AntError::missing_property(ANT_HOME_PROPERTY, ANT_HOME_ENV_VAR))?;

        let path = absolute(&ant_home.join("lib").join(LAUNCHER_ARTIFACT))?;
        let exists = path.is_file();
        if !exists {
            diagnostics.warn(Warning::MissingArtifact {
                path: path.clone(),
                tool_home: ant_home.to_path_buf(),
            });
        }

        Ok(ToolLocation { path, exists })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path.absolutize()?.into_owned())
}
