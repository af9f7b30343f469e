use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::error::AntError;
use crate::error::Result;
use crate::properties::PropertyTable;

/// Build file used when none is configured.
pub const DEFAULT_BUILD_FILE: &str = "build.xml";

/// Locale used to pick the compiler warning pattern when none is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// How prominently a plain output line should be surfaced by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageImportance {
    High,
    #[default]
    Normal,
    Low,
}

/// Everything needed to run one Ant build step.
#[derive(Debug, Clone, PartialEq)]
pub struct AntConfig {
    pub build_file: PathBuf,
    pub targets: Vec<String>,

    pub debug: bool,
    pub verbose: bool,
    pub keep_going: bool,
    pub no_input: bool,
    pub no_user_lib: bool,
    pub no_classpath: bool,
    pub auto_proxy: bool,

    pub lib: Option<String>,
    pub logger: Option<String>,
    pub listener: Option<String>,
    pub input_handler: Option<String>,
    pub property_file: Option<String>,
    pub main: Option<String>,
    /// Extra JVM options, e.g. `-Xmx640m`. Passed through as one token.
    pub ant_opts: Option<String>,

    pub properties: PropertyTable,
    pub locale: String,

    pub java_home: Option<PathBuf>,
    pub ant_home: Option<PathBuf>,

    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub stdout_importance: MessageImportance,
    pub stderr_importance: MessageImportance,
}

impl Default for AntConfig {
    fn default() -> Self {
        Self {
            build_file: PathBuf::from(DEFAULT_BUILD_FILE),
            targets: Vec::new(),
            debug: false,
            verbose: false,
            keep_going: false,
            no_input: false,
            no_user_lib: false,
            no_classpath: false,
            auto_proxy: false,
            lib: None,
            logger: None,
            listener: None,
            input_handler: None,
            property_file: None,
            main: None,
            ant_opts: None,
            properties: PropertyTable::new(),
            locale: DEFAULT_LOCALE.to_string(),
            java_home: None,
            ant_home: None,
            cwd: None,
            env: HashMap::new(),
            timeout: None,
            stdout_importance: MessageImportance::Normal,
            stderr_importance: MessageImportance::Normal,
        }
    }
}

impl AntConfig {
    pub fn add_target(&mut self, target: impl Into<String>) {
        self.targets.push(target.into());
    }

    /// Appends every entry of a comma separated target list. Blank entries
    /// are skipped.
    pub fn add_targets(&mut self, targets: &str) {
        self.targets.extend(
            targets
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        );
    }

    /// Overwrites a single property.
    pub fn set_property(&mut self, key: &str, value: &str) {
        self.properties.set(key, value);
    }

    /// Appends `name=value;...` pairs. Earlier entries are not cleared.
    pub fn set_properties(&mut self, raw: &str, diagnostics: &mut Diagnostics) {
        self.properties.set_from_pairs(raw, diagnostics);
    }

    /// Applies the values present in `toml` on top of `self`.
    pub fn apply_toml(&mut self, toml: AntConfigToml, diagnostics: &mut Diagnostics) {
        let AntConfigToml {
            build_file,
            targets,
            debug,
            verbose,
            keep_going,
            no_input,
            no_user_lib,
            no_classpath,
            auto_proxy,
            lib,
            logger,
            listener,
            input_handler,
            property_file,
            main,
            ant_opts,
            properties,
            locale,
            java_home,
            ant_home,
            cwd,
            env,
            timeout_ms,
            stdout_importance,
            stderr_importance,
        } = toml;

        if let Some(build_file) = build_file {
            self.build_file = build_file;
        }
        if let Some(targets) = targets {
            self.targets.extend(targets);
        }

        override_flag(&mut self.debug, debug);
        override_flag(&mut self.verbose, verbose);
        override_flag(&mut self.keep_going, keep_going);
        override_flag(&mut self.no_input, no_input);
        override_flag(&mut self.no_user_lib, no_user_lib);
        override_flag(&mut self.no_classpath, no_classpath);
        override_flag(&mut self.auto_proxy, auto_proxy);

        override_opt(&mut self.lib, lib);
        override_opt(&mut self.logger, logger);
        override_opt(&mut self.listener, listener);
        override_opt(&mut self.input_handler, input_handler);
        override_opt(&mut self.property_file, property_file);
        override_opt(&mut self.main, main);
        override_opt(&mut self.ant_opts, ant_opts);

        if let Some(properties) = properties {
            self.set_properties(&properties, diagnostics);
        }
        if let Some(locale) = locale {
            self.locale = locale;
        }
        if java_home.is_some() {
            self.java_home = java_home;
        }
        if ant_home.is_some() {
            self.ant_home = ant_home;
        }
        if cwd.is_some() {
            self.cwd = cwd;
        }
        if let Some(env) = env {
            self.env.extend(env);
        }
        if let Some(timeout_ms) = timeout_ms {
            self.timeout = Some(Duration::from_millis(timeout_ms));
        }
        if let Some(importance) = stdout_importance {
            self.stdout_importance = importance;
        }
        if let Some(importance) = stderr_importance {
            self.stderr_importance = importance;
        }
    }

    pub fn from_toml(toml: AntConfigToml, diagnostics: &mut Diagnostics) -> Self {
        let mut config = Self::default();
        config.apply_toml(toml, diagnostics);
        config
    }

    /// Returns `value` unless it is empty.
    pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }
}

fn override_flag(slot: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn override_opt(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

/// On-disk representation of [`AntConfig`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AntConfigToml {
    pub build_file: Option<PathBuf>,
    pub targets: Option<Vec<String>>,

    pub debug: Option<bool>,
    pub verbose: Option<bool>,
    pub keep_going: Option<bool>,
    pub no_input: Option<bool>,
    pub no_user_lib: Option<bool>,
    pub no_classpath: Option<bool>,
    pub auto_proxy: Option<bool>,

    pub lib: Option<String>,
    pub logger: Option<String>,
    pub listener: Option<String>,
    pub input_handler: Option<String>,
    pub property_file: Option<String>,
    pub main: Option<String>,
    pub ant_opts: Option<String>,

    /// `name=value` pairs separated by `;`.
    pub properties: Option<String>,
    pub locale: Option<String>,

    pub java_home: Option<PathBuf>,
    pub ant_home: Option<PathBuf>,

    pub cwd: Option<PathBuf>,
    pub env: Option<HashMap<String, String>>,
    pub timeout_ms: Option<u64>,
    pub stdout_importance: Option<MessageImportance>,
    pub stderr_importance: Option<MessageImportance>,
}

pub fn load_config_toml(path: &Path) -> Result<AntConfigToml> {
    let contents = std::fs::read_to_string(path).map_err(|source| AntError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| AntError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
