use std::path::PathBuf;

use crate::classify::ClassifiedLine;
use crate::classify::OutputClassifier;
use crate::command::CommandLine;
use crate::command::build_args;
use crate::command::build_command_line;
use crate::config::AntConfig;
use crate::config::MessageImportance;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::locator::ToolLocator;

/// What the runner needs from a process-based tool.
pub trait ExternalTool {
    /// Short name used in logs.
    fn tool_name(&self) -> &str;

    /// Absolute path of the executable to spawn.
    fn locate_tool(&self) -> Result<PathBuf>;

    /// Arguments passed verbatim after the executable. Non-fatal problems are
    /// pushed onto `diagnostics`.
    fn command_line_args(&self, diagnostics: &mut Diagnostics) -> Result<Vec<String>>;

    fn classify_line(&self, line: &str, importance: MessageImportance) -> ClassifiedLine;
}

/// Ant launched through `java -jar ant-launcher.jar`.
///
/// The warning pattern is selected when the task is created. Later changes to
/// the locale require a new task.
#[derive(Debug, Clone)]
pub struct AntTask {
    config: AntConfig,
    locator: ToolLocator,
    classifier: OutputClassifier,
}

impl AntTask {
    /// Resolves homes from `config` with `JAVA_HOME` / `ANT_HOME` fallback.
    pub fn new(config: AntConfig) -> Result<Self> {
        let locator = ToolLocator::from_config(&config);
        Self::with_locator(config, locator)
    }

    pub fn with_locator(config: AntConfig, locator: ToolLocator) -> Result<Self> {
        let classifier = OutputClassifier::for_locale(&config.locale)?;
        Ok(Self {
            config,
            locator,
            classifier,
        })
    }

    pub fn config(&self) -> &AntConfig {
        &self.config
    }

    pub fn locator(&self) -> &ToolLocator {
        &self.locator
    }

    pub fn classifier(&self) -> &OutputClassifier {
        &self.classifier
    }

    pub fn command_line(&self) -> Result<CommandLine> {
        build_command_line(&self.config, &self.locator)
    }
}

impl ExternalTool for AntTask {
    fn tool_name(&self) -> &str {
        crate::TASK_NAME
    }

    fn locate_tool(&self) -> Result<PathBuf> {
        Ok(self.locator.locate_runtime_executable()?.path)
    }

    fn command_line_args(&self, diagnostics: &mut Diagnostics) -> Result<Vec<String>> {
        build_args(&self.config, &self.locator, diagnostics)
    }

    fn classify_line(&self, line: &str, importance: MessageImportance) -> ClassifiedLine {
        self.classifier.classify(line, importance)
    }
}
