//! Runs Apache Ant as a managed build step.
//!
//! [`AntConfig`] describes the invocation, [`build_command_line`] turns it
//! into a `java -jar ant-launcher.jar ...` command, and [`run_tool`] spawns it
//! and classifies every output line into a [`TaskEvent`].

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod classify;
pub mod command;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod locator;
pub mod properties;
pub mod quote;
pub mod run;
pub mod task;

/// Name reported in errors raised by this crate.
pub const TASK_NAME: &str = "ant";

pub use classify::ClassifiedLine;
pub use classify::CompileWarningPattern;
pub use classify::Locale;
pub use classify::OutputClassifier;
pub use classify::OutputEvent;
pub use command::CommandLine;
pub use command::build_command_line;
pub use config::AntConfig;
pub use config::AntConfigToml;
pub use config::MessageImportance;
pub use config::load_config_toml;
pub use diagnostics::Diagnostics;
pub use diagnostics::Warning;
pub use error::AntError;
pub use error::Result;
pub use locator::ToolLocation;
pub use locator::ToolLocator;
pub use properties::PropertyTable;
pub use quote::quote;
pub use run::EventSink;
pub use run::LogSink;
pub use run::OutputStream;
pub use run::RunOutcome;
pub use run::RunParams;
pub use run::TaskEvent;
pub use run::run_tool;
pub use task::AntTask;
pub use task::ExternalTool;
