//! Command-line front end for running Ant builds through `anttask-core`.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod human_output;
mod jsonl_output;

use std::path::PathBuf;
use std::time::Duration;

use anttask_core::AntConfig;
use anttask_core::AntTask;
use anttask_core::Diagnostics;
use anttask_core::EventSink;
use anttask_core::LogSink;
use anttask_core::RunOutcome;
use anttask_core::RunParams;
use anttask_core::TaskEvent;
use anttask_core::load_config_toml;
use anttask_core::run::TIMEOUT_EXIT_CODE;
use anttask_core::run_tool;
use anyhow::Context;
use clap::Parser;
use clap::ValueEnum;
use supports_color::Stream;
use tracing_subscriber::EnvFilter;

pub use crate::human_output::HumanOutput;
pub use crate::jsonl_output::JsonlOutput;

const DEFAULT_LOG_FILTER: &str = "anttask_core=error,anttask_cli=warn,ant=info";
// With --quiet the log is the only place diagnostics show up.
const QUIET_LOG_FILTER: &str = "anttask_core=warn,anttask_cli=warn,ant=info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Color {
    Always,
    Never,
    #[default]
    Auto,
}

/// Run Apache Ant through a Java runtime and classify its output.
#[derive(Debug, Parser)]
#[command(name = "anttask", version)]
pub struct Cli {
    /// TOML file with default settings. Flags given here take precedence;
    /// switches accept `=false` to turn off a setting from the file.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Build file to run, relative to the working directory.
    #[arg(short = 'f', long = "buildfile", value_name = "FILE")]
    pub build_file: Option<PathBuf>,

    #[arg(
        short = 'd',
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
    )]
    pub debug: Option<bool>,

    #[arg(
        short = 'v',
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
    )]
    pub verbose: Option<bool>,

    /// Keep building targets that do not depend on a failed one.
    #[arg(
        short = 'k',
        long = "keep-going",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
    )]
    pub keep_going: Option<bool>,

    #[arg(
        long = "noinput",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
    )]
    pub no_input: Option<bool>,

    #[arg(
        long = "nouserlib",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
    )]
    pub no_user_lib: Option<bool>,

    #[arg(
        long = "noclasspath",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
    )]
    pub no_classpath: Option<bool>,

    #[arg(
        long = "autoproxy",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
    )]
    pub auto_proxy: Option<bool>,

    #[arg(long, value_name = "PATH")]
    pub lib: Option<String>,

    #[arg(long, value_name = "CLASS")]
    pub logger: Option<String>,

    #[arg(long, value_name = "CLASS")]
    pub listener: Option<String>,

    #[arg(long = "inputhandler", value_name = "CLASS")]
    pub input_handler: Option<String>,

    #[arg(long = "propertyfile", value_name = "FILE")]
    pub property_file: Option<String>,

    #[arg(long, value_name = "CLASS")]
    pub main: Option<String>,

    /// Options for the Java runtime, split into words and placed before `-jar`.
    #[arg(long = "ant-opts", value_name = "OPTS", allow_hyphen_values = true)]
    pub ant_opts: Option<String>,

    /// Semicolon separated `name=value` pairs.
    #[arg(long = "properties", value_name = "PAIRS")]
    pub properties: Vec<String>,

    /// Define a single property.
    #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    #[arg(long = "java-home", value_name = "DIR")]
    pub java_home: Option<PathBuf>,

    #[arg(long = "ant-home", value_name = "DIR")]
    pub ant_home: Option<PathBuf>,

    /// Language of the tool's output, used to recognize compiler warnings.
    #[arg(long, value_name = "TAG")]
    pub locale: Option<String>,

    /// Kill the build after this many milliseconds.
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Working directory for the build.
    #[arg(short = 'C', long = "cwd", value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Comma separated targets, run before any positional targets.
    #[arg(long = "targets", value_name = "LIST")]
    pub target_lists: Vec<String>,

    /// Print the command that would run and exit.
    #[arg(long = "print-command", default_value_t = false)]
    pub print_command: bool,

    /// Print events as JSON lines on stdout.
    #[arg(long = "json", default_value_t = false, conflicts_with = "quiet")]
    pub json: bool,

    /// Only report events through the log (see `RUST_LOG`).
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    pub quiet: bool,

    /// Specifies color settings for use in the output.
    #[arg(long = "color", value_enum, default_value_t = Color::Auto)]
    pub color: Color,

    /// Targets to run. The build file's default target runs when none are given.
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,
}

impl Cli {
    /// Layers flags over `config`. Flags that were not given leave it alone.
    pub fn apply_to(&self, config: &mut AntConfig, diagnostics: &mut Diagnostics) {
        if let Some(build_file) = &self.build_file {
            config.build_file = build_file.clone();
        }

        override_flag(&mut config.debug, self.debug);
        override_flag(&mut config.verbose, self.verbose);
        override_flag(&mut config.keep_going, self.keep_going);
        override_flag(&mut config.no_input, self.no_input);
        override_flag(&mut config.no_user_lib, self.no_user_lib);
        override_flag(&mut config.no_classpath, self.no_classpath);
        override_flag(&mut config.auto_proxy, self.auto_proxy);

        override_option(&mut config.lib, &self.lib);
        override_option(&mut config.logger, &self.logger);
        override_option(&mut config.listener, &self.listener);
        override_option(&mut config.input_handler, &self.input_handler);
        override_option(&mut config.property_file, &self.property_file);
        override_option(&mut config.main, &self.main);
        override_option(&mut config.ant_opts, &self.ant_opts);

        for raw in &self.properties {
            config.set_properties(raw, diagnostics);
        }
        for (name, value) in &self.defines {
            config.set_property(name, value);
        }

        if let Some(java_home) = &self.java_home {
            config.java_home = Some(java_home.clone());
        }
        if let Some(ant_home) = &self.ant_home {
            config.ant_home = Some(ant_home.clone());
        }
        if let Some(locale) = &self.locale {
            config.locale = locale.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout = Some(Duration::from_millis(ms));
        }
        if let Some(cwd) = &self.cwd {
            config.cwd = Some(cwd.clone());
        }

        if !self.target_lists.is_empty() || !self.targets.is_empty() {
            config.targets.clear();
        }
        for list in &self.target_lists {
            config.add_targets(list);
        }
        for target in &self.targets {
            config.add_target(target.trim());
        }
    }

    fn with_ansi(&self) -> bool {
        match self.color {
            Color::Always => true,
            Color::Never => false,
            Color::Auto => supports_color::on_cached(Stream::Stdout).is_some(),
        }
    }
}

fn override_flag(slot: &mut bool, flag: Option<bool>) {
    if let Some(value) = flag {
        *slot = value;
    }
}

fn override_option(slot: &mut Option<String>, flag: &Option<String>) {
    if let Some(value) = flag {
        *slot = Some(value.clone());
    }
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

pub fn init_tracing(quiet: bool) {
    let default_filter = if quiet {
        QUIET_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Resolves the configuration, runs the build and returns the process exit code.
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub async fn run_main(cli: Cli) -> anyhow::Result<i32> {
    let mut diagnostics = Diagnostics::new();
    let mut config = AntConfig::default();
    if let Some(path) = &cli.config {
        let toml = load_config_toml(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        config.apply_toml(toml, &mut diagnostics);
    }
    cli.apply_to(&mut config, &mut diagnostics);

    let task = AntTask::new(config).context("failed to set up the ant task")?;

    if cli.print_command {
        let command = task
            .command_line()
            .context("failed to resolve the ant command line")?;
        for warning in diagnostics.warnings().iter().chain(&command.warnings) {
            eprintln!("warning: {warning}");
        }
        println!("{}", command.to_command_string());
        return Ok(0);
    }

    let mut sink: Box<dyn EventSink> = if cli.json {
        Box::new(JsonlOutput::new())
    } else if cli.quiet {
        Box::new(LogSink)
    } else {
        Box::new(HumanOutput::create_with_ansi(cli.with_ansi()))
    };

    for warning in diagnostics.into_warnings() {
        sink.on_event(TaskEvent::Warning { warning });
    }

    let params = RunParams::from(task.config());
    let outcome = run_tool(&task, &params, sink.as_mut())
        .await
        .context("failed to run ant")?;
    Ok(exit_code_for(&outcome))
}

/// Mirrors the tool's exit status. Signals without a code map to 1.
pub fn exit_code_for(outcome: &RunOutcome) -> i32 {
    if outcome.timed_out {
        return TIMEOUT_EXIT_CODE;
    }
    if outcome.exit_code < 0 {
        1
    } else {
        outcome.exit_code
    }
}
