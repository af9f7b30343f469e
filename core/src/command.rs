use std::path::Path;
use std::path::PathBuf;

use crate::config::AntConfig;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::Warning;
use crate::error::Result;
use crate::locator::ToolLocator;
use crate::quote::quote;
use crate::quote::split_options;

/// A fully resolved invocation: the Java executable, the arguments to pass
/// to it verbatim, and any warnings raised while building them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl CommandLine {
    /// Program and arguments joined with single spaces. Arguments are not
    /// re-quoted: the ones that needed it were quoted while building.
    pub fn to_command_string(&self) -> String {
        let program = quote(&self.program.to_string_lossy()).into_owned();
        std::iter::once(program)
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Resolves the tools and builds the argument list for `config`.
///
/// The Java executable is resolved before the launcher jar, so a missing
/// `java_home` fails without touching `ant_home`.
pub fn build_command_line(config: &AntConfig, locator: &ToolLocator) -> Result<CommandLine> {
    let program = locator.locate_runtime_executable()?.path;
    let mut diagnostics = Diagnostics::new();
    let args = build_args(config, locator, &mut diagnostics)?;
    Ok(CommandLine {
        program,
        args,
        warnings: diagnostics.into_warnings(),
    })
}

/// Arguments for the Java executable, without resolving Java itself.
pub fn build_args(
    config: &AntConfig,
    locator: &ToolLocator,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<String>> {
    let launcher = locator.locate_launcher_artifact(diagnostics)?;
    Ok(args_with_launcher(config, &launcher.path))
}

/// Orders the Ant arguments. Pure: no filesystem access.
pub fn args_with_launcher(config: &AntConfig, launcher: &Path) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(ant_opts) = AntConfig::non_empty(&config.ant_opts) {
        args.extend(split_options(ant_opts));
    }

    args.push("-jar".to_string());
    args.push(quote(&launcher.to_string_lossy()).into_owned());
    args.push("-buildfile".to_string());
    args.push(quote(&config.build_file.to_string_lossy()).into_owned());

    push_flag(&mut args, config.debug, "-d");
    push_flag(&mut args, config.verbose, "-v");
    push_option(&mut args, "-lib", &config.lib);
    push_option(&mut args, "-logger", &config.logger);
    push_option(&mut args, "-listener", &config.listener);
    push_flag(&mut args, config.no_input, "-noinput");
    push_flag(&mut args, config.keep_going, "-k");
    push_option(&mut args, "-propertyfile", &config.property_file);
    push_option(&mut args, "-inputhandler", &config.input_handler);
    push_flag(&mut args, config.no_user_lib, "-nouserlib");
    push_flag(&mut args, config.no_classpath, "-noclasspath");
    push_flag(&mut args, config.auto_proxy, "-autoproxy");
    push_option(&mut args, "-main", &config.main);

    args.extend(
        config
            .properties
            .iter()
            .map(|(key, value)| format!("-D{key}={value}")),
    );
    args.extend(config.targets.iter().map(|t| quote(t).into_owned()));

    args
}

fn push_flag(args: &mut Vec<String>, enabled: bool, flag: &str) {
    if enabled {
        args.push(flag.to_string());
    }
}

fn push_option(args: &mut Vec<String>, flag: &str, value: &Option<String>) {
    if let Some(value) = AntConfig::non_empty(value) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}
