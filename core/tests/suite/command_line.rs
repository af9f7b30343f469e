use std::path::PathBuf;

use anttask_core::AntConfig;
use anttask_core::AntError;
use anttask_core::AntTask;
use anttask_core::Diagnostics;
use anttask_core::ExternalTool;
use anttask_core::ToolLocator;
use anttask_core::Warning;
use anttask_core::build_command_line;
use anttask_test_support::FakeAntInstall;
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

#[test]
fn minimal_command_ends_with_build_file_and_targets() -> anyhow::Result<()> {
    let install = FakeAntInstall::new();
    let mut config = install.config();
    config.add_targets("clean,compile");

    let command = build_command_line(&config, &install.locator())?;

    assert_eq!(command.program, install.java_path());
    assert_eq!(
        command.args,
        vec![
            "-jar".to_string(),
            install.launcher_path().to_string_lossy().into_owned(),
            "-buildfile".to_string(),
            "build.xml".to_string(),
            "clean".to_string(),
            "compile".to_string(),
        ]
    );
    assert!(command.warnings.is_empty());
    assert!(
        command
            .to_command_string()
            .ends_with("-buildfile build.xml clean compile")
    );
    Ok(())
}

#[test]
fn unset_java_home_fails_before_looking_for_the_launcher() {
    let install = FakeAntInstall::without_launcher();
    let locator = ToolLocator::new(None, Some(install.ant_home.clone()));

    let err = build_command_line(&install.config(), &locator).expect_err("java_home unset");

    assert_matches!(
        err,
        AntError::MissingRequiredProperty {
            property: "java_home",
            ..
        }
    );
}

#[test]
fn unset_ant_home_is_fatal() {
    let install = FakeAntInstall::new();
    let locator = ToolLocator::new(Some(install.java_home.clone()), None);

    let err = build_command_line(&install.config(), &locator).expect_err("ant_home unset");

    assert_matches!(
        err,
        AntError::MissingRequiredProperty {
            property: "ant_home",
            ..
        }
    );
}

#[test]
fn missing_java_is_tool_not_found() {
    let install = FakeAntInstall::new();
    let locator = ToolLocator::new(
        Some(install.java_home.join("does-not-exist")),
        Some(install.ant_home.clone()),
    );

    let err = build_command_line(&install.config(), &locator).expect_err("no java");

    assert_matches!(err, AntError::ToolNotFound { .. });
    assert!(err.to_string().contains("does-not-exist"));
}

#[test]
fn missing_launcher_still_builds_with_a_warning() -> anyhow::Result<()> {
    let install = FakeAntInstall::without_launcher();

    let command = build_command_line(&install.config(), &install.locator())?;

    assert_eq!(
        command.args[1],
        install.launcher_path().to_string_lossy().into_owned()
    );
    assert_eq!(
        command.warnings,
        vec![Warning::MissingArtifact {
            path: install.launcher_path(),
            tool_home: install.ant_home.clone(),
        }]
    );
    Ok(())
}

#[test]
fn malformed_pairs_are_dropped_but_neighbours_survive() -> anyhow::Result<()> {
    let install = FakeAntInstall::new();
    let mut config = install.config();
    let mut diagnostics = Diagnostics::new();
    config.set_properties("before=1;onlykey;after=2", &mut diagnostics);
    config.set_property("before", "3");

    let command = build_command_line(&config, &install.locator())?;

    assert_eq!(
        diagnostics.warnings(),
        &[Warning::MalformedPropertyPair {
            pair: "onlykey".to_string()
        }]
    );
    let defines: Vec<&str> = command
        .args
        .iter()
        .map(String::as_str)
        .filter(|arg| arg.starts_with("-D"))
        .collect();
    assert_eq!(defines, vec!["-Dbefore=3", "-Dafter=2"]);
    Ok(())
}

#[test]
fn task_exposes_the_same_command_through_the_tool_trait() -> anyhow::Result<()> {
    let install = FakeAntInstall::new();
    let config = AntConfig {
        build_file: PathBuf::from("sub dir/build.xml"),
        verbose: true,
        ..install.config()
    };
    let task = AntTask::with_locator(config, install.locator())?;

    let command = task.command_line()?;
    let mut diagnostics = Diagnostics::new();
    assert_eq!(task.locate_tool()?, command.program);
    assert_eq!(task.command_line_args(&mut diagnostics)?, command.args);
    assert!(command.args.contains(&"\"sub dir/build.xml\"".to_string()));
    Ok(())
}
