use std::time::Duration;

use anttask_core::AntTask;
use anttask_core::ClassifiedLine;
use anttask_core::MessageImportance;
use anttask_core::OutputEvent;
use anttask_core::OutputStream;
use anttask_core::RunParams;
use anttask_core::TaskEvent;
use anttask_core::Warning;
use anttask_core::run::TIMEOUT_EXIT_CODE;
use anttask_core::run_tool;
use anttask_test_support::FakeAntInstall;
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

fn lines_from(events: &[TaskEvent], wanted: OutputStream) -> Vec<ClassifiedLine> {
    events
        .iter()
        .filter_map(|event| match event {
            TaskEvent::Output { stream, line } if *stream == wanted => Some(line.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn classifies_output_and_reports_exit_code() -> anyhow::Result<()> {
    let install = FakeAntInstall::with_java_script(
        r#"echo "Buildfile: build.xml"
echo "compile:"
echo "    [javac] Foo.java:10: warning: unchecked call"
echo "    [javac] Foo.java:12: error: cannot find symbol" >&2
exit 3"#,
    );
    let mut config = install.config();
    config.stderr_importance = MessageImportance::High;
    config.add_target("compile");
    let task = AntTask::with_locator(config, install.locator())?;
    let params = RunParams::from(task.config());

    let mut events: Vec<TaskEvent> = Vec::new();
    let outcome = run_tool(&task, &params, &mut events).await?;

    assert_eq!(outcome.exit_code, 3);
    assert!(!outcome.success());
    assert_eq!(outcome.compile_warnings, 1);

    assert_eq!(
        lines_from(&events, OutputStream::Stdout),
        vec![
            ClassifiedLine {
                line: "Buildfile: build.xml".to_string(),
                event: OutputEvent::Message {
                    text: "Buildfile: build.xml".to_string(),
                    importance: MessageImportance::Normal,
                },
            },
            ClassifiedLine {
                line: "compile:".to_string(),
                event: OutputEvent::PhaseBoundary {
                    name: "compile".to_string(),
                },
            },
            ClassifiedLine {
                line: "    [javac] Foo.java:10: warning: unchecked call".to_string(),
                event: OutputEvent::CompileWarning {
                    source_file: "Foo.java".to_string(),
                    line_number: 10,
                    message: " unchecked call".to_string(),
                },
            },
        ]
    );
    assert_eq!(
        lines_from(&events, OutputStream::Stderr),
        vec![ClassifiedLine {
            line: "    [javac] Foo.java:12: error: cannot find symbol".to_string(),
            event: OutputEvent::Message {
                text: "    [javac] Foo.java:12: error: cannot find symbol".to_string(),
                importance: MessageImportance::High,
            },
        }]
    );

    assert!(matches!(events.first(), Some(TaskEvent::Started { .. })));
    assert_eq!(
        events.last(),
        Some(&TaskEvent::Finished {
            exit_code: 3,
            timed_out: false,
        })
    );
    Ok(())
}

fn printed_lines(events: &[TaskEvent]) -> Vec<String> {
    lines_from(events, OutputStream::Stdout)
        .into_iter()
        .map(|line| line.line)
        .collect()
}

const ECHO_ARGS: &str = r#"echo "argc=$#"; for arg in "$@"; do echo "arg=$arg"; done"#;

#[tokio::test]
async fn java_receives_arguments_without_display_quotes() -> anyhow::Result<()> {
    let install = FakeAntInstall::with_java_script(ECHO_ARGS);
    let mut config = install.config();
    config.build_file = "my build.xml".into();
    config.debug = true;
    config.set_property("label", "nightly build");
    config.add_target("dist");
    let task = AntTask::with_locator(config, install.locator())?;

    let mut events: Vec<TaskEvent> = Vec::new();
    let outcome = run_tool(&task, &RunParams::from(task.config()), &mut events).await?;

    assert!(outcome.success());
    assert_eq!(
        printed_lines(&events),
        vec![
            "argc=7".to_string(),
            "arg=-jar".to_string(),
            format!("arg={}", install.launcher_path().display()),
            "arg=-buildfile".to_string(),
            "arg=my build.xml".to_string(),
            "arg=-d".to_string(),
            "arg=-Dlabel=nightly build".to_string(),
            "arg=dist".to_string(),
        ]
    );
    // The event keeps the display form.
    assert_matches!(
        events.first(),
        Some(TaskEvent::Started { args, .. }) if args.contains(&"\"my build.xml\"".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn runtime_options_reach_java_as_separate_arguments() -> anyhow::Result<()> {
    let install = FakeAntInstall::with_java_script(ECHO_ARGS);
    let mut config = install.config();
    config.ant_opts = Some("-Xmx640m -Xss2m".to_string());
    let task = AntTask::with_locator(config, install.locator())?;

    let mut events: Vec<TaskEvent> = Vec::new();
    run_tool(&task, &RunParams::from(task.config()), &mut events).await?;

    let printed = printed_lines(&events);
    assert_eq!(
        printed[..4],
        [
            "argc=6".to_string(),
            "arg=-Xmx640m".to_string(),
            "arg=-Xss2m".to_string(),
            "arg=-jar".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn returns_once_java_exits_even_if_pipes_stay_open() -> anyhow::Result<()> {
    let install = FakeAntInstall::with_java_script("echo done; (sleep 10) & exit 0");
    let task = AntTask::with_locator(install.config(), install.locator())?;

    let mut events: Vec<TaskEvent> = Vec::new();
    let outcome = run_tool(&task, &RunParams::from(task.config()), &mut events).await?;

    assert!(outcome.success());
    assert!(!outcome.timed_out);
    assert!(
        outcome.duration < Duration::from_secs(7),
        "waited {:?}",
        outcome.duration
    );
    assert_eq!(printed_lines(&events), vec!["done".to_string()]);
    Ok(())
}

#[tokio::test]
async fn applies_working_directory_and_environment() -> anyhow::Result<()> {
    let install = FakeAntInstall::with_java_script(r#"pwd; echo "opts=$ANT_TEST_VALUE""#);
    let mut config = install.config();
    config
        .env
        .insert("ANT_TEST_VALUE".to_string(), "from-config".to_string());
    let task = AntTask::with_locator(config, install.locator())?;

    let mut events: Vec<TaskEvent> = Vec::new();
    run_tool(&task, &RunParams::from(task.config()), &mut events).await?;

    let printed: Vec<String> = lines_from(&events, OutputStream::Stdout)
        .into_iter()
        .map(|line| line.line)
        .collect();
    let expected_dir = install.work_dir.canonicalize()?;
    assert_eq!(printed.len(), 2);
    assert_eq!(
        std::path::Path::new(&printed[0]).canonicalize()?,
        expected_dir
    );
    assert_eq!(printed[1], "opts=from-config");
    Ok(())
}

#[tokio::test]
async fn missing_launcher_is_reported_before_start() -> anyhow::Result<()> {
    let install = FakeAntInstall::with_java_script("exit 0");
    std::fs::remove_file(install.launcher_path())?;
    let task = AntTask::with_locator(install.config(), install.locator())?;

    let mut events: Vec<TaskEvent> = Vec::new();
    let outcome = run_tool(&task, &RunParams::from(task.config()), &mut events).await?;

    let expected = Warning::MissingArtifact {
        path: install.launcher_path(),
        tool_home: install.ant_home.clone(),
    };
    assert_eq!(
        events.first(),
        Some(&TaskEvent::Warning {
            warning: expected.clone(),
        })
    );
    assert_eq!(outcome.warnings, vec![expected]);
    assert!(outcome.success());
    Ok(())
}

#[tokio::test]
async fn timeout_kills_the_tool() -> anyhow::Result<()> {
    let install = FakeAntInstall::with_java_script("echo started; exec sleep 30");
    let mut config = install.config();
    config.timeout = Some(Duration::from_millis(500));
    let task = AntTask::with_locator(config, install.locator())?;

    let mut events: Vec<TaskEvent> = Vec::new();
    let outcome = run_tool(&task, &RunParams::from(task.config()), &mut events).await?;

    assert!(outcome.timed_out);
    assert_eq!(outcome.exit_code, TIMEOUT_EXIT_CODE);
    assert!(outcome.duration < Duration::from_secs(10));
    assert_eq!(
        lines_from(&events, OutputStream::Stdout)
            .into_iter()
            .map(|line| line.line)
            .collect::<Vec<_>>(),
        vec!["started".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn fatal_errors_spawn_nothing() {
    let install = FakeAntInstall::with_java_script("echo should-not-run");
    let mut config = install.config();
    config.java_home = None;
    let task = AntTask::with_locator(config, anttask_core::ToolLocator::new(None, None))
        .expect("task");

    let mut events: Vec<TaskEvent> = Vec::new();
    let result = run_tool(&task, &RunParams::from(task.config()), &mut events).await;

    assert!(result.is_err());
    assert!(events.is_empty());
}
