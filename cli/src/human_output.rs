use anttask_core::EventSink;
use anttask_core::MessageImportance;
use anttask_core::OutputEvent;
use anttask_core::OutputStream;
use anttask_core::TaskEvent;
use owo_colors::OwoColorize;
use owo_colors::Style;

/// Prints events for a person watching the terminal.
///
/// Tool output keeps its stream. Everything this sink adds goes to stderr.
pub struct HumanOutput {
    // To ensure that --color=never is respected, ANSI escapes _must_ be added
    // using .style() with one of these fields.
    bold: Style,
    dimmed: Style,
    red: Style,
    green: Style,
    yellow: Style,
    cyan: Style,

    compile_warnings: usize,
}

impl HumanOutput {
    pub fn create_with_ansi(with_ansi: bool) -> Self {
        if with_ansi {
            Self {
                bold: Style::new().bold(),
                dimmed: Style::new().dimmed(),
                red: Style::new().red(),
                green: Style::new().green(),
                yellow: Style::new().yellow(),
                cyan: Style::new().cyan(),
                compile_warnings: 0,
            }
        } else {
            Self {
                bold: Style::new(),
                dimmed: Style::new(),
                red: Style::new(),
                green: Style::new(),
                yellow: Style::new(),
                cyan: Style::new(),
                compile_warnings: 0,
            }
        }
    }

    fn render_output(&mut self, event: &OutputEvent, line: &str) -> String {
        match event {
            OutputEvent::PhaseBoundary { .. } => line.style(self.bold).to_string(),
            OutputEvent::CompileWarning { .. } => {
                self.compile_warnings += 1;
                line.style(self.yellow).to_string()
            }
            OutputEvent::Message {
                importance: MessageImportance::Low,
                ..
            } => line.style(self.dimmed).to_string(),
            OutputEvent::Message { .. } => line.to_string(),
        }
    }
}

impl EventSink for HumanOutput {
    #[allow(clippy::print_stdout, clippy::print_stderr)]
    fn on_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Warning { warning } => {
                eprintln!("{} {warning}", "warning:".style(self.yellow));
            }
            TaskEvent::Started { program, args } => {
                let command = std::iter::once(program.display().to_string())
                    .chain(args)
                    .collect::<Vec<_>>()
                    .join(" ");
                eprintln!("{} {}", "$".style(self.dimmed), command.style(self.cyan));
            }
            TaskEvent::Output { stream, line } => {
                let rendered = self.render_output(&line.event, &line.line);
                match stream {
                    OutputStream::Stdout => println!("{rendered}"),
                    OutputStream::Stderr => eprintln!("{rendered}"),
                }
            }
            TaskEvent::Finished {
                exit_code,
                timed_out,
            } => {
                let warnings = match self.compile_warnings {
                    0 => String::new(),
                    1 => " (1 compiler warning)".to_string(),
                    n => format!(" ({n} compiler warnings)"),
                };
                if timed_out {
                    eprintln!("{}{warnings}", "ant timed out".style(self.red));
                } else if exit_code == 0 {
                    eprintln!("{}{warnings}", "ant succeeded".style(self.green));
                } else {
                    eprintln!(
                        "{}{warnings}",
                        format!("ant exited with code {exit_code}").style(self.red)
                    );
                }
            }
        }
    }
}
