//! Line classification for Ant console output.
//!
//! Each line is classified on its own. The only state is the compiled
//! [`CompileWarningPattern`], which is chosen once from the locale when the
//! classifier is created and never changes afterwards.

use regex_lite::Regex;
use serde::Serialize;

use crate::config::MessageImportance;
use crate::error::Result;

/// Substring that marks a line as `javac` output.
pub const COMPILER_MARKER: &str = "[javac] ";

const ENGLISH_WARNING_PATTERN: &str =
    r"^.*?\[javac\] (?P<src>.+):(?P<line>\d+): warning:(?P<msg>.+)$";
const JAPANESE_WARNING_PATTERN: &str =
    r"^.*?\[javac\] (?P<src>.+):(?P<line>\d+): (?:warning|警告):(?P<msg>.+)$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ja,
}

impl Locale {
    /// Maps a tag such as `ja`, `ja-JP` or `JA_jp` onto a supported locale.
    /// Anything unrecognised falls back to [`Locale::En`].
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "ja" => Locale::Ja,
            _ => Locale::En,
        }
    }

    fn warning_pattern(self) -> &'static str {
        match self {
            Locale::En => ENGLISH_WARNING_PATTERN,
            Locale::Ja => JAPANESE_WARNING_PATTERN,
        }
    }
}

/// Compiled `javac` warning pattern for one locale.
#[derive(Debug, Clone)]
pub struct CompileWarningPattern {
    locale: Locale,
    regex: Regex,
}

impl CompileWarningPattern {
    pub fn for_locale(tag: &str) -> Result<Self> {
        let locale = Locale::from_tag(tag);
        let regex = Regex::new(locale.warning_pattern())?;
        Ok(Self { locale, regex })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn extract(&self, line: &str) -> Option<OutputEvent> {
        let caps = self.regex.captures(line)?;
        let line_number = caps.name("line")?.as_str().parse().ok()?;
        Some(OutputEvent::CompileWarning {
            source_file: caps.name("src")?.as_str().to_string(),
            line_number,
            message: caps.name("msg")?.as_str().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    Message {
        text: String,
        importance: MessageImportance,
    },
    /// The line announced a new target, e.g. `compile:`.
    PhaseBoundary { name: String },
    CompileWarning {
        source_file: String,
        line_number: u32,
        message: String,
    },
}

/// One output line and what it was classified as. The original text is
/// always kept, whatever the classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedLine {
    pub line: String,
    #[serde(flatten)]
    pub event: OutputEvent,
}

#[derive(Debug, Clone)]
pub struct OutputClassifier {
    pattern: CompileWarningPattern,
}

impl OutputClassifier {
    pub fn new(pattern: CompileWarningPattern) -> Self {
        Self { pattern }
    }

    pub fn for_locale(tag: &str) -> Result<Self> {
        Ok(Self::new(CompileWarningPattern::for_locale(tag)?))
    }

    pub fn locale(&self) -> Locale {
        self.pattern.locale()
    }

    pub fn classify(&self, line: &str, importance: MessageImportance) -> ClassifiedLine {
        let event = if let Some(name) = line.strip_suffix(':') {
            OutputEvent::PhaseBoundary {
                name: name.trim().to_string(),
            }
        } else if line.contains(COMPILER_MARKER) {
            // Errors and unexpected formats fall through as plain messages.
            self.pattern
                .extract(line)
                .unwrap_or_else(|| message(line, importance))
        } else {
            message(line, importance)
        };

        ClassifiedLine {
            line: line.to_string(),
            event,
        }
    }
}

fn message(line: &str, importance: MessageImportance) -> OutputEvent {
    OutputEvent::Message {
        text: line.to_string(),
        importance,
    }
}
