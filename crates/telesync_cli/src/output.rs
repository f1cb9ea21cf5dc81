//! Console output. Text mode is styled with `console`, the settings listing
//! is a `comfy-table`, directory fetches get an `indicatif` spinner. With
//! `--output json` every line is one JSON record instead.

use std::sync::OnceLock;

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

static FORMAT: OnceLock<OutputFormat> = OnceLock::new();

pub fn init(format: OutputFormat) {
    let _ = FORMAT.set(format);
}

pub fn is_json() -> bool {
    matches!(FORMAT.get(), Some(OutputFormat::Json))
}

/// What a line means; picks its marker in text mode and its level in JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Heading,
    Note,
    Done,
    Warn,
    Fail,
}

impl Tone {
    fn level(self) -> &'static str {
        match self {
            Tone::Heading | Tone::Note => "info",
            Tone::Done => "success",
            Tone::Warn => "warning",
            Tone::Fail => "error",
        }
    }

    fn styled(self, text: &str) -> String {
        let marked = |mark: StyledObject<&str>| format!("{} {}", mark, style(text).bright());
        match self {
            Tone::Heading => style(text).bold().cyan().to_string(),
            Tone::Note => style(text).dim().to_string(),
            Tone::Done => marked(style("✓").green()),
            Tone::Warn => marked(style("!").yellow()),
            Tone::Fail => marked(style("✗").red()),
        }
    }
}

fn record(level: &str, message: &str, data: Option<Value>) -> String {
    let mut line = json!({ "level": level, "message": message });
    if let Some(data) = data {
        line["data"] = data;
    }
    line.to_string()
}

/// Print one line. Failures go to stderr.
pub fn say(tone: Tone, text: &str) {
    let line = if is_json() {
        record(tone.level(), text, None)
    } else {
        tone.styled(text)
    };
    if tone == Tone::Fail {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Indented `key value` line.
pub fn field(key: &str, value: &str) {
    if is_json() {
        println!("{}", record("info", key, Some(json!({ key: value }))));
    } else {
        println!("  {} {}", style(key).cyan().bold(), value);
    }
}

/// Structured result: pretty JSON in text mode, a `data` record otherwise.
pub fn data(value: Value) {
    if is_json() {
        println!("{}", record("data", "", Some(value)));
    } else {
        let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
        println!("{pretty}");
    }
}

/// Two-column settings listing; one `config` object in JSON mode.
pub fn settings(rows: &[(String, String)]) {
    if is_json() {
        let object: Map<String, Value> = rows
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        println!("{}", record("data", "config", Some(Value::Object(object))));
        return;
    }

    let heading = |text: &str| Cell::new(text).fg(Color::Cyan).add_attribute(Attribute::Bold);
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![heading("Setting"), heading("Value")]);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key).fg(Color::Green), Cell::new(value)]);
    }
    println!("{table}");
}

/// Spinner shown while a fetch is running. Hidden in JSON mode.
pub struct Progress(ProgressBar);

impl Progress {
    pub fn start(message: &str) -> Self {
        if is_json() {
            return Self(ProgressBar::hidden());
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(template);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self(bar)
    }

    pub fn done(self, message: &str) {
        self.0.finish_and_clear();
        say(Tone::Done, message);
    }

    pub fn failed(self, message: &str) {
        self.0.finish_and_clear();
        say(Tone::Fail, message);
    }
}
