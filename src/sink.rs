use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::level::Severity;

/// Console-style output with one write operation per severity.
///
/// Every write carries two parts: the formatted, human-readable `line` and the
/// untouched `payload` values it was built from, so consoles that can inspect
/// structured values still get them.
pub trait ConsoleSink {
    fn debug(&self, line: &str, payload: &[Value]);
    fn info(&self, line: &str, payload: &[Value]);
    fn warn(&self, line: &str, payload: &[Value]);
    fn error(&self, line: &str, payload: &[Value]);

    fn write(&self, severity: Severity, line: &str, payload: &[Value]) {
        match severity {
            Severity::Debug => self.debug(line, payload),
            Severity::Info => self.info(line, payload),
            Severity::Warn => self.warn(line, payload),
            Severity::Error => self.error(line, payload),
        }
    }
}

/// Output format used by [`StdSink`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdFormat {
    #[default]
    Text,
    Json,
}

/// Terminal sink: debug/info go to stdout, warn/error to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdSink {
    format: StdFormat,
}

impl StdSink {
    pub fn new(format: StdFormat) -> Self {
        Self { format }
    }

    pub fn text() -> Self {
        Self::new(StdFormat::Text)
    }

    pub fn json() -> Self {
        Self::new(StdFormat::Json)
    }

    fn render(&self, severity: Severity, line: &str, payload: &[Value]) -> String {
        match self.format {
            StdFormat::Text => line.to_string(),
            StdFormat::Json => render_json(severity, line, payload, current_timestamp_ms()),
        }
    }

    fn emit(&self, severity: Severity, line: &str, payload: &[Value]) {
        let rendered = self.render(severity, line, payload);
        match severity {
            Severity::Debug | Severity::Info => println!("{rendered}"),
            Severity::Warn | Severity::Error => eprintln!("{rendered}"),
        }
    }
}

impl ConsoleSink for StdSink {
    fn debug(&self, line: &str, payload: &[Value]) {
        self.emit(Severity::Debug, line, payload);
    }

    fn info(&self, line: &str, payload: &[Value]) {
        self.emit(Severity::Info, line, payload);
    }

    fn warn(&self, line: &str, payload: &[Value]) {
        self.emit(Severity::Warn, line, payload);
    }

    fn error(&self, line: &str, payload: &[Value]) {
        self.emit(Severity::Error, line, payload);
    }
}

#[derive(Serialize)]
struct LogEvent<'a> {
    level: &'a str,
    message: &'a str,
    timestamp_ms: u128,
    #[serde(skip_serializing_if = "no_payload")]
    payload: &'a [Value],
}

fn no_payload(payload: &&[Value]) -> bool {
    payload.is_empty()
}

pub(crate) fn render_json(
    severity: Severity,
    line: &str,
    payload: &[Value],
    timestamp_ms: u128,
) -> String {
    let entry = LogEvent {
        level: severity.as_str(),
        message: line,
        timestamp_ms,
        payload,
    };

    match serde_json::to_string(&entry) {
        Ok(rendered) => rendered,
        Err(err) => format!(
            "{{\"level\":\"error\",\"message\":\"failed to serialise log\",\"error\":\"{err}\"}}"
        ),
    }
}

fn current_timestamp_ms() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// One write captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted {
    pub severity: Severity,
    pub line: String,
    pub payload: Vec<Value>,
}

/// Records every write in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Rc<RefCell<Vec<Emitted>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Emitted> {
        self.records.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .map(|record| record.line.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }

    fn push(&self, severity: Severity, line: &str, payload: &[Value]) {
        self.records.borrow_mut().push(Emitted {
            severity,
            line: line.to_string(),
            payload: payload.to_vec(),
        });
    }
}

impl ConsoleSink for MemorySink {
    fn debug(&self, line: &str, payload: &[Value]) {
        self.push(Severity::Debug, line, payload);
    }

    fn info(&self, line: &str, payload: &[Value]) {
        self.push(Severity::Info, line, payload);
    }

    fn warn(&self, line: &str, payload: &[Value]) {
        self.push(Severity::Warn, line, payload);
    }

    fn error(&self, line: &str, payload: &[Value]) {
        self.push(Severity::Error, line, payload);
    }
}
