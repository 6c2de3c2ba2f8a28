use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::banner;
use crate::clock::{Clock, LocalClock};
use crate::config::{ConfigPatch, GateConfig};
use crate::level::Severity;
use crate::sink::ConsoleSink;

/// Module name used for the gate's own configuration announcements.
pub const ANNOUNCE_MODULE: &str = "DEBUG";
pub const FORCE_MARKER: &str = "[FORCE]";

struct GateInner {
    config: RefCell<GateConfig>,
    sink: Box<dyn ConsoleSink>,
    clock: Box<dyn Clock>,
}

/// Handle to a gate and the configuration it owns.
///
/// Clones are cheap and share state, so a change made through one handle (or
/// through a [`ScopedLogger`]) applies to every call issued afterwards.
#[derive(Clone)]
pub struct DebugGate {
    inner: Rc<GateInner>,
}

/// Point-in-time copy of the gate configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateStatus {
    pub enabled: bool,
    pub level: Severity,
    pub config: GateConfig,
}

impl DebugGate {
    pub fn new<S>(config: GateConfig, sink: S) -> Self
    where
        S: ConsoleSink + 'static,
    {
        Self::with_clock(config, sink, LocalClock)
    }

    pub fn with_clock<S, C>(config: GateConfig, sink: S, clock: C) -> Self
    where
        S: ConsoleSink + 'static,
        C: Clock + 'static,
    {
        Self {
            inner: Rc::new(GateInner {
                config: RefCell::new(config),
                sink: Box::new(sink),
                clock: Box::new(clock),
            }),
        }
    }

    /// Log `parts` at the severity named by `level`. Unknown names are treated
    /// as `info`.
    pub fn emit(&self, level: &str, module: Option<&str>, parts: &[Value]) {
        self.emit_at(Severity::resolve(level), module, parts);
    }

    pub fn emit_at(&self, severity: Severity, module: Option<&str>, parts: &[Value]) {
        let config = self.config();
        if !passes(&config, severity) {
            return;
        }

        let mut line = String::new();
        if config.show_timestamp {
            line.push('[');
            line.push_str(&self.inner.clock.time_label());
            line.push_str("] ");
        }
        if let Some(module) = module.filter(|m| config.show_module && !m.is_empty()) {
            line.push('[');
            line.push_str(module);
            line.push_str("] ");
        }
        line.push_str(&join_parts(parts));

        self.inner.sink.write(severity, &line, parts);
    }

    pub fn debug(&self, parts: &[Value]) {
        self.emit_at(Severity::Debug, None, parts);
    }

    pub fn info(&self, parts: &[Value]) {
        self.emit_at(Severity::Info, None, parts);
    }

    pub fn warn(&self, parts: &[Value]) {
        self.emit_at(Severity::Warn, None, parts);
    }

    pub fn error(&self, parts: &[Value]) {
        self.emit_at(Severity::Error, None, parts);
    }

    pub fn for_module(&self, module: impl Into<String>) -> ScopedLogger {
        ScopedLogger {
            gate: self.clone(),
            module: module.into(),
        }
    }

    /// Unconditional write, ignoring both the enable flag and the threshold.
    pub fn force_log(&self, parts: &[Value]) {
        self.force(Severity::Info, parts);
    }

    pub fn force_info(&self, parts: &[Value]) {
        self.force(Severity::Info, parts);
    }

    pub fn force_warn(&self, parts: &[Value]) {
        self.force(Severity::Warn, parts);
    }

    pub fn force_error(&self, parts: &[Value]) {
        self.force(Severity::Error, parts);
    }

    fn force(&self, severity: Severity, parts: &[Value]) {
        let line = if parts.is_empty() {
            FORCE_MARKER.to_string()
        } else {
            format!("{FORCE_MARKER} {}", join_parts(parts))
        };
        self.inner.sink.write(severity, &line, parts);
    }

    pub fn set_config(&self, patch: &ConfigPatch) {
        let updated = {
            let mut config = self.inner.config.borrow_mut();
            config.apply(patch);
            *config
        };
        let snapshot = serde_json::to_value(updated).unwrap_or(Value::Null);
        self.emit_at(
            Severity::Info,
            Some(ANNOUNCE_MODULE),
            &[Value::from("debug configuration changed:"), snapshot],
        );
    }

    /// Merge `patch` without announcing it. Used when another party already
    /// owns the change, such as page scripts editing a mirrored config.
    pub fn merge_config(&self, patch: &ConfigPatch) {
        self.inner.config.borrow_mut().apply(patch);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.config.borrow_mut().enabled = enabled;
        let state = if enabled { "enabled" } else { "disabled" };
        self.emit_at(
            Severity::Info,
            Some(ANNOUNCE_MODULE),
            &[Value::from(format!("debugging {state}"))],
        );
    }

    /// Set the threshold by name. Returns `false`, leaving the configuration
    /// untouched, when the name is not a known severity.
    pub fn set_level(&self, name: &str) -> bool {
        let Some(level) = Severity::from_name(name) else {
            let raw = Value::from(name);
            self.inner
                .sink
                .warn(&format!("invalid debug level: {name}"), &[raw]);
            return false;
        };

        self.inner.config.borrow_mut().level = level;
        self.emit_at(
            Severity::Info,
            Some(ANNOUNCE_MODULE),
            &[Value::from(format!("debug level set to {level}"))],
        );
        true
    }

    /// Flip the enable flag, returning the new value.
    pub fn toggle(&self) -> bool {
        let enabled = !self.inner.config.borrow().enabled;
        self.set_enabled(enabled);
        enabled
    }

    pub fn status(&self) -> GateStatus {
        let config = self.config();
        GateStatus {
            enabled: config.enabled,
            level: config.level,
            config,
        }
    }

    pub fn config(&self) -> GateConfig {
        *self.inner.config.borrow()
    }

    /// Whether a call at `severity` would currently produce output.
    pub fn is_enabled_for(&self, severity: Severity) -> bool {
        passes(&self.config(), severity)
    }

    pub fn print_banner(&self) {
        for line in banner::LINES {
            self.inner.sink.info(line, &[]);
        }
    }
}

/// Logger bound to a fixed module name.
#[derive(Clone)]
pub struct ScopedLogger {
    gate: DebugGate,
    module: String,
}

impl ScopedLogger {
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn debug(&self, parts: &[Value]) {
        self.gate.emit_at(Severity::Debug, Some(&self.module), parts);
    }

    pub fn info(&self, parts: &[Value]) {
        self.gate.emit_at(Severity::Info, Some(&self.module), parts);
    }

    pub fn warn(&self, parts: &[Value]) {
        self.gate.emit_at(Severity::Warn, Some(&self.module), parts);
    }

    pub fn error(&self, parts: &[Value]) {
        self.gate.emit_at(Severity::Error, Some(&self.module), parts);
    }
}

fn passes(config: &GateConfig, severity: Severity) -> bool {
    config.enabled && severity.rank() >= config.level.rank()
}

/// Render message parts for the human-readable line: strings verbatim,
/// everything else as compact JSON.
pub fn join_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .map(|part| match part {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::sink::MemorySink;
    use serde_json::json;

    fn gate_with(config: GateConfig) -> (DebugGate, MemorySink) {
        let sink = MemorySink::new();
        let gate = DebugGate::with_clock(config, sink.clone(), FixedClock::new("9:15:00 AM"));
        (gate, sink)
    }

    fn enabled_at(level: Severity) -> GateConfig {
        GateConfig {
            enabled: true,
            level,
            ..GateConfig::default()
        }
    }

    #[test]
    fn disabled_gate_is_silent() {
        let (gate, sink) = gate_with(GateConfig::default());
        for severity in Severity::ALL {
            gate.emit_at(severity, Some("Any"), &[json!("x"), json!({"k": 1})]);
        }
        gate.emit("bogus", None, &[json!("y")]);
        gate.for_module("Mod").error(&[json!("z")]);

        assert!(sink.is_empty());
    }

    #[test]
    fn threshold_filters_lower_ranks() {
        let (gate, sink) = gate_with(enabled_at(Severity::Warn));
        gate.debug(&[json!("d")]);
        gate.info(&[json!("i")]);
        gate.warn(&[json!("w")]);
        gate.error(&[json!("e")]);

        let severities: Vec<Severity> = sink.records().iter().map(|r| r.severity).collect();
        assert_eq!(severities, vec![Severity::Warn, Severity::Error]);
    }

    #[test]
    fn unknown_severity_uses_info_rank_and_sink() {
        let (gate, sink) = gate_with(enabled_at(Severity::Info));
        gate.emit("verbose", None, &[json!("shown")]);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Info);

        gate.set_level("warn");
        sink.clear();
        gate.emit("verbose", None, &[json!("hidden")]);
        assert!(sink.is_empty());
    }

    #[test]
    fn prefix_contains_time_and_module() {
        let (gate, sink) = gate_with(enabled_at(Severity::Debug));
        gate.for_module("X").error(&[json!("boom"), json!(3)]);

        let records = sink.records();
        assert_eq!(records[0].line, "[9:15:00 AM] [X] boom 3");
        assert_eq!(records[0].payload, vec![json!("boom"), json!(3)]);
        assert_eq!(records[0].severity, Severity::Error);
    }

    #[test]
    fn prefix_flags_are_honoured() {
        let (gate, sink) = gate_with(GateConfig {
            enabled: true,
            level: Severity::Debug,
            show_timestamp: false,
            show_module: false,
        });
        gate.for_module("X").info(&[json!({"a": [1, 2]})]);
        gate.info(&[json!("plain")]);

        assert_eq!(sink.lines(), vec![r#"{"a":[1,2]}"#, "plain"]);
    }

    #[test]
    fn module_is_skipped_when_absent() {
        let (gate, sink) = gate_with(GateConfig {
            show_timestamp: false,
            ..enabled_at(Severity::Debug)
        });
        gate.emit("warn", None, &[json!("no module")]);
        assert_eq!(sink.lines(), vec!["no module"]);
    }

    #[test]
    fn empty_module_name_is_treated_as_absent() {
        let (gate, sink) = gate_with(GateConfig {
            show_timestamp: false,
            ..enabled_at(Severity::Debug)
        });
        gate.emit("info", Some(""), &[json!("hi")]);
        gate.for_module("").warn(&[json!("there")]);

        assert_eq!(sink.lines(), vec!["hi", "there"]);
    }

    #[test]
    fn force_writes_while_disabled() {
        let (gate, sink) = gate_with(GateConfig::default());
        gate.force_error(&[json!("always")]);
        gate.force_log(&[json!("note"), json!(1)]);
        gate.force_warn(&[]);

        let records = sink.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].severity, Severity::Error);
        assert_eq!(records[0].line, "[FORCE] always");
        assert_eq!(records[1].severity, Severity::Info);
        assert_eq!(records[1].line, "[FORCE] note 1");
        assert_eq!(records[2].line, "[FORCE]");
    }

    #[test]
    fn invalid_level_is_rejected_with_warning() {
        let (gate, sink) = gate_with(GateConfig::default());
        assert!(!gate.set_level("bogus"));
        assert_eq!(gate.config().level, Severity::Info);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Warn);
        assert_eq!(records[0].line, "invalid debug level: bogus");
        assert_eq!(records[0].payload, vec![json!("bogus")]);
    }

    #[test]
    fn valid_level_is_announced_when_enabled() {
        let (gate, sink) = gate_with(GateConfig {
            show_timestamp: false,
            ..enabled_at(Severity::Info)
        });
        assert!(gate.set_level("error"));
        assert_eq!(gate.config().level, Severity::Error);
        // The announcement is info-level, so the new threshold swallows it.
        assert!(sink.is_empty());

        assert!(gate.set_level("debug"));
        assert_eq!(sink.lines(), vec!["[DEBUG] debug level set to debug"]);
    }

    #[test]
    fn set_config_merges_and_announces() {
        let (gate, sink) = gate_with(GateConfig::default());
        gate.set_config(&ConfigPatch {
            enabled: Some(true),
            show_timestamp: Some(false),
            ..ConfigPatch::default()
        });

        let config = gate.config();
        assert!(config.enabled);
        assert!(!config.show_timestamp);
        assert!(config.show_module);
        assert_eq!(config.level, Severity::Info);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0]
            .line
            .starts_with("[DEBUG] debug configuration changed: {"));
        assert_eq!(records[0].payload[1]["enabled"], json!(true));
    }

    #[test]
    fn merge_config_is_quiet() {
        let (gate, sink) = gate_with(GateConfig::default());
        gate.merge_config(&ConfigPatch {
            enabled: Some(true),
            level: Some(Severity::Debug),
            ..ConfigPatch::default()
        });
        assert!(sink.is_empty());
        assert!(gate.is_enabled_for(Severity::Debug));
    }

    #[test]
    fn enable_and_disable_announcements() {
        let (gate, sink) = gate_with(GateConfig {
            show_timestamp: false,
            ..GateConfig::default()
        });
        gate.set_enabled(true);
        gate.set_enabled(false);
        assert_eq!(sink.lines(), vec!["[DEBUG] debugging enabled"]);
    }

    #[test]
    fn toggle_flips_enabled() {
        let (gate, _sink) = gate_with(GateConfig::default());
        assert!(gate.toggle());
        assert!(gate.config().enabled);
        assert!(!gate.toggle());
        assert!(!gate.config().enabled);
    }

    #[test]
    fn status_is_a_copy() {
        let (gate, sink) = gate_with(GateConfig::default());
        let mut status = gate.status();
        status.config.enabled = true;
        status.config.level = Severity::Debug;

        gate.debug(&[json!("still hidden")]);
        assert!(sink.is_empty());
        assert!(!gate.status().enabled);
        assert_eq!(gate.status().config, GateConfig::default());
    }

    #[test]
    fn is_enabled_for_mirrors_guards() {
        let (gate, _sink) = gate_with(enabled_at(Severity::Warn));
        assert!(!gate.is_enabled_for(Severity::Info));
        assert!(gate.is_enabled_for(Severity::Error));
        gate.set_enabled(false);
        assert!(!gate.is_enabled_for(Severity::Error));
    }

    #[test]
    fn banner_ignores_enabled_flag() {
        let (gate, sink) = gate_with(GateConfig::default());
        gate.print_banner();
        assert_eq!(sink.len(), banner::LINES.len());
        assert!(sink
            .records()
            .iter()
            .all(|record| record.severity == Severity::Info));
    }
}
