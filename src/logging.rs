use std::cell::RefCell;

use log::{LevelFilter, Metadata, Record};
use serde_json::Value;

use crate::gate::DebugGate;
use crate::level::Severity;

thread_local! {
    static CURRENT: RefCell<Option<DebugGate>> = const { RefCell::new(None) };
}

struct GateLogger;

static LOGGER: GateLogger = GateLogger;

impl log::Log for GateLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let severity = Severity::from(metadata.level());
        CURRENT.with(|current| {
            current
                .borrow()
                .as_ref()
                .is_some_and(|gate| gate.is_enabled_for(severity))
        })
    }

    fn log(&self, record: &Record) {
        let Some(gate) = CURRENT.with(|current| current.borrow().clone()) else {
            return;
        };
        let message = Value::from(record.args().to_string());
        gate.emit_at(
            Severity::from(record.level()),
            Some(record.target()),
            &[message],
        );
    }

    fn flush(&self) {}
}

/// Route the `log` macros on this thread through `gate`.
///
/// Safe to call repeatedly; later calls replace the gate.
pub fn install(gate: &DebugGate) {
    CURRENT.with(|current| *current.borrow_mut() = Some(gate.clone()));
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

/// Detach the gate installed on this thread. `log` calls become no-ops.
pub fn uninstall() {
    CURRENT.with(|current| current.borrow_mut().take());
}
