use debug_gate::DebugGate;

/// Route `log` macros from the rest of the wasm module through the gate.
pub fn init_logging(gate: &DebugGate) {
    debug_gate::logging::install(gate);
}
