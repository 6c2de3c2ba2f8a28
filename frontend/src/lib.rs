use debug_gate::{DebugGate, GateConfig, ScopedLogger};
use serde_json::Value;
use wasm_bindgen::prelude::*;

mod console;
mod global;
mod logging;

pub use console::{BrowserConsole, LocaleClock};
pub use logging::init_logging;

thread_local! {
    static GATE: DebugGate =
        DebugGate::with_clock(GateConfig::default(), BrowserConsole, LocaleClock);
}

/// Run `f` against the page gate after syncing in edits made to
/// `window.DEBUG_CONFIG`.
fn with_gate<R>(f: impl FnOnce(&DebugGate) -> R) -> R {
    GATE.with(|gate| {
        global::adopt(gate);
        f(gate)
    })
}

/// Like [`with_gate`], then mirrors the resulting configuration back.
fn update_gate<R>(f: impl FnOnce(&DebugGate) -> R) -> R {
    with_gate(|gate| {
        let result = f(gate);
        global::publish(gate);
        result
    })
}

/// WASM entry point: install hooks and the `window` API, mirror the defaults
/// and print usage.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    global::install_functions();
    GATE.with(|gate| {
        init_logging(gate);
        global::publish(gate);
        gate.print_banner();
    });
}

// The module exports below take one argument: either an array of parts or a
// single part. The rest-parameter versions live on `window`.

#[wasm_bindgen]
pub fn debug(parts: JsValue) {
    with_gate(|gate| gate.debug(&console::parts_of(&parts)));
}

#[wasm_bindgen(js_name = debugInfo)]
pub fn debug_info(parts: JsValue) {
    with_gate(|gate| gate.info(&console::parts_of(&parts)));
}

#[wasm_bindgen(js_name = debugWarn)]
pub fn debug_warn(parts: JsValue) {
    with_gate(|gate| gate.warn(&console::parts_of(&parts)));
}

#[wasm_bindgen(js_name = debugError)]
pub fn debug_error(parts: JsValue) {
    with_gate(|gate| gate.error(&console::parts_of(&parts)));
}

/// Logger bound to one module name, returned by `debugModule(name)`.
#[wasm_bindgen]
#[derive(Clone)]
pub struct ModuleLogger {
    inner: ScopedLogger,
}

#[wasm_bindgen]
impl ModuleLogger {
    #[wasm_bindgen(getter)]
    pub fn module(&self) -> String {
        self.inner.module().to_string()
    }

    pub fn debug(&self, parts: JsValue) {
        with_gate(|_| self.inner.debug(&console::parts_of(&parts)));
    }

    pub fn info(&self, parts: JsValue) {
        with_gate(|_| self.inner.info(&console::parts_of(&parts)));
    }

    pub fn warn(&self, parts: JsValue) {
        with_gate(|_| self.inner.warn(&console::parts_of(&parts)));
    }

    pub fn error(&self, parts: JsValue) {
        with_gate(|_| self.inner.error(&console::parts_of(&parts)));
    }
}

#[wasm_bindgen(js_name = debugModule)]
pub fn debug_module(name: String) -> ModuleLogger {
    GATE.with(|gate| ModuleLogger {
        inner: gate.for_module(name),
    })
}

/// Merge the fields of a plain object into the configuration. Anything that
/// does not read as a patch is reported on the console and ignored.
#[wasm_bindgen(js_name = setDebugConfig)]
pub fn set_debug_config(config: JsValue) {
    let parsed = serde_wasm_bindgen::from_value::<Value>(config.clone())
        .map_err(|err| err.to_string())
        .and_then(|value| global::parse_patch(&value));
    match parsed {
        Ok(patch) => update_gate(|gate| gate.set_config(&patch)),
        Err(err) => web_sys::console::warn_2(
            &JsValue::from_str(&format!("invalid debug configuration: {err}")),
            &config,
        ),
    }
}

#[wasm_bindgen(js_name = setDebugEnabled)]
pub fn set_debug_enabled(enabled: bool) {
    update_gate(|gate| gate.set_enabled(enabled));
}

#[wasm_bindgen(js_name = setDebugLevel)]
pub fn set_debug_level(level: String) -> bool {
    update_gate(|gate| gate.set_level(&level))
}

#[wasm_bindgen(js_name = toggleDebug)]
pub fn toggle_debug() -> bool {
    update_gate(|gate| gate.toggle())
}

/// Fresh `{enabled, level, config}` object; editing it has no effect.
#[wasm_bindgen(js_name = getDebugStatus)]
pub fn get_debug_status() -> JsValue {
    with_gate(|gate| console::to_js(&gate.status()))
}

#[wasm_bindgen(js_name = forceLog)]
pub fn force_log(parts: JsValue) {
    GATE.with(|gate| gate.force_log(&console::parts_of(&parts)));
}

#[wasm_bindgen(js_name = forceInfo)]
pub fn force_info(parts: JsValue) {
    GATE.with(|gate| gate.force_info(&console::parts_of(&parts)));
}

#[wasm_bindgen(js_name = forceWarn)]
pub fn force_warn(parts: JsValue) {
    GATE.with(|gate| gate.force_warn(&console::parts_of(&parts)));
}

#[wasm_bindgen(js_name = forceError)]
pub fn force_error(parts: JsValue) {
    GATE.with(|gate| gate.force_error(&console::parts_of(&parts)));
}
