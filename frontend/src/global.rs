use debug_gate::{ConfigPatch, DebugGate};
use js_sys::{Function, Object, Reflect};
use serde::Deserialize;
use serde_json::Value;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

use crate::console::to_js;

/// Property on `window` that mirrors the gate configuration for page scripts.
pub const GLOBAL_KEY: &str = "DEBUG_CONFIG";

// Turns a one-argument callback into a rest-parameter function, so page code
// can call `debug("a", obj)` the way it would call `console.log`.
const VARIADIC_ADAPTER: &str = "return function (...parts) { return inner(parts); };";

/// Copy the current configuration onto `window.DEBUG_CONFIG`.
pub fn publish(gate: &DebugGate) {
    let Some(window) = web_sys::window() else {
        return;
    };
    set(&window, GLOBAL_KEY, &to_js(&gate.config()));
}

/// Pick up edits other scripts made to `window.DEBUG_CONFIG` since the last
/// publish. Unreadable values are ignored.
pub fn adopt(gate: &DebugGate) {
    if let Some(mirrored) = read() {
        adopt_value(gate, &mirrored);
    }
}

/// Merge a mirrored object into the gate. Returns `false`, leaving the
/// configuration as it was, when the object is not a valid patch.
pub(crate) fn adopt_value(gate: &DebugGate, mirrored: &Value) -> bool {
    match parse_patch(mirrored) {
        Ok(patch) => {
            gate.merge_config(&patch);
            true
        }
        Err(_) => false,
    }
}

fn read() -> Option<Value> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str(GLOBAL_KEY)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    serde_wasm_bindgen::from_value(value).ok()
}

/// Read a configuration patch from a plain JSON-like object. A field of the
/// wrong type rejects the whole patch.
pub(crate) fn parse_patch(value: &Value) -> Result<ConfigPatch, String> {
    if !value.is_object() {
        return Err(format!("expected an object, got {value}"));
    }
    ConfigPatch::deserialize(value).map_err(|err| err.to_string())
}

/// Install the page-level API on `window`: `debug`, `debugInfo`, `debugWarn`,
/// `debugError`, `debugModule`, the configuration functions and the
/// `debugForce` namespace.
pub fn install_functions() {
    let Some(window) = web_sys::window() else {
        return;
    };

    set(&window, "debug", &variadic(crate::debug));
    set(&window, "debugInfo", &variadic(crate::debug_info));
    set(&window, "debugWarn", &variadic(crate::debug_warn));
    set(&window, "debugError", &variadic(crate::debug_error));

    let module = Closure::<dyn Fn(JsValue) -> JsValue>::new(|name: JsValue| {
        module_object(&crate::debug_module(name_of(&name)))
    });
    set(&window, "debugModule", &module.into_js_value());

    let set_config = Closure::<dyn Fn(JsValue)>::new(crate::set_debug_config);
    set(&window, "setDebugConfig", &set_config.into_js_value());

    let set_enabled = Closure::<dyn Fn(JsValue)>::new(|flag: JsValue| {
        crate::set_debug_enabled(flag.is_truthy())
    });
    set(&window, "setDebugEnabled", &set_enabled.into_js_value());

    let set_level = Closure::<dyn Fn(JsValue) -> bool>::new(|level: JsValue| {
        crate::set_debug_level(name_of(&level))
    });
    set(&window, "setDebugLevel", &set_level.into_js_value());

    let status = Closure::<dyn Fn() -> JsValue>::new(crate::get_debug_status);
    set(&window, "getDebugStatus", &status.into_js_value());

    let toggle = Closure::<dyn Fn() -> bool>::new(crate::toggle_debug);
    set(&window, "toggleDebug", &toggle.into_js_value());

    let force = Object::new();
    set(&force, "log", &variadic(crate::force_log));
    set(&force, "info", &variadic(crate::force_info));
    set(&force, "warn", &variadic(crate::force_warn));
    set(&force, "error", &variadic(crate::force_error));
    set(&window, "debugForce", &force);
}

fn module_object(logger: &crate::ModuleLogger) -> JsValue {
    let object = Object::new();
    set(&object, "module", &JsValue::from_str(&logger.module()));
    for severity in ["debug", "info", "warn", "error"] {
        let bound = logger.clone();
        let method = variadic(move |parts| match severity {
            "debug" => bound.debug(parts),
            "info" => bound.info(parts),
            "warn" => bound.warn(parts),
            _ => bound.error(parts),
        });
        set(&object, severity, &method);
    }
    object.into()
}

fn variadic<F>(callback: F) -> JsValue
where
    F: Fn(JsValue) + 'static,
{
    let inner = Closure::<dyn Fn(JsValue)>::new(callback).into_js_value();
    Function::new_with_args("inner", VARIADIC_ADAPTER)
        .call1(&JsValue::NULL, &inner)
        .unwrap_or(JsValue::UNDEFINED)
}

fn name_of(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn set(target: &JsValue, key: &str, value: &JsValue) {
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}
