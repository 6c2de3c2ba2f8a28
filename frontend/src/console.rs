use debug_gate::{Clock, ConsoleSink};
use js_sys::{Array, Date};
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::JsValue;
use web_sys::console;

/// Writes to the developer console: the formatted line first, then every raw
/// part as its own argument so objects stay expandable.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserConsole;

impl BrowserConsole {
    fn arguments(line: &str, payload: &[Value]) -> Array {
        let args = Array::new();
        args.push(&JsValue::from_str(line));
        for part in payload {
            args.push(&to_js(part));
        }
        args
    }
}

impl ConsoleSink for BrowserConsole {
    fn debug(&self, line: &str, payload: &[Value]) {
        console::debug(&Self::arguments(line, payload));
    }

    fn info(&self, line: &str, payload: &[Value]) {
        console::info(&Self::arguments(line, payload));
    }

    fn warn(&self, line: &str, payload: &[Value]) {
        console::warn(&Self::arguments(line, payload));
    }

    fn error(&self, line: &str, payload: &[Value]) {
        console::error(&Self::arguments(line, payload));
    }
}

/// `Date.prototype.toLocaleTimeString()` in the browser's default locale.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocaleClock;

impl Clock for LocaleClock {
    fn time_label(&self) -> String {
        Date::new_0().to_locale_time_string("default").into()
    }
}

pub fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&Serializer::json_compatible())
        .unwrap_or(JsValue::UNDEFINED)
}

/// What could be read off a single JS argument.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reading {
    Text(String),
    Undefined,
    Decoded(Value),
    /// serde could not read it (functions, symbols, cyclic objects); carries
    /// the debug rendering instead.
    Opaque(String),
}

impl Reading {
    fn of(value: &JsValue) -> Reading {
        if let Some(text) = value.as_string() {
            return Reading::Text(text);
        }
        if value.is_undefined() {
            return Reading::Undefined;
        }
        match serde_wasm_bindgen::from_value::<Value>(value.clone()) {
            Ok(decoded) => Reading::Decoded(decoded),
            Err(_) => Reading::Opaque(format!("{value:?}")),
        }
    }

    pub(crate) fn into_part(self) -> Value {
        match self {
            Reading::Text(text) | Reading::Opaque(text) => Value::String(text),
            Reading::Undefined => Value::String("undefined".to_string()),
            Reading::Decoded(value) => value,
        }
    }
}

/// Convert a JS argument into a message part.
pub fn from_js(value: &JsValue) -> Value {
    Reading::of(value).into_part()
}

/// Message parts from one JS argument: an array contributes each element,
/// any other value is a single part.
pub fn parts_of(value: &JsValue) -> Vec<Value> {
    if Array::is_array(value) {
        Array::from(value).iter().map(|part| from_js(&part)).collect()
    } else {
        vec![from_js(value)]
    }
}
