//! Capability objects handed to scripts.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rhai::serde::{from_dynamic, to_dynamic};
use rhai::{Dynamic, Engine, EvalAltResult};
use serde_json::{Map, Value};

/// Mutable state shared between the worker thread and the caller.
#[derive(Debug, Default)]
pub(super) struct SandboxState {
    pub logs: Vec<String>,
    pub env_overrides: Map<String, Value>,
    pub vars_overrides: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
}

pub(super) type SharedState = Arc<Mutex<SandboxState>>;

impl SandboxState {
    pub fn with_headers(headers: BTreeMap<String, String>) -> SharedState {
        Arc::new(Mutex::new(Self {
            headers,
            ..Self::default()
        }))
    }
}

fn lookup(overrides: &Map<String, Value>, base: &Map<String, Value>, key: &str) -> Dynamic {
    overrides
        .get(key)
        .or_else(|| base.get(key))
        .and_then(|value| to_dynamic(value).ok())
        .unwrap_or(Dynamic::UNIT)
}

/// `env`: reads the resolved environment, stages overrides.
#[derive(Debug, Clone)]
pub(super) struct EnvApi {
    base: Arc<Map<String, Value>>,
    state: SharedState,
}

/// `vars`: the same layering over the parsed variables object.
#[derive(Debug, Clone)]
pub(super) struct VarsApi {
    base: Arc<Map<String, Value>>,
    state: SharedState,
}

/// `headers`: the enabled header map, writable.
#[derive(Debug, Clone)]
pub(super) struct HeadersApi {
    state: SharedState,
}

impl EnvApi {
    pub fn new(base: Map<String, Value>, state: &SharedState) -> Self {
        Self {
            base: Arc::new(base),
            state: Arc::clone(state),
        }
    }

    fn get(&mut self, key: &str) -> Dynamic {
        lookup(&self.state.lock().env_overrides, &self.base, key)
    }

    fn set(&mut self, key: &str, value: Dynamic) -> Result<(), Box<EvalAltResult>> {
        let value: Value = from_dynamic(&value)?;
        self.state.lock().env_overrides.insert(key.to_string(), value);
        Ok(())
    }
}

impl VarsApi {
    pub fn new(base: Map<String, Value>, state: &SharedState) -> Self {
        Self {
            base: Arc::new(base),
            state: Arc::clone(state),
        }
    }

    fn get(&mut self, key: &str) -> Dynamic {
        lookup(&self.state.lock().vars_overrides, &self.base, key)
    }

    fn set(&mut self, key: &str, value: Dynamic) -> Result<(), Box<EvalAltResult>> {
        let value: Value = from_dynamic(&value)?;
        self.state.lock().vars_overrides.insert(key.to_string(), value);
        Ok(())
    }
}

impl HeadersApi {
    pub fn new(state: &SharedState) -> Self {
        Self {
            state: Arc::clone(state),
        }
    }

    fn get(&mut self, name: &str) -> Dynamic {
        self.state
            .lock()
            .headers
            .get(name)
            .map_or(Dynamic::UNIT, |value| Dynamic::from(value.clone()))
    }

    fn set(&mut self, name: &str, value: Dynamic) {
        self.state
            .lock()
            .headers
            .insert(name.to_string(), value.to_string());
    }
}

/// Renders one `log` argument: objects and arrays as pretty JSON.
pub(super) fn render(value: &Dynamic) -> String {
    if value.is_unit() {
        return "()".to_string();
    }
    if value.is_map() || value.is_array() {
        if let Ok(json) = from_dynamic::<Value>(value)
            && let Ok(pretty) = serde_json::to_string_pretty(&json)
        {
            return pretty;
        }
    }
    value.to_string()
}

fn push_log(state: &SharedState, args: &[Dynamic]) {
    let line = args.iter().map(render).collect::<Vec<_>>().join(" ");
    state.lock().logs.push(line);
}

/// Registers the API types and the `log`/`print` sinks on `engine`.
pub(super) fn register(engine: &mut Engine, state: &SharedState) {
    engine
        .register_type_with_name::<EnvApi>("Env")
        .register_fn("get", EnvApi::get)
        .register_fn("set", EnvApi::set)
        .register_type_with_name::<VarsApi>("Vars")
        .register_fn("get", VarsApi::get)
        .register_fn("set", VarsApi::set)
        .register_type_with_name::<HeadersApi>("Headers")
        .register_fn("get", HeadersApi::get)
        .register_fn("set", HeadersApi::set);

    // Rhai has no variadic functions
    let sink = Arc::clone(state);
    engine.register_fn("log", move |a: Dynamic| push_log(&sink, &[a]));
    let sink = Arc::clone(state);
    engine.register_fn("log", move |a: Dynamic, b: Dynamic| push_log(&sink, &[a, b]));
    let sink = Arc::clone(state);
    engine.register_fn("log", move |a: Dynamic, b: Dynamic, c: Dynamic| {
        push_log(&sink, &[a, b, c]);
    });
    let sink = Arc::clone(state);
    engine.register_fn("log", move |a: Dynamic, b: Dynamic, c: Dynamic, d: Dynamic| {
        push_log(&sink, &[a, b, c, d]);
    });

    let sink = Arc::clone(state);
    engine.on_print(move |text| sink.lock().logs.push(text.to_string()));
}
