use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tera::{Function, Value};

use super::string_arg;

/// Whitelisted access to the process environment.
///
/// Names outside the whitelist read as `""`, exactly like an unset
/// variable, so a template cannot probe which variables exist.
#[derive(Debug, Clone)]
pub struct EnvFn {
    exposed: Arc<HashSet<String>>,
}

impl EnvFn {
    pub fn new<S: AsRef<str>>(exposed: &[S]) -> Self {
        Self {
            exposed: Arc::new(exposed.iter().map(|s| s.as_ref().to_string()).collect()),
        }
    }

    pub fn lookup(&self, name: &str) -> String {
        if !self.exposed.contains(name) {
            return String::new();
        }
        std::env::var(name).unwrap_or_default()
    }
}

/// `env(name="VAR")`, optionally with `default="..."` for empty results.
impl Function for EnvFn {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let value = string_arg(args, "name")
            .map(|name| self.lookup(name))
            .unwrap_or_default();
        let value = match (value.is_empty(), args.get("default")) {
            (true, Some(Value::String(fallback))) => fallback.clone(),
            (true, Some(fallback)) if !fallback.is_null() => fallback.to_string(),
            _ => value,
        };
        Ok(Value::String(tera::escape_html(&value)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
