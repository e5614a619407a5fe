use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Map;
use tera::{Function, Value};

use super::required_string_arg;
use crate::i18n::Translations;

/// Rendered by `tr` when the template has no translation catalog.
pub const MISSING_LOCALIZER: &str = "!(localizer is nil)";
/// Rendered by `trLocale` when the template has no translation catalog.
pub const MISSING_BUNDLE: &str = "!(bundle is nil)";

/// Build placeholder variables from a flat `[key, value, key, value, ...]`
/// list. A trailing key without a value maps to `null`; non-string keys are
/// skipped along with their value.
pub fn pair_vars(pairs: &[Value]) -> Map<String, Value> {
    let mut vars = Map::new();
    for pair in pairs.chunks(2) {
        if let Value::String(key) = &pair[0] {
            vars.insert(key.clone(), pair.get(1).cloned().unwrap_or(Value::Null));
        }
    }
    vars
}

/// Placeholder variables for a `tr`/`trLocale` call: every named argument
/// except the reserved ones, plus the pairs of an optional `args` list.
fn call_vars(args: &HashMap<String, Value>, reserved: &[&str]) -> Map<String, Value> {
    let mut vars = match args.get("args") {
        Some(Value::Array(pairs)) => pair_vars(pairs),
        _ => Map::new(),
    };
    for (name, value) in args {
        if name != "args" && !reserved.contains(&name.as_str()) {
            vars.insert(name.clone(), value.clone());
        }
    }
    vars
}

pub struct LocaleFn {
    locale: String,
}

impl LocaleFn {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
        }
    }
}

impl Function for LocaleFn {
    fn call(&self, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(Value::String(self.locale.clone()))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// `tr(key="greeting", name="World")` against the render's locale.
pub struct TrFn {
    translations: Option<Arc<Translations>>,
    locale: String,
}

impl TrFn {
    pub fn new(translations: Option<Arc<Translations>>, locale: &str) -> Self {
        Self {
            translations,
            locale: locale.to_string(),
        }
    }

    pub fn translate(&self, key: &str, vars: &Map<String, Value>) -> String {
        match &self.translations {
            Some(translations) => translations.get(&self.locale, key, vars),
            None => MISSING_LOCALIZER.to_string(),
        }
    }
}

impl Function for TrFn {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let key = required_string_arg(args, "tr", "key")?;
        let vars = call_vars(args, &["key"]);
        Ok(Value::String(tera::escape_html(&self.translate(key, &vars))))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// `trLocale(locale="de", key="greeting", ...)` against an explicit locale.
///
/// Matched locales are remembered for the lifetime of the registry, so a
/// render that repeats the same locale resolves it once.
pub struct TrLocaleFn {
    translations: Option<Arc<Translations>>,
    resolved: Mutex<HashMap<String, String>>,
}

impl TrLocaleFn {
    pub fn new(translations: Option<Arc<Translations>>) -> Self {
        Self {
            translations,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    pub fn translate(&self, locale: &str, key: &str, vars: &Map<String, Value>) -> String {
        let Some(translations) = &self.translations else {
            return MISSING_BUNDLE.to_string();
        };

        let matched = {
            let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
            resolved
                .entry(locale.to_string())
                .or_insert_with(|| translations.match_locale(locale))
                .clone()
        };
        translations.get(&matched, key, vars)
    }

    pub fn cached_locales(&self) -> usize {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Function for TrLocaleFn {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let locale = required_string_arg(args, "trLocale", "locale")?;
        let key = required_string_arg(args, "trLocale", "key")?;
        let vars = call_vars(args, &["locale", "key"]);
        Ok(Value::String(tera::escape_html(
            &self.translate(locale, key, &vars),
        )))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
