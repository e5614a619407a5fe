//! Translation catalogs for templates with a `locale` section.
//!
//! Each supported locale has a flat key → message map read from
//! `locales/<code>.yaml`. Nested YAML mappings are flattened with `.`
//! (`invoice: { title: ... }` becomes `invoice.title`). Messages may contain
//! `{name}` placeholders which are filled from the caller's variables.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use serde_yaml::Value as YamlValue;

use httpdf_core::models::config::LocaleConfig;

use crate::error::TemplateError;

#[derive(Debug, Clone, Default)]
pub struct Translations {
    config: LocaleConfig,
    messages: HashMap<String, HashMap<String, String>>,
}

impl Translations {
    pub fn new(config: LocaleConfig) -> Self {
        Self {
            config,
            messages: HashMap::new(),
        }
    }

    /// Read every `<code>.yaml` file in `dir`. A missing directory yields an
    /// empty catalog; lookups then fall back to the message key.
    pub fn load(dir: &Path, config: LocaleConfig) -> Result<Self, TemplateError> {
        let mut translations = Self::new(config);
        if !dir.is_dir() {
            return Ok(translations);
        }

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            let Some(code) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_yaml {
                continue;
            }

            let contents = std::fs::read_to_string(&path)?;
            let doc: YamlValue = serde_yaml::from_str(&contents).map_err(|e| {
                TemplateError::Load(format!("could not decode {}: {e}", path.display()))
            })?;
            translations.insert_yaml(code, &doc);
        }

        Ok(translations)
    }

    pub fn config(&self) -> &LocaleConfig {
        &self.config
    }

    /// Add (or overwrite) one message for `locale`.
    pub fn insert(&mut self, locale: &str, key: &str, message: &str) {
        self.messages
            .entry(normalize_tag(locale))
            .or_default()
            .insert(key.to_string(), message.to_string());
    }

    fn insert_yaml(&mut self, locale: &str, doc: &YamlValue) {
        let mut flat = Vec::new();
        flatten("", doc, &mut flat);
        for (key, message) in flat {
            self.insert(locale, &key, &message);
        }
    }

    /// Resolve a requested locale against the supported list.
    pub fn match_locale(&self, requested: &str) -> String {
        match_locale(requested, &self.config)
    }

    /// Look up `key` for an already-resolved `locale`, falling back to the
    /// default locale and finally to the key itself.
    pub fn get(&self, locale: &str, key: &str, vars: &Map<String, Value>) -> String {
        let message = self
            .lookup(locale, key)
            .or_else(|| self.lookup(self.config.fallback(), key));
        match message {
            Some(message) => interpolate(message, vars),
            None => key.to_string(),
        }
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.messages
            .get(&normalize_tag(locale))
            .and_then(|catalog| catalog.get(key))
            .map(String::as_str)
    }
}

fn flatten(prefix: &str, value: &YamlValue, out: &mut Vec<(String, String)>) {
    let text = match value {
        YamlValue::Mapping(map) => {
            for (k, v) in map {
                let Some(k) = yaml_key(k) else { continue };
                let key = if prefix.is_empty() {
                    k
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(&key, v, out);
            }
            return;
        }
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Tagged(tagged) => return flatten(prefix, &tagged.value, out),
        YamlValue::Null | YamlValue::Sequence(_) => return,
    };
    if !prefix.is_empty() {
        out.push((prefix.to_string(), text));
    }
}

fn yaml_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Replace `{name}` placeholders with values from `vars`. Unknown
/// placeholders are left untouched.
pub fn interpolate(message: &str, vars: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[..close]) => {
                let name = &after[..close];
                match vars.get(name) {
                    Some(value) => out.push_str(&display_value(value)),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pick the best supported locale for a request.
///
/// `requested` is either a single tag or an Accept-Language list with
/// optional `q` weights. Exact matches win over base-language matches;
/// nothing matching falls back to the configured default.
pub fn match_locale(requested: &str, config: &LocaleConfig) -> String {
    let wanted = parse_accept_language(requested);
    let supported: Vec<(String, &String)> = config
        .locales
        .iter()
        .map(|l| (normalize_tag(l), l))
        .collect();

    for tag in &wanted {
        if let Some((_, original)) = supported.iter().find(|(s, _)| s == tag) {
            return (*original).clone();
        }
    }
    for tag in &wanted {
        let base = base_language(tag);
        if let Some((_, original)) = supported.iter().find(|(s, _)| base_language(s) == base) {
            return (*original).clone();
        }
    }

    config.fallback().to_string()
}

fn parse_accept_language(header: &str) -> Vec<String> {
    let mut tags: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = normalize_tag(pieces.next()?.trim());
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = pieces
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then_some((tag, quality))
        })
        .collect();
    // Stable: equal weights keep header order.
    tags.sort_by(|a, b| b.1.total_cmp(&a.1));
    tags.into_iter().map(|(tag, _)| tag).collect()
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

fn base_language(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}
