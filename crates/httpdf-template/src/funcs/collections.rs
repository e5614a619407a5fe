use std::collections::HashMap;

use tera::{Function, Value};

use crate::i18n::display_value;

/// Split `items` into consecutive groups of at most `size` elements.
///
/// Returns `None` for a non-positive size. The caller turns that into a
/// `null` result instead of failing the render.
pub fn chunk(items: &[Value], size: i64) -> Option<Vec<Value>> {
    let size = usize::try_from(size).ok().filter(|s| *s > 0)?;
    Some(
        items
            .chunks(size)
            .map(|group| Value::Array(group.to_vec()))
            .collect(),
    )
}

fn chunk_value(items: Option<&Value>, size: Option<&Value>) -> Value {
    let (Some(items), Some(size)) = (
        items.and_then(Value::as_array),
        size.and_then(Value::as_i64),
    ) else {
        return Value::Null;
    };
    chunk(items, size).map(Value::Array).unwrap_or(Value::Null)
}

/// `chunk(items=list, size=n)` and `list | chunk(size=n)`.
pub struct ChunkFn;

impl Function for ChunkFn {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(chunk_value(args.get("items"), args.get("size")))
    }
}

impl tera::Filter for ChunkFn {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(chunk_value(Some(value), args.get("size")))
    }
}

/// Join an asset URL prefix with path segments using `/` semantics.
///
/// Empty segments are skipped, repeated separators collapse and `.`/`..`
/// are resolved lexically. Nothing touches the filesystem.
pub fn join_asset_path<S: AsRef<str>>(prefix: &str, segments: &[S]) -> String {
    let parts: Vec<&str> = std::iter::once(prefix)
        .chain(segments.iter().map(AsRef::as_ref))
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    clean_path(&parts.join("/"))
}

fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// `asset(path="css/a.css")` or `asset(path=["css", "a.css"])`.
pub struct AssetFn {
    prefix: String,
}

impl AssetFn {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl Function for AssetFn {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let segments: Vec<String> = match args.get("path") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(display_value).collect(),
            Some(other) => vec![display_value(other)],
        };
        let url = join_asset_path(&self.prefix, &segments);
        Ok(Value::String(tera::escape_html(&url)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
