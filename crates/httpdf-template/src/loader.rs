//! Template package loading.
//!
//! A package is a directory under the loader root:
//!
//! ```text
//! <name>/
//!   template.html      required
//!   schema.json        required
//!   config.yaml        required
//!   example.json       optional
//!   assets/            optional
//!   locales/<code>.yaml  optional, read when config.yaml has a `locale` section
//! ```

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};
use tracing::{debug, info};

use httpdf_core::models::config::TemplateConfig;

use crate::error::TemplateError;
use crate::i18n::Translations;
use crate::schema::Schema;
use crate::template::Template;

pub const TEMPLATE_FILE: &str = "template.html";
pub const CONFIG_FILE: &str = "config.yaml";
pub const SCHEMA_FILE: &str = "schema.json";
pub const EXAMPLE_FILE: &str = "example.json";
pub const ASSETS_DIR: &str = "assets";
pub const LOCALES_DIR: &str = "locales";

pub trait Loader: Send + Sync {
    fn load(&self, name: &str) -> Result<Arc<Template>, TemplateError>;
}

/// Reads the package from disk on every call.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_template(&self, name: &str) -> Result<Template, TemplateError> {
        if !is_package_name(name) {
            return Err(TemplateError::NotFound {
                name: name.to_string(),
                file: TEMPLATE_FILE.to_string(),
            });
        }
        let dir = self.root.join(name);

        for file in [TEMPLATE_FILE, CONFIG_FILE, SCHEMA_FILE] {
            require_file(name, &dir, file)?;
        }

        let config: TemplateConfig =
            serde_yaml::from_str(&std::fs::read_to_string(dir.join(CONFIG_FILE))?)?;
        let schema = Schema::from_slice(&std::fs::read(dir.join(SCHEMA_FILE))?)?;
        let source = std::fs::read_to_string(dir.join(TEMPLATE_FILE))?;

        let translations = match &config.locale {
            Some(locale) => Some(Translations::load(&dir.join(LOCALES_DIR), locale.clone())?),
            None => None,
        };

        let mut template = Template::new(name, &source, config, schema);
        template.translations = translations.map(Arc::new);
        template.example = read_example(&dir.join(EXAMPLE_FILE))?;

        let assets = dir.join(ASSETS_DIR);
        if assets.is_dir() {
            template.assets = Some(assets);
        }

        debug!(
            template = %name,
            assets = template.assets.is_some(),
            translations = template.translations.is_some(),
            example = template.example.is_some(),
            "template loaded"
        );
        Ok(template)
    }
}

impl Loader for FsLoader {
    fn load(&self, name: &str) -> Result<Arc<Template>, TemplateError> {
        self.load_template(name).map(Arc::new)
    }
}

/// Loads each template once and serves the cached copy afterwards.
///
/// Concurrent first loads of one name may both hit the disk; the first
/// insert wins and every caller receives that instance from then on.
#[derive(Debug)]
pub struct CachingLoader {
    inner: FsLoader,
    cache: RwLock<HashMap<String, Arc<Template>>>,
}

impl CachingLoader {
    pub fn new(inner: FsLoader) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Loader for CachingLoader {
    fn load(&self, name: &str) -> Result<Arc<Template>, TemplateError> {
        if let Some(template) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(Arc::clone(template));
        }

        let template = self.inner.load(name)?;
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let cached = cache.entry(name.to_string()).or_insert(template);
        info!(template = %name, "template cached");
        Ok(Arc::clone(cached))
    }
}

/// A package name is a single, plain path component.
fn is_package_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

fn require_file(name: &str, dir: &Path, file: &str) -> Result<(), TemplateError> {
    let not_found = || TemplateError::NotFound {
        name: name.to_string(),
        file: file.to_string(),
    };
    match std::fs::metadata(dir.join(file)) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(not_found()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(TemplateError::Load(format!("could not stat {file}: {e}"))),
    }
}

fn read_example(path: &Path) -> Result<Option<Map<String, Value>>, TemplateError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| TemplateError::Load(format!("could not decode example data file: {e}")))
}
