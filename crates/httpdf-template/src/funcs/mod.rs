//! Functions callable from inside a template.
//!
//! A [`FunctionRegistry`] is built for every render because it closes over
//! request-scoped state (asset prefix, resolved locale, translation catalog
//! and the env whitelist). Installing it into a fresh `Tera` instance layers
//! these functions over Tera's built-in filters and functions; a function
//! with the same name as a built-in replaces it.

pub mod barcode;
pub mod collections;
pub mod env;
pub mod i18n;

use std::collections::HashMap;
use std::sync::Arc;

use tera::{Tera, Value};

use httpdf_core::models::config::{TemplateConfig, DEFAULT_LOCALE};

use crate::i18n::{match_locale, Translations};

use self::barcode::QrCodeFn;
use self::collections::{AssetFn, ChunkFn};
use self::env::EnvFn;
use self::i18n::{LocaleFn, TrFn, TrLocaleFn};

pub struct FunctionRegistry {
    assets_prefix: String,
    locale: String,
    translations: Option<Arc<Translations>>,
    env: EnvFn,
}

impl FunctionRegistry {
    pub fn new(
        config: &TemplateConfig,
        translations: Option<Arc<Translations>>,
        assets_prefix: &str,
        requested_locale: &str,
    ) -> Self {
        let locale = match (&translations, &config.locale) {
            (Some(translations), _) => translations.match_locale(requested_locale),
            (None, Some(locale_config)) => match_locale(requested_locale, locale_config),
            (None, None) => DEFAULT_LOCALE.to_string(),
        };

        Self {
            assets_prefix: assets_prefix.to_string(),
            locale,
            translations,
            env: EnvFn::new(&config.exposed_env_vars),
        }
    }

    /// The locale every `tr` call of this render resolves against.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn assets_prefix(&self) -> &str {
        &self.assets_prefix
    }

    pub fn install(&self, tera: &mut Tera) {
        tera.register_function("chunk", ChunkFn);
        tera.register_filter("chunk", ChunkFn);
        tera.register_function("asset", AssetFn::new(&self.assets_prefix));
        tera.register_function("locale", LocaleFn::new(&self.locale));
        tera.register_function("tr", TrFn::new(self.translations.clone(), &self.locale));
        tera.register_function("trLocale", TrLocaleFn::new(self.translations.clone()));
        tera.register_function("env", self.env.clone());
        // Tera's own `get_env` reads any variable; route it through the whitelist.
        tera.register_function("get_env", self.env.clone());
        tera.register_function("qrCode", QrCodeFn);
    }
}

pub(crate) fn string_arg<'a>(args: &'a HashMap<String, Value>, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

pub(crate) fn required_string_arg<'a>(
    args: &'a HashMap<String, Value>,
    function: &str,
    name: &str,
) -> tera::Result<&'a str> {
    string_arg(args, name).ok_or_else(|| {
        tera::Error::msg(format!(
            "function `{function}` requires a string argument `{name}`"
        ))
    })
}
