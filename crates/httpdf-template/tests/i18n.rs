use serde_json::{json, Map};

use httpdf_core::models::config::LocaleConfig;
use httpdf_template::i18n::{interpolate, match_locale, Translations};

fn config(locales: &[&str], default: &str) -> LocaleConfig {
    LocaleConfig {
        locales: locales.iter().map(|l| l.to_string()).collect(),
        default: default.to_string(),
    }
}

#[test]
fn exact_match_wins() {
    let cfg = config(&["en", "de", "de-CH"], "en");
    assert_eq!(match_locale("de-CH", &cfg), "de-CH");
    assert_eq!(match_locale("de_ch", &cfg), "de-CH");
}

#[test]
fn base_language_matches_region_tags() {
    let cfg = config(&["en", "de"], "en");
    assert_eq!(match_locale("de-AT", &cfg), "de");
}

#[test]
fn accept_language_quality_order() {
    let cfg = config(&["en", "fr"], "en");
    assert_eq!(match_locale("de-CH,de;q=0.9,fr;q=0.8,en;q=0.7", &cfg), "fr");
    assert_eq!(match_locale("en;q=0.1, fr;q=0.5", &cfg), "fr");
    assert_eq!(match_locale("fr;q=0", &cfg), "en");
}

#[test]
fn unmatched_falls_back() {
    assert_eq!(match_locale("it", &config(&["en", "de"], "de")), "de");
    assert_eq!(match_locale("", &config(&["fr", "de"], "")), "fr");
    assert_eq!(match_locale("it", &config(&[], "")), "en");
}

#[test]
fn interpolates_named_placeholders() {
    let mut vars = Map::new();
    vars.insert("name".into(), json!("Ada"));
    vars.insert("count".into(), json!(3));
    vars.insert("none".into(), json!(null));
    assert_eq!(
        interpolate("Hi {name}, {count} new {unknown}{none}!", &vars),
        "Hi Ada, 3 new {unknown}!"
    );
    assert_eq!(interpolate("braces { stay }", &vars), "braces { stay }");
}

#[test]
fn loads_nested_yaml_catalogs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("en.yaml"),
        "hello: Hello\ninvoice:\n  title: Invoice {number}\n  total: 3\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("de.yml"), "hello: Hallo\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let translations = Translations::load(dir.path(), config(&["en", "de"], "en")).unwrap();
    let mut vars = Map::new();
    vars.insert("number".into(), json!(42));

    assert_eq!(translations.get("de", "hello", &Map::new()), "Hallo");
    assert_eq!(translations.get("en", "invoice.title", &vars), "Invoice 42");
    assert_eq!(translations.get("en", "invoice.total", &Map::new()), "3");
    assert_eq!(translations.get("de", "invoice.title", &vars), "Invoice 42");
}

#[test]
fn missing_catalog_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let translations =
        Translations::load(&dir.path().join("locales"), config(&["en"], "en")).unwrap();
    assert_eq!(translations.get("en", "hello", &Map::new()), "hello");
}

#[test]
fn malformed_catalog_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("en.yaml"), "hello: [unclosed").unwrap();
    assert!(Translations::load(dir.path(), config(&["en"], "en")).is_err());
}
