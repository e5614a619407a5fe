use httpdf_core::models::config::{LocaleConfig, TemplateConfig, DEFAULT_LOCALE};
use httpdf_core::models::page::PageOptions;
use httpdf_core::models::validation::{join_violations, ValidationResult, Violation};

#[test]
fn config_decodes_full_yaml() {
    let yaml = r#"
page:
  width: 210
  height: 297
locale:
  locales: [en, de]
  default: en
exposedEnvVars:
  - API_BASE_URL
  - APP_VERSION
"#;
    let config: TemplateConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.page.width, 210.0);
    assert_eq!(config.page.height, 297.0);

    let locale = config.locale.unwrap();
    assert_eq!(locale.locales, vec!["en", "de"]);
    assert_eq!(locale.default, "en");
    assert_eq!(config.exposed_env_vars, vec!["API_BASE_URL", "APP_VERSION"]);
}

#[test]
fn config_optional_sections_default_to_empty() {
    let config: TemplateConfig = serde_yaml::from_str("page:\n  width: 100\n  height: 50\n").unwrap();
    assert!(config.locale.is_none());
    assert!(config.exposed_env_vars.is_empty());
}

#[test]
fn a4_converts_to_inches() {
    let page = PageOptions::from_mm(210.0, 297.0);
    assert!((page.width_inches() - 8.2677).abs() < 1e-3);
    assert!((page.height_inches() - 11.6929).abs() < 1e-3);
}

#[test]
fn locale_fallback_order() {
    let with_default = LocaleConfig {
        locales: vec!["de".into(), "fr".into()],
        default: "fr".into(),
    };
    assert_eq!(with_default.fallback(), "fr");

    let first_listed = LocaleConfig {
        locales: vec!["de".into()],
        default: String::new(),
    };
    assert_eq!(first_listed.fallback(), "de");

    assert_eq!(LocaleConfig::default().fallback(), DEFAULT_LOCALE);
}

#[test]
fn violations_join_into_one_line() {
    let result = ValidationResult {
        violations: vec![
            Violation {
                pointer: String::new(),
                reason: "\"name\" is a required property".into(),
            },
            Violation {
                pointer: "/age".into(),
                reason: "\"x\" is not of type \"integer\"".into(),
            },
        ],
    };
    assert!(!result.is_valid());
    assert_eq!(
        join_violations(&result.violations),
        "\"name\" is a required property; /age: \"x\" is not of type \"integer\""
    );
    assert!(ValidationResult::valid().is_valid());
}
