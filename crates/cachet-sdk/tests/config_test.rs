// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use cachet_sdk::prelude::*;
use cachet_sdk::ConfigError;
use serde_json::{json, Value};
use tempfile::tempdir;

const CONFIG: &str = r#"{
    "name": "storefront",
    "logging": { "level": "warn" },
    "translations": {
        "locales": ["en", "ru"],
        "current_locale": "ru",
        "default_locale": "en",
        "seeds": [
            {
                "locale": "en",
                "context": "root",
                "entries": {
                    "greet": { "hello": "Hello ${name}!" },
                    "cart": { "items": "${count} item(s)", "limit": 10 }
                }
            },
            {
                "locale": "ru",
                "context": "root",
                "entries": { "cart": { "items": "Товаров: ${count}" } }
            }
        ]
    }
}"#;

#[test]
fn test_config_file_seeds_translations() -> Result<()> {
    // --- 1. Setup: write the config to a temporary file ---
    let dir = tempdir()?;
    let path = dir.path().join("cachet.json");
    std::fs::write(&path, CONFIG)?;

    // --- 2. Build the cache from the file ---
    let config = CachetConfig::from_file(&path)?;
    let cachet: Cachet = Cachet::from_config(&config);
    let translations = cachet.translations();

    // --- 3. Assert: locales applied, seeds stored, fallback active ---
    assert_eq!(cachet.name(), "storefront");
    assert_eq!(translations.current_locale().as_deref(), Some("ru"));
    assert_eq!(translations.default_locale().as_deref(), Some("en"));

    let translator = translations
        .current_translator("root")
        .ok_or_else(|| anyhow::anyhow!("current locale not applied"))?;
    assert_eq!(
        translator.translate("greet.hello", &[("name", json!("World"))], Value::Null),
        json!("Hello World!")
    );
    assert_eq!(
        translator.translate("cart.items", &[("count", json!(2))], Value::Null),
        json!("Товаров: 2")
    );
    assert_eq!(
        translator.translate("missing.path", &[], json!("N/A")),
        json!("N/A")
    );
    Ok(())
}

#[test]
fn test_config_round_trips_through_a_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("saved.json");

    let config = CachetConfig::from_json(CONFIG)?;
    config.to_file(&path)?;
    assert_eq!(CachetConfig::from_file(&path)?, config);
    Ok(())
}

#[test]
fn test_unknown_locales_in_config_are_ignored() -> Result<()> {
    let config = CachetConfig::from_json(
        r#"{ "translations": { "locales": ["en"], "current_locale": "fr", "default_locale": "en" } }"#,
    )?;
    let cachet: Cachet = Cachet::from_config(&config);

    assert_eq!(cachet.name(), "cachet");
    assert_eq!(cachet.translations().current_locale(), None);
    assert_eq!(cachet.translations().default_locale().as_deref(), Some("en"));
    Ok(())
}

#[test]
fn test_missing_file_is_an_io_error() -> Result<()> {
    let dir = tempdir()?;
    let err = CachetConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    Ok(())
}

#[tokio::test]
async fn test_domain_registries_load_through_the_handle() -> Result<()> {
    let cachet: Cachet<String, Vec<u8>, Value> = Cachet::new("app");
    cachet
        .resources()
        .set_loader(ContextLoader::from_fn("images", |id: &ScopedId| {
            let bytes = id.key().as_bytes().to_vec();
            Ok(LoadOutcome::pending(async move { Ok(bytes) }))
        }));

    let logo = cachet
        .resources()
        .load(&ScopedId::new("logo", "images"))?
        .resolve()
        .await?;
    assert_eq!(logo.payload(), b"logo");

    let err = cachet
        .modules()
        .load(&ScopedId::new("main", "scripts"))
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}
