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

// Cachet Sandbox
// Wires the cache from a config file and walks through every registry.

use anyhow::Result;
use cachet_sdk::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Used when no config path is given on the command line.
const DEFAULT_CONFIG: &str = include_str!("../cachet.json");

type App = Cachet<String, Vec<u8>, Value>;

fn load_config() -> Result<CachetConfig> {
    Ok(match std::env::args().nth(1) {
        Some(path) => CachetConfig::from_file(path)?,
        None => CachetConfig::from_json(DEFAULT_CONFIG)?,
    })
}

/// Modules: a synchronous loader plus a lazily built one.
async fn run_modules(app: &App) -> Result<()> {
    app.modules().set_loader(ContextLoader::from_fn("core", |id: &ScopedId| {
        Ok(LoadOutcome::Immediate(format!("// module {id}")))
    }));
    app.modules().add_lazy_loader(|| {
        log::info!("Building the plugin loader.");
        ContextLoader::from_fn("plugins", |id: &ScopedId| {
            let source = format!("// plugin {}", id.key());
            Ok(LoadOutcome::pending(async move { Ok(source) }))
        })
    });

    for id in [ScopedId::new("main", "core"), ScopedId::new("charts", "plugins")] {
        let entry = app.modules().load(&id)?.resolve().await?;
        log::info!("Loaded {}: {}", entry.id(), entry.payload());
    }
    // Cached now.
    let again = app.modules().load(&ScopedId::new("main", "core"))?;
    log::info!("Second request for core:main ready at once: {}", again.is_ready());

    let missing = app.modules().load(&ScopedId::new("x", "unknown"));
    if let Err(err) = missing {
        log::warn!("{err}");
    }
    Ok(())
}

/// Resources: concurrent requests for one identity share a single load.
async fn run_resources(app: &App) -> Result<()> {
    app.resources().set_loader(ContextLoader::from_fn("images", |id: &ScopedId| {
        log::info!("Fetching {id}.");
        let bytes = id.key().as_bytes().to_vec();
        Ok(LoadOutcome::pending(async move {
            tokio::task::yield_now().await;
            Ok(bytes)
        }))
    }));

    let id = ScopedId::new("logo.png", "images");
    let mut tasks = Vec::new();
    for _ in 0..4 {
        let resources = app.resources().clone();
        let id = id.clone();
        tasks.push(tokio::spawn(async move { resources.load(&id)?.resolve().await }));
    }
    for task in tasks {
        let entry = task.await??;
        log::info!("Got {} byte(s) for {}.", entry.payload().len(), entry.id());
    }
    Ok(())
}

/// Configs: a failing loader leaves nothing behind and can be replaced.
async fn run_configs(app: &App) -> Result<()> {
    let id = ScopedId::new("theme", "ui");
    app.configs().set_loader(ContextLoader::from_fn("ui", |_: &ScopedId| {
        Ok(LoadOutcome::pending(async {
            Err(LoadError::loader("settings service unreachable"))
        }))
    }));
    if let Err(err) = app.configs().load(&id)?.resolve().await {
        log::warn!("Loading {id} failed: {err}");
    }

    app.configs().set_loader(ContextLoader::from_fn("ui", |_: &ScopedId| {
        Ok(LoadOutcome::Immediate(json!({ "mode": "dark", "accent": "#ff8800" })))
    }));
    let theme = app.configs().load(&id)?.resolve().await?;
    log::info!("Theme: {}", theme.payload());
    Ok(())
}

/// Translations: loader fallback, translators, locale changes.
async fn run_translations(app: &App) -> Result<()> {
    let translations = app.translations();

    let mut files: HashMap<(String, String), Value> = HashMap::new();
    files.insert(
        ("en".into(), "shop".into()),
        json!({ "cart": { "items": "${count} item(s)", "total": "Total: ${sum}" } }),
    );
    files.insert(
        ("fr".into(), "shop".into()),
        json!({ "cart": { "items": "${count} article(s)" } }),
    );
    translations.set_loader(ContextLoader::from_fn("root", move |id: &LocalizedId| {
        let file = files
            .get(&(id.locale().to_string(), id.key().to_string()))
            .cloned();
        Ok(LoadOutcome::pending(async move { Ok(file) }))
    }));

    translations.load(&LocalizedId::new("shop", "root", "ru"))?.resolve().await?;
    translations.load(&LocalizedId::new("shop", "root", "fr"))?.resolve().await?;

    if let Some(translator) = translations.current_translator("root") {
        let greet = translator.clone().with_prefix("greet");
        log::info!(
            "[{}] {}",
            translator.locale(),
            greet.translate("hello", &[("name", json!("Ada"))], Value::Null)
        );
        log::info!(
            "[{}] {}",
            translator.locale(),
            translator.translate("shop.cart.items", &[("count", json!(3))], Value::Null)
        );
        log::info!(
            "[{}] {}",
            translator.locale(),
            translator.translate("missing.path", &[], json!("N/A"))
        );
    }

    translations.set_current_locale("fr")?;
    let translator = translations.get_translator("root", "fr").with_prefix("shop.cart");
    log::info!("[fr] {}", translator.translate("items", &[("count", json!(3))], Value::Null));
    // Only the requested locale's unit is consulted once loaded.
    log::info!("[fr] {}", translator.translate("total", &[], json!("-")));

    let inline = translator.translate_value(json!({ "fr": "Bonjour", "en": "Hello" }), &[], Value::Null)?;
    log::info!("[fr] inline: {inline}");
    if let Err(err) = translator.translate_value(json!(7), &[], Value::Null) {
        log::warn!("{err}");
    }

    if let Err(err) = translations.set_current_locale("de") {
        log::warn!("{err}; current locale stays {:?}.", translations.current_locale());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = load_config()?;
    init_logging(&config.logging)?;
    log::info!("Starting Cachet sandbox '{}'...", config.name);

    let app: App = Cachet::from_config(&config);
    run_modules(&app).await?;
    run_resources(&app).await?;
    run_configs(&app).await?;
    run_translations(&app).await?;

    app.log_metrics_summary();
    log::info!("Cachet sandbox has shut down.");
    Ok(())
}
