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

//! Path resolution and token substitution over loaded translations.

use super::TranslationRegistry;
use cachet_core::TranslateError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// What a [`Translator`] is asked to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationPath {
    /// A dotted/bracketed path such as `menu.items[2].label`. The lead
    /// segment names the translation unit.
    Key(String),
    /// Literal values per locale code, bypassing the loaded translations.
    Inline(HashMap<String, Value>),
}

impl From<&str> for TranslationPath {
    fn from(path: &str) -> Self {
        Self::Key(path.to_string())
    }
}

impl From<String> for TranslationPath {
    fn from(path: String) -> Self {
        Self::Key(path)
    }
}

impl From<HashMap<String, Value>> for TranslationPath {
    fn from(values: HashMap<String, Value>) -> Self {
        Self::Inline(values)
    }
}

impl TryFrom<Value> for TranslationPath {
    type Error = TranslateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(path) => Ok(Self::Key(path)),
            Value::Object(values) => Ok(Self::Inline(values.into_iter().collect())),
            other => Err(TranslateError::InvalidPathFormat {
                found: kind_of(&other),
            }),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Resolves paths for one context and locale.
///
/// Obtained from [`TranslationRegistry::get_translator`]. The locale is
/// fixed; the prefix can be changed and is prepended to every string path.
#[derive(Clone)]
pub struct Translator {
    translations: TranslationRegistry,
    context: String,
    locale: String,
    prefix: String,
}

impl Translator {
    pub(crate) fn new(
        translations: TranslationRegistry,
        context: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            translations,
            context: context.into(),
            locale: locale.into(),
            prefix: String::new(),
        }
    }

    /// The context translation units are looked up in.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The locale this translator resolves for.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The prefix prepended to string paths.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Replaces the prefix prepended to string paths.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// Returns this translator with another prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.set_prefix(prefix);
        self
    }

    /// Finds the raw value at `path`, without substitution.
    ///
    /// The unit named by the lead segment is looked up in this translator's
    /// locale, then in the default locale. Remaining segments index into
    /// objects by key and into arrays by position.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let full_path = format!("{}.{}", self.prefix, path);
        let segments = split_path(&full_path);
        let (unit, nested) = segments.split_first()?;

        let entry = self
            .translations
            .lookup(unit, &self.context, &self.locale)?;
        walk(entry.payload(), nested).cloned()
    }

    /// Translates `path`, or returns `default` when nothing is found.
    ///
    /// A string result has its `${name}` tokens replaced from `args`; any
    /// other value is returned as-is.
    pub fn translate(
        &self,
        path: impl Into<TranslationPath>,
        args: &[(&str, Value)],
        default: Value,
    ) -> Value {
        match path.into() {
            TranslationPath::Inline(mut values) => values.remove(&self.locale).unwrap_or(default),
            TranslationPath::Key(path) => match self.resolve(&path) {
                Some(Value::String(template)) => Value::String(substitute(&template, args)),
                Some(value) => value,
                None => {
                    log::trace!(
                        "No translation for '{path}' in '{}' ({}).",
                        self.context,
                        self.locale
                    );
                    default
                }
            },
        }
    }

    /// Like [`translate`](Self::translate), for a path that arrives as data.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::InvalidPathFormat`] if `path` is neither a
    /// string nor an object of per-locale values.
    pub fn translate_value(
        &self,
        path: Value,
        args: &[(&str, Value)],
        default: Value,
    ) -> Result<Value, TranslateError> {
        let path = TranslationPath::try_from(path)?;
        Ok(self.translate(path, args, default))
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("context", &self.context)
            .field("locale", &self.locale)
            .field("prefix", &self.prefix)
            .finish()
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn walk<'v>(value: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| match current {
            Value::Object(fields) => fields.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Replaces the first `${key}` token of each argument in `template`.
///
/// String arguments are inserted as their text, anything else as compact
/// JSON. Later occurrences of the same token are left untouched.
pub fn substitute(template: &str, args: &[(&str, Value)]) -> String {
    args.iter().fold(template.to_string(), |text, (key, value)| {
        let token = format!("${{{key}}}");
        match value {
            Value::String(text_arg) => text.replacen(&token, text_arg, 1),
            other => text.replacen(&token, &other.to_string(), 1),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::LocaleSettings;
    use serde_json::{json, Map};

    fn units(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(units) => units,
            other => panic!("expected an object, got {other}"),
        }
    }

    /// `en`/`ru` with `en` as default; only English has the `greet` unit.
    fn translations() -> TranslationRegistry {
        let mut settings = LocaleSettings::new(["en", "ru"]);
        settings.set_default_locale("en").unwrap();
        let translations = TranslationRegistry::with_locales("test.translations", settings);

        translations.set_translation_for_locale(
            "en",
            units(json!({
                "greet": {
                    "hello": "Hello ${name}!",
                    "farewell": "Bye ${name}, bye ${name}."
                },
                "menu": {
                    "items": [{ "label": "Open" }, { "label": "Save" }],
                    "count": 2,
                    "visible": true
                }
            })),
            "root",
        );
        translations.set_translation_for_locale(
            "ru",
            units(json!({ "menu": { "items": [{ "label": "Открыть" }] } })),
            "root",
        );
        translations
    }

    #[test]
    fn test_falls_back_to_default_locale_and_substitutes() {
        let translator = translations().get_translator("root", "ru").with_prefix("greet");

        let value = translator.translate("hello", &[("name", json!("World"))], json!(null));
        assert_eq!(value, json!("Hello World!"));
    }

    #[test]
    fn test_missing_path_returns_default() {
        let translator = translations().get_translator("root", "ru").with_prefix("greet");
        assert_eq!(
            translator.translate("missing.path", &[], json!("N/A")),
            json!("N/A")
        );

        let unprefixed = translations().get_translator("root", "ru");
        assert_eq!(
            unprefixed.translate("greet.hello.deeper", &[], json!("N/A")),
            json!("N/A")
        );
        assert_eq!(unprefixed.translate("", &[], json!("N/A")), json!("N/A"));
    }

    #[test]
    fn test_requested_locale_wins_over_default() {
        let translator = translations().get_translator("root", "ru");
        assert_eq!(
            translator.translate("menu.items[0].label", &[], json!(null)),
            json!("Открыть")
        );
        // The whole unit comes from one locale: `ru` has no second item.
        assert_eq!(
            translator.translate("menu.items[1].label", &[], json!("N/A")),
            json!("N/A")
        );
    }

    #[test]
    fn test_bracket_and_dot_segments_are_equivalent() {
        let translator = translations().get_translator("root", "en");
        assert_eq!(
            translator.translate("menu.items[1].label", &[], json!(null)),
            json!("Save")
        );
        assert_eq!(
            translator.translate("menu[items].1.label", &[], json!(null)),
            json!("Save")
        );
        assert_eq!(
            translator.translate("menu..items[x]", &[], json!("N/A")),
            json!("N/A")
        );
    }

    #[test]
    fn test_non_string_values_pass_through() {
        let translator = translations().get_translator("root", "en").with_prefix("menu");
        assert_eq!(
            translator.translate("count", &[("count", json!(5))], json!(null)),
            json!(2)
        );
        assert_eq!(translator.translate("visible", &[], json!(null)), json!(true));
        assert_eq!(
            translator.translate("items[0]", &[], json!(null)),
            json!({ "label": "Open" })
        );
    }

    #[test]
    fn test_only_first_token_occurrence_is_substituted() {
        let translator = translations().get_translator("root", "en");
        assert_eq!(
            translator.translate("greet.farewell", &[("name", json!("Ann"))], json!(null)),
            json!("Bye Ann, bye ${name}.")
        );
    }

    #[test]
    fn test_prefix_can_be_changed() {
        let mut translator = translations().get_translator("root", "en");
        assert_eq!(translator.prefix(), "");

        translator.set_prefix("menu.items");
        assert_eq!(translator.translate("[0].label", &[], json!(null)), json!("Open"));
        translator.set_prefix("greet.");
        assert_eq!(
            translator.translate("hello", &[("name", json!("Bob"))], json!(null)),
            json!("Hello Bob!")
        );
    }

    #[test]
    fn test_inline_paths_pick_the_translator_locale() {
        let translator = translations().get_translator("root", "ru");
        let inline: HashMap<String, Value> = [
            ("en".to_string(), json!("Yes")),
            ("ru".to_string(), json!("Да")),
        ]
        .into_iter()
        .collect();

        assert_eq!(translator.translate(inline.clone(), &[], json!(null)), json!("Да"));

        let english_only: HashMap<String, Value> =
            [("en".to_string(), json!("Yes"))].into_iter().collect();
        assert_eq!(translator.translate(english_only, &[], json!("?")), json!("?"));
    }

    #[test]
    fn test_dynamic_paths() {
        let translator = translations().get_translator("root", "en");

        let value = translator
            .translate_value(json!("greet.hello"), &[("name", json!("Eve"))], json!(null))
            .unwrap();
        assert_eq!(value, json!("Hello Eve!"));

        let value = translator
            .translate_value(json!({ "en": "Inline" }), &[], json!(null))
            .unwrap();
        assert_eq!(value, json!("Inline"));

        let err = translator
            .translate_value(json!(42), &[], json!(null))
            .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidPathFormat { found: "a number" }));
    }

    #[test]
    fn test_substitute_renders_structured_arguments() {
        let rendered = substitute(
            "${user} has ${count} items: ${list} (${missing})",
            &[
                ("user", json!("Kim")),
                ("count", json!(3)),
                ("list", json!(["a", "b"])),
                ("flag", json!(false)),
            ],
        );
        assert_eq!(rendered, r#"Kim has 3 items: ["a","b"] (${missing})"#);
    }

    #[test]
    fn test_other_contexts_are_not_visible() {
        let translator = translations().get_translator("settings", "en");
        assert_eq!(
            translator.translate("greet.hello", &[], json!("N/A")),
            json!("N/A")
        );
    }
}
