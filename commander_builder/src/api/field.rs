use std::collections::BTreeMap;

use crate::api::capture::*;
use crate::matcher::split_words;
use crate::model::Target;
use crate::parser::{BoxError, Error};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A required parameter that takes a single value.
pub struct Scalar<K: Kind> {
    key: String,
    kind: K,
    target: Target<K::Output>,
    pub(crate) default: Option<K::Output>,
    set: bool,
}

impl<K: Kind> Scalar<K> {
    pub(crate) fn new(key: String, kind: K, target: &Target<K::Output>) -> Self {
        Self {
            key,
            kind,
            target: target.clone(),
            default: None,
            set: false,
        }
    }
}

impl<K: Kind> Value for Scalar<K> {
    fn key(&self) -> &str {
        &self.key
    }

    fn set(&mut self, raw: &str) -> Result<(), Error> {
        let value = self.kind.convert(&self.key, raw)?;
        self.target.set(value);
        self.set = true;
        Ok(())
    }

    fn resolve(&mut self, env: Option<&str>) -> Result<(), Error> {
        if self.set {
            return Ok(());
        }

        if let Some(value) = lookup_env(env) {
            trace_source(&self.key, "environment");
            return self.set(&value);
        }

        if let Some(default) = &self.default {
            self.kind.admit(&self.key, default)?;
            trace_source(&self.key, "default");
            self.target.set(default.clone());
            return Ok(());
        }

        Err(Error::MissingInput {
            key: self.key.clone(),
            env: env.map(String::from),
        })
    }

    fn render(&self) -> String {
        if self.set {
            self.kind.render(&self.target.borrow())
        } else {
            self.default_string().unwrap_or_default()
        }
    }

    fn is_optional(&self) -> bool {
        false
    }

    fn is_switch(&self) -> bool {
        self.kind.is_switch()
    }

    fn default_string(&self) -> Option<String> {
        self.default.as_ref().map(|value| self.kind.render(value))
    }

    fn reset(&mut self) {
        self.set = false;
    }
}

/// An optional parameter that maps down to [`Option`], taking a single value.
pub struct Optional<K: Kind> {
    key: String,
    kind: K,
    target: Target<Option<K::Output>>,
    pub(crate) default: Option<K::Output>,
    set: bool,
}

impl<K: Kind> Optional<K> {
    pub(crate) fn new(key: String, kind: K, target: &Target<Option<K::Output>>) -> Self {
        Self {
            key,
            kind,
            target: target.clone(),
            default: None,
            set: false,
        }
    }
}

impl<K: Kind> Value for Optional<K> {
    fn key(&self) -> &str {
        &self.key
    }

    fn set(&mut self, raw: &str) -> Result<(), Error> {
        let value = self.kind.convert(&self.key, raw)?;
        self.target.set(Some(value));
        self.set = true;
        Ok(())
    }

    fn resolve(&mut self, env: Option<&str>) -> Result<(), Error> {
        if self.set {
            return Ok(());
        }

        if let Some(value) = lookup_env(env) {
            trace_source(&self.key, "environment");
            return self.set(&value);
        }

        if let Some(default) = &self.default {
            self.kind.admit(&self.key, default)?;
            trace_source(&self.key, "default");
            self.target.set(Some(default.clone()));
        }

        Ok(())
    }

    fn render(&self) -> String {
        match (&*self.target.borrow(), self.set) {
            (Some(value), true) => self.kind.render(value),
            _ => self.default_string().unwrap_or_default(),
        }
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn is_switch(&self) -> bool {
        self.kind.is_switch()
    }

    fn default_string(&self) -> Option<String> {
        self.default.as_ref().map(|value| self.kind.render(value))
    }

    fn reset(&mut self) {
        self.set = false;
    }
}

/// A parameter that accumulates every value into a list, in order.
///
/// The first value of a parse replaces whatever the list held before.
pub struct Collection {
    key: String,
    target: Target<Vec<String>>,
    pub(crate) default: Option<Vec<String>>,
    optional: bool,
    set: bool,
}

impl Collection {
    pub(crate) fn new(key: String, target: &Target<Vec<String>>, optional: bool) -> Self {
        Self {
            key,
            target: target.clone(),
            default: None,
            optional,
            set: false,
        }
    }
}

impl Value for Collection {
    fn key(&self) -> &str {
        &self.key
    }

    fn set(&mut self, raw: &str) -> Result<(), Error> {
        let mut target = self.target.borrow_mut();

        if !self.set {
            target.clear();
        }

        target.push(raw.to_string());
        self.set = true;
        Ok(())
    }

    fn resolve(&mut self, env: Option<&str>) -> Result<(), Error> {
        if self.set {
            return Ok(());
        }

        if let Some(value) = lookup_env(env) {
            let words = split_words(&value).map_err(|_| Error::TypeMismatch {
                key: self.key.clone(),
                raw: value.clone(),
                expected: "a list of strings",
            })?;
            trace_source(&self.key, "environment");
            self.target.borrow_mut().clear();
            self.set = true;

            for word in words {
                self.set(&word)?;
            }

            return Ok(());
        }

        if let Some(default) = &self.default {
            trace_source(&self.key, "default");
            self.target.set(default.clone());
            return Ok(());
        }

        if self.optional {
            return Ok(());
        }

        Err(Error::MissingInput {
            key: self.key.clone(),
            env: env.map(String::from),
        })
    }

    fn render(&self) -> String {
        if self.set {
            self.target.borrow().join(", ")
        } else {
            self.default_string().unwrap_or_default()
        }
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    fn default_string(&self) -> Option<String> {
        self.default.as_ref().map(|values| values.join(", "))
    }

    fn reset(&mut self) {
        self.set = false;
    }
}

/// A parameter that collects `key:value` pairs into a map.
///
/// Pairs split on the first `:`, and later keys overwrite earlier ones.
/// The first pair of a parse replaces whatever the map held before.
pub struct Mapping {
    key: String,
    target: Target<BTreeMap<String, String>>,
    pub(crate) default: Option<BTreeMap<String, String>>,
    optional: bool,
    set: bool,
}

impl Mapping {
    pub(crate) fn new(
        key: String,
        target: &Target<BTreeMap<String, String>>,
        optional: bool,
    ) -> Self {
        Self {
            key,
            target: target.clone(),
            default: None,
            optional,
            set: false,
        }
    }
}

impl Value for Mapping {
    fn key(&self) -> &str {
        &self.key
    }

    fn set(&mut self, raw: &str) -> Result<(), Error> {
        let (key, value) = raw.split_once(':').ok_or_else(|| Error::MalformedPair {
            key: self.key.clone(),
            raw: raw.to_string(),
        })?;
        let mut target = self.target.borrow_mut();

        if !self.set {
            target.clear();
        }

        target.insert(key.to_string(), value.to_string());
        self.set = true;
        Ok(())
    }

    fn resolve(&mut self, env: Option<&str>) -> Result<(), Error> {
        if self.set {
            return Ok(());
        }

        if let Some(value) = lookup_env(env) {
            let words = split_words(&value).map_err(|_| Error::TypeMismatch {
                key: self.key.clone(),
                raw: value.clone(),
                expected: "a string map",
            })?;
            trace_source(&self.key, "environment");
            self.target.borrow_mut().clear();
            self.set = true;

            for word in words {
                self.set(&word)?;
            }

            return Ok(());
        }

        if let Some(default) = &self.default {
            trace_source(&self.key, "default");
            self.target.set(default.clone());
            return Ok(());
        }

        if self.optional {
            return Ok(());
        }

        Err(Error::MissingInput {
            key: self.key.clone(),
            env: env.map(String::from),
        })
    }

    fn render(&self) -> String {
        if self.set {
            format_pairs(&self.target.borrow())
        } else {
            self.default
                .as_ref()
                .map(format_pairs)
                .unwrap_or_default()
        }
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    fn default_string(&self) -> Option<String> {
        self.default.as_ref().map(|pairs| {
            if pairs.is_empty() {
                "{}".to_string()
            } else {
                format_pairs(pairs)
            }
        })
    }

    fn reset(&mut self) {
        self.set = false;
    }
}

fn format_pairs(pairs: &BTreeMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}:{value}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub(crate) type CallbackFn = Box<dyn FnMut(&str) -> Result<(), BoxError>>;

/// A parameter whose values are handed to a user callback.
pub struct Callback {
    key: String,
    callback: CallbackFn,
    pub(crate) default: Option<String>,
    pub(crate) optional: bool,
    set: bool,
}

impl Callback {
    pub(crate) fn new(key: String, callback: CallbackFn) -> Self {
        Self {
            key,
            callback,
            default: None,
            optional: false,
            set: false,
        }
    }
}

impl Value for Callback {
    fn key(&self) -> &str {
        &self.key
    }

    fn set(&mut self, raw: &str) -> Result<(), Error> {
        (self.callback)(raw).map_err(|source| Error::Custom {
            key: self.key.clone(),
            raw: raw.to_string(),
            source,
        })?;
        self.set = true;
        Ok(())
    }

    fn resolve(&mut self, env: Option<&str>) -> Result<(), Error> {
        if self.set {
            return Ok(());
        }

        if let Some(value) = lookup_env(env) {
            trace_source(&self.key, "environment");
            return self.set(&value);
        }

        if let Some(default) = self.default.clone() {
            trace_source(&self.key, "default");
            return self.set(&default);
        }

        if self.optional {
            return Ok(());
        }

        Err(Error::MissingInput {
            key: self.key.clone(),
            env: env.map(String::from),
        })
    }

    fn render(&self) -> String {
        if self.set {
            String::default()
        } else {
            self.default.clone().unwrap_or_default()
        }
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    fn default_string(&self) -> Option<String> {
        self.default.clone()
    }

    fn reset(&mut self) {
        self.set = false;
    }
}

#[allow(unused_variables)]
fn trace_source(key: &str, source: &str) {
    #[cfg(feature = "tracing_debug")]
    {
        debug!("Resolved '{key}' from {source}.");
    }
}
