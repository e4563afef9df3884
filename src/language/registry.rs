//! Language registry for selecting plugins by id or by path

use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use ugen_language::paths;
use ugen_language::{
    FileClass, LanguageError, LanguageFactory, LanguageMetadata, LanguageResult,
    LanguageSettings, LanguageSupport,
};

use super::go::GoFactory;
use super::java::JavaFactory;
use super::javascript::JavaScriptFactory;
use super::python::PythonFactory;
use super::rust::RustFactory;

/// Registry of language factories and configured plugins
///
/// Plugins are kept in registration order, which is also the order
/// [`LanguageRegistry::detect`] tries them in.
#[derive(Default, Clone)]
pub struct LanguageRegistry {
    /// Registered factories
    factories: Vec<Box<dyn LanguageFactory>>,

    /// Configured plugin instances
    languages: Vec<(String, Box<dyn LanguageSupport>)>,
}

impl LanguageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in plugin, configured from `settings`
    pub fn with_builtins(settings: &BTreeMap<String, LanguageSettings>) -> LanguageResult<Self> {
        let mut registry = Self::new();
        registry.register_factory(Box::new(PythonFactory));
        registry.register_factory(Box::new(JavaScriptFactory::javascript()));
        registry.register_factory(Box::new(JavaScriptFactory::typescript()));
        registry.register_factory(Box::new(GoFactory));
        registry.register_factory(Box::new(JavaFactory));
        registry.register_factory(Box::new(RustFactory));

        let defaults = LanguageSettings::default();
        let ids: Vec<String> = registry
            .factories
            .iter()
            .map(|f| f.language_id().to_string())
            .collect();
        for id in ids {
            let language_settings = settings.get(&id).unwrap_or(&defaults);
            registry.create_language(&id, language_settings)?;
        }

        for id in settings.keys() {
            if registry.get(id).is_none() {
                return Err(LanguageError::UnsupportedLanguage(id.clone()));
            }
        }

        Ok(registry)
    }

    /// Register a factory, replacing one with the same id
    pub fn register_factory(&mut self, factory: Box<dyn LanguageFactory>) {
        let id = factory.language_id().to_string();
        match self.factories.iter().position(|f| f.language_id() == id) {
            Some(index) => self.factories[index] = factory,
            None => self.factories.push(factory),
        }
    }

    /// Build a plugin from its factory and register the instance
    pub fn create_language(
        &mut self,
        id: &str,
        settings: &LanguageSettings,
    ) -> LanguageResult<&dyn LanguageSupport> {
        let factory = self
            .factories
            .iter()
            .find(|f| f.language_id() == id)
            .ok_or_else(|| LanguageError::UnsupportedLanguage(id.to_string()))?;
        let language = factory.create(settings)?;
        debug!(
            "Configured language {} with framework {}",
            id,
            language.test_framework()
        );

        let index = match self.languages.iter().position(|(existing, _)| existing == id) {
            Some(index) => {
                self.languages[index].1 = language;
                index
            }
            None => {
                self.languages.push((id.to_string(), language));
                self.languages.len() - 1
            }
        };
        Ok(self.languages[index].1.as_ref())
    }

    /// Plugin by id
    pub fn get(&self, id: &str) -> Option<&dyn LanguageSupport> {
        self.languages
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, language)| language.as_ref())
    }

    /// Plugin by id, failing for unknown ids
    pub fn require(&self, id: &str) -> LanguageResult<&dyn LanguageSupport> {
        self.get(id)
            .ok_or_else(|| LanguageError::UnsupportedLanguage(id.to_string()))
    }

    /// Metadata of every configured plugin
    pub fn languages(&self) -> Vec<LanguageMetadata> {
        self.languages
            .iter()
            .map(|(_, language)| language.metadata())
            .collect()
    }

    /// Plugin whose source or test rule matches the path
    pub fn detect(&self, path: &Path) -> LanguageResult<&dyn LanguageSupport> {
        self.languages
            .iter()
            .map(|(_, language)| language.as_ref())
            .find(|language| language.is_source_file(path) || language.is_test_file(path))
            .ok_or_else(|| {
                LanguageError::UnsupportedLanguage(
                    paths::extension_of(path).unwrap_or_else(|| paths::file_name(path)),
                )
            })
    }

    /// Plugin named by `id`, or the one detected from the path
    pub fn resolve(&self, id: Option<&str>, path: &Path) -> LanguageResult<&dyn LanguageSupport> {
        match id {
            Some(id) => self.require(id),
            None => self.detect(path),
        }
    }

    /// Classify a path against every configured plugin
    pub fn classify(&self, path: &Path) -> FileClass {
        for (id, language) in &self.languages {
            if language.is_test_file(path) {
                return FileClass::Test(id.clone());
            }
            if language.is_source_file(path) {
                return FileClass::Source(id.clone());
            }
        }
        FileClass::Unknown
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.languages.iter().map(|(id, _)| id.as_str()).collect();
        f.debug_struct("LanguageRegistry")
            .field("languages", &ids)
            .finish()
    }
}
