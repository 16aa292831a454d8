//! Test module capability and registry
//!
//! Every module kind implements the same `TestModule` contract. The
//! registry holds at most one capability per `ModuleKind`, so the set of
//! runnable modules stays closed.

mod probe;

pub use probe::{ProbeModule, ProbeOutcome};

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::SuiteConfig;
use crate::error::SuiteError;
use crate::models::{ModuleKind, ModuleResult};

/// Uniform contract implemented by every test module
#[async_trait]
pub trait TestModule: Send + Sync {
    /// Module kind this capability implements
    fn kind(&self) -> ModuleKind;

    /// One-time setup, run right before `execute`
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Run the module's tests against the system under test
    async fn execute(&self) -> Result<ModuleResult>;
}

/// Module capabilities keyed by kind
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<ModuleKind, Arc<dyn TestModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module, replacing any previous capability for its kind
    pub fn register(&mut self, module: impl TestModule + 'static) -> &mut Self {
        self.register_arc(Arc::new(module))
    }

    pub fn register_arc(&mut self, module: Arc<dyn TestModule>) -> &mut Self {
        self.modules.insert(module.kind(), module);
        self
    }

    pub fn with(mut self, module: impl TestModule + 'static) -> Self {
        self.register(module);
        self
    }

    pub fn get(&self, kind: ModuleKind) -> Option<Arc<dyn TestModule>> {
        self.modules.get(&kind).cloned()
    }

    pub fn contains(&self, kind: ModuleKind) -> bool {
        self.modules.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolve capabilities for the given kinds, in order
    pub fn resolve(
        &self,
        kinds: &[ModuleKind],
    ) -> crate::error::Result<Vec<(ModuleKind, Arc<dyn TestModule>)>> {
        kinds
            .iter()
            .map(|kind| {
                self.get(*kind).map(|module| (*kind, module)).ok_or_else(|| {
                    SuiteError::configuration(format!("No test module registered for {kind}"))
                })
            })
            .collect()
    }

    /// Probe-based modules for every enabled module kind
    pub fn from_config(config: &SuiteConfig) -> crate::error::Result<Self> {
        let base_url = config.target.base_url.as_deref().ok_or_else(|| {
            SuiteError::configuration("No target base URL configured (use --base-url)")
        })?;

        let mut registry = Self::new();
        for kind in config.enabled_kinds()? {
            let module = ProbeModule::new(
                kind,
                base_url,
                config.target.request_timeout_secs,
                config.probes_for(kind),
            )
            .map_err(|e| SuiteError::configuration(format!("{e:#}")))?
            .with_retries(config.execution.retry_attempts);
            registry.register(module);
        }
        Ok(registry)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.modules.keys().collect();
        kinds.sort();
        f.debug_struct("ModuleRegistry")
            .field("modules", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticModule(ModuleKind);

    #[async_trait]
    impl TestModule for StaticModule {
        fn kind(&self) -> ModuleKind {
            self.0
        }

        async fn execute(&self) -> Result<ModuleResult> {
            Ok(ModuleResult::from_counts(1, 0, 0))
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = ModuleRegistry::new()
            .with(StaticModule(ModuleKind::Chatbot))
            .with(StaticModule(ModuleKind::Security));

        assert_eq!(registry.len(), 2);
        let resolved = registry
            .resolve(&[ModuleKind::Security, ModuleKind::Chatbot])
            .unwrap();
        assert_eq!(resolved[0].0, ModuleKind::Security);
        assert_eq!(resolved[1].0, ModuleKind::Chatbot);
    }

    #[test]
    fn test_resolve_missing_is_configuration_error() {
        let registry = ModuleRegistry::new().with(StaticModule(ModuleKind::Chatbot));
        let err = registry
            .resolve(&[ModuleKind::Chatbot, ModuleKind::UiUx])
            .err()
            .unwrap();
        assert!(matches!(err, SuiteError::Configuration(_)));
        assert!(err.to_string().contains("uiUx"));
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = ModuleRegistry::new();
        registry
            .register(StaticModule(ModuleKind::Chatbot))
            .register(StaticModule(ModuleKind::Chatbot));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = SuiteConfig::example().with_modules(&[
            ModuleKind::Authentication,
            ModuleKind::Performance,
        ]);
        let registry = ModuleRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ModuleKind::Performance));
        assert!(!registry.contains(ModuleKind::Chatbot));

        let no_target = SuiteConfig::default();
        assert!(ModuleRegistry::from_config(&no_target).is_err());
    }

    #[tokio::test]
    async fn test_default_initialize_is_noop() {
        let module = StaticModule(ModuleKind::Integration);
        assert!(module.initialize().await.is_ok());
        assert!(module.execute().await.unwrap().success);
    }
}
