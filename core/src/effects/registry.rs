//! Explicit effect registry.
//!
//! Built once at startup and passed to whatever needs to enumerate or look
//! up effects.

use std::collections::BTreeMap;

use super::{
    BoxBlur, Effect, EffectEnv, EffectError, EffectInfo, EffectInstance, EffectRuntime,
    GradientMap, SpectralFilter,
};
use crate::buffer::ImageBuffer;
use crate::config::RuntimeConfig;
use crate::params::ParameterSet;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Effect '{0}' is already registered")]
    DuplicateId(String),
    #[error("Unknown effect '{0}'")]
    UnknownId(String),
}

/// Effects keyed by id.
#[derive(Default)]
pub struct EffectRegistry {
    effects: BTreeMap<&'static str, Box<dyn EffectRuntime>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in effect.
    ///
    /// # Example
    /// ```
    /// use liveeffect::config::RuntimeConfig;
    /// use liveeffect::effects::EffectRegistry;
    ///
    /// let registry = EffectRegistry::builtin(&RuntimeConfig::default());
    /// assert!(registry.get("box-blur").is_ok());
    /// ```
    pub fn builtin(config: &RuntimeConfig) -> Self {
        let mut registry = Self::new();
        let builtins: [Box<dyn EffectRuntime>; 3] = [
            Box::new(EffectInstance::new(GradientMap::new(), config.clone())),
            Box::new(EffectInstance::new(BoxBlur::new(), config.clone())),
            Box::new(EffectInstance::new(SpectralFilter::new(), config.clone())),
        ];
        for effect in builtins {
            // Built-in ids are distinct.
            let _ = registry.register(effect);
        }
        registry
    }

    pub fn register(&mut self, effect: Box<dyn EffectRuntime>) -> Result<(), RegistryError> {
        let id = effect.info().id;
        if self.effects.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }
        self.effects.insert(id, effect);
        Ok(())
    }

    /// Wrap `effect` in an [`EffectInstance`] and register it.
    pub fn register_effect<E>(
        &mut self,
        effect: E,
        config: RuntimeConfig,
    ) -> Result<(), RegistryError>
    where
        E: Effect + 'static,
    {
        self.register(Box::new(EffectInstance::new(effect, config)))
    }

    pub fn get(&self, id: &str) -> Result<&dyn EffectRuntime, RegistryError> {
        self.effects
            .get(id)
            .map(|effect| effect.as_ref())
            .ok_or_else(|| RegistryError::UnknownId(id.to_string()))
    }

    /// Registered effects sorted by title.
    pub fn list(&self) -> Vec<EffectInfo> {
        let mut infos: Vec<EffectInfo> = self.effects.values().map(|e| e.info()).collect();
        infos.sort_by(|a, b| a.title.cmp(b.title).then_with(|| a.id.cmp(b.id)));
        infos
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Look up `id` and invoke it.
    pub fn invoke(
        &self,
        id: &str,
        params: &ParameterSet,
        input: &ImageBuffer,
        env: &EffectEnv,
    ) -> Result<ImageBuffer, EffectError> {
        self.get(id)?.invoke(params, input, env)
    }

    /// Initialize every registered effect.
    ///
    /// A failing effect does not stop the others; its error is logged and
    /// returned alongside its id.
    pub fn initialize_all(&self) -> Vec<(&'static str, EffectError)> {
        let mut failures = Vec::new();
        for (id, effect) in &self.effects {
            match effect.initialize() {
                Ok(()) => log::info!("Initialized effect '{}'", id),
                Err(e) => {
                    log::error!("Failed to initialize effect '{}': {}", id, e);
                    failures.push((*id, e));
                }
            }
        }
        log::info!(
            "{} of {} effects initialized",
            self.effects.len() - failures.len(),
            self.effects.len()
        );
        failures
    }
}
