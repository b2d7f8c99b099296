//! Builder for [`Engine`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::info;

use tripmate_config::EngineConfig;
use tripmate_core::{ParticipantId, RawProfile, Result, TripmateError};
use tripmate_partition::Partitioner;
use tripmate_scoring::{ConflictDetector, DimensionWeights, TraitScorer};
use tripmate_service::{
    BatchOrchestrator, CacheBackend, EngineJobExecutor, InMemoryParticipantProvider, JobQueue,
    ParticipantProvider, ResultCache, ResultStore,
};

use crate::engine::Engine;

/// Wires an [`Engine`] from configuration and collaborators.
///
/// Every collaborator is optional: profiles default to an empty in-memory
/// provider, results are not persisted and the cache is an in-process
/// `moka` cache sized by [`tripmate_config::CacheConfig`].
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    weights: Option<DimensionWeights>,
    provider: Option<Arc<dyn ParticipantProvider>>,
    store: Option<Arc<dyn ResultStore>>,
    cache_backend: Option<Arc<dyn CacheBackend>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the default per-dimension weights.
    pub fn with_weights(mut self, weights: DimensionWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ParticipantProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Serves profiles from memory.
    pub fn with_participants<I>(self, participants: I) -> Self
    where
        I: IntoIterator<Item = (ParticipantId, RawProfile)>,
    {
        let provider: InMemoryParticipantProvider = participants.into_iter().collect();
        self.with_provider(Arc::new(provider))
    }

    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    /// Validates the configuration and starts the job queue workers.
    ///
    /// # Errors
    ///
    /// [`TripmateError::Config`] for an invalid configuration or when
    /// called outside a tokio runtime.
    pub fn build(self) -> Result<Engine> {
        #[cfg(feature = "console")]
        tripmate_console::init();

        self.config
            .validate()
            .map_err(|e| TripmateError::Config(e.to_string()))?;
        if Handle::try_current().is_err() {
            return Err(TripmateError::Config(
                "the engine must be built inside a tokio runtime".to_string(),
            ));
        }

        let config = self.config;
        let mut scorer = TraitScorer::new(&config.scoring);
        if let Some(weights) = self.weights {
            scorer = scorer.with_weights(weights);
        }
        let detector = ConflictDetector::new(&config.conflict);
        let partitioner = Arc::new(Partitioner::new(
            config.partition.clone(),
            scorer.clone(),
            detector.clone(),
        ));

        let cache = match (config.cache.enabled, self.cache_backend) {
            (false, _) => ResultCache::disabled(),
            (true, Some(backend)) => ResultCache::new(backend),
            (true, None) => ResultCache::from_config(&config.cache),
        };
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(InMemoryParticipantProvider::new()));

        let scorer = Arc::new(scorer);
        let detector = Arc::new(detector);
        let orchestrator = BatchOrchestrator::new(
            provider,
            Arc::clone(&scorer),
            Arc::new(cache),
            config.batch.clone(),
            config.cache.clone(),
        );
        let executor = EngineJobExecutor::new(
            orchestrator.clone(),
            Arc::clone(&partitioner),
            Arc::clone(&detector),
        );
        let queue = JobQueue::start(config.queue.clone(), Arc::new(executor), self.store);

        info!(
            event = "engine_start",
            workers = config.queue.worker_pool_size,
            cache_enabled = config.cache.enabled,
        );
        Ok(Engine::from_parts(
            config,
            scorer,
            detector,
            partitioner,
            orchestrator,
            queue,
        ))
    }
}
