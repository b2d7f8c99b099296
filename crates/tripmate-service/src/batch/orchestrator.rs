//! Bounded-concurrency all-pairs scoring.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info};

use tripmate_config::{BatchConfig, CacheConfig};
use tripmate_core::{validate_ids, CompatibilityScore, Participant, ParticipantId, Result, TripmateError};
use tripmate_scoring::{CompatibilityMatrix, TraitScorer};

use super::{pair_count, BatchOptions, BatchPhase, BatchProgress, BatchResult, BatchStrategy, ProgressCallback};
use crate::cache::{CacheKey, ResultCache};
use crate::provider::{ParticipantProvider, ProviderError};

type Scored = Vec<((usize, usize), CompatibilityScore)>;

/// Rearranges a cached result to follow `ids`.
///
/// Returns `None` when the cached entry does not cover exactly `ids`.
fn in_request_order(cached: BatchResult, ids: &[ParticipantId]) -> Option<BatchResult> {
    if cached.participant_ids.len() != ids.len() || cached.scores.len() != pair_count(ids.len()) {
        return None;
    }
    let index: HashMap<&ParticipantId, usize> =
        ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

    let mut ordered = Vec::with_capacity(cached.scores.len());
    for mut score in cached.scores {
        let i = *index.get(&score.participant_a)?;
        let j = *index.get(&score.participant_b)?;
        if i > j {
            std::mem::swap(&mut score.participant_a, &mut score.participant_b);
        }
        ordered.push(((i.min(j), i.max(j)), score));
    }
    ordered.sort_by_key(|(pair, _)| *pair);
    let scores: Vec<CompatibilityScore> = ordered.into_iter().map(|(_, score)| score).collect();

    let matrix = cached
        .matrix
        .is_some()
        .then(|| CompatibilityMatrix::from_scores(ids.to_vec(), &scores));
    Some(BatchResult {
        participant_ids: ids.to_vec(),
        scores,
        matrix,
        from_cache: true,
        ..cached
    })
}

/// Computes every pairwise score of a participant set.
///
/// Profiles are fetched from a [`ParticipantProvider`] with bounded
/// concurrency, pairs are scored on the tokio runtime, and complete results
/// go through the [`ResultCache`].
#[derive(Clone)]
pub struct BatchOrchestrator {
    provider: Arc<dyn ParticipantProvider>,
    scorer: Arc<TraitScorer>,
    cache: Arc<ResultCache>,
    config: BatchConfig,
    cache_config: CacheConfig,
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl BatchOrchestrator {
    pub fn new(
        provider: Arc<dyn ParticipantProvider>,
        scorer: Arc<TraitScorer>,
        cache: Arc<ResultCache>,
        config: BatchConfig,
        cache_config: CacheConfig,
    ) -> Self {
        Self {
            provider,
            scorer,
            cache,
            config,
            cache_config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn scorer(&self) -> &Arc<TraitScorer> {
        &self.scorer
    }

    /// Cache key of a batch over `ids` with `options`.
    pub fn cache_key(ids: &[ParticipantId], options: &BatchOptions) -> CacheKey {
        CacheKey::for_participants(ids, &options.cache_config())
    }

    /// Scores all n(n−1)/2 pairs of `ids`.
    ///
    /// A cached result for the same participant set and options is returned
    /// with `from_cache` set, reordered to the order of `ids`.
    ///
    /// # Errors
    ///
    /// [`TripmateError::Validation`] for an invalid id list or an unknown
    /// participant, [`TripmateError::Computation`] if the provider fails or
    /// a pair task dies.
    pub async fn compute_all_pairs(
        &self,
        ids: &[ParticipantId],
        options: &BatchOptions,
        progress: Option<ProgressCallback>,
    ) -> Result<BatchResult> {
        let n = validate_ids(ids)?;
        let key = Self::cache_key(ids, options);
        if let Some(cached) = self
            .cache
            .get::<BatchResult>(&key)
            .and_then(|cached| in_request_order(cached, ids))
        {
            debug!(event = "batch_cache_hit", participants = n, key = %key);
            return Ok(cached);
        }

        let start = Instant::now();
        let strategy = BatchStrategy::select(n, &self.config);
        info!(
            event = "batch_start",
            participants = n,
            pairs = pair_count(n),
            strategy = %strategy,
        );

        let participants = Arc::new(self.fetch_participants(ids).await?);
        let ledger = match strategy {
            BatchStrategy::Direct => self.run_direct(&participants).await?,
            BatchStrategy::Chunked { chunks } => {
                self.run_chunked(&participants, chunks, progress.as_ref())
                    .await?
            }
        };

        let scores: Vec<CompatibilityScore> = ledger.into_values().collect();
        if scores.len() != pair_count(n) {
            return Err(TripmateError::computation(format!(
                "batch produced {} of {} pair scores",
                scores.len(),
                pair_count(n)
            )));
        }
        let matrix = options
            .include_matrix
            .then(|| CompatibilityMatrix::from_scores(ids.to_vec(), &scores));
        let duration_ms = start.elapsed().as_millis() as u64;
        let result = BatchResult {
            participant_ids: ids.to_vec(),
            pair_count: scores.len(),
            scores,
            matrix,
            strategy,
            from_cache: false,
            duration_ms,
        };

        if options.cache_results {
            self.cache
                .set(&key, &result, self.cache_config.ttl_for_batch(n));
        }
        info!(
            event = "batch_end",
            participants = n,
            pairs = result.pair_count,
            duration_ms,
        );
        Ok(result)
    }

    /// Fetches and normalizes the profiles of `ids`, preserving order.
    ///
    /// # Errors
    ///
    /// [`TripmateError::Validation`] naming the first unknown id,
    /// [`TripmateError::Computation`] if the provider fails.
    pub async fn fetch_participants(&self, ids: &[ParticipantId]) -> Result<Vec<Participant>> {
        let permits = Arc::new(Semaphore::new(self.config.fetch_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for (index, id) in ids.iter().cloned().enumerate() {
            let provider = Arc::clone(&self.provider);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let raw = provider.get_participant(&id).await;
                (index, id, raw)
            });
        }

        let mut slots: Vec<Option<Participant>> = vec![None; ids.len()];
        let mut missing: Vec<(usize, ParticipantId)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (index, id, raw) = joined.map_err(task_failure)?;
            match raw {
                Ok(Some(raw)) => slots[index] = Some(Participant::from_raw(id, &raw)),
                Ok(None) => missing.push((index, id)),
                Err(e) => return Err(provider_failure(&id, e)),
            }
        }
        if let Some((_, id)) = missing.into_iter().min_by_key(|(index, _)| *index) {
            return Err(TripmateError::validation(format!(
                "participant '{id}' not found"
            )));
        }
        Ok(slots.into_iter().flatten().collect())
    }

    async fn run_direct(&self, participants: &Arc<Vec<Participant>>) -> Result<BTreeMap<(usize, usize), CompatibilityScore>> {
        let n = participants.len();
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let participants = Arc::clone(participants);
                let scorer = Arc::clone(&self.scorer);
                let permits = Arc::clone(&permits);
                tasks.spawn(async move {
                    let _permit = permits.acquire_owned().await;
                    ((i, j), scorer.score(&participants[i], &participants[j]))
                });
            }
        }

        let mut ledger = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (pair, score) = joined.map_err(task_failure)?;
            ledger.entry(pair).or_insert(score);
        }
        Ok(ledger)
    }

    async fn run_chunked(
        &self,
        participants: &Arc<Vec<Participant>>,
        chunks: usize,
        progress: Option<&ProgressCallback>,
    ) -> Result<BTreeMap<(usize, usize), CompatibilityScore>> {
        let ranges = chunk_ranges(participants.len(), chunks);
        let intra: Vec<Block> = ranges.iter().map(|r| Block::Intra(r.clone())).collect();
        let mut inter = Vec::new();
        for (x, left) in ranges.iter().enumerate() {
            for right in &ranges[x + 1..] {
                inter.push(Block::Inter(left.clone(), right.clone()));
            }
        }

        let total = intra.len() + inter.len();
        let mut tracker = ProgressTracker {
            processed: 0,
            total,
            callback: progress,
        };
        let mut ledger = BTreeMap::new();
        self.run_blocks(participants, intra, BatchPhase::Intra, &mut ledger, &mut tracker)
            .await?;
        self.run_blocks(participants, inter, BatchPhase::Inter, &mut ledger, &mut tracker)
            .await?;
        Ok(ledger)
    }

    async fn run_blocks(
        &self,
        participants: &Arc<Vec<Participant>>,
        blocks: Vec<Block>,
        phase: BatchPhase,
        ledger: &mut BTreeMap<(usize, usize), CompatibilityScore>,
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<()> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for block in blocks {
            let participants = Arc::clone(participants);
            let scorer = Arc::clone(&self.scorer);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                block.score(&scorer, &participants)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let scored = joined.map_err(task_failure)?;
            for (pair, score) in scored {
                // Each unordered pair is recorded once.
                ledger.entry(pair).or_insert(score);
            }
            tracker.advance(phase);
        }
        Ok(())
    }
}

/// A unit of chunked work.
#[derive(Debug, Clone)]
enum Block {
    /// Pairs within one chunk.
    Intra(Range<usize>),
    /// Pairs across two chunks.
    Inter(Range<usize>, Range<usize>),
}

impl Block {
    fn score(&self, scorer: &TraitScorer, participants: &[Participant]) -> Scored {
        let mut scored = Vec::new();
        match self {
            Block::Intra(range) => {
                for i in range.clone() {
                    for j in (i + 1)..range.end {
                        scored.push(((i, j), scorer.score(&participants[i], &participants[j])));
                    }
                }
            }
            Block::Inter(left, right) => {
                for i in left.clone() {
                    for j in right.clone() {
                        scored.push(((i, j), scorer.score(&participants[i], &participants[j])));
                    }
                }
            }
        }
        scored
    }
}

struct ProgressTracker<'a> {
    processed: usize,
    total: usize,
    callback: Option<&'a ProgressCallback>,
}

impl ProgressTracker<'_> {
    fn advance(&mut self, phase: BatchPhase) {
        self.processed += 1;
        let update = BatchProgress {
            processed_chunks: self.processed,
            total_chunks: self.total,
            percentage: self.processed as f64 * 100.0 / self.total.max(1) as f64,
            phase,
        };
        debug!(
            event = "batch_progress",
            processed = update.processed_chunks,
            total = update.total_chunks,
            phase = ?phase,
        );
        if let Some(callback) = self.callback {
            callback(update);
        }
    }
}

/// Splits `0..n` into at most `chunks` contiguous, non-empty ranges whose
/// sizes differ by at most one.
pub(crate) fn chunk_ranges(n: usize, chunks: usize) -> Vec<Range<usize>> {
    let k = chunks.clamp(1, n.max(1));
    let base = n / k;
    let extra = n % k;
    let mut ranges = Vec::with_capacity(k);
    let mut start = 0;
    for c in 0..k {
        let len = base + usize::from(c < extra);
        if len == 0 {
            continue;
        }
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

fn task_failure(e: JoinError) -> TripmateError {
    TripmateError::computation(format!("batch task failed: {e}"))
}

fn provider_failure(id: &ParticipantId, e: ProviderError) -> TripmateError {
    TripmateError::computation(format!("failed to fetch participant '{id}': {e}"))
}
