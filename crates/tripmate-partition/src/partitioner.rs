//! Group partitioner entry point.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use tripmate_config::{PartitionAlgorithm, PartitionConfig};
use tripmate_core::{validate_participants, Participant, ParticipantId, Result, TripmateError};
use tripmate_scoring::conflict::overall_risk;
use tripmate_scoring::{ConflictDetector, ConflictSummary, Severity, TraitScorer};

use crate::cancel::CancelFlag;
use crate::chain::StrategyChain;
use crate::context::PartitionContext;
use crate::local_search::RefinementStats;
use crate::objective::{group_mean, objective, Clusters};
use crate::strategy::PartitionStrategy;

/// Per-call partition options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionOptions {
    pub target_group_size: usize,
    pub algorithm: PartitionAlgorithm,
    pub avoid_conflicts: bool,
    /// Fixed seed for reproducible results; `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl PartitionOptions {
    /// Options seeded from configured defaults.
    pub fn from_config(config: &PartitionConfig) -> Self {
        Self {
            target_group_size: config.target_group_size,
            algorithm: config.algorithm,
            avoid_conflicts: config.avoid_conflicts,
            seed: config.random_seed,
        }
    }

    pub fn with_target_group_size(mut self, size: usize) -> Self {
        self.target_group_size = size;
        self
    }

    pub fn with_algorithm(mut self, algorithm: PartitionAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_avoid_conflicts(mut self, avoid: bool) -> Self {
        self.avoid_conflicts = avoid;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self::from_config(&PartitionConfig::default())
    }
}

/// One travel group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Member ids in ascending order.
    pub members: Vec<ParticipantId>,
    /// Mean pairwise score; neutral for a singleton.
    pub aggregate_compatibility: f64,
    pub conflict_summary: ConflictSummary,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.binary_search(id).is_ok()
    }
}

/// Result of a partition call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionOutcome {
    pub groups: Vec<Group>,
    /// Strategy that produced the groups.
    pub algorithm_used: PartitionAlgorithm,
    /// True when the requested strategy failed and a fallback was used.
    pub degraded: bool,
    pub objective: f64,
    /// Seed the run used; pass it back to reproduce the result.
    pub seed: u64,
    pub refinement: Option<RefinementStats>,
}

impl PartitionOutcome {
    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Group::len).collect()
    }

    pub fn group_of(&self, id: &ParticipantId) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(id))
    }
}

/// Splits participants into balanced, compatible travel groups.
///
/// Partitioning is CPU-bound and synchronous; async callers should run it
/// on a blocking thread.
#[derive(Debug, Clone)]
pub struct Partitioner {
    config: PartitionConfig,
    scorer: TraitScorer,
    detector: ConflictDetector,
    strategies: Option<Vec<Arc<dyn PartitionStrategy>>>,
}

impl Partitioner {
    pub fn new(config: PartitionConfig, scorer: TraitScorer, detector: ConflictDetector) -> Self {
        Self {
            config,
            scorer,
            detector,
            strategies: None,
        }
    }

    /// Replaces the algorithm-derived strategy chain.
    pub fn with_strategies(mut self, strategies: Vec<Arc<dyn PartitionStrategy>>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    fn chain(&self, algorithm: PartitionAlgorithm) -> StrategyChain {
        match &self.strategies {
            Some(strategies) => StrategyChain::new(strategies.clone()),
            None => StrategyChain::for_algorithm(algorithm, &self.config),
        }
    }

    /// Partitions `participants` according to `options`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid input or a zero target size,
    /// and a computation error when every strategy in the chain failed.
    pub fn partition(
        &self,
        participants: &[Participant],
        options: &PartitionOptions,
    ) -> Result<PartitionOutcome> {
        self.partition_cancellable(participants, options, &CancelFlag::new())
    }

    /// [`Partitioner::partition`] that stops early once `cancel` is set.
    ///
    /// # Errors
    ///
    /// As [`Partitioner::partition`], plus a computation error when
    /// cancelled before a result was produced.
    pub fn partition_cancellable(
        &self,
        participants: &[Participant],
        options: &PartitionOptions,
        cancel: &CancelFlag,
    ) -> Result<PartitionOutcome> {
        let n = validate_participants(participants)?;
        if options.target_group_size == 0 {
            return Err(TripmateError::validation("target group size must be positive"));
        }
        let seed = options.seed.unwrap_or_else(|| rand::rng().random());
        let started = Instant::now();

        info!(
            event = "partition_start",
            participants = n,
            target_group_size = options.target_group_size,
            algorithm = %options.algorithm,
            avoid_conflicts = options.avoid_conflicts,
            seed,
        );

        let ctx = PartitionContext::new(
            participants,
            &self.scorer,
            &self.detector,
            options.target_group_size,
            self.config.penalty_weight(options.avoid_conflicts),
            options.avoid_conflicts,
        )
        .with_cancel(cancel.clone());

        let (clusters, algorithm_used, degraded, refinement) = if ctx.group_count() <= 1 {
            (vec![(0..n).collect::<Vec<usize>>()], options.algorithm, false, None)
        } else {
            let outcome = self.chain(options.algorithm).run(&ctx, seed)?;
            (
                outcome.output.clusters,
                outcome.algorithm,
                outcome.degraded,
                outcome.output.refinement,
            )
        };

        let objective = objective(&ctx, &clusters);
        let groups = self.build_groups(&ctx, participants, clusters);

        info!(
            event = "partition_end",
            groups = groups.len(),
            algorithm_used = %algorithm_used,
            degraded,
            objective,
            elapsed_ms = started.elapsed().as_millis() as u64,
        );

        Ok(PartitionOutcome {
            groups,
            algorithm_used,
            degraded,
            objective,
            seed,
            refinement,
        })
    }

    fn build_groups(
        &self,
        ctx: &PartitionContext,
        participants: &[Participant],
        clusters: Clusters,
    ) -> Vec<Group> {
        let mut groups: Vec<Group> = clusters
            .into_iter()
            .map(|members| {
                let aggregate_compatibility = group_mean(ctx, &members);
                let conflict_summary = self.summarize_conflicts(participants, &members);
                let mut ids: Vec<ParticipantId> =
                    members.iter().map(|&i| participants[i].id.clone()).collect();
                ids.sort();
                Group {
                    members: ids,
                    aggregate_compatibility,
                    conflict_summary,
                }
            })
            .collect();
        groups.sort_by(|a, b| a.members.first().cmp(&b.members.first()));
        groups
    }

    fn summarize_conflicts(&self, participants: &[Participant], members: &[usize]) -> ConflictSummary {
        let mut summary = ConflictSummary::default();
        let mut weight = 0.0;
        for (x, &i) in members.iter().enumerate() {
            for &j in &members[x + 1..] {
                let findings = self
                    .detector
                    .evaluate(&participants[i].profile, &participants[j].profile);
                if !findings.is_empty() {
                    summary.flagged_pairs += 1;
                }
                for finding in findings {
                    weight += finding.severity.weight();
                    match finding.severity {
                        Severity::Minor => summary.minor += 1,
                        Severity::Major => summary.major += 1,
                        Severity::Critical => summary.critical += 1,
                    }
                }
            }
        }
        summary.overall_risk = overall_risk(weight, members.len());
        summary
    }
}

impl Default for Partitioner {
    fn default() -> Self {
        Self::new(
            PartitionConfig::default(),
            TraitScorer::default(),
            ConflictDetector::default(),
        )
    }
}
