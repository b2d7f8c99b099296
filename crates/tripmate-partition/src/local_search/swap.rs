//! Swap moves with incremental objective deltas.

use crate::context::PartitionContext;
use crate::objective::{objective, pair_count, Clusters};

/// Exchange of two participants that sit in different groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapMove {
    pub a: usize,
    pub b: usize,
}

/// Working partition that evaluates swaps in O(1).
///
/// For every participant and group the state caches the summed score and
/// penalty towards that group's members, so a swap delta only touches the
/// two affected groups. Swaps never change group sizes.
#[derive(Debug)]
pub struct SwapState<'a> {
    ctx: &'a PartitionContext,
    clusters: Clusters,
    group_of: Vec<usize>,
    slot_of: Vec<usize>,
    score_to: Vec<f64>,
    penalty_to: Vec<f64>,
    objective: f64,
}

impl<'a> SwapState<'a> {
    pub fn new(ctx: &'a PartitionContext, clusters: Clusters) -> Self {
        let n = ctx.len();
        let k = clusters.len();
        let mut group_of = vec![0; n];
        let mut slot_of = vec![0; n];
        for (g, members) in clusters.iter().enumerate() {
            for (slot, &i) in members.iter().enumerate() {
                group_of[i] = g;
                slot_of[i] = slot;
            }
        }

        let mut score_to = vec![0.0; n * k];
        let mut penalty_to = vec![0.0; n * k];
        for i in 0..n {
            for (g, members) in clusters.iter().enumerate() {
                for &m in members {
                    if m != i {
                        score_to[i * k + g] += ctx.score(i, m);
                        penalty_to[i * k + g] += ctx.penalty(i, m);
                    }
                }
            }
        }

        let objective = objective(ctx, &clusters);
        Self {
            ctx,
            clusters,
            group_of,
            slot_of,
            score_to,
            penalty_to,
            objective,
        }
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn clusters(&self) -> &Clusters {
        &self.clusters
    }

    pub fn into_clusters(self) -> Clusters {
        self.clusters
    }

    fn k(&self) -> usize {
        self.clusters.len()
    }

    /// Objective change if `mv` were applied.
    pub fn delta(&self, mv: SwapMove) -> f64 {
        let (a, b) = (mv.a, mv.b);
        let (ga, gb) = (self.group_of[a], self.group_of[b]);
        if ga == gb {
            return 0.0;
        }
        let k = self.k();
        let s_ab = self.ctx.score(a, b);
        let p_ab = self.ctx.penalty(a, b);

        let ds_a = self.score_to[b * k + ga] - s_ab - self.score_to[a * k + ga];
        let ds_b = self.score_to[a * k + gb] - s_ab - self.score_to[b * k + gb];
        let dp_a = self.penalty_to[b * k + ga] - p_ab - self.penalty_to[a * k + ga];
        let dp_b = self.penalty_to[a * k + gb] - p_ab - self.penalty_to[b * k + gb];

        self.mean_term(ga, ds_a) + self.mean_term(gb, ds_b)
            - self.ctx.penalty_weight() * (dp_a + dp_b)
    }

    fn mean_term(&self, g: usize, score_delta: f64) -> f64 {
        let m = self.clusters[g].len();
        if m < 2 {
            return 0.0;
        }
        m as f64 * score_delta / pair_count(m) / self.ctx.len() as f64
    }

    /// Applies `mv` and returns the objective after it.
    pub fn apply(&mut self, mv: SwapMove) -> f64 {
        let (a, b) = (mv.a, mv.b);
        let (ga, gb) = (self.group_of[a], self.group_of[b]);
        if ga == gb {
            return self.objective;
        }
        self.objective += self.delta(mv);

        let k = self.k();
        for i in 0..self.ctx.len() {
            let towards_a = if i == a { 0.0 } else { self.ctx.score(i, a) };
            let towards_b = if i == b { 0.0 } else { self.ctx.score(i, b) };
            self.score_to[i * k + ga] += towards_b - towards_a;
            self.score_to[i * k + gb] += towards_a - towards_b;

            let pen_a = self.ctx.penalty(i, a);
            let pen_b = self.ctx.penalty(i, b);
            self.penalty_to[i * k + ga] += pen_b - pen_a;
            self.penalty_to[i * k + gb] += pen_a - pen_b;
        }

        let (slot_a, slot_b) = (self.slot_of[a], self.slot_of[b]);
        self.clusters[ga][slot_a] = b;
        self.clusters[gb][slot_b] = a;
        self.group_of[a] = gb;
        self.group_of[b] = ga;
        self.slot_of[a] = slot_b;
        self.slot_of[b] = slot_a;
        self.objective
    }

    /// Every swap between members of different groups, in a fixed order.
    pub fn moves(&self) -> impl Iterator<Item = SwapMove> + '_ {
        let k = self.k();
        (0..k).flat_map(move |ga| {
            (ga + 1..k).flat_map(move |gb| {
                self.clusters[ga].iter().flat_map(move |&a| {
                    self.clusters[gb].iter().map(move |&b| SwapMove { a, b })
                })
            })
        })
    }
}
