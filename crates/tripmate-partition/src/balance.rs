//! Group count and size plan.

/// Number of groups for `n` participants at `target` members per group.
pub fn group_count(n: usize, target: usize) -> usize {
    if n == 0 {
        return 0;
    }
    n.div_ceil(target.max(1))
}

/// Sizes of `k` groups covering `n` participants, largest first.
///
/// The first `n mod k` groups hold one member more than the rest, so sizes
/// differ by at most one.
///
/// ```
/// use tripmate_partition::balance::balance_plan;
///
/// assert_eq!(balance_plan(12, 2), vec![6, 6]);
/// assert_eq!(balance_plan(13, 3), vec![5, 4, 4]);
/// ```
pub fn balance_plan(n: usize, k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    let base = n / k;
    let extra = n % k;
    (0..k).map(|i| base + usize::from(i < extra)).collect()
}

/// True when `sizes` is a permutation of the plan for their total.
pub fn matches_plan(sizes: &[usize], plan: &[usize]) -> bool {
    let mut sorted = sizes.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted == plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_count() {
        assert_eq!(group_count(12, 6), 2);
        assert_eq!(group_count(13, 6), 3);
        assert_eq!(group_count(5, 6), 1);
        assert_eq!(group_count(0, 6), 0);
        assert_eq!(group_count(4, 1), 4);
    }

    #[test]
    fn test_plan_sizes_differ_by_at_most_one() {
        for n in 1..60 {
            for target in 1..9 {
                let plan = balance_plan(n, group_count(n, target));
                assert_eq!(plan.iter().sum::<usize>(), n);
                let max = plan.iter().max().copied().unwrap_or(0);
                let min = plan.iter().min().copied().unwrap_or(0);
                assert!(max - min <= 1, "n={n} target={target} plan={plan:?}");
                assert!(max <= target.max(1) || target == 0);
            }
        }
    }

    #[test]
    fn test_matches_plan_ignores_order() {
        assert!(matches_plan(&[4, 5, 4], &[5, 4, 4]));
        assert!(!matches_plan(&[6, 3, 4], &[5, 4, 4]));
    }
}
