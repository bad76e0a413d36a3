//! CART regression tree.
//!
//! Binary splits chosen by sum-of-squared-error reduction, evaluated with
//! prefix sums over value-sorted samples. Split selection is deterministic:
//! features are scanned in feature-vector order and thresholds left to
//! right, and a candidate only replaces the incumbent on a strictly greater
//! improvement, so the first best split always wins.

use crate::types::FEATURE_COUNT;

/// Improvements below this are treated as no split (numerical noise).
const MIN_IMPROVEMENT: f64 = 1e-12;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree. Node 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct RegressionTree {
    nodes: Vec<Node>,
    /// Accumulated SSE reduction per feature, unnormalized
    importances: [f64; FEATURE_COUNT],
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    improvement: f64,
}

impl RegressionTree {
    /// Fit a tree on the rows named by `indices` (bootstrap sample indices,
    /// duplicates allowed).
    pub fn fit(
        features: &[[f64; FEATURE_COUNT]],
        targets: &[f64],
        indices: &[usize],
        max_depth: Option<usize>,
        min_samples_split: usize,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            importances: [0.0; FEATURE_COUNT],
        };
        tree.build(features, targets, indices.to_vec(), 0, max_depth, min_samples_split);
        tree
    }

    /// Predict the target for one feature vector.
    pub fn predict(&self, sample: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if sample[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Unnormalized per-feature SSE reduction accumulated over all splits.
    pub fn importances(&self) -> &[f64; FEATURE_COUNT] {
        &self.importances
    }

    /// Recursively build the subtree for `indices`, returning its node index.
    fn build(
        &mut self,
        features: &[[f64; FEATURE_COUNT]],
        targets: &[f64],
        indices: Vec<usize>,
        depth: usize,
        max_depth: Option<usize>,
        min_samples_split: usize,
    ) -> usize {
        let node_idx = self.nodes.len();
        let mean = mean_target(targets, &indices);
        // Placeholder leaf; replaced below if a split is taken
        self.nodes.push(Node::Leaf { value: mean });

        let depth_exhausted = max_depth.is_some_and(|limit| depth >= limit);
        if depth_exhausted || indices.len() < min_samples_split {
            return node_idx;
        }

        let Some(split) = best_split(features, targets, &indices) else {
            return node_idx;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| features[i][split.feature] <= split.threshold);
        if left_indices.is_empty() || right_indices.is_empty() {
            return node_idx;
        }

        self.importances[split.feature] += split.improvement;

        let left = self.build(features, targets, left_indices, depth + 1, max_depth, min_samples_split);
        let right = self.build(features, targets, right_indices, depth + 1, max_depth, min_samples_split);
        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_idx
    }
}

fn mean_target(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

/// SSE of a group expressed via sums: sum_sq - sum^2 / n.
fn group_sse(sum: f64, sum_sq: f64, n: f64) -> f64 {
    (sum_sq - sum * sum / n).max(0.0)
}

/// Scan all features and thresholds for the split with the greatest SSE
/// reduction. Returns None when the node is pure or no threshold separates
/// the samples.
fn best_split(
    features: &[[f64; FEATURE_COUNT]],
    targets: &[f64],
    indices: &[usize],
) -> Option<SplitCandidate> {
    let n = indices.len() as f64;
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let parent_sse = group_sse(total_sum, total_sq, n);
    if parent_sse <= MIN_IMPROVEMENT {
        return None;
    }

    let mut best: Option<SplitCandidate> = None;

    for feature in 0..FEATURE_COUNT {
        let mut samples: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (features[i][feature], targets[i]))
            .collect();
        samples.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (pos, window) in samples.windows(2).enumerate() {
            let (value, target) = window[0];
            left_sum += target;
            left_sq += target * target;

            let next_value = window[1].0;
            if next_value <= value {
                continue;
            }

            let n_left = (pos + 1) as f64;
            let n_right = n - n_left;
            let sse_left = group_sse(left_sum, left_sq, n_left);
            let sse_right = group_sse(total_sum - left_sum, total_sq - left_sq, n_right);
            let improvement = parent_sse - sse_left - sse_right;

            let is_better = match &best {
                Some(candidate) => improvement > candidate.improvement,
                None => improvement > MIN_IMPROVEMENT,
            };
            if is_better {
                best = Some(SplitCandidate {
                    feature,
                    threshold: value + (next_value - value) / 2.0,
                    improvement,
                });
            }
        }
    }

    best
}
