// ============================================================
// Layer 5 — Classification Losses
// ============================================================
// The epoch loop only needs "scores + true labels → scalar".
// ClassificationLoss is that seam, so the same loop can train a
// model that emits log-probabilities (NllLoss) or raw logits
// (Burn's CrossEntropyLoss).
//
// Reference: Burn Book §5 (Training), burn::nn::loss

use burn::{nn::loss::CrossEntropyLoss, prelude::*};

/// A differentiable loss over per-class scores.
pub trait ClassificationLoss<B: Backend> {
    /// scores: [batch, num_classes], targets: [batch] → [1]
    fn loss(&self, scores: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1>;
}

/// Mean negative log-likelihood.
///
/// Expects `scores` to already be log-probabilities, which is what
/// both classifier variants emit from their log-softmax head.
#[derive(Debug, Clone, Copy, Default)]
pub struct NllLoss;

impl<B: Backend> ClassificationLoss<B> for NllLoss {
    fn loss(&self, scores: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        // Pick log p(target) from each row: [batch, 1]
        let picked = scores.gather(1, targets.unsqueeze_dim::<2>(1));
        picked.mean().neg()
    }
}

impl<B: Backend> ClassificationLoss<B> for CrossEntropyLoss<B> {
    fn loss(&self, scores: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        self.forward(scores, targets)
    }
}
