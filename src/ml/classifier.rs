// ============================================================
// Layer 5 — ClassifiableModel
// ============================================================
// The contract every trainable classifier satisfies, plus the
// generic train / evaluate / serialise loop written once against
// that contract.
//
// A concrete model only supplies:
//   - transform_input  raw [batch, h, w] → whatever its layers eat
//   - forward          transformed input → [batch, num_classes]
//   - save_weights / load_weights for its named parameters
//   - num_classes
//
// Everything else is provided here:
//
//   classify       forward(transform_input(raw))
//   predict_label  row-wise argmax, lowest index on ties
//   train_epoch    loss → backward → optimizer step, per batch
//   evaluate       accuracy of the inference-mode copy
//   accuracy       matches / samples over a whole split
//
// Training and inference mode in Burn:
//   A model on an Autodiff backend records gradients and applies
//   dropout. model.valid() returns the same weights on the inner
//   backend: no gradient tape, dropout off. evaluate always scores
//   that copy, so the switch lasts exactly as long as the call and
//   the trained model is never touched. accuracy is bounded on
//   InferenceBackend, so it cannot run on an Autodiff backend.
//
// Reference: Burn Book §5 (Training), §3 (Modules)

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::ClassificationBatch;
use crate::domain::weights::WeightSnapshot;
use crate::ml::loss::ClassificationLoss;

/// Backends without a gradient tape. Dropout is inactive on these.
pub trait InferenceBackend: Backend {}

impl InferenceBackend for burn::backend::NdArray {}

#[cfg(feature = "wgpu")]
impl InferenceBackend for burn::backend::Wgpu {}

pub trait ClassifiableModel<B: Backend>: Module<B> + Sized {
    /// What the model's first layer consumes after transform_input
    type Input;

    /// Number of output classes
    fn num_classes(&self) -> usize;

    /// Prepare a raw image batch for the forward pass.
    /// Must be deterministic for a given input.
    fn transform_input(&self, raw: Tensor<B, 3>) -> Self::Input;

    /// Per-class scores, shape [batch, num_classes]
    fn forward(&self, input: Self::Input) -> Tensor<B, 2>;

    /// Every learnable parameter as a named array.
    fn save_weights(&self) -> Result<WeightSnapshot>;

    /// Assign matching parameters from `snapshot`. Unknown names are
    /// ignored and absent ones keep their values; a shape mismatch
    /// is an error.
    fn load_weights(self, snapshot: &WeightSnapshot) -> Result<Self>;

    fn classify(&self, raw: Tensor<B, 3>) -> Tensor<B, 2> {
        let input = self.transform_input(raw);
        self.forward(input)
    }

    /// One label per input row.
    fn predict_label(&self, raw: Tensor<B, 3>) -> Tensor<B, 1, Int> {
        argmax_lowest(self.classify(raw))
    }

    /// Run one pass over `train_data`, stepping the optimizer after
    /// every batch. Returns the updated model and the mean batch loss.
    ///
    /// Burn builds a fresh gradient set on every backward pass, so
    /// nothing carries over from one batch to the next.
    fn train_epoch<I, L, O>(
        self,
        train_data: I,
        loss_fn:    &L,
        optim:      &mut O,
        lr:         f64,
    ) -> (Self, f64)
    where
        B: AutodiffBackend,
        Self: AutodiffModule<B>,
        I: IntoIterator<Item = ClassificationBatch<B>>,
        L: ClassificationLoss<B>,
        O: Optimizer<Self, B>,
    {
        let mut model    = self;
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in train_data {
            let scores = model.classify(batch.images);
            let loss   = loss_fn.loss(scores, batch.targets);

            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);
        }

        let mean_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        (model, mean_loss)
    }

    /// Fraction of samples in `test_data` whose predicted label
    /// equals the true label, scored in inference mode. 0.0 for an
    /// empty split.
    fn evaluate<I>(&self, test_data: I) -> f64
    where
        B: AutodiffBackend,
        B::InnerBackend: InferenceBackend,
        Self: AutodiffModule<B>,
        <Self as AutodiffModule<B>>::InnerModule: ClassifiableModel<B::InnerBackend>,
        I: IntoIterator<Item = ClassificationBatch<B::InnerBackend>>,
    {
        self.valid().accuracy(test_data)
    }

    /// evaluate for a model that already lives on an inference backend.
    fn accuracy<I>(&self, test_data: I) -> f64
    where
        B: InferenceBackend,
        I: IntoIterator<Item = ClassificationBatch<B>>,
    {
        let mut num_correct = 0usize;
        let mut num_seen    = 0usize;

        for batch in test_data {
            if batch.is_empty() {
                continue;
            }
            num_seen += batch.len();

            let predicted = self.predict_label(batch.images);
            let correct: i64 = predicted
                .equal(batch.targets)
                .int().sum().into_scalar().elem::<i64>();
            num_correct += correct as usize;
        }

        if num_seen > 0 { num_correct as f64 / num_seen as f64 } else { 0.0 }
    }
}

/// Row-wise argmax that resolves ties to the lowest class index.
///
/// Every column holding the row maximum keeps its index, the rest
/// are pushed to `num_classes`, and the row minimum is taken. NaN
/// counts as the maximum: a row containing NaN yields its first
/// NaN column.
pub fn argmax_lowest<B: Backend>(scores: Tensor<B, 2>) -> Tensor<B, 1, Int> {
    let [batch_size, num_classes] = scores.dims();
    let device = scores.device();

    // NaN is the only value not equal to itself
    let is_nan  = scores.clone().not_equal(scores.clone()).int();
    let has_nan = is_nan.clone().sum_dim(1).clamp_max(1).expand([batch_size, num_classes]);

    let row_max = scores.clone().max_dim(1).expand([batch_size, num_classes]);
    let is_max  = scores.equal(row_max).int();

    // rows with NaN take the NaN columns, other rows the max columns
    let keep = is_nan.mul(has_nan.clone())
        .add(is_max.mul(has_nan.neg().add_scalar(1)))
        .equal_elem(1);

    let indices = Tensor::<B, 1, Int>::arange(0..num_classes as i64, &device)
        .unsqueeze::<2>()
        .expand([batch_size, num_classes]);

    indices
        .mask_fill(keep.bool_not(), num_classes as i64)
        .min_dim(1)
        .flatten::<1>(0, 1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::{momentum::MomentumConfig, SgdConfig};

    use crate::domain::weights::WeightArray;
    use crate::ml::loss::NllLoss;
    use crate::ml::model::{ConvClassifierConfig, NonConvClassifier, NonConvClassifierConfig};

    type B  = NdArray;
    type AD = Autodiff<NdArray>;

    fn ints(t: Tensor<B, 1, Int>) -> Vec<i64> {
        t.into_data().convert::<i64>().to_vec().unwrap()
    }

    fn floats<Bk: Backend, const D: usize>(t: Tensor<Bk, D>) -> Vec<f32> {
        t.into_data().convert::<f32>().to_vec().unwrap()
    }

    fn batch<Bk: Backend>(rows: &[[f32; 2]], labels: &[i32]) -> ClassificationBatch<Bk> {
        let device = Default::default();
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        ClassificationBatch {
            images:  Tensor::<Bk, 3>::from_data(TensorData::new(flat, [rows.len(), 1, 2]), &device),
            targets: Tensor::<Bk, 1, Int>::from_ints(labels, &device),
        }
    }

    // Two linearly separable classes, one pixel row of width 2.
    const TOY_ROWS: [[f32; 2]; 4] = [[-1.0, -1.0], [-2.0, -1.0], [1.0, 1.0], [2.0, 1.0]];
    const TOY_LABELS: [i32; 4] = [0, 0, 1, 1];

    fn toy_model<Bk: Backend>() -> NonConvClassifier<Bk> {
        NonConvClassifierConfig::new(2, 2)
            .with_hidden_size(16)
            .with_dropout(0.0)
            .init(&Default::default())
    }

    #[test]
    fn test_argmax_lowest_breaks_ties_low() {
        let device = Default::default();
        let scores = Tensor::<B, 2>::from_floats(
            [[1.0, 3.0, 3.0], [5.0, 5.0, 5.0], [0.0, -1.0, 2.0]],
            &device,
        );
        assert_eq!(ints(argmax_lowest(scores)), vec![1, 0, 2]);
    }

    #[test]
    fn test_argmax_lowest_nan_rows_stay_in_range() {
        let device = Default::default();
        let nan = f32::NAN;
        let scores = Tensor::<B, 2>::from_floats(
            [[nan, 1.0, 0.5], [nan, nan, nan], [0.0, nan, 2.0], [0.5, 1.5, 1.0]],
            &device,
        );
        assert_eq!(ints(argmax_lowest(scores)), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_predict_label_one_per_row_in_range() {
        let device = Default::default();
        let model = ConvClassifierConfig::new(10).init::<B>(&device);
        let raw = Tensor::<B, 3>::random([5, 28, 28], burn::tensor::Distribution::Default, &device);

        let labels = ints(model.predict_label(raw));
        assert_eq!(labels.len(), 5);
        assert!(labels.iter().all(|&l| (0..10).contains(&l)));
    }

    #[test]
    fn test_evaluate_all_and_none_correct() {
        let model = toy_model::<AD>();
        let raw = batch::<B>(&TOY_ROWS, &TOY_LABELS).images;
        let predicted: Vec<i32> = ints(model.valid().predict_label(raw)).into_iter().map(|l| l as i32).collect();
        let wrong: Vec<i32> = predicted.iter().map(|l| 1 - l).collect();

        assert_eq!(model.evaluate(vec![batch::<B>(&TOY_ROWS, &predicted)]), 1.0);
        assert_eq!(model.evaluate(vec![batch::<B>(&TOY_ROWS, &wrong)]), 0.0);
    }

    #[test]
    fn test_evaluate_counts_across_batches() {
        let model = toy_model::<B>();
        let raw = batch::<B>(&TOY_ROWS, &TOY_LABELS).images;
        let predicted: Vec<i32> = ints(model.predict_label(raw)).into_iter().map(|l| l as i32).collect();
        // First batch fully right, second half wrong: 3 of 4
        let second = [predicted[2], 1 - predicted[3]];

        let acc = model.accuracy(vec![
            batch::<B>(&TOY_ROWS[..2], &predicted[..2]),
            batch::<B>(&TOY_ROWS[2..], &second),
        ]);
        assert!((acc - 0.75).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&acc));
    }

    #[test]
    fn test_evaluate_empty_split_is_zero() {
        assert_eq!(toy_model::<B>().accuracy(Vec::<ClassificationBatch<B>>::new()), 0.0);
        assert_eq!(toy_model::<AD>().evaluate(Vec::<ClassificationBatch<B>>::new()), 0.0);
    }

    #[test]
    fn test_evaluate_runs_in_inference_mode() {
        let device = Default::default();
        let model = NonConvClassifierConfig::new(64, 10)
            .with_dropout(0.9)
            .init::<AD>(&device);

        let images = Tensor::<B, 3>::random([64, 8, 8], burn::tensor::Distribution::Default, &device);
        let labels: Vec<i32> = (0..64).map(|i| i % 10).collect();
        let data = || vec![ClassificationBatch {
            images:  images.clone(),
            targets: Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &device),
        }];

        let first = model.evaluate(data());
        assert_eq!(model.evaluate(data()), first);
        assert_eq!(model.valid().accuracy(data()), first);
    }

    #[test]
    fn test_save_load_round_trip_keeps_scores() {
        let model = toy_model::<B>();
        let raw = batch::<B>(&TOY_ROWS, &TOY_LABELS).images;
        let before = floats(model.classify(raw.clone()));

        let snapshot = model.save_weights().unwrap();
        let fresh = toy_model::<B>().load_weights(&snapshot).unwrap();
        assert_eq!(floats(fresh.classify(raw)), before);
    }

    #[test]
    fn test_empty_snapshot_changes_nothing() {
        let model = toy_model::<B>();
        let before = model.save_weights().unwrap();
        let model = model.load_weights(&WeightSnapshot::new()).unwrap();
        assert_eq!(model.save_weights().unwrap(), before);
    }

    #[test]
    fn test_unknown_snapshot_keys_are_ignored() {
        let model = toy_model::<B>();
        let before = model.save_weights().unwrap();

        let mut extra = WeightSnapshot::new();
        extra.insert("not.a.param", WeightArray::new(vec![1], vec![9.0]).unwrap());
        let model = model.load_weights(&extra).unwrap();
        assert_eq!(model.save_weights().unwrap(), before);
    }

    #[test]
    fn test_evaluate_leaves_weights_untouched() {
        let model = toy_model::<AD>();
        let before = model.save_weights().unwrap();
        let _ = model.evaluate(vec![batch::<B>(&TOY_ROWS, &TOY_LABELS)]);
        assert_eq!(model.save_weights().unwrap(), before);
    }

    fn sgd_optimizer() -> impl Optimizer<NonConvClassifier<AD>, AD> {
        SgdConfig::new()
            .with_momentum(Some(MomentumConfig::new().with_momentum(0.9).with_dampening(0.0)))
            .init::<AD, NonConvClassifier<AD>>()
    }

    #[test]
    fn test_training_does_not_increase_loss() {
        let mut model = toy_model::<AD>();
        let mut optim = sgd_optimizer();

        let mut losses = Vec::new();
        for _ in 0..30 {
            let (trained, loss) = model.train_epoch(
                vec![batch::<AD>(&TOY_ROWS, &TOY_LABELS)], &NllLoss, &mut optim, 0.1,
            );
            model = trained;
            losses.push(loss);
        }
        assert!(losses.iter().all(|l| l.is_finite()));
        assert!(losses.last().unwrap() <= losses.first().unwrap());
    }

    #[test]
    fn test_separable_toy_set_reaches_full_accuracy() {
        AD::seed(2);
        let mut model = toy_model::<AD>();
        let mut optim = sgd_optimizer();

        for _ in 0..50 {
            let (trained, _) = model.train_epoch(
                vec![batch::<AD>(&TOY_ROWS, &TOY_LABELS)], &NllLoss, &mut optim, 0.1,
            );
            model = trained;
        }
        let acc = model.evaluate(vec![batch::<B>(&TOY_ROWS, &TOY_LABELS)]);
        assert_eq!(acc, 1.0);
    }

    #[test]
    fn test_training_changes_weights() {
        let model = toy_model::<AD>();
        let before = model.save_weights().unwrap();
        let mut optim = sgd_optimizer();
        let (model, _) = model.train_epoch(
            vec![batch::<AD>(&TOY_ROWS, &TOY_LABELS)], &NllLoss, &mut optim, 0.1,
        );
        assert_ne!(model.save_weights().unwrap(), before);
    }
}
