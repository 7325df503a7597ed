use anyhow::Result;
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{log_softmax, relu},
};

use crate::domain::weights::WeightSnapshot;
use crate::ml::classifier::ClassifiableModel;
use crate::ml::params::{export_conv2d, export_linear, import_conv2d, import_linear};

// #[derive(Config)] supplies Clone and serde impls for the config structs.

// ─── Non-convolutional classifier ─────────────────────────────────────────────
// flatten → fc1 → ReLU → dropout → fc2 → log-softmax

#[derive(Config, Debug)]
pub struct NonConvClassifierConfig {
    /// Pixels per image (height * width)
    pub input_size:  usize,
    pub num_classes: usize,
    #[config(default = 128)]
    pub hidden_size: usize,
    #[config(default = 0.5)]
    pub dropout:     f64,
}

impl NonConvClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> NonConvClassifier<B> {
        NonConvClassifier {
            fc1:         LinearConfig::new(self.input_size, self.hidden_size).init(device),
            fc2:         LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            dropout:     DropoutConfig::new(self.dropout).init(),
            num_classes: self.num_classes,
        }
    }
}

#[derive(Module, Debug)]
pub struct NonConvClassifier<B: Backend> {
    pub fc1:         Linear<B>,
    pub fc2:         Linear<B>,
    pub dropout:     Dropout,
    pub num_classes: usize,
}

impl<B: Backend> ClassifiableModel<B> for NonConvClassifier<B> {
    type Input = Tensor<B, 2>;

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// [batch, h, w] → [batch, h * w]
    fn transform_input(&self, raw: Tensor<B, 3>) -> Tensor<B, 2> {
        raw.flatten::<2>(1, 2)
    }

    fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(input));
        let x = self.dropout.forward(x);
        log_softmax(self.fc2.forward(x), 1)
    }

    fn save_weights(&self) -> Result<WeightSnapshot> {
        let mut snapshot = WeightSnapshot::new();
        export_linear(&mut snapshot, "fc1", &self.fc1)?;
        export_linear(&mut snapshot, "fc2", &self.fc2)?;
        Ok(snapshot)
    }

    fn load_weights(mut self, snapshot: &WeightSnapshot) -> Result<Self> {
        self.fc1 = import_linear(snapshot, "fc1", self.fc1)?;
        self.fc2 = import_linear(snapshot, "fc2", self.fc2)?;
        Ok(self)
    }
}

// ─── Convolutional classifier ─────────────────────────────────────────────────
// conv1(1→10, 5x5) → max-pool 2 → ReLU
// conv2(10→20, 5x5) → dropout → max-pool 2 → ReLU
// flatten → fc1(→50) → ReLU → dropout → fc2 → log-softmax
//
// Each 5x5 convolution trims 4 pixels per side length and each
// pool halves it, so a 28x28 digit ends as 20 maps of 4x4 = 320.

const CONV1_CHANNELS: usize = 10;
const CONV2_CHANNELS: usize = 20;
const KERNEL: usize = 5;
const FC_HIDDEN: usize = 50;

/// Smallest image side the two conv + pool stages can process
pub const MIN_CONV_SIDE: usize = 16;

#[derive(Config, Debug)]
pub struct ConvClassifierConfig {
    pub num_classes:  usize,
    #[config(default = 28)]
    pub image_height: usize,
    #[config(default = 28)]
    pub image_width:  usize,
    #[config(default = 0.5)]
    pub dropout:      f64,
}

impl ConvClassifierConfig {
    /// Width of the flattened feature vector entering fc1
    pub fn flattened_size(&self) -> usize {
        CONV2_CHANNELS * feature_side(self.image_height) * feature_side(self.image_width)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvClassifier<B> {
        ConvClassifier {
            conv1:       Conv2dConfig::new([1, CONV1_CHANNELS], [KERNEL, KERNEL]).init(device),
            conv2:       Conv2dConfig::new([CONV1_CHANNELS, CONV2_CHANNELS], [KERNEL, KERNEL]).init(device),
            pool:        MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            fc1:         LinearConfig::new(self.flattened_size(), FC_HIDDEN).init(device),
            fc2:         LinearConfig::new(FC_HIDDEN, self.num_classes).init(device),
            dropout:     DropoutConfig::new(self.dropout).init(),
            num_classes: self.num_classes,
        }
    }
}

/// Side length after conv(5) → pool(2) → conv(5) → pool(2)
fn feature_side(side: usize) -> usize {
    (side.saturating_sub(KERNEL - 1) / 2).saturating_sub(KERNEL - 1) / 2
}

#[derive(Module, Debug)]
pub struct ConvClassifier<B: Backend> {
    pub conv1:       Conv2d<B>,
    pub conv2:       Conv2d<B>,
    pub pool:        MaxPool2d,
    pub fc1:         Linear<B>,
    pub fc2:         Linear<B>,
    pub dropout:     Dropout,
    pub num_classes: usize,
}

impl<B: Backend> ClassifiableModel<B> for ConvClassifier<B> {
    type Input = Tensor<B, 4>;

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// [batch, h, w] → [batch, 1, h, w]
    fn transform_input(&self, raw: Tensor<B, 3>) -> Tensor<B, 4> {
        raw.unsqueeze_dim::<4>(1)
    }

    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.pool.forward(self.conv1.forward(input)));
        let x = self.dropout.forward(self.conv2.forward(x));
        let x = relu(self.pool.forward(x));

        let x = x.flatten::<2>(1, 3);
        let x = relu(self.fc1.forward(x));
        let x = self.dropout.forward(x);
        log_softmax(self.fc2.forward(x), 1)
    }

    fn save_weights(&self) -> Result<WeightSnapshot> {
        let mut snapshot = WeightSnapshot::new();
        export_conv2d(&mut snapshot, "conv1", &self.conv1)?;
        export_conv2d(&mut snapshot, "conv2", &self.conv2)?;
        export_linear(&mut snapshot, "fc1", &self.fc1)?;
        export_linear(&mut snapshot, "fc2", &self.fc2)?;
        Ok(snapshot)
    }

    fn load_weights(mut self, snapshot: &WeightSnapshot) -> Result<Self> {
        self.conv1 = import_conv2d(snapshot, "conv1", self.conv1)?;
        self.conv2 = import_conv2d(snapshot, "conv2", self.conv2)?;
        self.fc1   = import_linear(snapshot, "fc1", self.fc1)?;
        self.fc2   = import_linear(snapshot, "fc2", self.fc2)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type B = NdArray;

    #[test]
    fn test_mnist_conv_flattens_to_320() {
        assert_eq!(ConvClassifierConfig::new(10).flattened_size(), 320);
        assert_eq!(feature_side(MIN_CONV_SIDE), 1);
    }

    #[test]
    fn test_nonconv_scores_shape() {
        let device = Default::default();
        let model = NonConvClassifierConfig::new(28 * 28, 10).init::<B>(&device);
        let raw = Tensor::<B, 3>::random([3, 28, 28], Distribution::Default, &device);
        assert_eq!(model.classify(raw).dims(), [3, 10]);
        assert_eq!(model.num_classes(), 10);
    }

    #[test]
    fn test_conv_scores_shape() {
        let device = Default::default();
        let model = ConvClassifierConfig::new(10).init::<B>(&device);
        let raw = Tensor::<B, 3>::random([2, 28, 28], Distribution::Default, &device);
        assert_eq!(model.transform_input(raw.clone()).dims(), [2, 1, 28, 28]);
        assert_eq!(model.classify(raw).dims(), [2, 10]);
    }

    #[test]
    fn test_scores_are_log_probabilities() {
        let device = Default::default();
        let model = NonConvClassifierConfig::new(4, 3).init::<B>(&device);
        let raw = Tensor::<B, 3>::random([2, 2, 2], Distribution::Default, &device);
        let row_sums: Vec<f32> = model
            .classify(raw)
            .exp()
            .sum_dim(1)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .unwrap();
        assert!(row_sums.iter().all(|s| (s - 1.0).abs() < 1e-4));
    }

    #[test]
    fn test_conv_snapshot_names() {
        let model = ConvClassifierConfig::new(10).init::<B>(&Default::default());
        let snapshot = model.save_weights().unwrap();
        let names: Vec<&str> = snapshot.names().collect();
        assert_eq!(
            names,
            vec![
                "conv1.bias", "conv1.weight", "conv2.bias", "conv2.weight",
                "fc1.bias", "fc1.weight", "fc2.bias", "fc2.weight",
            ]
        );
        assert_eq!(snapshot.get("conv1.weight").unwrap().shape, vec![10, 1, 5, 5]);
        assert_eq!(snapshot.get("fc1.weight").unwrap().shape, vec![320, 50]);
    }

    #[test]
    fn test_load_into_other_architecture_fails_on_shape() {
        let device = Default::default();
        let small = NonConvClassifierConfig::new(4, 2).init::<B>(&device);
        let large = NonConvClassifierConfig::new(8, 2).init::<B>(&device);
        let snapshot = small.save_weights().unwrap();
        assert!(large.load_weights(&snapshot).is_err());
    }
}
