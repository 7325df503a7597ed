// ============================================================
// Layer 4 — MNIST Source
// ============================================================
// Adapts Burn's MnistDataset to the DatasetSource trait.
//
// Burn downloads the raw IDX files on first use and caches them
// under the user's cache directory. Each MnistItem carries a
// 28x28 image of grey levels in [0, 255] and a digit label.
//
// Pixels are scaled to [0, 1] and then standardised with the
// MNIST training-set mean and standard deviation, so inputs to
// both classifier variants are roughly zero-centred.
//
// Reference: Burn Book §4 (Datasets), burn::data::dataset::vision

use anyhow::Result;
use burn::data::dataset::{
    vision::{MnistDataset, MnistItem},
    Dataset,
};

use crate::domain::sample::LabelledImage;
use crate::domain::split::Split;
use crate::domain::traits::DatasetSource;

const MNIST_SIDE: usize = 28;
const MNIST_MEAN: f32 = 0.1307;
const MNIST_STD: f32 = 0.3081;

/// The MNIST handwritten digit dataset.
#[derive(Debug, Default, Clone, Copy)]
pub struct MnistSource;

impl MnistSource {
    pub fn new() -> Self {
        Self
    }
}

impl DatasetSource for MnistSource {
    fn class_names(&self) -> Vec<String> {
        (0..10).map(|d| d.to_string()).collect()
    }

    fn load_split(&self, split: Split) -> Result<Vec<LabelledImage>> {
        let dataset = match split {
            Split::Train => MnistDataset::train(),
            Split::Test  => MnistDataset::test(),
        };
        tracing::info!("Loaded MNIST {:?} split: {} images", split, dataset.len());
        Ok(dataset.iter().map(to_sample).collect())
    }
}

fn to_sample(item: MnistItem) -> LabelledImage {
    let pixels: Vec<f32> = item
        .image
        .iter()
        .flat_map(|row| row.iter())
        .map(|&p| normalise(p))
        .collect();
    LabelledImage::new(pixels, MNIST_SIDE, MNIST_SIDE, item.label as usize)
}

fn normalise(grey: f32) -> f32 {
    ((grey / 255.0) - MNIST_MEAN) / MNIST_STD
}
