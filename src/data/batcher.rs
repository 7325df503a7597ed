// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<LabelledImage>
// into one ClassificationBatch.
//
// How batching works here:
//   Input:  N samples, each with H*W pixels and one label
//   Output: images  [N, H, W] float tensor
//           targets [N]       int tensor
//
// The pixels of all samples are concatenated in order and the
// flat buffer is reshaped, so sample i occupies images[i].
// Every sample in a split shares the same H and W.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::sample::LabelledImage;

// ─── ClassificationBatch ──────────────────────────────────────────────────────
/// A batch of raw images with their true labels.
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Raw inputs — shape: [batch_size, height, width]
    pub images: Tensor<B, 3>,

    /// True class indices — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> ClassificationBatch<B> {
    /// Number of samples in this batch
    pub fn len(&self) -> usize {
        self.targets.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created where the model lives.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<LabelledImage, ClassificationBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<LabelledImage>) -> ClassificationBatch<B> {
        let batch_size = items.len();
        let (height, width) = items.first().map(LabelledImage::dims).unwrap_or((0, 0));

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|s| s.pixels.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let images = Tensor::<B, 3>::from_data(
            TensorData::new(pixels, [batch_size, height, width]),
            &self.device,
        );

        let targets = Tensor::<B, 1, Int>::from_ints(
            labels.as_slice(), &self.device
        );

        ClassificationBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let items = vec![
            LabelledImage::new(vec![0.0; 6], 2, 3, 4),
            LabelledImage::new(vec![1.0; 6], 2, 3, 7),
        ];
        let batch = batcher.batch(items);
        assert_eq!(batch.images.dims(), [2, 2, 3]);
        assert_eq!(batch.len(), 2);

        let labels: Vec<i64> = batch.targets.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![4, 7]);
    }

    #[test]
    fn test_sample_order_is_preserved() {
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let items = vec![
            LabelledImage::new(vec![1.0, 2.0], 1, 2, 0),
            LabelledImage::new(vec![3.0, 4.0], 1, 2, 1),
        ];
        let batch = batcher.batch(items);
        let pixels: Vec<f32> = batch.images.into_data().convert::<f32>().to_vec().unwrap();
        assert_eq!(pixels, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
