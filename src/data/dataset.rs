use std::sync::Arc;

use burn::data::dataset::Dataset;

use crate::domain::sample::LabelledImage;

/// A read-only split of labelled images.
///
/// The samples sit behind an `Arc` so the same split can feed one
/// DataLoader per model variant without copying the pixels.
#[derive(Debug, Clone)]
pub struct ImageDataset {
    samples: Arc<Vec<LabelledImage>>,
}

impl ImageDataset {
    pub fn new(samples: Vec<LabelledImage>) -> Self {
        Self { samples: Arc::new(samples) }
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// `(height, width)` of the first sample, if any
    pub fn image_dims(&self) -> Option<(usize, usize)> {
        self.samples.first().map(LabelledImage::dims)
    }
}

impl Dataset<LabelledImage> for ImageDataset {
    fn get(&self, index: usize) -> Option<LabelledImage> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_len() {
        let ds = ImageDataset::new(vec![
            LabelledImage::new(vec![0.0; 4], 2, 2, 0),
            LabelledImage::new(vec![1.0; 4], 2, 2, 1),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).map(|s| s.label), Some(1));
        assert!(ds.get(2).is_none());
        assert_eq!(ds.image_dims(), Some((2, 2)));
    }
}
