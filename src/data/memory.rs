use anyhow::Result;

use crate::domain::sample::LabelledImage;
use crate::domain::split::Split;
use crate::domain::traits::DatasetSource;

/// Serves fixed train and test samples held in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    class_names: Vec<String>,
    train:       Vec<LabelledImage>,
    test:        Vec<LabelledImage>,
}

impl InMemorySource {
    pub fn new(
        class_names: Vec<String>,
        train:       Vec<LabelledImage>,
        test:        Vec<LabelledImage>,
    ) -> Self {
        Self { class_names, train, test }
    }
}

impl DatasetSource for InMemorySource {
    fn class_names(&self) -> Vec<String> {
        self.class_names.clone()
    }

    fn load_split(&self, split: Split) -> Result<Vec<LabelledImage>> {
        Ok(match split {
            Split::Train => self.train.clone(),
            Split::Test  => self.test.clone(),
        })
    }
}
