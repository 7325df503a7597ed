// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Carves a holdout set out of a single split when a dataset
// provider has no test half, or when the caller explicitly asks
// for one.
//
// The shuffle is driven by a seeded StdRng so the same seed
// always yields the same partition. The seed is the one from
// TrainConfig, so a rerun reproduces both the split and the
// trained weights.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use anyhow::{bail, Context, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::sample::LabelledImage;
use crate::domain::split::{EvalSplit, Split};
use crate::domain::traits::DatasetSource;

/// Fetch the (train, evaluation) samples a run asked for.
///
/// `EvalSplit::TestSplit` loads both halves from the provider.
/// `EvalSplit::Holdout(f)` loads only the training half and holds
/// out a seeded fraction `f` of it for evaluation.
///
/// Every sample is checked before it is returned.
pub fn prepare_splits<S: DatasetSource + ?Sized>(
    source:     &S,
    eval_split: EvalSplit,
    seed:       u64,
) -> Result<(Vec<LabelledImage>, Vec<LabelledImage>)> {
    let (train, test) = match eval_split {
        EvalSplit::TestSplit => {
            let train = source.load_split(Split::Train)?;
            let test  = source.load_split(Split::Test)?;
            (train, test)
        }
        EvalSplit::Holdout(fraction) => {
            check_fraction(fraction)?;
            let all = source.load_split(Split::Train)?;
            split_train_val(all, 1.0 - fraction, seed)
        }
    };
    check_samples(train.iter().chain(&test), source.num_classes())?;
    Ok((train, test))
}

/// Fetch only the evaluation samples of a run.
///
/// With `EvalSplit::TestSplit` the training half is never loaded.
pub fn prepare_eval_split<S: DatasetSource + ?Sized>(
    source:     &S,
    eval_split: EvalSplit,
    seed:       u64,
) -> Result<Vec<LabelledImage>> {
    match eval_split {
        EvalSplit::TestSplit => {
            let test = source.load_split(Split::Test)?;
            check_samples(&test, source.num_classes())?;
            Ok(test)
        }
        EvalSplit::Holdout(_) => Ok(prepare_splits(source, eval_split, seed)?.1),
    }
}

fn check_fraction(fraction: f64) -> Result<()> {
    if !(fraction > 0.0 && fraction < 1.0) {
        bail!("holdout fraction must be in (0, 1), got {fraction}");
    }
    Ok(())
}

/// Every sample must be well formed and share the first one's dims.
fn check_samples<'a, I>(samples: I, num_classes: usize) -> Result<()>
where
    I: IntoIterator<Item = &'a LabelledImage>,
{
    let mut dims = None;
    for (i, sample) in samples.into_iter().enumerate() {
        sample.check(num_classes).with_context(|| format!("sample {i}"))?;
        match dims {
            None => dims = Some(sample.dims()),
            Some(d) if d != sample.dims() => bail!(
                "sample {i} is {:?}, expected {:?} like the rest",
                sample.dims(), d
            ),
            Some(_) => {}
        }
    }
    Ok(())
}

/// Shuffle `samples` with `seed` and split into (train, held_out).
///
/// # Arguments
/// * `samples`        - All available samples (consumed by this function)
/// * `train_fraction` - Proportion kept for training, e.g. 0.8 = 80%
/// * `seed`           - RNG seed for the shuffle
pub fn split_train_val<T>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    seed:           u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} held out ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}
