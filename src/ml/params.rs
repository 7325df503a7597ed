// ============================================================
// Layer 5 — Named Parameter Export / Import
// ============================================================
// Bridges Burn parameters and the engine-free WeightSnapshot.
//
// Export reads each Param's current tensor and stores its shape
// and f32 values under a dotted name ("fc1.weight").
//
// Import is non-strict:
//   - a name missing from the snapshot leaves the Param as is
//   - snapshot names nobody asks for are never looked at
//   - a present name whose shape differs is an error
//
// Imported tensors keep the original ParamId, so optimizer state
// keyed by that id (momentum buffers) still lines up.

use anyhow::{anyhow, bail, Result};
use burn::{
    module::Param,
    nn::{conv::Conv2d, Linear},
    prelude::*,
};

use crate::domain::weights::{WeightArray, WeightSnapshot};

/// Copy one parameter into `snapshot` under `name`.
pub fn export_param<B: Backend, const D: usize>(
    snapshot: &mut WeightSnapshot,
    name:     &str,
    param:    &Param<Tensor<B, D>>,
) -> Result<()> {
    let data   = param.val().into_data().convert::<f32>();
    let shape  = data.shape.clone();
    let values = data
        .to_vec::<f32>()
        .map_err(|e| anyhow!("cannot read parameter '{name}': {e:?}"))?;
    snapshot.insert(name, WeightArray::new(shape, values)?);
    Ok(())
}

/// Replace `param` with the values stored under `name`, if any.
pub fn import_param<B: Backend, const D: usize>(
    snapshot: &WeightSnapshot,
    name:     &str,
    param:    Param<Tensor<B, D>>,
) -> Result<Param<Tensor<B, D>>> {
    let Some(array) = snapshot.get(name) else {
        return Ok(param);
    };

    let current  = param.val();
    let expected = current.dims().to_vec();
    if array.shape != expected {
        bail!(
            "parameter '{name}' has shape {:?} but the snapshot holds {:?}",
            expected, array.shape
        );
    }
    if array.values.len() != expected.iter().product::<usize>() {
        bail!(
            "parameter '{name}' expects {} values but the snapshot holds {}",
            expected.iter().product::<usize>(),
            array.values.len()
        );
    }

    let tensor = Tensor::<B, D>::from_data(
        TensorData::new(array.values.clone(), expected),
        &current.device(),
    );
    Ok(Param::initialized(param.id, tensor.require_grad()))
}

fn import_optional<B: Backend, const D: usize>(
    snapshot: &WeightSnapshot,
    name:     &str,
    param:    Option<Param<Tensor<B, D>>>,
) -> Result<Option<Param<Tensor<B, D>>>> {
    param.map(|p| import_param(snapshot, name, p)).transpose()
}

// ─── Layer helpers ────────────────────────────────────────────────────────────
// Weight and bias of a layer live under "<prefix>.weight" / "<prefix>.bias".

pub fn export_linear<B: Backend>(
    snapshot: &mut WeightSnapshot,
    prefix:   &str,
    linear:   &Linear<B>,
) -> Result<()> {
    export_param(snapshot, &format!("{prefix}.weight"), &linear.weight)?;
    if let Some(bias) = &linear.bias {
        export_param(snapshot, &format!("{prefix}.bias"), bias)?;
    }
    Ok(())
}

pub fn import_linear<B: Backend>(
    snapshot:   &WeightSnapshot,
    prefix:     &str,
    mut linear: Linear<B>,
) -> Result<Linear<B>> {
    linear.weight = import_param(snapshot, &format!("{prefix}.weight"), linear.weight)?;
    linear.bias   = import_optional(snapshot, &format!("{prefix}.bias"), linear.bias)?;
    Ok(linear)
}

pub fn export_conv2d<B: Backend>(
    snapshot: &mut WeightSnapshot,
    prefix:   &str,
    conv:     &Conv2d<B>,
) -> Result<()> {
    export_param(snapshot, &format!("{prefix}.weight"), &conv.weight)?;
    if let Some(bias) = &conv.bias {
        export_param(snapshot, &format!("{prefix}.bias"), bias)?;
    }
    Ok(())
}

pub fn import_conv2d<B: Backend>(
    snapshot: &WeightSnapshot,
    prefix:   &str,
    mut conv: Conv2d<B>,
) -> Result<Conv2d<B>> {
    conv.weight = import_param(snapshot, &format!("{prefix}.weight"), conv.weight)?;
    conv.bias   = import_optional(snapshot, &format!("{prefix}.bias"), conv.bias)?;
    Ok(conv)
}
