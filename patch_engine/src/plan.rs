//! Patch planning: finding the payload size ceiling.

use log::debug;

use crate::decoder::decode_one;
use crate::error::{PatchError, Result};
use crate::targets::Target;
use crate::translate::translate;

/// Decode every selected target and return the minimum instruction
/// length across them. The payload must fit inside the shortest target
/// instruction, otherwise some write would spill past an instruction
/// boundary.
///
/// Any target that fails to decode aborts the whole plan; a single
/// unmeasurable target makes every subsequent write unsafe. An empty
/// target list has no minimum and is an error.
pub fn minimum_patch_len(image: &[u8], targets: &[Target], magic_offset: i64) -> Result<usize> {
    if targets.is_empty() {
        return Err(PatchError::EmptyTargetSet);
    }

    let mut minimum = usize::MAX;
    for target in targets {
        let decode_failure = PatchError::DecodeFailure {
            index: target.index,
            address: target.address,
        };
        let offset = translate(target.address, magic_offset).ok_or(decode_failure.clone())?;
        let instruction = decode_one(image, offset).ok_or(decode_failure)?;
        debug!(
            "index {}: {:#x} -> offset {:#x}, {} bytes, {}",
            target.index,
            target.address,
            offset,
            instruction.len(),
            instruction.text
        );
        minimum = minimum.min(instruction.len());
    }
    Ok(minimum)
}
