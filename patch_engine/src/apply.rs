//! Patch application: writing payload bytes into target spans.

use log::debug;

use crate::decoder::decode_one;
use crate::error::{PatchError, Result};
use crate::targets::Target;
use crate::translate::translate;

/// Single-byte x86 no-op used to pad each span out to its own length.
pub const NOP: u8 = 0x90;

/// Overwrite every target's instruction span with the payload followed
/// by NOP padding.
///
/// `minimum_len` is the ceiling computed by the planner; a payload
/// longer than that is rejected before any byte is written. Each target
/// is re-decoded so the padding reaches that instruction's own length,
/// not the global minimum. Bytes outside the target spans are never
/// touched and the image length never changes.
///
/// Target spans are assumed to be disjoint; overlapping spans are a
/// caller error and are not detected.
pub fn apply_payload(
    image: &mut [u8],
    targets: &[Target],
    magic_offset: i64,
    payload: &[u8],
    minimum_len: usize,
) -> Result<()> {
    if payload.len() > minimum_len {
        return Err(PatchError::PayloadTooLarge {
            len: payload.len(),
            max: minimum_len,
        });
    }

    for target in targets {
        let decode_failure = PatchError::DecodeFailure {
            index: target.index,
            address: target.address,
        };
        let offset = translate(target.address, magic_offset).ok_or(decode_failure.clone())?;
        let len = decode_one(image, offset).ok_or(decode_failure)?.len();

        let span = &mut image[offset..offset + len];
        span[..payload.len()].copy_from_slice(payload);
        span[payload.len()..].fill(NOP);
        debug!(
            "index {}: wrote {} payload byte(s) + {} NOP(s) at offset {:#x}",
            target.index,
            payload.len(),
            len - payload.len(),
            offset
        );
    }
    Ok(())
}
