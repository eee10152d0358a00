//! Disassembler address to image offset translation.

/// Convert a virtual address from the disassembler into a byte offset
/// into the loaded image by applying the signed magic offset.
///
/// Returns `None` when the adjusted offset is negative; such an offset
/// can never decode, so callers report it as a decode failure. Offsets
/// at or past the image end are not rejected here, the decoder detects
/// those.
pub fn translate(virtual_address: u64, magic_offset: i64) -> Option<usize> {
    let offset = virtual_address as i128 + magic_offset as i128;
    usize::try_from(offset).ok()
}
