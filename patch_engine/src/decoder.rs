//! Glue around the iced-x86 decoder.
//!
//! The rest of the crate only ever needs one instruction at a time: the
//! one starting at a translated image offset. This module hides the
//! decoder setup behind [`decode_one`] and hands back the raw bytes and
//! the formatted text of exactly that instruction.

use iced_x86::{Decoder, DecoderOptions, FastFormatter};

/// One decoded x86-64 instruction: its exact bytes and its textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub bytes: Vec<u8>,
    pub text: String,
}

impl DecodedInstruction {
    /// Byte length of the instruction as encoded in the image.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decode exactly one instruction beginning at `offset` within `image`.
///
/// Returns `None` when `offset` is past the end of the image or when no
/// valid instruction starts there (including instructions truncated by
/// the end of the buffer).
pub fn decode_one(image: &[u8], offset: usize) -> Option<DecodedInstruction> {
    if offset >= image.len() {
        return None;
    }

    let mut decoder = Decoder::with_ip(64, &image[offset..], offset as u64, DecoderOptions::NONE);
    if !decoder.can_decode() {
        return None;
    }
    let instruction = decoder.decode();
    if instruction.is_invalid() {
        return None;
    }

    let mut text = String::new();
    FastFormatter::new().format(&instruction, &mut text);

    Some(DecodedInstruction {
        bytes: image[offset..offset + instruction.len()].to_vec(),
        text,
    })
}
