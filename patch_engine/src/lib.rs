//! Instruction-boundary-safe patching of x86-64 module images.
//!
//! This crate provides the pieces for overwriting selected instructions
//! inside a raw binary image with a caller-supplied payload:
//! - Decoding a single instruction at an image offset ([`decode_one`])
//! - Translating disassembler addresses to image offsets ([`translate`])
//! - Selecting targets from an address list with exclusions ([`select`])
//! - Computing the payload size ceiling across targets ([`minimum_patch_len`])
//! - Writing payload plus NOP padding into each target span ([`apply_payload`])
//!
//! Every write stays within the byte span of one original instruction;
//! the unused tail of each span is filled with single-byte NOPs so the
//! instruction stream never ends up split mid-instruction.

pub mod apply;
pub mod decoder;
pub mod error;
pub mod plan;
pub mod targets;
pub mod translate;

pub use apply::{apply_payload, NOP};
pub use decoder::{decode_one, DecodedInstruction};
pub use error::{PatchError, Result};
pub use plan::minimum_patch_len;
pub use targets::{select, Exclusions, Target};
pub use translate::translate;
