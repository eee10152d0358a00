use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("no valid instruction at address {address:#x} (target index {index})")]
    DecodeFailure { index: usize, address: u64 },
    #[error("payload is {len} bytes but the smallest target instruction is {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("no targets remain after exclusions")]
    EmptyTargetSet,
    #[error("index {index} is out of bounds for an address list of {len} entries")]
    InvalidIndex { index: usize, len: usize },
}

pub type Result<T> = core::result::Result<T, PatchError>;
