use std::io;

/// Error taxonomy for every fallible operation in this crate.
///
/// One variant per error kind in the specification: each carries enough
/// context to explain itself without the caller needing to inspect an
/// `io::ErrorKind`.
#[derive(thiserror::Error, Debug)]
pub enum BusError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("invalid topic config: {0}")]
    InvalidConfig(String),

    #[error("region too small: need at least {needed} bytes, have {have}")]
    OutOfSpace { needed: u64, have: u64 },

    /// Present for taxonomy completeness (spec §7's `AlreadyExists` row);
    /// `region::build` never constructs it — a concurrent creator racing us
    /// to the same path is reported as `BuildOutcome::Exists`, not an error,
    /// since callers should attach instead of failing.
    #[error("region already exists at this path")]
    AlreadyExists,

    #[error("io error: {0}")]
    IoError(#[from] io::Error),

    #[error("payload too large: {len} bytes exceeds slot capacity {capacity}")]
    PayloadTooLarge { len: usize, capacity: usize },

    #[error("publish timed out after {iterations} spin iterations")]
    Timeout { iterations: u32 },

    /// No message currently available. Not logged as an error; returned as a
    /// normal, expected outcome of `Subscriber::next`.
    #[error("no message available")]
    Empty,

    #[error("caller buffer too small: message is {needed} bytes, buffer is {have}")]
    Truncated { needed: usize, have: usize },
}

pub type Result<T> = std::result::Result<T, BusError>;
