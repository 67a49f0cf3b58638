use thiserror::Error;

#[derive(Error, Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
/// Error codes for the reserve model. Common errors match up with the codes used by the
/// pool contracts. Model specific errors start at 1200.
pub enum ModelError {
    // Common Errors
    #[error("arithmetic overflow")]
    Overflow = 12,
    #[error("division by zero")]
    DivisionByZero = 13,

    // Model Errors (start at 1200)
    #[error("invariant violation")]
    InvariantViolation = 1200,
    #[error("bad request")]
    BadRequest = 1201,
    #[error("invalid reserve config")]
    InvalidReserveConfig = 1202,
    #[error("reserve not found")]
    ReserveNotFound = 1203,
    #[error("unbacked mint cap exceeded")]
    UnbackedMintCapExceeded = 1204,
}

impl ModelError {
    /// The stable numeric code for the error
    pub fn code(&self) -> u32 {
        *self as u32
    }
}
