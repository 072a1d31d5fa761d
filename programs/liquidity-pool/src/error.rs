use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq)]
pub enum PoolError {
    #[error("Invalid instruction")]
    InvalidInstruction = 0,

    #[error("Invalid PDA")]
    InvalidPda = 1,

    #[error("Pool already exists for this pair")]
    DuplicatePool = 2,

    #[error("Both sides of the pair use the same mint")]
    IdenticalMints = 3,

    #[error("Fee rate must be below 10000 basis points")]
    InvalidFeeRate = 4,

    #[error("Vault or share mint does not belong to this pool")]
    VaultMismatch = 5,

    #[error("Pool has no liquidity")]
    PoolEmpty = 6,

    #[error("Deposit would mint zero shares")]
    ZeroLiquidityMinted = 7,

    #[error("Insufficient shares")]
    InsufficientShares = 8,

    #[error("Insufficient liquidity")]
    InsufficientLiquidity = 9,

    #[error("Slippage tolerance exceeded")]
    SlippageExceeded = 10,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 11,
}

impl PrintProgramError for PoolError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("PoolError: {}", self);
    }
}

impl From<PoolError> for ProgramError {
    fn from(e: PoolError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for PoolError {
    fn type_of() -> &'static str {
        "PoolError"
    }
}
