use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,

    // Controlled tokens
    InvalidControlledToken = 4,
    ControlledTokenExists = 5,
    InvalidAmount = 6,
    InsufficientFunds = 7,
    TransferRejected = 8,

    // Policy
    ExceedsLiquidityCap = 9,
    ExitFeeExceedsMaximum = 10,
    InvalidMantissa = 11,

    // Awards
    PrizeStrategyNotSet = 12,
    AwardExceedsAvailable = 13,
    InvalidExternalToken = 14,

    ReserveNotSet = 15,
    MathOverflow = 16,
}
