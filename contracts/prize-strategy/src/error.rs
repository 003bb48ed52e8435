use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum StrategyError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,

    // Award cycle
    PrizePeriodNotOver = 4,
    RngInFlight = 5,
    RngNotRequested = 6,
    RngNotCompleted = 7,
    RngNotTimedOut = 8,

    // Settings
    InvalidPrizePeriod = 9,
    InvalidRngTimeout = 10,
    InvalidNumberOfWinners = 11,

    // External award registry
    InvalidExternalToken = 12,
    ExternalAwardExists = 13,
    ExternalAwardNotFound = 14,
    NftNotHeld = 15,
    DuplicateTokenId = 16,

    MathOverflow = 17,
}
