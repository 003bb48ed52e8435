use soroban_sdk::{contracttype, Address, Env, Symbol, Vec};

use crate::credit::{CreditBalance, CreditPlan};
use crate::error::PoolError;

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub(crate) const ACCOUNT_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub(crate) const ACCOUNT_LIFETIME_THRESHOLD: u32 = ACCOUNT_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner,
    Token,
    YieldSource,
    Reserve,
    PrizeStrategy,
    LiquidityCap,
    MaxExitFeeMantissa,
    MaxTimelockDuration,
    AwardCaptureThreshold,
    Totals,
    ControlledTokens,
    TotalSupply(Symbol),
    Balance(Symbol, Address),
    CreditPlan(Symbol),
    CreditBalance(Symbol, Address),
    Timelock(Address),
    /// Number of slots in a class's draw index.
    DrawSize(Symbol),
    /// Fenwick node value.
    DrawNode(Symbol, u32),
    DrawSlot(Symbol, Address),
    DrawAccount(Symbol, u32),
    /// Released slots waiting to be reassigned.
    DrawFree(Symbol),
}

/// Settings supplied once at `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    pub owner: Address,
    pub yield_source: Address,
    pub reserve: Option<Address>,
    /// Controlled token classes, e.g. `ticket` and `sponsor`.
    pub controlled_tokens: Vec<Symbol>,
    /// Upper bound on any early-exit fee, as a fraction of the withdrawn amount.
    pub max_exit_fee_mantissa: i128,
    pub max_timelock_duration: u64,
}

/// Pool-wide bookkeeping claims against the yield source balance.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolTotals {
    /// Captured yield waiting to be awarded.
    pub award_balance: i128,
    pub reserve_total_supply: i128,
    pub timelock_total_supply: i128,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TimelockBalance {
    pub amount: i128,
    pub unlock_timestamp: u64,
}

pub(crate) fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub(crate) fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Owner)
}

pub(crate) fn read_owner(env: &Env) -> Result<Address, PoolError> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(PoolError::NotInitialized)
}

pub(crate) fn write_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
}

pub(crate) fn read_token(env: &Env) -> Result<Address, PoolError> {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(PoolError::NotInitialized)
}

pub(crate) fn read_yield_source(env: &Env) -> Result<Address, PoolError> {
    env.storage()
        .instance()
        .get(&DataKey::YieldSource)
        .ok_or(PoolError::NotInitialized)
}

pub(crate) fn read_reserve(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Reserve)
}

pub(crate) fn write_reserve(env: &Env, reserve: &Option<Address>) {
    match reserve {
        Some(reserve) => env.storage().instance().set(&DataKey::Reserve, reserve),
        None => env.storage().instance().remove(&DataKey::Reserve),
    }
}

pub(crate) fn read_prize_strategy(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::PrizeStrategy)
}

pub(crate) fn read_liquidity_cap(env: &Env) -> Option<i128> {
    env.storage().instance().get(&DataKey::LiquidityCap)
}

pub(crate) fn read_max_exit_fee_mantissa(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::MaxExitFeeMantissa)
        .unwrap_or(0)
}

pub(crate) fn read_max_timelock_duration(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::MaxTimelockDuration)
        .unwrap_or(0)
}

pub(crate) fn read_award_capture_threshold(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::AwardCaptureThreshold)
        .unwrap_or(0)
}

pub(crate) fn read_totals(env: &Env) -> PoolTotals {
    env.storage()
        .instance()
        .get(&DataKey::Totals)
        .unwrap_or_default()
}

pub(crate) fn write_totals(env: &Env, totals: &PoolTotals) {
    env.storage().instance().set(&DataKey::Totals, totals);
}

// ──────────────────────────────────────────
//  Controlled tokens
// ──────────────────────────────────────────

pub(crate) fn read_controlled_tokens(env: &Env) -> Vec<Symbol> {
    env.storage()
        .instance()
        .get(&DataKey::ControlledTokens)
        .unwrap_or_else(|| Vec::new(env))
}

pub(crate) fn write_controlled_tokens(env: &Env, tokens: &Vec<Symbol>) {
    env.storage()
        .instance()
        .set(&DataKey::ControlledTokens, tokens);
}

pub(crate) fn require_controlled_token(env: &Env, class: &Symbol) -> Result<(), PoolError> {
    if read_controlled_tokens(env).contains(class) {
        Ok(())
    } else {
        Err(PoolError::InvalidControlledToken)
    }
}

pub(crate) fn read_total_supply(env: &Env, class: &Symbol) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalSupply(class.clone()))
        .unwrap_or(0)
}

pub(crate) fn write_total_supply(env: &Env, class: &Symbol, amount: i128) {
    env.storage()
        .instance()
        .set(&DataKey::TotalSupply(class.clone()), &amount);
}

/// Sum of every controlled token's total supply.
pub(crate) fn read_controlled_supply(env: &Env) -> Result<i128, PoolError> {
    let mut total: i128 = 0;
    for class in read_controlled_tokens(env).iter() {
        total = total
            .checked_add(read_total_supply(env, &class))
            .ok_or(PoolError::MathOverflow)?;
    }
    Ok(total)
}

pub(crate) fn read_balance(env: &Env, class: &Symbol, user: &Address) -> i128 {
    let key = DataKey::Balance(class.clone(), user.clone());
    persistent_get(env, &key).unwrap_or(0)
}

pub(crate) fn write_balance(env: &Env, class: &Symbol, user: &Address, amount: i128) {
    let key = DataKey::Balance(class.clone(), user.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        persistent_set(env, &key, &amount);
    }
}

// ──────────────────────────────────────────
//  Credit
// ──────────────────────────────────────────

pub(crate) fn read_credit_plan(env: &Env, class: &Symbol) -> CreditPlan {
    env.storage()
        .instance()
        .get(&DataKey::CreditPlan(class.clone()))
        .unwrap_or_default()
}

pub(crate) fn write_credit_plan(env: &Env, class: &Symbol, plan: &CreditPlan) {
    env.storage()
        .instance()
        .set(&DataKey::CreditPlan(class.clone()), plan);
}

pub(crate) fn read_credit_balance(
    env: &Env,
    class: &Symbol,
    user: &Address,
) -> Option<CreditBalance> {
    persistent_get(env, &DataKey::CreditBalance(class.clone(), user.clone()))
}

pub(crate) fn write_credit_balance(
    env: &Env,
    class: &Symbol,
    user: &Address,
    credit: &CreditBalance,
) {
    persistent_set(
        env,
        &DataKey::CreditBalance(class.clone(), user.clone()),
        credit,
    );
}

// ──────────────────────────────────────────
//  Timelocks
// ──────────────────────────────────────────

pub(crate) fn read_timelock(env: &Env, user: &Address) -> TimelockBalance {
    persistent_get(env, &DataKey::Timelock(user.clone())).unwrap_or_default()
}

pub(crate) fn write_timelock(env: &Env, user: &Address, timelock: &TimelockBalance) {
    let key = DataKey::Timelock(user.clone());
    if timelock.amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        persistent_set(env, &key, timelock);
    }
}

// ──────────────────────────────────────────
//  Persistent helpers
// ──────────────────────────────────────────

pub(crate) fn persistent_get<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(key, ACCOUNT_LIFETIME_THRESHOLD, ACCOUNT_BUMP_AMOUNT);
    }
    value
}

pub(crate) fn persistent_set<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, ACCOUNT_LIFETIME_THRESHOLD, ACCOUNT_BUMP_AMOUNT);
}
