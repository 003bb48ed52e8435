//! Collaborator contracts the pool talks to.

use soroban_sdk::{contractclient, Address, Env, Symbol};

/// Adapter around an external money market or vault.
///
/// An adapter serves a single pool: `supply` is called after the pool has
/// transferred the asset to the adapter, and `redeem` sends the asset back
/// to the pool.
#[contractclient(name = "YieldSourceClient")]
pub trait YieldSourceInterface {
    /// Underlying asset.
    fn token(env: Env) -> Address;
    /// Asset balance held for the pool, including accrued yield.
    fn balance(env: Env) -> i128;
    fn supply(env: Env, amount: i128);
    /// Returns the amount actually sent back.
    fn redeem(env: Env, amount: i128) -> i128;
    /// False for tokens the adapter uses internally.
    fn can_award_external(env: Env, token: Address) -> bool;
}

#[contractclient(name = "ReserveClient")]
pub trait ReserveInterface {
    fn reserve_rate_mantissa(env: Env, pool: Address) -> i128;
    fn reserve_recipient(env: Env, pool: Address) -> Address;
    fn withdraw_reserve(env: Env, pool: Address, to: Address) -> i128;
}

/// Hooks the pool fires at the prize strategy.
#[contractclient(name = "PrizeStrategyHooksClient")]
pub trait PrizeStrategyHooks {
    fn before_token_mint(
        env: Env,
        to: Address,
        amount: i128,
        token: Symbol,
        referrer: Option<Address>,
    );
    fn before_token_transfer(env: Env, from: Address, to: Address, amount: i128, token: Symbol);
}

#[contractclient(name = "NonFungibleClient")]
pub trait NonFungibleInterface {
    fn owner_of(env: Env, token_id: u64) -> Address;
    fn transfer(env: Env, from: Address, to: Address, token_id: u64);
}

