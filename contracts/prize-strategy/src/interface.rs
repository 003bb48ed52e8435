//! Contracts the strategy drives or notifies.

use soroban_sdk::{contractclient, Address, Env, Symbol, Vec};

/// The slice of the prize pool the strategy needs.
#[contractclient(name = "PoolClient")]
pub trait PrizePoolInterface {
    fn capture_award_balance(env: Env) -> i128;
    fn award(env: Env, to: Address, amount: i128, controlled_token: Symbol);
    fn award_external_erc20(env: Env, to: Address, external_token: Address, amount: i128);
    fn award_external_erc721(env: Env, to: Address, external_token: Address, token_ids: Vec<u64>);
    fn draw(env: Env, controlled_token: Symbol, random_number: u128) -> Option<Address>;
    fn can_award_external(env: Env, external_token: Address) -> bool;
}

/// Asynchronous randomness service. A request is issued once and polled
/// until complete.
#[contractclient(name = "RngClient")]
pub trait RngInterface {
    /// Fee token (if any) and amount charged per request.
    fn get_request_fee(env: Env) -> (Option<Address>, i128);
    /// Returns the request id and the timestamp the result is locked to.
    fn request_random_number(env: Env) -> (u32, u64);
    fn is_request_complete(env: Env, request_id: u32) -> bool;
    fn random_number(env: Env, request_id: u32) -> u128;
}

#[contractclient(name = "ListenerClient")]
pub trait PrizeStrategyListener {
    fn after_prize_pool_awarded(env: Env, random_number: u128, prize_period_started_at: u64);
}

#[contractclient(name = "DistributorClient")]
pub trait Distributor {
    fn distribute(env: Env, random_number: u128);
}

/// Receives the pool's token hooks after the strategy has vetted them.
#[contractclient(name = "TokenListenerClient")]
pub trait TokenListener {
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
}
