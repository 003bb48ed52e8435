//! Mock RNG service and listener for exercising the strategy in tests.

use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, Symbol};

use crate::interface::{Distributor, PrizeStrategyListener, RngInterface, TokenListener};

#[contracttype]
#[derive(Clone)]
enum MockKey {
    FeeToken,
    Fee,
    LastRequest,
    Random(u32),
    Fail,
    Awarded,
    Distributed,
    Mints,
    Transfers,
    LastRandom,
    LastPeriod,
}

/// RNG whose requests complete once a test supplies the number.
#[contract]
pub struct MockRng;

#[contractimpl]
impl MockRng {
    pub fn set_fee(env: Env, fee_token: Option<Address>, fee: i128) {
        match fee_token {
            Some(token) => env.storage().instance().set(&MockKey::FeeToken, &token),
            None => env.storage().instance().remove(&MockKey::FeeToken),
        }
        env.storage().instance().set(&MockKey::Fee, &fee);
    }

    pub fn set_random_number(env: Env, request_id: u32, random_number: u128) {
        env.storage()
            .instance()
            .set(&MockKey::Random(request_id), &random_number);
    }

    pub fn last_request_id(env: Env) -> u32 {
        env.storage().instance().get(&MockKey::LastRequest).unwrap_or(0)
    }
}

#[contractimpl]
impl RngInterface for MockRng {
    fn get_request_fee(env: Env) -> (Option<Address>, i128) {
        let fee_token = env.storage().instance().get(&MockKey::FeeToken);
        let fee = env.storage().instance().get(&MockKey::Fee).unwrap_or(0);
        (fee_token, fee)
    }

    fn request_random_number(env: Env) -> (u32, u64) {
        let id = Self::last_request_id(env.clone()) + 1;
        env.storage().instance().set(&MockKey::LastRequest, &id);
        (id, env.ledger().timestamp())
    }

    fn is_request_complete(env: Env, request_id: u32) -> bool {
        env.storage().instance().has(&MockKey::Random(request_id))
    }

    fn random_number(env: Env, request_id: u32) -> u128 {
        env.storage()
            .instance()
            .get(&MockKey::Random(request_id))
            .unwrap_or(0)
    }
}

/// Counts every callback it receives. With `fail` set, every callback panics.
#[contract]
pub struct MockListener;

#[contractimpl]
impl MockListener {
    pub fn set_fail(env: Env, fail: bool) {
        env.storage().instance().set(&MockKey::Fail, &fail);
    }

    pub fn awarded(env: Env) -> u32 {
        count(&env, &MockKey::Awarded)
    }

    pub fn distributed(env: Env) -> u32 {
        count(&env, &MockKey::Distributed)
    }

    pub fn mints(env: Env) -> u32 {
        count(&env, &MockKey::Mints)
    }

    pub fn transfers(env: Env) -> u32 {
        count(&env, &MockKey::Transfers)
    }

    pub fn last_random(env: Env) -> u128 {
        env.storage().instance().get(&MockKey::LastRandom).unwrap_or(0)
    }

    pub fn last_period(env: Env) -> u64 {
        env.storage().instance().get(&MockKey::LastPeriod).unwrap_or(0)
    }
}

fn count(env: &Env, key: &MockKey) -> u32 {
    env.storage().instance().get(key).unwrap_or(0)
}

fn record(env: &Env, key: &MockKey) {
    if env.storage().instance().get(&MockKey::Fail).unwrap_or(false) {
        panic!("listener failure");
    }
    env.storage().instance().set(key, &(count(env, key) + 1));
}

#[contractimpl]
impl PrizeStrategyListener for MockListener {
    fn after_prize_pool_awarded(env: Env, random_number: u128, prize_period_started_at: u64) {
        record(&env, &MockKey::Awarded);
        env.storage().instance().set(&MockKey::LastRandom, &random_number);
        env.storage()
            .instance()
            .set(&MockKey::LastPeriod, &prize_period_started_at);
    }
}

#[contractimpl]
impl Distributor for MockListener {
    fn distribute(env: Env, _random_number: u128) {
        record(&env, &MockKey::Distributed);
    }
}

#[contractimpl]
impl TokenListener for MockListener {
    fn before_token_mint(
        env: Env,
        _to: Address,
        _amount: i128,
        _token: Symbol,
        _referrer: Option<Address>,
    ) {
        record(&env, &MockKey::Mints);
    }

    fn before_token_transfer(env: Env, _from: Address, _to: Address, _amount: i128, _token: Symbol) {
        record(&env, &MockKey::Transfers);
    }
}
