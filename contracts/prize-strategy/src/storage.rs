use soroban_sdk::{contracttype, Address, Env, Symbol, Vec};

use crate::error::StrategyError;

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Shortest RNG request timeout an owner may configure, in seconds.
pub const MIN_RNG_REQUEST_TIMEOUT: u64 = 60;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner,
    PrizePool,
    Ticket,
    Rng,
    RngRequestTimeout,
    NumberOfWinners,
    SplitExternalErc20Awards,
    AwardState,
    /// Outstanding RNG request; absent while no award is in progress.
    RngRequest,
    Listener,
    TokenListener,
    Distributor,
    ExternalErc20Awards,
    ExternalErc721Awards,
    /// Token ids registered for one non-fungible award token.
    ExternalErc721TokenIds(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyConfig {
    pub owner: Address,
    pub prize_pool: Address,
    /// Controlled token class the draw runs over and prizes are minted in.
    pub ticket: Symbol,
    pub rng: Address,
    pub prize_period_start: u64,
    pub prize_period_seconds: u64,
    pub number_of_winners: u32,
    pub split_external_erc20_awards: bool,
    pub rng_request_timeout: u64,
}

/// Outstanding randomness request.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RngRequest {
    pub id: u32,
    pub lock_timestamp: u64,
    pub requested_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AwardState {
    pub prize_period_started_at: u64,
    pub prize_period_seconds: u64,
}

impl AwardState {
    pub fn prize_period_end_at(&self) -> u64 {
        self.prize_period_started_at
            .saturating_add(self.prize_period_seconds)
    }

    pub fn is_prize_period_over(&self, now: u64) -> bool {
        now >= self.prize_period_end_at()
    }

    pub fn prize_period_remaining_seconds(&self, now: u64) -> u64 {
        self.prize_period_end_at().saturating_sub(now)
    }

    /// Latest period boundary at or before `now`. Periods stay aligned to
    /// multiples of the period length even when an award completes late.
    pub fn next_prize_period_start(&self, now: u64) -> u64 {
        if self.prize_period_seconds == 0 {
            return now;
        }
        let elapsed = now.saturating_sub(self.prize_period_started_at) / self.prize_period_seconds;
        self.prize_period_started_at + elapsed * self.prize_period_seconds
    }

}

impl RngRequest {
    pub fn is_timed_out(&self, now: u64, timeout: u64) -> bool {
        now > self.requested_at.saturating_add(timeout)
    }
}

pub(crate) fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub(crate) fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Owner)
}

fn read_required<T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>>(
    env: &Env,
    key: &DataKey,
) -> Result<T, StrategyError> {
    env.storage()
        .instance()
        .get(key)
        .ok_or(StrategyError::NotInitialized)
}

pub(crate) fn read_owner(env: &Env) -> Result<Address, StrategyError> {
    read_required(env, &DataKey::Owner)
}

pub(crate) fn write_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
}

pub(crate) fn read_prize_pool(env: &Env) -> Result<Address, StrategyError> {
    read_required(env, &DataKey::PrizePool)
}

pub(crate) fn read_ticket(env: &Env) -> Result<Symbol, StrategyError> {
    read_required(env, &DataKey::Ticket)
}

pub(crate) fn read_rng(env: &Env) -> Result<Address, StrategyError> {
    read_required(env, &DataKey::Rng)
}

pub(crate) fn read_rng_request_timeout(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::RngRequestTimeout)
        .unwrap_or(0)
}

pub(crate) fn read_number_of_winners(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::NumberOfWinners)
        .unwrap_or(1)
}

pub(crate) fn read_split_external_erc20_awards(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::SplitExternalErc20Awards)
        .unwrap_or(false)
}

pub(crate) fn read_award_state(env: &Env) -> Result<AwardState, StrategyError> {
    read_required(env, &DataKey::AwardState)
}

pub(crate) fn write_award_state(env: &Env, state: &AwardState) {
    env.storage().instance().set(&DataKey::AwardState, state);
}

pub(crate) fn read_rng_request(env: &Env) -> Option<RngRequest> {
    env.storage().instance().get(&DataKey::RngRequest)
}

pub(crate) fn write_rng_request(env: &Env, request: &RngRequest) {
    env.storage().instance().set(&DataKey::RngRequest, request);
}

pub(crate) fn clear_rng_request(env: &Env) {
    env.storage().instance().remove(&DataKey::RngRequest);
}

/// Optional collaborator address; `None` clears it.
pub(crate) fn read_optional(env: &Env, key: &DataKey) -> Option<Address> {
    env.storage().instance().get(key)
}

pub(crate) fn write_optional(env: &Env, key: &DataKey, value: &Option<Address>) {
    match value {
        Some(address) => env.storage().instance().set(key, address),
        None => env.storage().instance().remove(key),
    }
}

// ──────────────────────────────────────────
//  External award registry
// ──────────────────────────────────────────

pub(crate) fn read_address_list(env: &Env, key: &DataKey) -> Vec<Address> {
    env.storage()
        .instance()
        .get(key)
        .unwrap_or_else(|| Vec::new(env))
}

pub(crate) fn write_address_list(env: &Env, key: &DataKey, list: &Vec<Address>) {
    if list.is_empty() {
        env.storage().instance().remove(key);
    } else {
        env.storage().instance().set(key, list);
    }
}

pub(crate) fn read_token_ids(env: &Env, token: &Address) -> Vec<u64> {
    env.storage()
        .instance()
        .get(&DataKey::ExternalErc721TokenIds(token.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub(crate) fn write_token_ids(env: &Env, token: &Address, ids: &Vec<u64>) {
    let key = DataKey::ExternalErc721TokenIds(token.clone());
    if ids.is_empty() {
        env.storage().instance().remove(&key);
    } else {
        env.storage().instance().set(&key, ids);
    }
}
