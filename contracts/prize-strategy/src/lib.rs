#![no_std]

//! Periodic Prize Strategy Contract
//!
//! Runs the award cycle of a prize pool. Once a prize period has elapsed
//! anyone may request randomness; when the RNG service answers, anyone may
//! complete the award, which captures the pool's interest, draws the winners
//! by ticket balance and has the pool mint the prize to them. Ticket
//! transfers are refused while a request is outstanding so balances cannot
//! shift between the request and the draw.

mod award;
mod error;
mod events;
pub mod interface;
mod storage;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use error::StrategyError;
pub use storage::{AwardState, RngRequest, StrategyConfig, MIN_RNG_REQUEST_TIMEOUT};

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Symbol, Vec};

use interface::{
    DistributorClient, ListenerClient, NonFungibleClient, PoolClient, RngClient, TokenListenerClient,
};
use storage::DataKey;

#[contract]
pub struct PeriodicPrizeStrategy;

#[contractimpl]
impl PeriodicPrizeStrategy {
    pub fn initialize(
        env: Env,
        config: StrategyConfig,
        external_erc20_awards: Vec<Address>,
    ) -> Result<(), StrategyError> {
        if storage::is_initialized(&env) {
            return Err(StrategyError::AlreadyInitialized);
        }
        config.owner.require_auth();
        require_prize_period(config.prize_period_seconds)?;
        require_rng_timeout(config.rng_request_timeout)?;
        require_number_of_winners(config.number_of_winners)?;

        let instance = env.storage().instance();
        storage::write_owner(&env, &config.owner);
        instance.set(&DataKey::PrizePool, &config.prize_pool);
        instance.set(&DataKey::Ticket, &config.ticket);
        instance.set(&DataKey::Rng, &config.rng);
        instance.set(&DataKey::RngRequestTimeout, &config.rng_request_timeout);
        instance.set(&DataKey::NumberOfWinners, &config.number_of_winners);
        instance.set(
            &DataKey::SplitExternalErc20Awards,
            &config.split_external_erc20_awards,
        );
        storage::write_award_state(
            &env,
            &AwardState {
                prize_period_started_at: config.prize_period_start,
                prize_period_seconds: config.prize_period_seconds,
            },
        );
        storage::extend_instance(&env);

        for external in external_erc20_awards.iter() {
            add_external_erc20(&env, &external)?;
        }

        log!(
            &env,
            "Strategy initialized: pool={} | period: {}s from {}",
            config.prize_pool,
            config.prize_period_seconds,
            config.prize_period_start
        );
        Ok(())
    }

    // ──────────────────────────────────────────
    //  Award cycle
    // ──────────────────────────────────────────

    pub fn can_start_award(env: Env) -> Result<bool, StrategyError> {
        let state = storage::read_award_state(&env)?;
        Ok(state.is_prize_period_over(env.ledger().timestamp())
            && storage::read_rng_request(&env).is_none())
    }

    /// Requests randomness for the elapsed period, paying the RNG fee out of
    /// this contract's own balance.
    pub fn start_award(env: Env) -> Result<u32, StrategyError> {
        storage::extend_instance(&env);
        let state = storage::read_award_state(&env)?;
        let now = env.ledger().timestamp();
        if !state.is_prize_period_over(now) {
            return Err(StrategyError::PrizePeriodNotOver);
        }
        if storage::read_rng_request(&env).is_some() {
            return Err(StrategyError::RngInFlight);
        }

        let rng_address = storage::read_rng(&env)?;
        let rng = RngClient::new(&env, &rng_address);
        let (fee_token, fee) = rng.get_request_fee();
        if let Some(fee_token) = fee_token {
            if fee > 0 {
                token::Client::new(&env, &fee_token).transfer(
                    &env.current_contract_address(),
                    &rng_address,
                    &fee,
                );
            }
        }
        let (id, lock_timestamp) = rng.request_random_number();

        storage::write_rng_request(
            &env,
            &RngRequest {
                id,
                lock_timestamp,
                requested_at: now,
            },
        );

        events::award_started(&env, id, lock_timestamp);
        log!(&env, "Award started: rng request {} | lock: {}", id, lock_timestamp);
        Ok(id)
    }

    pub fn can_complete_award(env: Env) -> Result<bool, StrategyError> {
        match storage::read_rng_request(&env) {
            Some(request) => is_request_complete(&env, request.id),
            None => Ok(false),
        }
    }

    /// Draws the winners with the delivered random number, mints their prize
    /// and opens the next prize period.
    pub fn complete_award(env: Env) -> Result<Vec<Address>, StrategyError> {
        storage::extend_instance(&env);
        let mut state = storage::read_award_state(&env)?;
        let request = storage::read_rng_request(&env).ok_or(StrategyError::RngNotRequested)?;
        if !is_request_complete(&env, request.id)? {
            return Err(StrategyError::RngNotCompleted);
        }

        let random_number = RngClient::new(&env, &storage::read_rng(&env)?).random_number(&request.id);
        let awarded_period = state.prize_period_started_at;

        storage::clear_rng_request(&env);

        let distribution = award::distribute(&env, random_number)?;

        let now = env.ledger().timestamp();
        state.prize_period_started_at = state.next_prize_period_start(now);
        storage::write_award_state(&env, &state);

        events::awarded(&env, random_number, &distribution.winners, distribution.prize_share);
        events::period_opened(&env, state.prize_period_started_at);
        log!(
            &env,
            "Award completed: {} winners | prize each: {} | next period from {}",
            distribution.winners.len(),
            distribution.prize_share,
            state.prize_period_started_at
        );

        notify_listeners(&env, random_number, awarded_period);
        Ok(distribution.winners)
    }

    /// Drops an RNG request that outlived the timeout. Nothing is awarded;
    /// the interest is captured again by the next award.
    pub fn cancel_award(env: Env) -> Result<(), StrategyError> {
        storage::extend_instance(&env);
        storage::read_award_state(&env)?;
        let request = storage::read_rng_request(&env).ok_or(StrategyError::RngNotRequested)?;
        let now = env.ledger().timestamp();
        if !request.is_timed_out(now, storage::read_rng_request_timeout(&env)) {
            return Err(StrategyError::RngNotTimedOut);
        }
        storage::clear_rng_request(&env);

        events::award_cancelled(&env, request.id, request.lock_timestamp);
        log!(&env, "Award cancelled: rng request {} timed out", request.id);
        Ok(())
    }

    pub fn is_rng_requested(env: Env) -> Result<bool, StrategyError> {
        storage::read_award_state(&env)?;
        Ok(storage::read_rng_request(&env).is_some())
    }

    pub fn is_rng_completed(env: Env) -> Result<bool, StrategyError> {
        storage::read_award_state(&env)?;
        match storage::read_rng_request(&env) {
            Some(request) => is_request_complete(&env, request.id),
            None => Ok(false),
        }
    }

    pub fn is_rng_timed_out(env: Env) -> Result<bool, StrategyError> {
        storage::read_award_state(&env)?;
        let timeout = storage::read_rng_request_timeout(&env);
        Ok(storage::read_rng_request(&env)
            .map(|request| request.is_timed_out(env.ledger().timestamp(), timeout))
            .unwrap_or(false))
    }

    // ──────────────────────────────────────────
    //  Prize period
    // ──────────────────────────────────────────

    pub fn prize_period_remaining_seconds(env: Env) -> Result<u64, StrategyError> {
        let state = storage::read_award_state(&env)?;
        Ok(state.prize_period_remaining_seconds(env.ledger().timestamp()))
    }

    pub fn is_prize_period_over(env: Env) -> Result<bool, StrategyError> {
        let state = storage::read_award_state(&env)?;
        Ok(state.is_prize_period_over(env.ledger().timestamp()))
    }

    pub fn prize_period_end_at(env: Env) -> Result<u64, StrategyError> {
        Ok(storage::read_award_state(&env)?.prize_period_end_at())
    }

    pub fn next_prize_period_start_time(
        env: Env,
        current_time: u64,
    ) -> Result<u64, StrategyError> {
        Ok(storage::read_award_state(&env)?.next_prize_period_start(current_time))
    }

    pub fn get_last_rng_request_id(env: Env) -> Result<u32, StrategyError> {
        storage::read_award_state(&env)?;
        Ok(storage::read_rng_request(&env).map(|request| request.id).unwrap_or(0))
    }

    pub fn get_last_rng_lock_timestamp(env: Env) -> Result<u64, StrategyError> {
        storage::read_award_state(&env)?;
        Ok(storage::read_rng_request(&env)
            .map(|request| request.lock_timestamp)
            .unwrap_or(0))
    }

    pub fn award_state(env: Env) -> Result<AwardState, StrategyError> {
        storage::read_award_state(&env)
    }

    // ──────────────────────────────────────────
    //  Pool hooks
    // ──────────────────────────────────────────

    pub fn before_token_mint(
        env: Env,
        to: Address,
        amount: i128,
        token: Symbol,
        referrer: Option<Address>,
    ) -> Result<(), StrategyError> {
        storage::read_prize_pool(&env)?.require_auth();
        if let Some(listener) = storage::read_optional(&env, &DataKey::TokenListener) {
            let result = TokenListenerClient::new(&env, &listener)
                .try_before_token_mint(&to, &amount, &token, &referrer);
            if result.is_err() {
                log!(&env, "WARN: token listener rejected mint to {}", to);
            }
        }
        Ok(())
    }

    /// Refuses ticket transfers while an award is in progress.
    pub fn before_token_transfer(
        env: Env,
        from: Address,
        to: Address,
        amount: i128,
        token: Symbol,
    ) -> Result<(), StrategyError> {
        storage::read_prize_pool(&env)?.require_auth();
        if token == storage::read_ticket(&env)? && storage::read_rng_request(&env).is_some() {
            return Err(StrategyError::RngInFlight);
        }
        if let Some(listener) = storage::read_optional(&env, &DataKey::TokenListener) {
            let result = TokenListenerClient::new(&env, &listener)
                .try_before_token_transfer(&from, &to, &amount, &token);
            if result.is_err() {
                log!(&env, "WARN: token listener rejected transfer from {}", from);
            }
        }
        Ok(())
    }

    // ──────────────────────────────────────────
    //  External award registry
    // ──────────────────────────────────────────

    /// Registers a fungible token held by the pool as an extra prize.
    /// `caller` must be the owner or the listener.
    pub fn add_external_erc20_award(
        env: Env,
        caller: Address,
        external_token: Address,
    ) -> Result<(), StrategyError> {
        require_owner_or_listener(&env, &caller)?;
        require_award_not_in_progress(&env)?;
        add_external_erc20(&env, &external_token)
    }

    pub fn remove_external_erc20_award(env: Env, external_token: Address) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        let mut tokens = storage::read_address_list(&env, &DataKey::ExternalErc20Awards);
        let index = tokens
            .first_index_of(&external_token)
            .ok_or(StrategyError::ExternalAwardNotFound)?;
        tokens.remove(index);
        storage::write_address_list(&env, &DataKey::ExternalErc20Awards, &tokens);
        events::external_award_removed(&env, &external_token);
        Ok(())
    }

    /// Registers non-fungible token ids already held by the pool.
    /// `caller` must be the owner or the listener.
    pub fn add_external_erc721_award(
        env: Env,
        caller: Address,
        external_token: Address,
        token_ids: Vec<u64>,
    ) -> Result<(), StrategyError> {
        require_owner_or_listener(&env, &caller)?;
        require_award_not_in_progress(&env)?;
        let pool_address = storage::read_prize_pool(&env)?;
        if !PoolClient::new(&env, &pool_address).can_award_external(&external_token) {
            return Err(StrategyError::InvalidExternalToken);
        }

        let nft = NonFungibleClient::new(&env, &external_token);
        let mut ids = storage::read_token_ids(&env, &external_token);
        for token_id in token_ids.iter() {
            if nft.owner_of(&token_id) != pool_address {
                return Err(StrategyError::NftNotHeld);
            }
            if ids.contains(token_id) {
                return Err(StrategyError::DuplicateTokenId);
            }
            ids.push_back(token_id);
        }
        storage::write_token_ids(&env, &external_token, &ids);

        let mut tokens = storage::read_address_list(&env, &DataKey::ExternalErc721Awards);
        if !tokens.contains(&external_token) {
            tokens.push_back(external_token.clone());
            storage::write_address_list(&env, &DataKey::ExternalErc721Awards, &tokens);
        }
        events::external_nft_added(&env, &external_token, &token_ids);
        Ok(())
    }

    pub fn remove_external_erc721_award(env: Env, external_token: Address) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        let mut tokens = storage::read_address_list(&env, &DataKey::ExternalErc721Awards);
        let index = tokens
            .first_index_of(&external_token)
            .ok_or(StrategyError::ExternalAwardNotFound)?;
        tokens.remove(index);
        storage::write_address_list(&env, &DataKey::ExternalErc721Awards, &tokens);
        storage::write_token_ids(&env, &external_token, &Vec::new(&env));
        events::external_award_removed(&env, &external_token);
        Ok(())
    }

    pub fn get_external_erc20_awards(env: Env) -> Vec<Address> {
        storage::read_address_list(&env, &DataKey::ExternalErc20Awards)
    }

    pub fn get_external_erc721_awards(env: Env) -> Vec<Address> {
        storage::read_address_list(&env, &DataKey::ExternalErc721Awards)
    }

    pub fn get_erc721_award_token_ids(env: Env, external_token: Address) -> Vec<u64> {
        storage::read_token_ids(&env, &external_token)
    }

    // ──────────────────────────────────────────
    //  Owner settings
    // ──────────────────────────────────────────

    pub fn set_rng_service(env: Env, rng: Address) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        env.storage().instance().set(&DataKey::Rng, &rng);
        log!(&env, "RNG service set: {}", rng);
        Ok(())
    }

    pub fn set_rng_request_timeout(env: Env, rng_request_timeout: u64) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        require_rng_timeout(rng_request_timeout)?;
        env.storage()
            .instance()
            .set(&DataKey::RngRequestTimeout, &rng_request_timeout);
        Ok(())
    }

    /// Takes effect from the current period's start.
    pub fn set_prize_period_seconds(env: Env, prize_period_seconds: u64) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        require_prize_period(prize_period_seconds)?;
        let mut state = storage::read_award_state(&env)?;
        state.prize_period_seconds = prize_period_seconds;
        storage::write_award_state(&env, &state);
        log!(&env, "Prize period set: {}s", prize_period_seconds);
        Ok(())
    }

    pub fn set_number_of_winners(env: Env, number_of_winners: u32) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        require_number_of_winners(number_of_winners)?;
        env.storage()
            .instance()
            .set(&DataKey::NumberOfWinners, &number_of_winners);
        Ok(())
    }

    pub fn set_split_external_erc20_awards(env: Env, split: bool) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::SplitExternalErc20Awards, &split);
        Ok(())
    }

    pub fn set_listener(env: Env, listener: Option<Address>) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        storage::write_optional(&env, &DataKey::Listener, &listener);
        Ok(())
    }

    pub fn set_token_listener(env: Env, token_listener: Option<Address>) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        storage::write_optional(&env, &DataKey::TokenListener, &token_listener);
        Ok(())
    }

    pub fn set_distributor(env: Env, distributor: Option<Address>) -> Result<(), StrategyError> {
        require_owner(&env)?;
        require_award_not_in_progress(&env)?;
        storage::write_optional(&env, &DataKey::Distributor, &distributor);
        Ok(())
    }

    pub fn transfer_ownership(env: Env, new_owner: Address) -> Result<(), StrategyError> {
        require_owner(&env)?;
        storage::write_owner(&env, &new_owner);
        Ok(())
    }

    // ──────────────────────────────────────────
    //  Read helpers
    // ──────────────────────────────────────────

    pub fn owner(env: Env) -> Result<Address, StrategyError> {
        storage::read_owner(&env)
    }

    pub fn prize_pool(env: Env) -> Result<Address, StrategyError> {
        storage::read_prize_pool(&env)
    }

    pub fn ticket(env: Env) -> Result<Symbol, StrategyError> {
        storage::read_ticket(&env)
    }

    pub fn rng(env: Env) -> Result<Address, StrategyError> {
        storage::read_rng(&env)
    }

    pub fn rng_request_timeout(env: Env) -> u64 {
        storage::read_rng_request_timeout(&env)
    }

    pub fn number_of_winners(env: Env) -> u32 {
        storage::read_number_of_winners(&env)
    }

    pub fn split_external_erc20_awards(env: Env) -> bool {
        storage::read_split_external_erc20_awards(&env)
    }

    pub fn listener(env: Env) -> Option<Address> {
        storage::read_optional(&env, &DataKey::Listener)
    }

    pub fn token_listener(env: Env) -> Option<Address> {
        storage::read_optional(&env, &DataKey::TokenListener)
    }

    pub fn distributor(env: Env) -> Option<Address> {
        storage::read_optional(&env, &DataKey::Distributor)
    }
}

fn require_owner(env: &Env) -> Result<Address, StrategyError> {
    let owner = storage::read_owner(env)?;
    owner.require_auth();
    storage::extend_instance(env);
    Ok(owner)
}

fn require_owner_or_listener(env: &Env, caller: &Address) -> Result<(), StrategyError> {
    caller.require_auth();
    let is_owner = *caller == storage::read_owner(env)?;
    let is_listener = storage::read_optional(env, &DataKey::Listener).as_ref() == Some(caller);
    if is_owner || is_listener {
        storage::extend_instance(env);
        Ok(())
    } else {
        Err(StrategyError::Unauthorized)
    }
}

fn require_award_not_in_progress(env: &Env) -> Result<(), StrategyError> {
    if storage::read_rng_request(env).is_some() {
        Err(StrategyError::RngInFlight)
    } else {
        Ok(())
    }
}

fn require_prize_period(seconds: u64) -> Result<(), StrategyError> {
    if seconds > 0 {
        Ok(())
    } else {
        Err(StrategyError::InvalidPrizePeriod)
    }
}

fn require_rng_timeout(seconds: u64) -> Result<(), StrategyError> {
    if seconds > MIN_RNG_REQUEST_TIMEOUT {
        Ok(())
    } else {
        Err(StrategyError::InvalidRngTimeout)
    }
}

fn require_number_of_winners(count: u32) -> Result<(), StrategyError> {
    if count >= 1 {
        Ok(())
    } else {
        Err(StrategyError::InvalidNumberOfWinners)
    }
}

fn is_request_complete(env: &Env, request_id: u32) -> Result<bool, StrategyError> {
    Ok(RngClient::new(env, &storage::read_rng(env)?).is_request_complete(&request_id))
}

/// Pool asset excluded, and the token must answer a balance query.
fn add_external_erc20(env: &Env, external_token: &Address) -> Result<(), StrategyError> {
    let pool_address = storage::read_prize_pool(env)?;
    if !PoolClient::new(env, &pool_address).can_award_external(external_token) {
        return Err(StrategyError::InvalidExternalToken);
    }
    if !matches!(
        token::Client::new(env, external_token).try_balance(&pool_address),
        Ok(Ok(_))
    ) {
        return Err(StrategyError::InvalidExternalToken);
    }

    let mut tokens = storage::read_address_list(env, &DataKey::ExternalErc20Awards);
    if tokens.contains(external_token) {
        return Err(StrategyError::ExternalAwardExists);
    }
    tokens.push_back(external_token.clone());
    storage::write_address_list(env, &DataKey::ExternalErc20Awards, &tokens);
    events::external_award_added(env, external_token);
    Ok(())
}

/// Best-effort fan-out once the award is final. Failures are logged only.
fn notify_listeners(env: &Env, random_number: u128, awarded_period: u64) {
    if let Some(listener) = storage::read_optional(env, &DataKey::Listener) {
        let result = ListenerClient::new(env, &listener)
            .try_after_prize_pool_awarded(&random_number, &awarded_period);
        if result.is_err() {
            log!(env, "WARN: listener {} failed after award", listener);
        }
    }
    if let Some(distributor) = storage::read_optional(env, &DataKey::Distributor) {
        if DistributorClient::new(env, &distributor)
            .try_distribute(&random_number)
            .is_err()
        {
            log!(env, "WARN: distributor {} failed", distributor);
        }
    }
}

#[cfg(test)]
mod test;
