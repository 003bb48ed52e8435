#![no_std]

//! Prize Pool Ledger Contract
//!
//! Holds depositors' principal in a yield source and tracks it as balances of
//! one or more controlled token classes (e.g. `ticket`, `sponsor`). Interest
//! that accrues above those balances is captured as the award balance and
//! handed out by the prize strategy; principal can always be withdrawn,
//! either instantly for an early-exit fee or fee-free behind a timelock.
//! Credit earned by holding a balance over time pays the fee down.

mod credit;
mod draw;
mod error;
mod events;
pub mod interface;
mod ledger;
mod math;
mod storage;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use credit::{CreditBalance, CreditPlan};
pub use error::PoolError;
pub use math::MANTISSA;
pub use storage::{PoolConfig, PoolTotals, TimelockBalance};

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Symbol, Vec};

use interface::{NonFungibleClient, PrizeStrategyHooksClient, YieldSourceClient};
use storage::DataKey;

#[contract]
pub struct PrizePool;

#[contractimpl]
impl PrizePool {
    pub fn initialize(env: Env, config: PoolConfig) -> Result<(), PoolError> {
        if storage::is_initialized(&env) {
            return Err(PoolError::AlreadyInitialized);
        }
        config.owner.require_auth();
        math::require_mantissa(config.max_exit_fee_mantissa)?;

        let mut classes: Vec<Symbol> = Vec::new(&env);
        for class in config.controlled_tokens.iter() {
            if classes.contains(&class) {
                return Err(PoolError::ControlledTokenExists);
            }
            classes.push_back(class);
        }

        let asset = YieldSourceClient::new(&env, &config.yield_source).token();

        storage::write_owner(&env, &config.owner);
        env.storage().instance().set(&DataKey::Token, &asset);
        env.storage()
            .instance()
            .set(&DataKey::YieldSource, &config.yield_source);
        storage::write_reserve(&env, &config.reserve);
        storage::write_controlled_tokens(&env, &classes);
        env.storage()
            .instance()
            .set(&DataKey::MaxExitFeeMantissa, &config.max_exit_fee_mantissa);
        env.storage()
            .instance()
            .set(&DataKey::MaxTimelockDuration, &config.max_timelock_duration);
        storage::write_totals(&env, &PoolTotals::default());
        storage::extend_instance(&env);

        log!(
            &env,
            "Pool initialized: yield_source={} | classes={}",
            config.yield_source,
            classes.len()
        );
        Ok(())
    }

    // ──────────────────────────────────────────
    //  Deposits and withdrawals
    // ──────────────────────────────────────────

    /// `from` pays `amount` of the underlying asset; `to` receives the same
    /// amount of `controlled_token`.
    pub fn deposit_to(
        env: Env,
        from: Address,
        to: Address,
        amount: i128,
        controlled_token: Symbol,
        referrer: Option<Address>,
    ) -> Result<(), PoolError> {
        from.require_auth();
        storage::extend_instance(&env);
        require_positive(amount)?;
        storage::require_controlled_token(&env, &controlled_token)?;

        if let Some(cap) = storage::read_liquidity_cap(&env) {
            let supply = storage::read_controlled_supply(&env)?
                .checked_add(amount)
                .ok_or(PoolError::MathOverflow)?;
            if supply > cap {
                return Err(PoolError::ExceedsLiquidityCap);
            }
        }

        let asset = storage::read_token(&env)?;
        token::Client::new(&env, &asset).transfer(&from, &env.current_contract_address(), &amount);

        let balance = ledger::mint(&env, &to, amount, &controlled_token)?;
        credit::checkpoint(&env, &controlled_token, &to, balance, 0)?;
        ledger::supply_to_yield_source(&env, amount)?;

        if let Some(strategy) = storage::read_prize_strategy(&env) {
            let hooks = PrizeStrategyHooksClient::new(&env, &strategy);
            if hooks
                .try_before_token_mint(&to, &amount, &controlled_token, &referrer)
                .is_err()
            {
                log!(&env, "WARN: before_token_mint hook failed for {}", to);
            }
        }

        events::deposited(&env, &from, &to, &controlled_token, amount, &referrer);
        log!(
            &env,
            "Deposit: {} deposited {} for {} | class: {} | balance: {}",
            from,
            amount,
            to,
            controlled_token,
            balance
        );
        Ok(())
    }

    /// Withdraws immediately, paying whatever part of the early-exit fee the
    /// account's credit does not cover. Returns the fee charged.
    pub fn withdraw_instantly_from(
        env: Env,
        from: Address,
        amount: i128,
        controlled_token: Symbol,
        maximum_exit_fee: i128,
    ) -> Result<i128, PoolError> {
        from.require_auth();
        storage::extend_instance(&env);
        require_positive(amount)?;
        storage::require_controlled_token(&env, &controlled_token)?;

        let quote = ledger::quote_exit(&env, &from, &controlled_token, amount)?;
        if quote.fee > maximum_exit_fee {
            return Err(PoolError::ExitFeeExceedsMaximum);
        }

        let balance = ledger::burn(&env, &from, amount, &controlled_token)?;
        credit::checkpoint(&env, &controlled_token, &from, balance, quote.credit_used)?;

        // the fee stays in the yield source and is captured with the next award
        let redeemed = ledger::redeem(&env, amount - quote.fee)?;
        ledger::pay_out(&env, &from, redeemed)?;

        events::instant_withdrawal(&env, &from, &controlled_token, amount, redeemed, quote.fee);
        log!(
            &env,
            "Instant withdrawal: {} withdrew {} | fee: {} | credit used: {}",
            from,
            amount,
            quote.fee,
            quote.credit_used
        );
        Ok(quote.fee)
    }

    /// Withdraws without a fee, holding the funds until the account's credit
    /// would have covered it. Returns the unlock timestamp.
    pub fn withdraw_with_timelock_from(
        env: Env,
        from: Address,
        amount: i128,
        controlled_token: Symbol,
    ) -> Result<u64, PoolError> {
        from.require_auth();
        storage::extend_instance(&env);
        require_positive(amount)?;
        storage::require_controlled_token(&env, &controlled_token)?;

        let now = env.ledger().timestamp();
        let quote = ledger::quote_exit(&env, &from, &controlled_token, amount)?;
        let duration = quote.timelock_duration(storage::read_max_timelock_duration(&env))?;

        let balance = ledger::burn(&env, &from, amount, &controlled_token)?;
        credit::checkpoint(&env, &controlled_token, &from, balance, quote.credit_used)?;

        let unlock_timestamp = if duration == 0 {
            // with no lock available any unpaid fee is charged up front
            let redeemed = ledger::redeem(&env, amount - quote.fee)?;
            ledger::pay_out(&env, &from, redeemed)?;
            now
        } else {
            let unlock = now.checked_add(duration).ok_or(PoolError::MathOverflow)?;
            ledger::lock(&env, &from, amount, unlock)?
        };

        events::timelocked_withdrawal(&env, &from, &controlled_token, amount, unlock_timestamp);
        log!(
            &env,
            "Timelocked withdrawal: {} withdrew {} | unlocks at: {}",
            from,
            amount,
            unlock_timestamp
        );
        Ok(unlock_timestamp)
    }

    /// Releases the timelocked funds of every unlocked account in `users`.
    /// Returns the total amount released.
    pub fn sweep_timelock_balances(env: Env, users: Vec<Address>) -> Result<i128, PoolError> {
        storage::extend_instance(&env);
        ledger::sweep(&env, &users)
    }

    /// Moves controlled-token balance between accounts.
    pub fn transfer(
        env: Env,
        controlled_token: Symbol,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), PoolError> {
        from.require_auth();
        storage::extend_instance(&env);
        require_positive(amount)?;
        storage::require_controlled_token(&env, &controlled_token)?;

        let balance = storage::read_balance(&env, &controlled_token, &from);
        if balance < amount {
            return Err(PoolError::InsufficientFunds);
        }
        if from == to {
            credit::checkpoint(&env, &controlled_token, &from, balance, 0)?;
            return Ok(());
        }

        if let Some(strategy) = storage::read_prize_strategy(&env) {
            let hooks = PrizeStrategyHooksClient::new(&env, &strategy);
            match hooks.try_before_token_transfer(&from, &to, &amount, &controlled_token) {
                Ok(Ok(())) => {}
                _ => return Err(PoolError::TransferRejected),
            }
        }

        let from_balance = ledger::burn(&env, &from, amount, &controlled_token)?;
        credit::checkpoint(&env, &controlled_token, &from, from_balance, 0)?;
        let to_balance = ledger::mint(&env, &to, amount, &controlled_token)?;
        credit::checkpoint(&env, &controlled_token, &to, to_balance, 0)?;

        events::transferred(&env, &controlled_token, &from, &to, amount);
        Ok(())
    }

    // ──────────────────────────────────────────
    //  Awards (prize strategy only)
    // ──────────────────────────────────────────

    /// Captures interest accrued since the last capture. Returns the award balance.
    pub fn capture_award_balance(env: Env) -> Result<i128, PoolError> {
        storage::extend_instance(&env);
        ledger::capture_award_balance(&env)
    }

    /// Mints `amount` of the captured award to `to`. The awarded amount carries
/// credit for its own exit fee; the rest of the balance keeps its accrual.
    pub fn award(
        env: Env,
        to: Address,
        amount: i128,
        controlled_token: Symbol,
    ) -> Result<(), PoolError> {
        require_prize_strategy(&env)?;
        storage::require_controlled_token(&env, &controlled_token)?;
        if amount == 0 {
            return Ok(());
        }
        require_positive(amount)?;

        let mut totals = storage::read_totals(&env);
        if amount > totals.award_balance {
            return Err(PoolError::AwardExceedsAvailable);
        }
        totals.award_balance -= amount;
        storage::write_totals(&env, &totals);

        let balance = ledger::mint(&env, &to, amount, &controlled_token)?;
        credit::grant(&env, &controlled_token, &to, amount, balance)?;

        events::awarded(&env, &to, &controlled_token, amount);
        log!(&env, "Awarded: {} to {} | class: {}", amount, to, controlled_token);
        Ok(())
    }

    pub fn award_external_erc20(
        env: Env,
        to: Address,
        external_token: Address,
        amount: i128,
    ) -> Result<(), PoolError> {
        require_prize_strategy(&env)?;
        require_awardable(&env, &external_token)?;
        if amount == 0 {
            return Ok(());
        }
        require_positive(amount)?;

        token::Client::new(&env, &external_token).transfer(&env.current_contract_address(), &to, &amount);
        events::awarded_external(&env, &to, &external_token, amount);
        Ok(())
    }

    pub fn award_external_erc721(
        env: Env,
        to: Address,
        external_token: Address,
        token_ids: Vec<u64>,
    ) -> Result<(), PoolError> {
        require_prize_strategy(&env)?;
        require_awardable(&env, &external_token)?;
        if token_ids.is_empty() {
            return Ok(());
        }

        let nft = NonFungibleClient::new(&env, &external_token);
        let pool = env.current_contract_address();
        for token_id in token_ids.iter() {
            nft.transfer(&pool, &to, &token_id);
        }
        events::awarded_external_nft(&env, &to, &external_token, &token_ids);
        Ok(())
    }

    /// Sends the whole reserve to `to`. Only the registered reserve may call.
    pub fn withdraw_reserve(env: Env, to: Address) -> Result<i128, PoolError> {
        let reserve = storage::read_reserve(&env).ok_or(PoolError::ReserveNotSet)?;
        reserve.require_auth();

        let mut totals = storage::read_totals(&env);
        let amount = totals.reserve_total_supply;
        totals.reserve_total_supply = 0;
        storage::write_totals(&env, &totals);

        let redeemed = ledger::redeem(&env, amount)?;
        ledger::pay_out(&env, &to, redeemed)?;
        events::reserve_withdrawn(&env, &to, redeemed);
        log!(&env, "Reserve withdrawn: {} to {}", redeemed, to);
        Ok(redeemed)
    }

    /// Account owning `random_number mod total_supply` of `controlled_token`.
    pub fn draw(
        env: Env,
        controlled_token: Symbol,
        random_number: u128,
    ) -> Result<Option<Address>, PoolError> {
        storage::require_controlled_token(&env, &controlled_token)?;
        let total = storage::read_total_supply(&env, &controlled_token);
        Ok(draw::select(&env, &controlled_token, total, random_number))
    }

    // ──────────────────────────────────────────
    //  Credit
    // ──────────────────────────────────────────

    /// Early-exit fee and credit burned for withdrawing `amount` now.
    pub fn calculate_early_exit_fee(
        env: Env,
        from: Address,
        controlled_token: Symbol,
        amount: i128,
    ) -> Result<(i128, i128), PoolError> {
        storage::require_controlled_token(&env, &controlled_token)?;
        let quote = ledger::quote_exit(&env, &from, &controlled_token, amount)?;
        Ok((quote.fee, quote.credit_used))
    }

    /// Lock duration in seconds and credit burned for a timelocked withdrawal now.
    pub fn calculate_timelock_duration(
        env: Env,
        from: Address,
        controlled_token: Symbol,
        amount: i128,
    ) -> Result<(u64, i128), PoolError> {
        storage::require_controlled_token(&env, &controlled_token)?;
        let quote = ledger::quote_exit(&env, &from, &controlled_token, amount)?;
        let duration = quote.timelock_duration(storage::read_max_timelock_duration(&env))?;
        Ok((duration, quote.credit_used))
    }

    pub fn balance_of_credit(env: Env, user: Address, controlled_token: Symbol) -> Result<i128, PoolError> {
        storage::require_controlled_token(&env, &controlled_token)?;
        credit::current_credit(&env, &controlled_token, &user)
    }

    pub fn credit_plan_of(env: Env, controlled_token: Symbol) -> CreditPlan {
        storage::read_credit_plan(&env, &controlled_token)
    }

    // ──────────────────────────────────────────
    //  Owner settings
    // ──────────────────────────────────────────

    pub fn set_credit_plan_of(
        env: Env,
        controlled_token: Symbol,
        credit_rate_mantissa: i128,
        credit_limit_mantissa: i128,
    ) -> Result<(), PoolError> {
        require_owner(&env)?;
        storage::require_controlled_token(&env, &controlled_token)?;
        math::require_mantissa(credit_rate_mantissa)?;
        math::require_mantissa(credit_limit_mantissa)?;

        let plan = CreditPlan {
            credit_rate_mantissa,
            credit_limit_mantissa,
        };
        storage::write_credit_plan(&env, &controlled_token, &plan);
        log!(
            &env,
            "Credit plan set: {} | rate: {} | limit: {}",
            controlled_token,
            credit_rate_mantissa,
            credit_limit_mantissa
        );
        Ok(())
    }

    pub fn set_prize_strategy(env: Env, prize_strategy: Address) -> Result<(), PoolError> {
        require_owner(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::PrizeStrategy, &prize_strategy);
        log!(&env, "Prize strategy set: {}", prize_strategy);
        Ok(())
    }

    pub fn set_reserve(env: Env, reserve: Option<Address>) -> Result<(), PoolError> {
        require_owner(&env)?;
        storage::write_reserve(&env, &reserve);
        Ok(())
    }

    pub fn set_liquidity_cap(env: Env, liquidity_cap: i128) -> Result<(), PoolError> {
        require_owner(&env)?;
        if liquidity_cap < 0 {
            return Err(PoolError::InvalidAmount);
        }
        env.storage()
            .instance()
            .set(&DataKey::LiquidityCap, &liquidity_cap);
        log!(&env, "Liquidity cap set: {}", liquidity_cap);
        Ok(())
    }

    /// Applies to withdrawals priced after this call.
    pub fn set_max_exit_fee_mantissa(env: Env, max_exit_fee_mantissa: i128) -> Result<(), PoolError> {
        require_owner(&env)?;
        math::require_mantissa(max_exit_fee_mantissa)?;
        env.storage()
            .instance()
            .set(&DataKey::MaxExitFeeMantissa, &max_exit_fee_mantissa);
        Ok(())
    }

    /// Existing timelocks keep their unlock timestamps.
    pub fn set_max_timelock_duration(env: Env, max_timelock_duration: u64) -> Result<(), PoolError> {
        require_owner(&env)?;
        env.storage()
            .instance()
            .set(&DataKey::MaxTimelockDuration, &max_timelock_duration);
        Ok(())
    }

    /// Newly accrued interest at or below `threshold` is left uncaptured.
    pub fn set_award_capture_threshold(env: Env, threshold: i128) -> Result<(), PoolError> {
        require_owner(&env)?;
        if threshold < 0 {
            return Err(PoolError::InvalidAmount);
        }
        env.storage()
            .instance()
            .set(&DataKey::AwardCaptureThreshold, &threshold);
        Ok(())
    }

    pub fn add_controlled_token(env: Env, controlled_token: Symbol) -> Result<(), PoolError> {
        require_owner(&env)?;
        let mut classes = storage::read_controlled_tokens(&env);
        if classes.contains(&controlled_token) {
            return Err(PoolError::ControlledTokenExists);
        }
        classes.push_back(controlled_token.clone());
        storage::write_controlled_tokens(&env, &classes);
        log!(&env, "Controlled token added: {}", controlled_token);
        Ok(())
    }

    pub fn transfer_ownership(env: Env, new_owner: Address) -> Result<(), PoolError> {
        require_owner(&env)?;
        storage::write_owner(&env, &new_owner);
        Ok(())
    }

    // ──────────────────────────────────────────
    //  Read helpers
    // ──────────────────────────────────────────

    pub fn balance_of(env: Env, controlled_token: Symbol, user: Address) -> i128 {
        storage::read_balance(&env, &controlled_token, &user)
    }

    pub fn total_supply(env: Env, controlled_token: Symbol) -> i128 {
        storage::read_total_supply(&env, &controlled_token)
    }

    pub fn controlled_tokens(env: Env) -> Vec<Symbol> {
        storage::read_controlled_tokens(&env)
    }

    /// Underlying balance held by the yield source, interest included.
    pub fn balance(env: Env) -> Result<i128, PoolError> {
        ledger::yield_source_balance(&env)
    }

    pub fn accounted_balance(env: Env) -> Result<i128, PoolError> {
        ledger::accounted_balance(&env)
    }

    pub fn award_balance(env: Env) -> i128 {
        storage::read_totals(&env).award_balance
    }

    pub fn reserve_total_supply(env: Env) -> i128 {
        storage::read_totals(&env).reserve_total_supply
    }

    pub fn timelock_total_supply(env: Env) -> i128 {
        storage::read_totals(&env).timelock_total_supply
    }

    pub fn totals(env: Env) -> PoolTotals {
        storage::read_totals(&env)
    }

    pub fn timelock_balance_of(env: Env, user: Address) -> i128 {
        storage::read_timelock(&env, &user).amount
    }

    pub fn timelock_balance_available_at(env: Env, user: Address) -> u64 {
        storage::read_timelock(&env, &user).unlock_timestamp
    }

    pub fn can_award_external(env: Env, external_token: Address) -> Result<bool, PoolError> {
        can_award_external(&env, &external_token)
    }

    pub fn token(env: Env) -> Result<Address, PoolError> {
        storage::read_token(&env)
    }

    pub fn yield_source(env: Env) -> Result<Address, PoolError> {
        storage::read_yield_source(&env)
    }

    pub fn owner(env: Env) -> Result<Address, PoolError> {
        storage::read_owner(&env)
    }

    pub fn prize_strategy(env: Env) -> Option<Address> {
        storage::read_prize_strategy(&env)
    }

    pub fn reserve(env: Env) -> Option<Address> {
        storage::read_reserve(&env)
    }

    pub fn liquidity_cap(env: Env) -> Option<i128> {
        storage::read_liquidity_cap(&env)
    }

    pub fn max_exit_fee_mantissa(env: Env) -> i128 {
        storage::read_max_exit_fee_mantissa(&env)
    }

    pub fn max_timelock_duration(env: Env) -> u64 {
        storage::read_max_timelock_duration(&env)
    }
}

fn require_positive(amount: i128) -> Result<(), PoolError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(PoolError::InvalidAmount)
    }
}

fn require_owner(env: &Env) -> Result<Address, PoolError> {
    let owner = storage::read_owner(env)?;
    owner.require_auth();
    storage::extend_instance(env);
    Ok(owner)
}

/// The prize strategy is the pool's only award authority.
fn require_prize_strategy(env: &Env) -> Result<Address, PoolError> {
    let strategy = storage::read_prize_strategy(env).ok_or(PoolError::PrizeStrategyNotSet)?;
    strategy.require_auth();
    storage::extend_instance(env);
    Ok(strategy)
}

fn can_award_external(env: &Env, external_token: &Address) -> Result<bool, PoolError> {
    if *external_token == storage::read_token(env)? {
        return Ok(false);
    }
    let yield_source = storage::read_yield_source(env)?;
    Ok(YieldSourceClient::new(env, &yield_source).can_award_external(external_token))
}

fn require_awardable(env: &Env, external_token: &Address) -> Result<(), PoolError> {
    if can_award_external(env, external_token)? {
        Ok(())
    } else {
        Err(PoolError::InvalidExternalToken)
    }
}
