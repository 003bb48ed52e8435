use soroban_sdk::{log, token, Address, Env, Symbol, Vec};

use crate::credit::{self, ExitQuote};
use crate::draw;
use crate::error::PoolError;
use crate::events;
use crate::interface::{ReserveClient, YieldSourceClient};
use crate::math::{mul_mantissa, require_mantissa};
use crate::storage::{self, TimelockBalance};

// ──────────────────────────────────────────
//  Controlled token balances
// ──────────────────────────────────────────

/// Credits `amount` of `class` to `to`. Returns the new balance.
pub(crate) fn mint(env: &Env, to: &Address, amount: i128, class: &Symbol) -> Result<i128, PoolError> {
    let balance = storage::read_balance(env, class, to)
        .checked_add(amount)
        .ok_or(PoolError::MathOverflow)?;
    let supply = storage::read_total_supply(env, class)
        .checked_add(amount)
        .ok_or(PoolError::MathOverflow)?;
    storage::write_balance(env, class, to, balance);
    storage::write_total_supply(env, class, supply);
    draw::update(env, class, to, amount)?;
    Ok(balance)
}

/// Debits `amount` of `class` from `from`. Returns the new balance.
pub(crate) fn burn(env: &Env, from: &Address, amount: i128, class: &Symbol) -> Result<i128, PoolError> {
    let balance = storage::read_balance(env, class, from);
    if balance < amount {
        return Err(PoolError::InsufficientFunds);
    }
    let supply = storage::read_total_supply(env, class) - amount;
    storage::write_balance(env, class, from, balance - amount);
    storage::write_total_supply(env, class, supply);
    draw::update(env, class, from, -amount)?;
    Ok(balance - amount)
}

/// Prices a withdrawal of `amount` against `from`'s current credit.
pub(crate) fn quote_exit(
    env: &Env,
    from: &Address,
    class: &Symbol,
    amount: i128,
) -> Result<ExitQuote, PoolError> {
    let balance = storage::read_balance(env, class, from);
    if balance < amount {
        return Err(PoolError::InsufficientFunds);
    }
    let credit = credit::current_credit(env, class, from)?;
    storage::read_credit_plan(env, class).quote_exit(
        storage::read_max_exit_fee_mantissa(env),
        credit,
        balance,
        amount,
    )
}

// ──────────────────────────────────────────
//  Yield source plumbing
// ──────────────────────────────────────────

pub(crate) fn supply_to_yield_source(env: &Env, amount: i128) -> Result<(), PoolError> {
    let yield_source = storage::read_yield_source(env)?;
    let asset = storage::read_token(env)?;
    token::Client::new(env, &asset).transfer(&env.current_contract_address(), &yield_source, &amount);
    YieldSourceClient::new(env, &yield_source).supply(&amount);
    Ok(())
}

pub(crate) fn redeem(env: &Env, amount: i128) -> Result<i128, PoolError> {
    if amount == 0 {
        return Ok(0);
    }
    let yield_source = storage::read_yield_source(env)?;
    Ok(YieldSourceClient::new(env, &yield_source).redeem(&amount))
}

pub(crate) fn pay_out(env: &Env, to: &Address, amount: i128) -> Result<(), PoolError> {
    if amount == 0 {
        return Ok(());
    }
    let asset = storage::read_token(env)?;
    token::Client::new(env, &asset).transfer(&env.current_contract_address(), to, &amount);
    Ok(())
}

pub(crate) fn yield_source_balance(env: &Env) -> Result<i128, PoolError> {
    let yield_source = storage::read_yield_source(env)?;
    Ok(YieldSourceClient::new(env, &yield_source).balance())
}

// ──────────────────────────────────────────
//  Award capture
// ──────────────────────────────────────────

/// Every claim against the yield source except the captured award.
pub(crate) fn accounted_balance(env: &Env) -> Result<i128, PoolError> {
    let totals = storage::read_totals(env);
    storage::read_controlled_supply(env)?
        .checked_add(totals.timelock_total_supply)
        .and_then(|total| total.checked_add(totals.reserve_total_supply))
        .ok_or(PoolError::MathOverflow)
}

pub(crate) fn reserve_fee(env: &Env, amount: i128) -> Result<i128, PoolError> {
    let Some(reserve) = storage::read_reserve(env) else {
        return Ok(0);
    };
    let rate = ReserveClient::new(env, &reserve).reserve_rate_mantissa(&env.current_contract_address());
    if rate == 0 {
        return Ok(0);
    }
    require_mantissa(rate)?;
    mul_mantissa(amount, rate)
}

/// Moves newly accrued interest into the award balance, skimming the reserve.
pub(crate) fn capture_award_balance(env: &Env) -> Result<i128, PoolError> {
    let mut totals = storage::read_totals(env);
    let accounted = accounted_balance(env)?;
    let current = yield_source_balance(env)?;

    // the yield source may round a little below what was supplied
    let interest = (current - accounted).max(0);
    let unaccounted = (interest - totals.award_balance).max(0);
    if unaccounted <= storage::read_award_capture_threshold(env) {
        return Ok(totals.award_balance);
    }

    let reserve = reserve_fee(env, unaccounted)?;
    if reserve > 0 {
        totals.reserve_total_supply += reserve;
        events::reserve_captured(env, reserve);
    }
    let captured = unaccounted - reserve;
    totals.award_balance += captured;
    storage::write_totals(env, &totals);
    events::award_captured(env, captured);

    log!(
        env,
        "Award captured: {} | reserve: {} | award balance: {}",
        captured,
        reserve,
        totals.award_balance
    );
    Ok(totals.award_balance)
}

// ──────────────────────────────────────────
//  Timelocks
// ──────────────────────────────────────────

/// Locks `amount` for `user` until `unlock_timestamp`, merging with any
/// balance still locked. Returns the effective unlock timestamp.
pub(crate) fn lock(env: &Env, user: &Address, amount: i128, unlock_timestamp: u64) -> Result<u64, PoolError> {
    sweep(env, &Vec::from_array(env, [user.clone()]))?;

    let mut timelock = storage::read_timelock(env, user);
    timelock.amount = timelock
        .amount
        .checked_add(amount)
        .ok_or(PoolError::MathOverflow)?;
    timelock.unlock_timestamp = timelock.unlock_timestamp.max(unlock_timestamp);
    storage::write_timelock(env, user, &timelock);

    let mut totals = storage::read_totals(env);
    totals.timelock_total_supply += amount;
    storage::write_totals(env, &totals);
    Ok(timelock.unlock_timestamp)
}

/// Releases every unlocked timelock among `users`. Locked accounts are skipped.
pub(crate) fn sweep(env: &Env, users: &Vec<Address>) -> Result<i128, PoolError> {
    let now = env.ledger().timestamp();
    let mut released: Vec<(Address, i128)> = Vec::new(env);
    let mut total: i128 = 0;

    for user in users.iter() {
        let timelock = storage::read_timelock(env, &user);
        if timelock.amount > 0 && timelock.unlock_timestamp <= now {
            total = total
                .checked_add(timelock.amount)
                .ok_or(PoolError::MathOverflow)?;
            storage::write_timelock(env, &user, &TimelockBalance::default());
            released.push_back((user, timelock.amount));
        }
    }
    if total == 0 {
        return Ok(0);
    }

    let mut totals = storage::read_totals(env);
    totals.timelock_total_supply -= total;
    storage::write_totals(env, &totals);

    let redeemed = redeem(env, total)?;
    let last = released.len() - 1;
    let mut paid: i128 = 0;
    for (index, (user, amount)) in released.iter().enumerate() {
        // the last account takes the rounding dust of a short redemption
        let share = if index as u32 == last {
            redeemed - paid
        } else {
            redeemed
                .checked_mul(amount)
                .ok_or(PoolError::MathOverflow)?
                / total
        };
        paid += share;
        pay_out(env, &user, share)?;
        events::timelock_swept(env, &user, amount, share);
    }
    log!(env, "Timelocks swept: {} accounts | total: {}", released.len(), total);
    Ok(total)
}
