//! Credit accrual, early-exit fees and timelock durations.
//!
//! Holding a controlled token accrues credit at `credit_rate_mantissa` of the
//! balance per second, up to `credit_limit_mantissa` of the balance. The full
//! early-exit fee on a withdrawal is `credit_limit × amount`; accrued credit
//! pays it down, and whatever is left is either charged immediately or turned
//! into a proportional share of the maximum timelock duration. Awarded
//! amounts arrive carrying their own full fee as credit.

use soroban_sdk::{contracttype, Address, Env, Symbol};

use crate::error::PoolError;
use crate::math::{mul_div_ceil, mul_mantissa};
use crate::storage;

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreditPlan {
    /// Fraction of the balance accrued as credit every second.
    pub credit_rate_mantissa: i128,
    /// Maximum credit as a fraction of the balance. Also the full exit fee.
    pub credit_limit_mantissa: i128,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreditBalance {
    pub accrued: i128,
    pub checkpoint_balance: i128,
    pub checkpoint_timestamp: u64,
}

/// Result of pricing a withdrawal against an account's credit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExitQuote {
    /// Full fee for the amount before any credit is applied.
    pub fee_base: i128,
    pub fee: i128,
    pub credit_used: i128,
}

impl CreditPlan {
    pub fn credit_limit(&self, balance: i128) -> Result<i128, PoolError> {
        mul_mantissa(balance, self.credit_limit_mantissa)
    }

    /// Credit held at `now`, accrued on the checkpointed balance and capped.
    pub fn credit_at(&self, credit: Option<&CreditBalance>, now: u64) -> Result<i128, PoolError> {
        let Some(credit) = credit else {
            return Ok(0);
        };
        let cap = self.credit_limit(credit.checkpoint_balance)?;
        if credit.accrued >= cap {
            return Ok(cap);
        }
        let elapsed = now.saturating_sub(credit.checkpoint_timestamp) as i128;
        // anything past the limit fraction is clipped anyway
        let fraction = self
            .credit_rate_mantissa
            .saturating_mul(elapsed)
            .min(self.credit_limit_mantissa);
        let earned = mul_mantissa(credit.checkpoint_balance, fraction)?;
        let total = credit
            .accrued
            .checked_add(earned)
            .ok_or(PoolError::MathOverflow)?;
        Ok(total.min(cap))
    }

    /// New checkpoint at `balance`, clipping `accrued` to the balance's limit.
    pub fn checkpoint(
        &self,
        accrued: i128,
        balance: i128,
        now: u64,
    ) -> Result<CreditBalance, PoolError> {
        let cap = self.credit_limit(balance)?;
        Ok(CreditBalance {
            accrued: accrued.clamp(0, cap.max(0)),
            checkpoint_balance: balance,
            checkpoint_timestamp: now,
        })
    }

    /// Fee for withdrawing `amount` out of `balance` while holding `credit`.
    ///
    /// Only credit above what the remaining balance needs for its own limit
    /// is usable, so the account stays within its cap after the burn.
    pub fn quote_exit(
        &self,
        max_exit_fee_mantissa: i128,
        credit: i128,
        balance: i128,
        amount: i128,
    ) -> Result<ExitQuote, PoolError> {
        let fee_base = self.fee_without_credit(max_exit_fee_mantissa, amount)?;
        let remaining = self.fee_without_credit(max_exit_fee_mantissa, balance - amount)?;
        let available = (credit - remaining).max(0);
        let credit_used = available.min(fee_base);
        Ok(ExitQuote {
            fee_base,
            fee: fee_base - credit_used,
            credit_used,
        })
    }

    pub fn fee_without_credit(&self, max_exit_fee_mantissa: i128, amount: i128) -> Result<i128, PoolError> {
        let fee = mul_mantissa(amount, self.credit_limit_mantissa)?;
        let max_fee = mul_mantissa(amount, max_exit_fee_mantissa)?;
        Ok(fee.min(max_fee))
    }
}

impl ExitQuote {
    /// Share of `max_duration` matching the unpaid share of the fee, rounded up
    /// so that a non-zero fee never maps to a zero lock unless `max_duration`
    /// itself is zero.
    pub fn timelock_duration(&self, max_duration: u64) -> Result<u64, PoolError> {
        let seconds = mul_div_ceil(max_duration as i128, self.fee, self.fee_base)?;
        u64::try_from(seconds).map_err(|_| PoolError::MathOverflow)
    }
}

// ──────────────────────────────────────────
//  Ledger-side checkpoints
// ──────────────────────────────────────────

pub(crate) fn current_credit(env: &Env, class: &Symbol, user: &Address) -> Result<i128, PoolError> {
    let plan = storage::read_credit_plan(env, class);
    let record = storage::read_credit_balance(env, class, user);
    plan.credit_at(record.as_ref(), env.ledger().timestamp())
}

/// Accrues on the pre-mutation balance, spends `spent`, and re-checkpoints at
/// `balance_after`.
pub(crate) fn checkpoint(
    env: &Env,
    class: &Symbol,
    user: &Address,
    balance_after: i128,
    spent: i128,
) -> Result<i128, PoolError> {
    let plan = storage::read_credit_plan(env, class);
    let now = env.ledger().timestamp();
    let record = storage::read_credit_balance(env, class, user);
    let accrued = plan.credit_at(record.as_ref(), now)? - spent;
    write_checkpoint(env, class, user, &plan.checkpoint(accrued, balance_after, now)?, record)
}

/// Accrues on the balance held before an award of `amount` was minted, then
/// adds the award's own uncredited exit fee so the prize itself leaves free.
/// Credit stays capped at the limit of `balance_after`.
pub(crate) fn grant(
    env: &Env,
    class: &Symbol,
    user: &Address,
    amount: i128,
    balance_after: i128,
) -> Result<i128, PoolError> {
    let plan = storage::read_credit_plan(env, class);
    let now = env.ledger().timestamp();
    let record = storage::read_credit_balance(env, class, user);
    let extra = plan.fee_without_credit(storage::read_max_exit_fee_mantissa(env), amount)?;
    let accrued = plan
        .credit_at(record.as_ref(), now)?
        .checked_add(extra)
        .ok_or(PoolError::MathOverflow)?;
    write_checkpoint(env, class, user, &plan.checkpoint(accrued, balance_after, now)?, record)
}

fn write_checkpoint(
    env: &Env,
    class: &Symbol,
    user: &Address,
    updated: &CreditBalance,
    previous: Option<CreditBalance>,
) -> Result<i128, PoolError> {
    let before = previous.map(|c| c.accrued).unwrap_or(0);
    if updated.checkpoint_balance == 0 && updated.accrued == 0 {
        env.storage()
            .persistent()
            .remove(&storage::DataKey::CreditBalance(class.clone(), user.clone()));
    } else {
        storage::write_credit_balance(env, class, user, updated);
    }
    if updated.accrued != before {
        crate::events::credit(env, class, user, updated.accrued - before);
    }
    Ok(updated.accrued)
}
