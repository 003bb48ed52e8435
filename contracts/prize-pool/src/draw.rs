//! Weighted random draw over controlled-token balances.
//!
//! Every account holding a class owns a slot. Slot weights live in a Fenwick
//! tree stored as persistent entries, so a balance change and a draw each
//! touch O(log n) entries. Slot `k` owns the half-open range
//! `[prefix(k - 1), prefix(k))` of the class's total supply. A slot whose
//! weight drops to zero is released and handed to the next new holder, so
//! the tree only grows with the peak number of concurrent holders.

use soroban_sdk::{Address, Env, Symbol, Vec};

use crate::error::PoolError;
use crate::storage::{persistent_get, persistent_set, DataKey};

/// Adds `delta` to `account`'s weight, assigning a slot on first use and
/// releasing it once the weight is back to zero.
pub(crate) fn update(env: &Env, class: &Symbol, account: &Address, delta: i128) -> Result<(), PoolError> {
    if delta == 0 {
        return Ok(());
    }
    let slot = match slot_of(env, class, account) {
        Some(slot) => slot,
        None => assign_slot(env, class, account)?,
    };
    let size = size(env, class);
    let mut i = slot;
    while i <= size {
        let value = node(env, class, i)
            .checked_add(delta)
            .ok_or(PoolError::MathOverflow)?;
        set_node(env, class, i, value);
        i += lowbit(i);
    }
    if prefix(env, class, slot) == prefix(env, class, slot - 1) {
        release_slot(env, class, account, slot);
    }
    Ok(())
}

/// Account owning position `random mod total`, or `None` for an empty class.
pub(crate) fn select(env: &Env, class: &Symbol, total: i128, random: u128) -> Option<Address> {
    if total <= 0 {
        return None;
    }
    let mut remaining = (random % total as u128) as i128;
    let size = size(env, class);
    if size == 0 {
        return None;
    }

    let mut pos: u32 = 0;
    let mut step: u32 = 1 << (31 - size.leading_zeros());
    while step > 0 {
        let next = pos + step;
        if next <= size {
            let value = node(env, class, next);
            if value <= remaining {
                pos = next;
                remaining -= value;
            }
        }
        step >>= 1;
    }
    persistent_get(env, &DataKey::DrawAccount(class.clone(), pos + 1))
}

fn assign_slot(env: &Env, class: &Symbol, account: &Address) -> Result<u32, PoolError> {
    let mut free = free_slots(env, class);
    if let Some(slot) = free.pop_back() {
        persistent_set(env, &DataKey::DrawFree(class.clone()), &free);
        persistent_set(env, &DataKey::DrawSlot(class.clone(), account.clone()), &slot);
        persistent_set(env, &DataKey::DrawAccount(class.clone(), slot), account);
        return Ok(slot);
    }

    let slot = size(env, class)
        .checked_add(1)
        .ok_or(PoolError::MathOverflow)?;
    // node covers (slot - lowbit, slot]; the new slot itself weighs nothing yet
    let covered = prefix(env, class, slot - 1) - prefix(env, class, slot - lowbit(slot));
    set_node(env, class, slot, covered);
    persistent_set(env, &DataKey::DrawSize(class.clone()), &slot);
    persistent_set(env, &DataKey::DrawSlot(class.clone(), account.clone()), &slot);
    persistent_set(env, &DataKey::DrawAccount(class.clone(), slot), account);
    Ok(slot)
}

fn release_slot(env: &Env, class: &Symbol, account: &Address, slot: u32) {
    env.storage()
        .persistent()
        .remove(&DataKey::DrawSlot(class.clone(), account.clone()));
    env.storage()
        .persistent()
        .remove(&DataKey::DrawAccount(class.clone(), slot));
    let mut free = free_slots(env, class);
    free.push_back(slot);
    persistent_set(env, &DataKey::DrawFree(class.clone()), &free);
}

fn free_slots(env: &Env, class: &Symbol) -> Vec<u32> {
    persistent_get(env, &DataKey::DrawFree(class.clone())).unwrap_or_else(|| Vec::new(env))
}

fn prefix(env: &Env, class: &Symbol, slot: u32) -> i128 {
    let mut total = 0;
    let mut i = slot;
    while i > 0 {
        total += node(env, class, i);
        i -= lowbit(i);
    }
    total
}

fn slot_of(env: &Env, class: &Symbol, account: &Address) -> Option<u32> {
    persistent_get(env, &DataKey::DrawSlot(class.clone(), account.clone()))
}

fn size(env: &Env, class: &Symbol) -> u32 {
    persistent_get(env, &DataKey::DrawSize(class.clone())).unwrap_or(0)
}

fn node(env: &Env, class: &Symbol, i: u32) -> i128 {
    persistent_get(env, &DataKey::DrawNode(class.clone(), i)).unwrap_or(0)
}

fn set_node(env: &Env, class: &Symbol, i: u32, value: i128) {
    persistent_set(env, &DataKey::DrawNode(class.clone(), i), &value);
}

fn lowbit(i: u32) -> u32 {
    i & i.wrapping_neg()
}
