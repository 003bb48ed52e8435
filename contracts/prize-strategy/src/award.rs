//! Prize distribution for a completed award.
//!
//! The first winner is drawn with the RNG value itself. Every further winner
//! is drawn with a value derived from the previous one by hashing, so a
//! single random number seeds the whole winner set.

use soroban_sdk::{log, token, Address, Bytes, Env, Vec};

use crate::error::StrategyError;
use crate::interface::PoolClient;
use crate::storage::{self, DataKey};

/// Winners picked for one award together with the ticket prize each received.
pub(crate) struct Distribution {
    pub winners: Vec<Address>,
    pub prize_share: i128,
}

/// Captures the award balance and hands it, plus every registered external
/// award, to the winners drawn with `random_number`.
pub(crate) fn distribute(env: &Env, random_number: u128) -> Result<Distribution, StrategyError> {
    let pool_address = storage::read_prize_pool(env)?;
    let pool = PoolClient::new(env, &pool_address);
    let ticket = storage::read_ticket(env)?;
    let number_of_winners = storage::read_number_of_winners(env);

    let prize = pool.capture_award_balance();
    let winners = draw_winners(env, &pool, random_number, number_of_winners)?;
    let Some(main_winner) = winners.first() else {
        log!(env, "No winner drawn | prize kept: {}", prize);
        return Ok(Distribution {
            winners,
            prize_share: 0,
        });
    };

    // the remainder of the split stays in the award balance
    let prize_share = prize / number_of_winners as i128;
    if prize_share > 0 {
        for winner in winners.iter() {
            pool.award(&winner, &prize_share, &ticket);
        }
    }

    award_external_erc20s(env, &pool, &pool_address, &main_winner, &winners)?;
    award_external_erc721s(env, &pool, &main_winner);

    Ok(Distribution {
        winners,
        prize_share,
    })
}

/// Draws up to `number_of_winners` accounts. Empty when no tickets exist.
fn draw_winners(
    env: &Env,
    pool: &PoolClient,
    random_number: u128,
    number_of_winners: u32,
) -> Result<Vec<Address>, StrategyError> {
    let ticket = storage::read_ticket(env)?;
    let mut winners = Vec::new(env);
    let Some(main_winner) = pool.draw(&ticket, &random_number) else {
        return Ok(winners);
    };
    winners.push_back(main_winner);

    let mut next = random_number;
    for index in 0..number_of_winners.saturating_sub(1) {
        next = next_random_number(env, next, index);
        if let Some(winner) = pool.draw(&ticket, &next) {
            winners.push_back(winner);
        }
    }
    Ok(winners)
}

/// `keccak256(previous + 499 + index × 521)`, truncated to its first 16 bytes.
pub(crate) fn next_random_number(env: &Env, previous: u128, index: u32) -> u128 {
    let seed = previous
        .wrapping_add(499)
        .wrapping_add((index as u128).wrapping_mul(521));
    let hash = env
        .crypto()
        .keccak256(&Bytes::from_array(env, &seed.to_be_bytes()))
        .to_array();
    let mut head = [0u8; 16];
    head.copy_from_slice(&hash[..16]);
    u128::from_be_bytes(head)
}

fn award_external_erc20s(
    env: &Env,
    pool: &PoolClient,
    pool_address: &Address,
    main_winner: &Address,
    winners: &Vec<Address>,
) -> Result<(), StrategyError> {
    let split = storage::read_split_external_erc20_awards(env) && winners.len() > 1;
    for external in storage::read_address_list(env, &DataKey::ExternalErc20Awards).iter() {
        let balance = token::Client::new(env, &external).balance(pool_address);
        if balance <= 0 {
            continue;
        }
        if split {
            let share = balance
                .checked_div(winners.len() as i128)
                .ok_or(StrategyError::MathOverflow)?;
            for winner in winners.iter() {
                pool.award_external_erc20(&winner, &external, &share);
            }
        } else {
            pool.award_external_erc20(main_winner, &external, &balance);
        }
    }
    Ok(())
}

/// Non-fungible awards all go to the main winner; the registry is emptied.
fn award_external_erc721s(env: &Env, pool: &PoolClient, main_winner: &Address) {
    let tokens = storage::read_address_list(env, &DataKey::ExternalErc721Awards);
    for external in tokens.iter() {
        let ids = storage::read_token_ids(env, &external);
        if !ids.is_empty() {
            pool.award_external_erc721(main_winner, &external, &ids);
        }
        storage::write_token_ids(env, &external, &Vec::new(env));
    }
    storage::write_address_list(env, &DataKey::ExternalErc721Awards, &Vec::new(env));
}
