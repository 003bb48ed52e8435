use soroban_sdk::{symbol_short, Address, Env, Vec};

pub(crate) fn award_started(env: &Env, request_id: u32, lock_timestamp: u64) {
    env.events()
        .publish((symbol_short!("aw_start"), request_id), lock_timestamp);
}

pub(crate) fn awarded(env: &Env, random_number: u128, winners: &Vec<Address>, prize_share: i128) {
    env.events().publish(
        (symbol_short!("awarded"), random_number),
        (winners.clone(), prize_share),
    );
}

pub(crate) fn period_opened(env: &Env, prize_period_started_at: u64) {
    env.events()
        .publish((symbol_short!("opened"),), prize_period_started_at);
}

pub(crate) fn award_cancelled(env: &Env, request_id: u32, lock_timestamp: u64) {
    env.events()
        .publish((symbol_short!("aw_cancel"), request_id), lock_timestamp);
}

pub(crate) fn external_award_added(env: &Env, token: &Address) {
    env.events()
        .publish((symbol_short!("ext_add"), token.clone()), ());
}

pub(crate) fn external_nft_added(env: &Env, token: &Address, token_ids: &Vec<u64>) {
    env.events()
        .publish((symbol_short!("nft_add"), token.clone()), token_ids.clone());
}

pub(crate) fn external_award_removed(env: &Env, token: &Address) {
    env.events()
        .publish((symbol_short!("ext_rm"), token.clone()), ());
}
