use soroban_sdk::{symbol_short, Address, Env, Symbol, Vec};

pub(crate) fn deposited(
    env: &Env,
    from: &Address,
    to: &Address,
    class: &Symbol,
    amount: i128,
    referrer: &Option<Address>,
) {
    env.events().publish(
        (symbol_short!("deposited"), to.clone()),
        (from.clone(), class.clone(), amount, referrer.clone()),
    );
}

pub(crate) fn instant_withdrawal(
    env: &Env,
    from: &Address,
    class: &Symbol,
    amount: i128,
    redeemed: i128,
    fee: i128,
) {
    env.events().publish(
        (symbol_short!("inst_wd"), from.clone()),
        (class.clone(), amount, redeemed, fee),
    );
}

pub(crate) fn timelocked_withdrawal(
    env: &Env,
    from: &Address,
    class: &Symbol,
    amount: i128,
    unlock_timestamp: u64,
) {
    env.events().publish(
        (symbol_short!("tl_wd"), from.clone()),
        (class.clone(), amount, unlock_timestamp),
    );
}

pub(crate) fn timelock_swept(env: &Env, user: &Address, amount: i128, redeemed: i128) {
    env.events()
        .publish((symbol_short!("tl_swept"), user.clone()), (amount, redeemed));
}

pub(crate) fn transferred(env: &Env, class: &Symbol, from: &Address, to: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("transfer"), from.clone(), to.clone()),
        (class.clone(), amount),
    );
}

pub(crate) fn award_captured(env: &Env, amount: i128) {
    env.events().publish((symbol_short!("captured"),), amount);
}

pub(crate) fn reserve_captured(env: &Env, amount: i128) {
    env.events().publish((symbol_short!("reserve"),), amount);
}

pub(crate) fn reserve_withdrawn(env: &Env, to: &Address, amount: i128) {
    env.events()
        .publish((symbol_short!("rsv_wd"), to.clone()), amount);
}

pub(crate) fn awarded(env: &Env, to: &Address, class: &Symbol, amount: i128) {
    env.events().publish(
        (symbol_short!("awarded"), to.clone()),
        (class.clone(), amount),
    );
}

pub(crate) fn awarded_external(env: &Env, to: &Address, token: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("ext_award"), to.clone()),
        (token.clone(), amount),
    );
}

pub(crate) fn awarded_external_nft(env: &Env, to: &Address, token: &Address, token_ids: &Vec<u64>) {
    env.events().publish(
        (symbol_short!("ext_nft"), to.clone()),
        (token.clone(), token_ids.clone()),
    );
}

pub(crate) fn credit(env: &Env, class: &Symbol, user: &Address, delta: i128) {
    env.events().publish(
        (symbol_short!("credit"), user.clone()),
        (class.clone(), delta),
    );
}
