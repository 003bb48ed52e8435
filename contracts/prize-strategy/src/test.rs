#![cfg(test)]

use super::*;
use crate::testutils::{MockListener, MockListenerClient, MockRng, MockRngClient};
use prize_pool::testutils::{MockNft, MockNftClient, MockYieldSource, MockYieldSourceClient};
use prize_pool::{PoolConfig, PoolError, PrizePool, PrizePoolClient, MANTISSA};
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Ledger},
    token, vec, Address, Env, Symbol,
};

const TICKET: Symbol = symbol_short!("ticket");
const SPONSOR: Symbol = symbol_short!("sponsor");
const START: u64 = 10_000;
const PERIOD: u64 = 100;
const RNG_TIMEOUT: u64 = 3_600;

// ─────────────────────────────────────────────────────────────────────────────
//  Helpers
// ─────────────────────────────────────────────────────────────────────────────

struct Setup {
    env: Env,
    pool_id: Address,
    strategy_id: Address,
    rng_id: Address,
    asset_id: Address,
    yield_source: Address,
    owner: Address,
    user1: Address,
    user2: Address,
}

/// A pool with `ticket` and `sponsor` classes driven by a strategy with a
/// 100 second prize period starting at `START`.
fn setup() -> Setup {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let asset_admin = Address::generate(&env);
    let asset_id = env.register_stellar_asset_contract_v2(asset_admin).address();
    let owner = Address::generate(&env);
    let user1 = Address::generate(&env);
    let user2 = Address::generate(&env);

    let minter = token::StellarAssetClient::new(&env, &asset_id);
    minter.mint(&user1, &1_000_000i128);
    minter.mint(&user2, &1_000_000i128);

    let pool_id = env.register_contract(None, PrizePool);
    let yield_source = env.register_contract(None, MockYieldSource);
    MockYieldSourceClient::new(&env, &yield_source).initialize(&asset_id, &pool_id);

    let pool = PrizePoolClient::new(&env, &pool_id);
    pool.initialize(&PoolConfig {
        owner: owner.clone(),
        yield_source: yield_source.clone(),
        reserve: None,
        controlled_tokens: vec![&env, TICKET, SPONSOR],
        max_exit_fee_mantissa: MANTISSA / 2,
        max_timelock_duration: 100,
    });
    pool.set_credit_plan_of(&TICKET, &(MANTISSA / 100), &(MANTISSA / 10));

    let rng_id = env.register_contract(None, MockRng);
    let strategy_id = env.register_contract(None, PeriodicPrizeStrategy);
    PeriodicPrizeStrategyClient::new(&env, &strategy_id).initialize(
        &config(&owner, &pool_id, &rng_id),
        &vec![&env],
    );
    pool.set_prize_strategy(&strategy_id);

    Setup {
        env,
        pool_id,
        strategy_id,
        rng_id,
        asset_id,
        yield_source,
        owner,
        user1,
        user2,
    }
}

fn config(owner: &Address, pool_id: &Address, rng_id: &Address) -> StrategyConfig {
    StrategyConfig {
        owner: owner.clone(),
        prize_pool: pool_id.clone(),
        ticket: TICKET,
        rng: rng_id.clone(),
        prize_period_start: START,
        prize_period_seconds: PERIOD,
        number_of_winners: 1,
        split_external_erc20_awards: false,
        rng_request_timeout: RNG_TIMEOUT,
    }
}

impl Setup {
    fn pool(&self) -> PrizePoolClient<'_> {
        PrizePoolClient::new(&self.env, &self.pool_id)
    }

    fn strategy(&self) -> PeriodicPrizeStrategyClient<'_> {
        PeriodicPrizeStrategyClient::new(&self.env, &self.strategy_id)
    }

    fn rng(&self) -> MockRngClient<'_> {
        MockRngClient::new(&self.env, &self.rng_id)
    }

    fn deposit(&self, user: &Address, amount: i128) {
        self.pool().deposit_to(user, user, &amount, &TICKET, &None);
    }

    fn accrue_yield(&self, amount: i128) {
        token::StellarAssetClient::new(&self.env, &self.asset_id).mint(&self.yield_source, &amount);
    }

    fn set_time(&self, timestamp: u64) {
        self.env.ledger().set_timestamp(timestamp);
    }

    fn asset_balance(&self, who: &Address) -> i128 {
        token::Client::new(&self.env, &self.asset_id).balance(who)
    }

    /// Second fungible token, `amount` of it donated to the pool.
    fn donate_token(&self, amount: i128) -> Address {
        let admin = Address::generate(&self.env);
        let donated = self.env.register_stellar_asset_contract_v2(admin).address();
        token::StellarAssetClient::new(&self.env, &donated).mint(&self.pool_id, &amount);
        donated
    }

    fn listener(&self) -> Address {
        self.env.register_contract(None, MockListener)
    }

    /// Starts an award, answers it with `random_number` and completes it.
    fn run_award(&self, random_number: u128) -> Vec<Address> {
        let request_id = self.strategy().start_award();
        self.rng().set_random_number(&request_id, &random_number);
        self.strategy().complete_award()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
//  initialize
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_initialize_records_config() {
    let s = setup();
    let strategy = s.strategy();

    assert_eq!(strategy.owner(), s.owner);
    assert_eq!(strategy.prize_pool(), s.pool_id);
    assert_eq!(strategy.ticket(), TICKET);
    assert_eq!(strategy.rng(), s.rng_id);
    assert_eq!(strategy.rng_request_timeout(), RNG_TIMEOUT);
    assert_eq!(strategy.number_of_winners(), 1);
    assert!(!strategy.split_external_erc20_awards());
    assert_eq!(strategy.listener(), None);
    assert_eq!(
        strategy.award_state(),
        AwardState {
            prize_period_started_at: START,
            prize_period_seconds: PERIOD,
        }
    );
    assert_eq!(strategy.prize_period_end_at(), START + PERIOD);
}

#[test]
fn test_initialize_twice_fails() {
    let s = setup();
    assert_eq!(
        s.strategy()
            .try_initialize(&config(&s.owner, &s.pool_id, &s.rng_id), &vec![&s.env]),
        Err(Ok(StrategyError::AlreadyInitialized))
    );
}

#[test]
fn test_initialize_rejects_bad_settings() {
    let s = setup();
    let fresh = PeriodicPrizeStrategyClient::new(&s.env, &s.env.register_contract(None, PeriodicPrizeStrategy));
    let base = config(&s.owner, &s.pool_id, &s.rng_id);

    let mut no_period = base.clone();
    no_period.prize_period_seconds = 0;
    assert_eq!(
        fresh.try_initialize(&no_period, &vec![&s.env]),
        Err(Ok(StrategyError::InvalidPrizePeriod))
    );

    let mut short_timeout = base.clone();
    short_timeout.rng_request_timeout = MIN_RNG_REQUEST_TIMEOUT;
    assert_eq!(
        fresh.try_initialize(&short_timeout, &vec![&s.env]),
        Err(Ok(StrategyError::InvalidRngTimeout))
    );

    let mut no_winners = base;
    no_winners.number_of_winners = 0;
    assert_eq!(
        fresh.try_initialize(&no_winners, &vec![&s.env]),
        Err(Ok(StrategyError::InvalidNumberOfWinners))
    );
}

#[test]
fn test_initialize_registers_external_awards() {
    let s = setup();
    let donated = s.donate_token(10);
    let fresh_id = s.env.register_contract(None, PeriodicPrizeStrategy);
    let fresh = PeriodicPrizeStrategyClient::new(&s.env, &fresh_id);

    fresh.initialize(
        &config(&s.owner, &s.pool_id, &s.rng_id),
        &vec![&s.env, donated.clone()],
    );
    assert_eq!(fresh.get_external_erc20_awards(), vec![&s.env, donated]);
}

// ─────────────────────────────────────────────────────────────────────────────
//  Prize period
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_prize_period_views() {
    let s = setup();
    let strategy = s.strategy();

    s.set_time(START + 30);
    assert_eq!(strategy.prize_period_remaining_seconds(), 70);
    assert!(!strategy.is_prize_period_over());
    assert!(!strategy.can_start_award());

    s.set_time(START + PERIOD);
    assert_eq!(strategy.prize_period_remaining_seconds(), 0);
    assert!(strategy.is_prize_period_over());
    assert!(strategy.can_start_award());

    assert_eq!(strategy.next_prize_period_start_time(&(START + 99)), START);
    assert_eq!(strategy.next_prize_period_start_time(&(START + 250)), START + 200);
}

#[test]
fn test_start_award_before_period_ends_fails() {
    let s = setup();
    s.set_time(START + PERIOD - 1);
    assert_eq!(
        s.strategy().try_start_award(),
        Err(Ok(StrategyError::PrizePeriodNotOver))
    );
}

#[test]
fn test_start_award_records_request() {
    let s = setup();
    let strategy = s.strategy();
    s.set_time(START + PERIOD);

    let request_id = strategy.start_award();

    assert_eq!(request_id, 1);
    assert!(strategy.is_rng_requested());
    assert!(!strategy.is_rng_completed());
    assert!(!strategy.can_start_award());
    assert!(!strategy.can_complete_award());
    assert_eq!(strategy.get_last_rng_request_id(), 1);
    assert_eq!(strategy.get_last_rng_lock_timestamp(), START + PERIOD);
    assert_eq!(
        strategy.try_start_award(),
        Err(Ok(StrategyError::RngInFlight))
    );
}

#[test]
fn test_complete_award_requires_completed_request() {
    let s = setup();
    let strategy = s.strategy();
    s.set_time(START + PERIOD);

    assert_eq!(
        strategy.try_complete_award(),
        Err(Ok(StrategyError::RngNotRequested))
    );
    strategy.start_award();
    assert_eq!(
        strategy.try_complete_award(),
        Err(Ok(StrategyError::RngNotCompleted))
    );
}

// ─────────────────────────────────────────────────────────────────────────────
//  complete_award
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_single_winner_receives_interest_with_full_credit() {
    let s = setup();
    let pool = s.pool();
    s.deposit(&s.user1, 100);
    s.accrue_yield(22);
    s.set_time(START + PERIOD);

    let request_id = s.strategy().start_award();
    s.rng().set_random_number(&request_id, &7);
    assert!(s.strategy().can_complete_award());
    let winners = s.strategy().complete_award();

    assert_eq!(winners, vec![&s.env, s.user1.clone()]);
    assert_eq!(pool.balance_of(&TICKET, &s.user1), 122);
    assert_eq!(pool.award_balance(), 0);
    assert_eq!(pool.calculate_early_exit_fee(&s.user1, &TICKET, &122), (0, 12));

    let state = s.strategy().award_state();
    assert_eq!(state.prize_period_started_at, START + PERIOD);
    assert!(!s.strategy().is_rng_requested());

    pool.withdraw_instantly_from(&s.user1, &122, &TICKET, &0);
    assert_eq!(s.asset_balance(&s.user1), 1_000_000 + 22);
}

#[test]
fn test_award_checkpoints_only_winner_credit() {
    let s = setup();
    let pool = s.pool();
    s.set_time(START + 95);
    s.deposit(&s.user1, 100);
    s.deposit(&s.user2, 100);
    s.accrue_yield(20);
    s.set_time(START + PERIOD);

    // 42 mod 200 falls in the first depositor's range
    let winners = s.run_award(42);

    assert_eq!(winners, vec![&s.env, s.user1.clone()]);
    assert_eq!(pool.balance_of(&TICKET, &s.user1), 120);
    // 5 seconds on 100 plus the prize's own fee of 2
    assert_eq!(pool.balance_of_credit(&s.user1, &TICKET), 7);
    assert_eq!(pool.balance_of(&TICKET, &s.user2), 100);
    assert_eq!(pool.balance_of_credit(&s.user2, &TICKET), 5);
}

#[test]
fn test_late_depositor_winning_still_pays_exit_fee() {
    let s = setup();
    let pool = s.pool();
    s.deposit(&s.user1, 100);
    s.accrue_yield(10);
    s.set_time(START + PERIOD);

    let request_id = s.strategy().start_award();
    s.deposit(&s.user2, 100_000);
    s.rng().set_random_number(&request_id, &500);
    let winners = s.strategy().complete_award();

    assert_eq!(winners, vec![&s.env, s.user2.clone()]);
    assert_eq!(pool.balance_of(&TICKET, &s.user2), 100_010);
    assert_eq!(pool.balance_of_credit(&s.user2, &TICKET), 1);
    assert_eq!(pool.calculate_early_exit_fee(&s.user2, &TICKET, &100_000), (10_000, 0));
    assert_eq!(
        pool.try_withdraw_instantly_from(&s.user2, &100_000, &TICKET, &0),
        Err(Ok(PoolError::ExitFeeExceedsMaximum))
    );
}

#[test]
fn test_award_cannot_complete_twice() {
    let s = setup();
    s.deposit(&s.user1, 100);
    s.accrue_yield(10);
    s.set_time(START + PERIOD);
    s.run_award(3);

    assert_eq!(
        s.strategy().try_complete_award(),
        Err(Ok(StrategyError::RngNotRequested))
    );
    assert_eq!(
        s.strategy().try_start_award(),
        Err(Ok(StrategyError::PrizePeriodNotOver))
    );
    assert_eq!(s.pool().balance_of(&TICKET, &s.user1), 110);
}

#[test]
fn test_late_completion_keeps_periods_aligned() {
    let s = setup();
    s.deposit(&s.user1, 100);
    s.set_time(START + 250);

    s.run_award(1);

    let strategy = s.strategy();
    assert_eq!(strategy.award_state().prize_period_started_at, START + 200);
    assert_eq!(strategy.prize_period_end_at(), START + 300);
    assert_eq!(strategy.prize_period_remaining_seconds(), 50);
}

#[test]
fn test_award_without_tickets_keeps_prize() {
    let s = setup();
    let pool = s.pool();
    pool.deposit_to(&s.user1, &s.user1, &100, &SPONSOR, &None);
    s.accrue_yield(10);
    s.set_time(START + PERIOD);

    let winners = s.run_award(5);

    assert!(winners.is_empty());
    assert_eq!(pool.award_balance(), 10);
    assert_eq!(s.strategy().award_state().prize_period_started_at, START + PERIOD);
}

#[test]
fn test_multiple_winners_split_prize() {
    let s = setup();
    let pool = s.pool();
    s.strategy().set_number_of_winners(&3);
    s.deposit(&s.user1, 100);
    s.deposit(&s.user2, 100);
    s.accrue_yield(20);
    s.set_time(START + PERIOD);

    let winners = s.run_award(42);

    assert_eq!(winners.len(), 3);
    assert_eq!(winners.get(0), Some(s.user1.clone()));
    // 20 / 3 = 6 each, 2 left for the next award
    assert_eq!(pool.total_supply(&TICKET), 218);
    assert_eq!(pool.award_balance(), 2);
    assert_eq!(
        pool.balance_of(&TICKET, &s.user1) + pool.balance_of(&TICKET, &s.user2),
        218
    );
}

// ─────────────────────────────────────────────────────────────────────────────
//  cancel_award
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_cancel_only_after_timeout() {
    let s = setup();
    let strategy = s.strategy();
    s.deposit(&s.user1, 100);
    s.accrue_yield(10);
    s.set_time(START + PERIOD);
    strategy.start_award();

    assert_eq!(
        strategy.try_cancel_award(),
        Err(Ok(StrategyError::RngNotTimedOut))
    );
    s.set_time(START + PERIOD + RNG_TIMEOUT);
    assert!(!strategy.is_rng_timed_out());

    s.set_time(START + PERIOD + RNG_TIMEOUT + 1);
    assert!(strategy.is_rng_timed_out());
    strategy.cancel_award();

    assert!(!strategy.is_rng_requested());
    assert!(strategy.can_start_award());
    assert_eq!(s.pool().balance_of(&TICKET, &s.user1), 100);

    // the forfeited interest is picked up by the next award
    assert_eq!(s.run_award(0), vec![&s.env, s.user1.clone()]);
    assert_eq!(s.pool().balance_of(&TICKET, &s.user1), 110);
    assert_eq!(s.rng().last_request_id(), 2);
}

#[test]
fn test_cancel_without_request_fails() {
    let s = setup();
    assert_eq!(
        s.strategy().try_cancel_award(),
        Err(Ok(StrategyError::RngNotRequested))
    );

    // a request from before the timeout is still refused as pending
    s.set_time(START + PERIOD);
    s.strategy().start_award();
    assert_eq!(
        s.strategy().try_cancel_award(),
        Err(Ok(StrategyError::RngNotTimedOut))
    );
}

// ─────────────────────────────────────────────────────────────────────────────
//  Transfers while an award is in progress
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ticket_transfers_blocked_during_award() {
    let s = setup();
    let pool = s.pool();
    s.deposit(&s.user1, 100);
    pool.deposit_to(&s.user1, &s.user1, &50, &SPONSOR, &None);
    s.set_time(START + PERIOD);

    let request_id = s.strategy().start_award();
    assert_eq!(
        pool.try_transfer(&TICKET, &s.user1, &s.user2, &10),
        Err(Ok(PoolError::TransferRejected))
    );
    // other classes and deposits keep working
    pool.transfer(&SPONSOR, &s.user1, &s.user2, &10);
    s.deposit(&s.user2, 30);

    s.rng().set_random_number(&request_id, &0);
    s.strategy().complete_award();
    pool.transfer(&TICKET, &s.user1, &s.user2, &10);

    assert_eq!(pool.balance_of(&TICKET, &s.user2), 40);
    assert_eq!(pool.balance_of(&SPONSOR, &s.user2), 10);
}

#[test]
fn test_token_listener_receives_hooks() {
    let s = setup();
    let listener = s.listener();
    let listener_client = MockListenerClient::new(&s.env, &listener);
    s.strategy().set_token_listener(&Some(listener.clone()));

    s.deposit(&s.user1, 100);
    s.pool().transfer(&TICKET, &s.user1, &s.user2, &10);
    assert_eq!(listener_client.mints(), 1);
    assert_eq!(listener_client.transfers(), 1);

    // a failing token listener never blocks the pool
    listener_client.set_fail(&true);
    s.deposit(&s.user1, 100);
    s.pool().transfer(&TICKET, &s.user1, &s.user2, &10);
    assert_eq!(s.pool().balance_of(&TICKET, &s.user2), 20);
}

// ─────────────────────────────────────────────────────────────────────────────
//  Listeners and RNG fee
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_listeners_notified_after_award() {
    let s = setup();
    let listener = s.listener();
    let listener_client = MockListenerClient::new(&s.env, &listener);
    s.strategy().set_listener(&Some(listener.clone()));
    s.strategy().set_distributor(&Some(listener.clone()));
    s.deposit(&s.user1, 100);
    s.set_time(START + PERIOD);

    s.run_award(7);

    assert_eq!(listener_client.awarded(), 1);
    assert_eq!(listener_client.distributed(), 1);
    assert_eq!(listener_client.last_random(), 7);
    assert_eq!(listener_client.last_period(), START);
}

#[test]
fn test_failing_listener_does_not_block_award() {
    let s = setup();
    let listener = s.listener();
    MockListenerClient::new(&s.env, &listener).set_fail(&true);
    s.strategy().set_listener(&Some(listener.clone()));
    s.strategy().set_distributor(&Some(listener));
    s.deposit(&s.user1, 100);
    s.accrue_yield(22);
    s.set_time(START + PERIOD);

    s.run_award(7);

    assert_eq!(s.pool().balance_of(&TICKET, &s.user1), 122);
    assert_eq!(s.strategy().award_state().prize_period_started_at, START + PERIOD);
}

#[test]
fn test_rng_fee_paid_from_strategy_balance() {
    let s = setup();
    let fee_admin = Address::generate(&s.env);
    let fee_token = s.env.register_stellar_asset_contract_v2(fee_admin).address();
    token::StellarAssetClient::new(&s.env, &fee_token).mint(&s.strategy_id, &5);
    s.rng().set_fee(&Some(fee_token.clone()), &5);
    s.set_time(START + PERIOD);

    s.strategy().start_award();

    let fees = token::Client::new(&s.env, &fee_token);
    assert_eq!(fees.balance(&s.rng_id), 5);
    assert_eq!(fees.balance(&s.strategy_id), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
//  External award registry
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_external_erc20_goes_to_main_winner() {
    let s = setup();
    let donated = s.donate_token(500);
    let strategy = s.strategy();

    strategy.add_external_erc20_award(&s.owner, &donated);
    assert_eq!(strategy.get_external_erc20_awards(), vec![&s.env, donated.clone()]);
    assert_eq!(
        strategy.try_add_external_erc20_award(&s.owner, &donated),
        Err(Ok(StrategyError::ExternalAwardExists))
    );

    s.deposit(&s.user1, 100);
    s.set_time(START + PERIOD);
    s.run_award(0);

    assert_eq!(token::Client::new(&s.env, &donated).balance(&s.user1), 500);
    assert_eq!(token::Client::new(&s.env, &donated).balance(&s.pool_id), 0);
}

#[test]
fn test_external_erc20_split_between_winners() {
    let s = setup();
    let donated = s.donate_token(501);
    let strategy = s.strategy();
    strategy.set_number_of_winners(&2);
    strategy.set_split_external_erc20_awards(&true);
    strategy.add_external_erc20_award(&s.owner, &donated);

    s.deposit(&s.user1, 100);
    s.deposit(&s.user2, 100);
    s.set_time(START + PERIOD);
    s.run_award(11);

    let balances = token::Client::new(&s.env, &donated);
    assert_eq!(balances.balance(&s.user1) + balances.balance(&s.user2), 500);
    assert_eq!(balances.balance(&s.pool_id), 1);
}

#[test]
fn test_external_erc20_registry_guards() {
    let s = setup();
    let strategy = s.strategy();
    let donated = s.donate_token(1);
    let stranger = Address::generate(&s.env);

    assert_eq!(
        strategy.try_add_external_erc20_award(&s.owner, &s.asset_id),
        Err(Ok(StrategyError::InvalidExternalToken))
    );
    assert_eq!(
        strategy.try_add_external_erc20_award(&stranger, &donated),
        Err(Ok(StrategyError::Unauthorized))
    );

    // the listener may register awards too
    let listener = s.listener();
    strategy.set_listener(&Some(listener.clone()));
    strategy.add_external_erc20_award(&listener, &donated);

    strategy.remove_external_erc20_award(&donated);
    assert!(strategy.get_external_erc20_awards().is_empty());
    assert_eq!(
        strategy.try_remove_external_erc20_award(&donated),
        Err(Ok(StrategyError::ExternalAwardNotFound))
    );
}

#[test]
fn test_external_nft_award() {
    let s = setup();
    let strategy = s.strategy();
    let nft = s.env.register_contract(None, MockNft);
    let nft_client = MockNftClient::new(&s.env, &nft);
    nft_client.mint(&s.pool_id, &1);
    nft_client.mint(&s.pool_id, &2);
    nft_client.mint(&s.user2, &3);

    strategy.add_external_erc721_award(&s.owner, &nft, &vec![&s.env, 1u64]);
    assert_eq!(
        strategy.try_add_external_erc721_award(&s.owner, &nft, &vec![&s.env, 1u64]),
        Err(Ok(StrategyError::DuplicateTokenId))
    );
    assert_eq!(
        strategy.try_add_external_erc721_award(&s.owner, &nft, &vec![&s.env, 3u64]),
        Err(Ok(StrategyError::NftNotHeld))
    );
    strategy.add_external_erc721_award(&s.owner, &nft, &vec![&s.env, 2u64]);
    assert_eq!(strategy.get_erc721_award_token_ids(&nft), vec![&s.env, 1u64, 2u64]);

    s.deposit(&s.user1, 100);
    s.set_time(START + PERIOD);
    s.run_award(9);

    assert_eq!(nft_client.owner_of(&1), s.user1);
    assert_eq!(nft_client.owner_of(&2), s.user1);
    assert!(strategy.get_external_erc721_awards().is_empty());
    assert!(strategy.get_erc721_award_token_ids(&nft).is_empty());
}

#[test]
fn test_remove_external_nft_award() {
    let s = setup();
    let strategy = s.strategy();
    let nft = s.env.register_contract(None, MockNft);
    MockNftClient::new(&s.env, &nft).mint(&s.pool_id, &4);

    strategy.add_external_erc721_award(&s.owner, &nft, &vec![&s.env, 4u64]);
    strategy.remove_external_erc721_award(&nft);

    assert!(strategy.get_external_erc721_awards().is_empty());
    assert!(strategy.get_erc721_award_token_ids(&nft).is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
//  Owner settings
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_settings_refused_during_award() {
    let s = setup();
    let strategy = s.strategy();
    let donated = s.donate_token(1);
    s.set_time(START + PERIOD);
    strategy.start_award();

    assert_eq!(
        strategy.try_set_number_of_winners(&2),
        Err(Ok(StrategyError::RngInFlight))
    );
    assert_eq!(
        strategy.try_set_prize_period_seconds(&50),
        Err(Ok(StrategyError::RngInFlight))
    );
    assert_eq!(
        strategy.try_set_rng_service(&s.rng_id),
        Err(Ok(StrategyError::RngInFlight))
    );
    assert_eq!(
        strategy.try_add_external_erc20_award(&s.owner, &donated),
        Err(Ok(StrategyError::RngInFlight))
    );
}

#[test]
fn test_setting_validation() {
    let s = setup();
    let strategy = s.strategy();

    assert_eq!(
        strategy.try_set_rng_request_timeout(&MIN_RNG_REQUEST_TIMEOUT),
        Err(Ok(StrategyError::InvalidRngTimeout))
    );
    strategy.set_rng_request_timeout(&(MIN_RNG_REQUEST_TIMEOUT + 1));
    assert_eq!(strategy.rng_request_timeout(), MIN_RNG_REQUEST_TIMEOUT + 1);

    assert_eq!(
        strategy.try_set_prize_period_seconds(&0),
        Err(Ok(StrategyError::InvalidPrizePeriod))
    );
    strategy.set_prize_period_seconds(&50);
    assert_eq!(strategy.prize_period_end_at(), START + 50);

    assert_eq!(
        strategy.try_set_number_of_winners(&0),
        Err(Ok(StrategyError::InvalidNumberOfWinners))
    );
}

#[test]
fn test_transfer_ownership() {
    let s = setup();
    let new_owner = Address::generate(&s.env);
    s.strategy().transfer_ownership(&new_owner);
    assert_eq!(s.strategy().owner(), new_owner);
}

#[test]
fn test_settings_require_owner_authorization() {
    let s = setup();
    s.env.mock_auths(&[]);
    assert!(s.strategy().try_set_number_of_winners(&2).is_err());
    assert_eq!(s.strategy().number_of_winners(), 1);
}
