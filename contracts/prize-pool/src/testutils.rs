//! Mock collaborators for exercising the pool in tests.
//!
//! Each mock lives in its own module so the entry points generated for
//! same-named functions do not collide.

use soroban_sdk::contracttype;

pub use self::nft::{MockNft, MockNftClient};
pub use self::reserve::{MockReserve, MockReserveClient};
pub use self::yield_source::{MockYieldSource, MockYieldSourceClient};

#[contracttype]
#[derive(Clone)]
enum MockKey {
    Pool,
    Token,
    Rate,
    Recipient,
    RedeemLoss,
    NftOwner(u64),
}

mod yield_source {
    use soroban_sdk::{contract, contractimpl, token, Address, Env};

    use super::MockKey;
    use crate::interface::YieldSourceInterface;

    /// Yield source that simply holds the asset. Yield is simulated by minting
    /// the asset straight to the mock's address.
    #[contract]
    pub struct MockYieldSource;

    #[contractimpl]
    impl MockYieldSource {
        pub fn initialize(env: Env, token: Address, pool: Address) {
            env.storage().instance().set(&MockKey::Token, &token);
            env.storage().instance().set(&MockKey::Pool, &pool);
        }

        /// Units withheld from every later redemption.
        pub fn set_redeem_loss(env: Env, loss: i128) {
            env.storage().instance().set(&MockKey::RedeemLoss, &loss);
        }
    }

    #[contractimpl]
    impl YieldSourceInterface for MockYieldSource {
        fn token(env: Env) -> Address {
            env.storage().instance().get(&MockKey::Token).unwrap()
        }

        fn balance(env: Env) -> i128 {
            let asset: Address = env.storage().instance().get(&MockKey::Token).unwrap();
            token::Client::new(&env, &asset).balance(&env.current_contract_address())
        }

        fn supply(env: Env, _amount: i128) {
            let pool: Address = env.storage().instance().get(&MockKey::Pool).unwrap();
            pool.require_auth();
        }

        fn redeem(env: Env, amount: i128) -> i128 {
            let pool: Address = env.storage().instance().get(&MockKey::Pool).unwrap();
            pool.require_auth();
            let asset: Address = env.storage().instance().get(&MockKey::Token).unwrap();
            let loss: i128 = env.storage().instance().get(&MockKey::RedeemLoss).unwrap_or(0);
            let redeemed = (amount - loss).max(0);
            token::Client::new(&env, &asset).transfer(
                &env.current_contract_address(),
                &pool,
                &redeemed,
            );
            redeemed
        }

        fn can_award_external(env: Env, token: Address) -> bool {
            let asset: Address = env.storage().instance().get(&MockKey::Token).unwrap();
            token != asset
        }
    }
}

mod reserve {
    use soroban_sdk::{contract, contractimpl, Address, Env};

    use super::MockKey;
    use crate::interface::ReserveInterface;
    use crate::PrizePoolClient;

    /// Reserve with a fixed rate that forwards withdrawals to a single recipient.
    #[contract]
    pub struct MockReserve;

    #[contractimpl]
    impl MockReserve {
        pub fn initialize(env: Env, rate_mantissa: i128, recipient: Address) {
            env.storage().instance().set(&MockKey::Rate, &rate_mantissa);
            env.storage().instance().set(&MockKey::Recipient, &recipient);
        }

        pub fn set_rate(env: Env, rate_mantissa: i128) {
            env.storage().instance().set(&MockKey::Rate, &rate_mantissa);
        }
    }

    #[contractimpl]
    impl ReserveInterface for MockReserve {
        fn reserve_rate_mantissa(env: Env, _pool: Address) -> i128 {
            env.storage().instance().get(&MockKey::Rate).unwrap_or(0)
        }

        fn reserve_recipient(env: Env, _pool: Address) -> Address {
            env.storage().instance().get(&MockKey::Recipient).unwrap()
        }

        fn withdraw_reserve(env: Env, pool: Address, to: Address) -> i128 {
            PrizePoolClient::new(&env, &pool).withdraw_reserve(&to)
        }
    }
}

mod nft {
    use soroban_sdk::{contract, contractimpl, Address, Env};

    use super::MockKey;
    use crate::interface::NonFungibleInterface;

    /// Bare-bones non-fungible token.
    #[contract]
    pub struct MockNft;

    #[contractimpl]
    impl MockNft {
        pub fn mint(env: Env, to: Address, token_id: u64) {
            env.storage().instance().set(&MockKey::NftOwner(token_id), &to);
        }
    }

    #[contractimpl]
    impl NonFungibleInterface for MockNft {
        fn owner_of(env: Env, token_id: u64) -> Address {
            env.storage()
                .instance()
                .get(&MockKey::NftOwner(token_id))
                .unwrap()
        }

        fn transfer(env: Env, from: Address, to: Address, token_id: u64) {
            from.require_auth();
            let owner: Address = env
                .storage()
                .instance()
                .get(&MockKey::NftOwner(token_id))
                .unwrap();
            assert!(owner == from, "not the token owner");
            env.storage().instance().set(&MockKey::NftOwner(token_id), &to);
        }
    }
}
