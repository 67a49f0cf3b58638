use alloy_primitives::{Address, U256};
use reserve_model::{
    pool::{apply_request, Action, Pool, Request, ReserveSnapshot, UserSnapshot},
    testutils, ModelError,
};

pub const START_TIMESTAMP: u64 = 1441065600; // Sept 1st, 2015
pub const ONE_DAY: u64 = 24 * 60 * 60;

#[repr(usize)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenIndex {
    WETH = 0,
    USDC = 1,
    DAI = 2,
}

pub struct TokenFixture {
    pub asset: Address,
    pub symbol: &'static str,
    pub decimals: u32,
    pub reserve_factor: u32,
}

impl TokenFixture {
    /// `amount` whole tokens in the token's decimals
    pub fn amount(&self, amount: u64) -> U256 {
        U256::from(amount) * U256::from(10u8).pow(U256::from(self.decimals))
    }
}

pub struct TestFixture {
    pub pool: Pool,
    pub timestamp: u64,
    pub bombadil: Address,
    pub tokens: Vec<TokenFixture>,
}

impl TestFixture {
    /// Create a new TestFixture
    ///
    /// Lists WETH (0), USDC (1), and DAI (2) with no liquidity at `START_TIMESTAMP`
    pub fn create() -> TestFixture {
        let tokens = vec![
            TokenFixture {
                asset: Address::repeat_byte(0xE1),
                symbol: "WETH",
                decimals: 18,
                reserve_factor: 1500,
            },
            TokenFixture {
                asset: Address::repeat_byte(0xC1),
                symbol: "USDC",
                decimals: 6,
                reserve_factor: 1000,
            },
            TokenFixture {
                asset: Address::repeat_byte(0xD1),
                symbol: "DAI",
                decimals: 18,
                reserve_factor: 1000,
            },
        ];

        let mut pool = Pool::new(testutils::default_pool_config()).unwrap();
        for token in tokens.iter() {
            pool.list_reserve(
                testutils::default_reserve_config(),
                ReserveSnapshot::new_listing(
                    token.asset,
                    token.symbol,
                    token.decimals,
                    token.reserve_factor,
                    START_TIMESTAMP,
                ),
            )
            .unwrap();
        }

        TestFixture {
            pool,
            timestamp: START_TIMESTAMP,
            bombadil: Address::repeat_byte(0xB0),
            tokens,
        }
    }

    pub fn token(&self, index: TokenIndex) -> &TokenFixture {
        &self.tokens[index as usize]
    }

    pub fn asset(&self, index: TokenIndex) -> Address {
        self.token(index).asset
    }

    /// `amount` whole tokens of the token at `index`
    pub fn amount(&self, index: TokenIndex, amount: u64) -> U256 {
        self.token(index).amount(amount)
    }

    /********** Chain Helpers ***********/

    /// Move the fixture's clock forward by `time` seconds
    pub fn jump(&mut self, time: u64) {
        self.timestamp += time;
    }

    /// Add `amount` to the wallet of `user` for the token at `index`
    pub fn fund(&mut self, user: &Address, index: TokenIndex, amount: U256) {
        let asset = self.asset(index);
        let wallet = self.pool.load_user(user, &asset).unwrap().wallet_balance;
        self.pool
            .set_wallet_balance(user, &asset, wallet + amount)
            .unwrap();
    }

    /// Apply `action` at the fixture's current timestamp. The pool is left untouched if the
    /// action fails.
    pub fn submit(&mut self, action: Action) -> Result<(), ModelError> {
        let request = Request {
            timestamp: self.timestamp,
            action,
        };
        self.pool = apply_request(self.pool.clone(), &request)?;
        Ok(())
    }

    /********** Query Helpers ***********/

    /// The reserve of the token at `index` as last written
    pub fn reserve(&self, index: TokenIndex) -> ReserveSnapshot {
        self.pool.load_reserve(&self.asset(index)).unwrap()
    }

    /// The position of `user` in the token at `index`, accrued to the fixture's timestamp
    pub fn user(&self, user: &Address, index: TokenIndex) -> UserSnapshot {
        let reserve = self.reserve(index).accrue(self.timestamp).unwrap();
        self.pool
            .load_user(user, &self.asset(index))
            .unwrap()
            .accrue(&reserve, self.timestamp)
            .unwrap()
    }
}

/// Create a fixture where bombadil has supplied 1000 tokens of every reserve
pub fn create_fixture_with_data() -> TestFixture {
    let mut fixture = TestFixture::create();
    let bombadil = fixture.bombadil;
    for index in [TokenIndex::WETH, TokenIndex::USDC, TokenIndex::DAI] {
        fixture.fund(&bombadil, index, fixture.amount(index, 100_000));
        fixture
            .submit(Action::Supply {
                user: bombadil,
                asset: fixture.asset(index),
                amount: fixture.amount(index, 1000),
            })
            .unwrap();
    }
    fixture
}
