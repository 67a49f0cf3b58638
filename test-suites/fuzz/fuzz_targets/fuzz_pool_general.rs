#![no_main]

use alloy_primitives::{Address, U256};
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use reserve_model::{
    constants::MAX_UINT_AMOUNT,
    pool::{Action, LiquidationParams, RateMode, ReserveSnapshot},
    ModelError,
};
use test_suites::{
    create_fixture_with_data,
    test_fixture::{TestFixture, TokenIndex},
};

#[derive(Arbitrary, Debug)]
struct Input {
    sam_balance: u32,
    merry_balance: u32,
    commands: [Command; 16],
}

/// The set of tokens that the pool supports.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum PoolReserveToken {
    WETH,
    USDC,
    DAI,
}

impl PoolReserveToken {
    fn index(&self) -> TokenIndex {
        match self {
            PoolReserveToken::WETH => TokenIndex::WETH,
            PoolReserveToken::USDC => TokenIndex::USDC,
            PoolReserveToken::DAI => TokenIndex::DAI,
        }
    }
}

/// An amount in whole tokens, where zero stands for the max sentinel
#[derive(Arbitrary, Debug, Clone, Copy)]
struct Amount(u32);

impl Amount {
    fn to_u256(self, fixture: &TestFixture, token: PoolReserveToken) -> U256 {
        if self.0 == 0 {
            MAX_UINT_AMOUNT
        } else {
            fixture.amount(token.index(), self.0 as u64)
        }
    }
}

#[derive(Arbitrary, Debug)]
enum Command {
    // Misc
    PassTime { minutes: u16 },

    // User (0 = sam, 1 = merry) Pool Commands
    Supply { user: bool, token: PoolReserveToken, amount: Amount },
    Withdraw { user: bool, token: PoolReserveToken, amount: Amount },
    Borrow { user: bool, token: PoolReserveToken, amount: Amount, stable: bool },
    Repay { user: bool, token: PoolReserveToken, amount: Amount, stable: bool },
    SwapRateMode { user: bool, token: PoolReserveToken, stable: bool },
    Rebalance { user: bool, token: PoolReserveToken },
    Transfer { user: bool, token: PoolReserveToken, amount: Amount },
    FlashLoan { user: bool, token: PoolReserveToken, amount: Amount },
    MintUnbacked { user: bool, token: PoolReserveToken, amount: Amount },
    BackUnbacked { user: bool, token: PoolReserveToken, amount: Amount, fee: u16 },
    Liquidate {
        user: bool,
        debt: PoolReserveToken,
        collateral: PoolReserveToken,
        debt_price: u16,
        collateral_price: u16,
        amount: Amount,
        receive_a_token: bool,
    },
}

fn user(merry: bool) -> Address {
    if merry {
        Address::repeat_byte(0x3E)
    } else {
        Address::repeat_byte(0x5A)
    }
}

fn rate_mode(stable: bool) -> RateMode {
    if stable {
        RateMode::Stable
    } else {
        RateMode::Variable
    }
}

fuzz_target!(|input: Input| {
    let mut fixture = create_fixture_with_data();

    for token in [PoolReserveToken::WETH, PoolReserveToken::USDC, PoolReserveToken::DAI] {
        let index = token.index();
        fixture.fund(&user(false), index, fixture.amount(index, input.sam_balance as u64));
        fixture.fund(&user(true), index, fixture.amount(index, input.merry_balance as u64));
    }

    let mut last: Vec<ReserveSnapshot> = fixture.pool.reserves().cloned().collect();
    for command in &input.commands {
        if let Some(action) = command.to_action(&mut fixture) {
            match fixture.submit(action) {
                Ok(())
                | Err(ModelError::BadRequest)
                | Err(ModelError::UnbackedMintCapExceeded) => {}
                Err(error) => panic!("{:?} failed with {:?}", command, error),
            }
        }
        last = assert_invariants(&fixture, &last);
    }
});

impl Command {
    fn to_action(&self, fixture: &mut TestFixture) -> Option<Action> {
        use Command::*;
        let action = match *self {
            PassTime { minutes } => {
                fixture.jump(minutes as u64 * 60);
                return None;
            }
            Supply { user: u, token, amount } => Action::Supply {
                user: user(u),
                asset: fixture.asset(token.index()),
                amount: amount.to_u256(fixture, token),
            },
            Withdraw { user: u, token, amount } => Action::Withdraw {
                user: user(u),
                asset: fixture.asset(token.index()),
                amount: amount.to_u256(fixture, token),
            },
            Borrow { user: u, token, amount, stable } => Action::Borrow {
                user: user(u),
                asset: fixture.asset(token.index()),
                amount: amount.to_u256(fixture, token),
                rate_mode: rate_mode(stable),
            },
            Repay { user: u, token, amount, stable } => Action::Repay {
                user: user(u),
                asset: fixture.asset(token.index()),
                amount: amount.to_u256(fixture, token),
                rate_mode: rate_mode(stable),
            },
            SwapRateMode { user: u, token, stable } => Action::SwapRateMode {
                user: user(u),
                asset: fixture.asset(token.index()),
                rate_mode: rate_mode(stable),
            },
            Rebalance { user: u, token } => Action::RebalanceStableRate {
                user: user(u),
                asset: fixture.asset(token.index()),
            },
            Transfer { user: u, token, amount } => Action::Transfer {
                from: user(u),
                to: user(!u),
                asset: fixture.asset(token.index()),
                amount: amount.to_u256(fixture, token),
            },
            FlashLoan { user: u, token, amount } => Action::FlashLoan {
                receiver: user(u),
                asset: fixture.asset(token.index()),
                amount: amount.to_u256(fixture, token),
            },
            MintUnbacked { user: u, token, amount } => Action::MintUnbacked {
                user: user(u),
                asset: fixture.asset(token.index()),
                amount: amount.to_u256(fixture, token),
            },
            BackUnbacked { user: u, token, amount, fee } => Action::BackUnbacked {
                user: user(u),
                asset: fixture.asset(token.index()),
                amount: amount.to_u256(fixture, token),
                fee: fixture.amount(token.index(), fee as u64),
            },
            Liquidate {
                user: u,
                debt,
                collateral,
                debt_price,
                collateral_price,
                amount,
                receive_a_token,
            } => {
                if debt_price == 0 || collateral_price == 0 {
                    return None;
                }
                Action::Liquidation {
                    liquidator: user(u),
                    borrower: user(!u),
                    debt_asset: fixture.asset(debt.index()),
                    collateral_asset: fixture.asset(collateral.index()),
                    params: LiquidationParams {
                        debt_price: U256::from(debt_price),
                        collateral_price: U256::from(collateral_price),
                        debt_to_cover: amount.to_u256(fixture, debt),
                        receive_a_token,
                    },
                }
            }
        };
        Some(action)
    }
}

/// Assert indices only grow and the supply usage never exceeds the borrow usage
fn assert_invariants(fixture: &TestFixture, last: &[ReserveSnapshot]) -> Vec<ReserveSnapshot> {
    let reserves: Vec<ReserveSnapshot> = fixture.pool.reserves().cloned().collect();
    for (reserve, prev) in reserves.iter().zip(last.iter()) {
        assert_eq!(reserve.asset, prev.asset);
        assert!(reserve.liquidity_index >= prev.liquidity_index);
        assert!(reserve.variable_borrow_index >= prev.variable_borrow_index);
        assert!(reserve.supply_usage_ratio <= reserve.borrow_usage_ratio);
    }
    reserves
}
