#![cfg(test)]

use alloy_primitives::{Address, U256};
use reserve_model::{
    pool::{Action, RateMode},
    ModelError,
};
use test_suites::{
    assertions::{assert_approx_eq_abs, assert_reserve_solvent},
    create_fixture_with_data,
    test_fixture::{TokenIndex, ONE_DAY},
};

/// Mint unbacked DAI against a borrowed reserve, back it with a fee, then flash loan against
/// the same reserve
#[test]
fn test_bridge_and_flash_loan() {
    let mut fixture = create_fixture_with_data();
    let delta = U256::from(10u8);
    let sam = Address::repeat_byte(0x5A);
    let bridge = Address::repeat_byte(0xBB);
    let merry = Address::repeat_byte(0x3E);
    let dai = fixture.asset(TokenIndex::DAI);

    fixture
        .submit(Action::Borrow {
            user: sam,
            asset: dai,
            amount: fixture.amount(TokenIndex::DAI, 300),
            rate_mode: RateMode::Variable,
        })
        .unwrap();
    fixture
        .submit(Action::MintUnbacked {
            user: bridge,
            asset: dai,
            amount: fixture.amount(TokenIndex::DAI, 100),
        })
        .unwrap();

    let reserve = fixture.reserve(TokenIndex::DAI);
    assert_eq!(reserve.unbacked, fixture.amount(TokenIndex::DAI, 100));
    assert_eq!(reserve.total_liquidity, fixture.amount(TokenIndex::DAI, 800));
    assert_eq!(reserve.scaled_a_token_supply, fixture.amount(TokenIndex::DAI, 1100));
    assert_eq!(
        reserve.borrow_usage_ratio,
        U256::from(300_000_000_000_000_000_000_000_000u128)
    );
    assert_eq!(
        reserve.supply_usage_ratio,
        U256::from(272_727_272_727_272_727_272_727_273u128)
    );
    assert_eq!(
        reserve.liquidity_rate,
        U256::from(11_454_545_454_545_454_545_454_546u128)
    );
    assert_eq!(
        fixture.user(&bridge, TokenIndex::DAI).scaled_a_token_balance,
        fixture.amount(TokenIndex::DAI, 100)
    );

    // the bridge backs more than is unbacked, only the outstanding 100 is taken
    fixture.jump(90 * ONE_DAY);
    fixture.fund(&bridge, TokenIndex::DAI, fixture.amount(TokenIndex::DAI, 200));
    fixture
        .submit(Action::BackUnbacked {
            user: bridge,
            asset: dai,
            amount: fixture.amount(TokenIndex::DAI, 150),
            fee: fixture.amount(TokenIndex::DAI, 5),
        })
        .unwrap();

    let reserve = fixture.reserve(TokenIndex::DAI);
    assert_eq!(reserve.unbacked, U256::ZERO);
    assert_eq!(reserve.available_liquidity, fixture.amount(TokenIndex::DAI, 805));
    assert_approx_eq_abs(
        reserve.liquidity_index,
        U256::from(1_006_914_030_366_361_945_712_324_927u128),
        delta,
    );
    assert_approx_eq_abs(
        reserve.accrued_to_treasury_scaled,
        U256::from(842_787_499_393_238_642u128),
        delta,
    );
    assert_approx_eq_abs(
        reserve.liquidity_rate,
        U256::from(10_493_389_815_295_003_385_157_223u128),
        delta,
    );
    let bridge_dai = fixture.user(&bridge, TokenIndex::DAI);
    assert_eq!(bridge_dai.wallet_balance, fixture.amount(TokenIndex::DAI, 95));
    assert_approx_eq_abs(
        bridge_dai.current_a_token_balance,
        U256::from(100_691_403_036_636_194_571u128),
        delta,
    );
    assert_reserve_solvent(&reserve, delta);

    // merry flash borrows 500 DAI in the same block and pays the 0.09% premium
    fixture.fund(&merry, TokenIndex::DAI, fixture.amount(TokenIndex::DAI, 10));
    fixture
        .submit(Action::FlashLoan {
            receiver: merry,
            asset: dai,
            amount: fixture.amount(TokenIndex::DAI, 500),
        })
        .unwrap();

    let reserve = fixture.reserve(TokenIndex::DAI);
    assert_eq!(
        reserve.available_liquidity,
        U256::from(805_450_000_000_000_000_000u128)
    );
    assert_approx_eq_abs(
        reserve.liquidity_index,
        U256::from(1_007_200_174_767_339_976_938_573_169u128),
        delta,
    );
    assert_approx_eq_abs(
        reserve.accrued_to_treasury_scaled,
        U256::from(976_822_424_507_488_715u128),
        delta,
    );
    assert_approx_eq_abs(
        reserve.liquidity_rate,
        U256::from(10_484_875_118_360_976_057_169_036u128),
        delta,
    );
    assert_eq!(
        fixture.user(&merry, TokenIndex::DAI).wallet_balance,
        U256::from(9_550_000_000_000_000_000u128)
    );
    assert_reserve_solvent(&reserve, delta);
}

#[test]
fn test_mint_unbacked_cap() {
    let mut fixture = create_fixture_with_data();
    let bridge = Address::repeat_byte(0xBB);
    let usdc = fixture.asset(TokenIndex::USDC);

    // the default cap is one million whole tokens in the asset's own decimals
    fixture
        .submit(Action::MintUnbacked {
            user: bridge,
            asset: usdc,
            amount: fixture.amount(TokenIndex::USDC, 1_000_000),
        })
        .unwrap();
    let result = fixture.submit(Action::MintUnbacked {
        user: bridge,
        asset: usdc,
        amount: U256::from(1u8),
    });
    assert_eq!(result, Err(ModelError::UnbackedMintCapExceeded));
    assert_eq!(
        fixture.reserve(TokenIndex::USDC).unbacked,
        U256::from(1_000_000_000_000u64)
    );
}
