use alloy_primitives::U256;
use reserve_model::pool::{ReserveSnapshot, UserSnapshot};

pub fn assert_approx_eq_abs(a: U256, b: U256, delta: U256) {
    assert!(
        a.abs_diff(b) < delta,
        "assertion failed: `(left != right)` \
         (left: `{:?}`, right: `{:?}`, epsilon: `{:?}`)",
        a,
        b,
        delta
    );
}

/// Assert every balance, index and rate of two reserve snapshots are within `delta`
pub fn assert_reserve_approx_eq(actual: &ReserveSnapshot, expected: &ReserveSnapshot, delta: U256) {
    assert_eq!(actual.asset, expected.asset);
    assert_eq!(actual.last_update_timestamp, expected.last_update_timestamp);
    let fields = [
        ("liquidity_index", actual.liquidity_index, expected.liquidity_index),
        ("variable_borrow_index", actual.variable_borrow_index, expected.variable_borrow_index),
        ("liquidity_rate", actual.liquidity_rate, expected.liquidity_rate),
        ("variable_borrow_rate", actual.variable_borrow_rate, expected.variable_borrow_rate),
        ("stable_borrow_rate", actual.stable_borrow_rate, expected.stable_borrow_rate),
        (
            "average_stable_borrow_rate",
            actual.average_stable_borrow_rate,
            expected.average_stable_borrow_rate,
        ),
        ("total_stable_debt", actual.total_stable_debt, expected.total_stable_debt),
        ("total_variable_debt", actual.total_variable_debt, expected.total_variable_debt),
        ("available_liquidity", actual.available_liquidity, expected.available_liquidity),
        ("unbacked", actual.unbacked, expected.unbacked),
        (
            "accrued_to_treasury_scaled",
            actual.accrued_to_treasury_scaled,
            expected.accrued_to_treasury_scaled,
        ),
    ];
    for (name, a, b) in fields {
        assert!(
            a.abs_diff(b) < delta,
            "reserve field `{}` differs (left: `{}`, right: `{}`, epsilon: `{}`)",
            name,
            a,
            b,
            delta
        );
    }
}

/// Assert every balance of two positions are within `delta`
pub fn assert_user_approx_eq(actual: &UserSnapshot, expected: &UserSnapshot, delta: U256) {
    assert_eq!(actual.user, expected.user);
    assert_eq!(actual.asset, expected.asset);
    assert_eq!(
        actual.usage_as_collateral_enabled,
        expected.usage_as_collateral_enabled
    );
    let fields = [
        ("current_a_token_balance", actual.current_a_token_balance, expected.current_a_token_balance),
        ("current_variable_debt", actual.current_variable_debt, expected.current_variable_debt),
        ("current_stable_debt", actual.current_stable_debt, expected.current_stable_debt),
        ("stable_borrow_rate", actual.stable_borrow_rate, expected.stable_borrow_rate),
        ("wallet_balance", actual.wallet_balance, expected.wallet_balance),
    ];
    for (name, a, b) in fields {
        assert!(
            a.abs_diff(b) < delta,
            "user field `{}` differs (left: `{}`, right: `{}`, epsilon: `{}`)",
            name,
            a,
            b,
            delta
        );
    }
}

/// Assert the reserve can cover every supply claim against it
pub fn assert_reserve_solvent(reserve: &ReserveSnapshot, delta: U256) {
    let supply = reserve.total_a_token_supply().unwrap();
    let backing = reserve.available_liquidity
        + reserve.unbacked
        + reserve.total_variable_debt
        + reserve.total_stable_debt;
    assert!(
        backing + delta > supply,
        "reserve {} is insolvent (backing: `{}`, supply: `{}`)",
        reserve.symbol,
        backing,
        supply
    );
}
