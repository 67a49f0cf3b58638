use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use crate::{
    config::{PoolConfig, ReserveConfig},
    errors::ModelError,
};

use super::{reserve::ReserveSnapshot, user::UserSnapshot};

/// The expected state of every listed reserve and every touched position. Actions read
/// snapshots out of the pool and cache the updated snapshots back into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    pub config: PoolConfig,
    reserve_configs: BTreeMap<Address, ReserveConfig>,
    reserves: BTreeMap<Address, ReserveSnapshot>,
    users: BTreeMap<(Address, Address), UserSnapshot>, // keyed by (user, asset)
}

impl Pool {
    /// Create a pool with no reserves
    ///
    /// ### Errors
    /// If the pool configuration is invalid
    pub fn new(config: PoolConfig) -> Result<Pool, ModelError> {
        config.validate()?;
        Ok(Pool {
            config,
            reserve_configs: BTreeMap::new(),
            reserves: BTreeMap::new(),
            users: BTreeMap::new(),
        })
    }

    /// List a reserve in the pool
    ///
    /// ### Arguments
    /// * `config` - The reserve configuration
    /// * `reserve` - The initial state of the reserve
    ///
    /// ### Errors
    /// If the configuration is invalid or the asset is already listed
    pub fn list_reserve(
        &mut self,
        config: ReserveConfig,
        reserve: ReserveSnapshot,
    ) -> Result<(), ModelError> {
        config.validate()?;
        if self.reserves.contains_key(&reserve.asset) {
            return Err(ModelError::BadRequest);
        }
        tracing::debug!(asset = %reserve.asset, symbol = %reserve.symbol, "list reserve");
        self.reserve_configs.insert(reserve.asset, config);
        self.reserves.insert(reserve.asset, reserve);
        Ok(())
    }

    /// Load the configuration of a listed reserve
    ///
    /// ### Errors
    /// If the asset is not listed
    pub fn load_config(&self, asset: &Address) -> Result<&ReserveConfig, ModelError> {
        self.reserve_configs
            .get(asset)
            .ok_or(ModelError::ReserveNotFound)
    }

    /// Load the cached state of a listed reserve
    ///
    /// ### Errors
    /// If the asset is not listed
    pub fn load_reserve(&self, asset: &Address) -> Result<ReserveSnapshot, ModelError> {
        self.reserves
            .get(asset)
            .cloned()
            .ok_or(ModelError::ReserveNotFound)
    }

    /// Load a user's position in a listed reserve. Users the pool has not seen start with an
    /// empty position and an empty wallet.
    ///
    /// ### Errors
    /// If the asset is not listed
    pub fn load_user(&self, user: &Address, asset: &Address) -> Result<UserSnapshot, ModelError> {
        if !self.reserves.contains_key(asset) {
            return Err(ModelError::ReserveNotFound);
        }
        Ok(self
            .users
            .get(&(*user, *asset))
            .cloned()
            .unwrap_or_else(|| UserSnapshot::new(*user, *asset, U256::ZERO)))
    }

    /// Cache an updated reserve
    pub fn cache_reserve(&mut self, reserve: ReserveSnapshot) {
        self.reserves.insert(reserve.asset, reserve);
    }

    /// Cache an updated position
    pub fn cache_user(&mut self, user: UserSnapshot) {
        self.users.insert((user.user, user.asset), user);
    }

    /// Set the underlying a user holds outside of a reserve
    ///
    /// ### Errors
    /// If the asset is not listed
    pub fn set_wallet_balance(
        &mut self,
        user: &Address,
        asset: &Address,
        amount: U256,
    ) -> Result<(), ModelError> {
        let mut position = self.load_user(user, asset)?;
        position.wallet_balance = amount;
        self.cache_user(position);
        Ok(())
    }

    /// The cached reserves, ordered by asset
    pub fn reserves(&self) -> impl Iterator<Item = &ReserveSnapshot> {
        self.reserves.values()
    }

    /// The cached positions, ordered by user then asset
    pub fn users(&self) -> impl Iterator<Item = &UserSnapshot> {
        self.users.values()
    }
}
