//! Per-event records of the second marketplace revision.

use alloy::primitives::{Address, B256, U256};

use crate::{
    abi::v2::MarketplaceV2::MarketplaceV2Events,
    error::MarketError,
    store::EntityStore,
    stream,
    types::{BlockCursor, EventContext, StateInstant},
};

use super::log_entity;

log_entity!(Paused, "Paused" { account: Address });

log_entity!(Unpaused, "Unpaused" { account: Address });

log_entity!(RoleAdminChanged, "RoleAdminChanged" {
    role: B256,
    previous_admin_role: B256,
    new_admin_role: B256,
});

log_entity!(RoleGranted, "RoleGranted" {
    role: B256,
    account: Address,
    sender: Address,
});

log_entity!(RoleRevoked, "RoleRevoked" {
    role: B256,
    account: Address,
    sender: Address,
});

log_entity!(FeeUpdated, "FeeUpdated" {
    new_percentage_fee: U256,
    new_fixed_fee: U256,
});

log_entity!(MinimumTradePriceUpdated, "MinimumTradePriceUpdated" {
    new_minimum_trade_price: U256,
});

log_entity!(
    /// One `Sold` event with raw (unscaled) monetary values.
    Sold, "Sold" {
    seller: Address,
    buyer: Address,
    nft_to: Address,
    token_id: U256,
    amount: U256,
    price: U256,
    net_amount: U256,
    percentage_fee_amount: U256,
    fixed_fee_amount: U256,
    is_buy_limit: bool,
});

/// Raw event recorder over a V2 marketplace deployment.
#[derive(Debug)]
pub struct Recorder<S> {
    cursor: BlockCursor,
    store: S,
}

impl<S: EntityStore> Recorder<S> {
    pub fn new(store: S) -> Self {
        Self {
            cursor: BlockCursor::default(),
            store,
        }
    }

    /// Instant of the last applied block, if any block was applied yet.
    pub fn instant(&self) -> Option<StateInstant> {
        self.cursor.instant()
    }

    /// Read access to the recorded entities.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Records one block of raw marketplace events, one entity per event.
    ///
    /// Blocks must arrive strictly in order. A block at or before the cursor
    /// is ignored (safe replay); a gap is [`MarketError::BlockOutOfOrder`].
    pub fn apply_events(
        &mut self,
        events: &stream::RawBlockEvents<MarketplaceV2Events>,
    ) -> Result<(), MarketError> {
        let next = events.instant();
        if !self.cursor.admits(next)? {
            return Ok(());
        }

        for event in events.events() {
            self.record(next, event)?;
        }
        self.cursor.advance(next);
        Ok(())
    }

    fn record(
        &mut self,
        instant: StateInstant,
        ctx: &EventContext<MarketplaceV2Events>,
    ) -> Result<(), MarketError> {
        let id = ctx.entity_id();
        let block_number = instant.block_number();
        let block_timestamp = instant.block_timestamp();
        let transaction_hash = ctx.tx_hash();

        match ctx.event() {
            MarketplaceV2Events::Paused(e) => self.store.save(&Paused {
                id,
                account: e.account,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceV2Events::Unpaused(e) => self.store.save(&Unpaused {
                id,
                account: e.account,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceV2Events::RoleAdminChanged(e) => self.store.save(&RoleAdminChanged {
                id,
                role: e.role,
                previous_admin_role: e.previousAdminRole,
                new_admin_role: e.newAdminRole,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceV2Events::RoleGranted(e) => self.store.save(&RoleGranted {
                id,
                role: e.role,
                account: e.account,
                sender: e.sender,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceV2Events::RoleRevoked(e) => self.store.save(&RoleRevoked {
                id,
                role: e.role,
                account: e.account,
                sender: e.sender,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceV2Events::FeeUpdated(e) => self.store.save(&FeeUpdated {
                id,
                new_percentage_fee: e.newPercentageFee,
                new_fixed_fee: e.newFixedFee,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceV2Events::MinimumTradePriceUpdated(e) => {
                self.store.save(&MinimumTradePriceUpdated {
                    id,
                    new_minimum_trade_price: e.newMinimumTradePrice,
                    block_number,
                    block_timestamp,
                    transaction_hash,
                })?
            }
            MarketplaceV2Events::Sold(e) => self.store.save(&Sold {
                id,
                seller: e.seller,
                buyer: e.buyer,
                nft_to: e.nftTo,
                token_id: e.tokenId,
                amount: e.amount,
                price: e.price,
                net_amount: e.netAmount,
                percentage_fee_amount: e.percentageFeeAmount,
                fixed_fee_amount: e.fixedFeeAmount,
                is_buy_limit: e.isBuyLimit,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
        }
        Ok(())
    }
}
