//! Per-event records of the first marketplace revision.

use alloy::primitives::{Address, B256, U256};

use crate::{
    abi::v1::Marketplace::MarketplaceEvents,
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

log_entity!(SetFeePercent, "SetFeePercent" {
    new_platform_fee_percent: U256,
    new_partner_fee_percent: U256,
});

log_entity!(SetTotalFeePercent, "SetTotalFeePercent" {
    new_total_fee_percent: U256,
});

log_entity!(SetMinimumTradePrice, "SetMinimumTradePrice" {
    new_minimum_trade_price: U256,
});

log_entity!(
    /// One `Sold` event with raw (unscaled) monetary values.
    Sold, "Sold" {
    seller: Address,
    buyer: Address,
    token_id: U256,
    amount: U256,
    price: U256,
    price_after_fee: U256,
    is_buy_limit: bool,
});

/// Raw event recorder over a V1 marketplace deployment.
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
        events: &stream::RawBlockEvents<MarketplaceEvents>,
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
        ctx: &EventContext<MarketplaceEvents>,
    ) -> Result<(), MarketError> {
        let id = ctx.entity_id();
        let block_number = instant.block_number();
        let block_timestamp = instant.block_timestamp();
        let transaction_hash = ctx.tx_hash();

        match ctx.event() {
            MarketplaceEvents::Paused(e) => self.store.save(&Paused {
                id,
                account: e.account,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceEvents::Unpaused(e) => self.store.save(&Unpaused {
                id,
                account: e.account,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceEvents::RoleAdminChanged(e) => self.store.save(&RoleAdminChanged {
                id,
                role: e.role,
                previous_admin_role: e.previousAdminRole,
                new_admin_role: e.newAdminRole,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceEvents::RoleGranted(e) => self.store.save(&RoleGranted {
                id,
                role: e.role,
                account: e.account,
                sender: e.sender,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceEvents::RoleRevoked(e) => self.store.save(&RoleRevoked {
                id,
                role: e.role,
                account: e.account,
                sender: e.sender,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceEvents::SetFeePercent(e) => self.store.save(&SetFeePercent {
                id,
                new_platform_fee_percent: e.newPlatformFeePercent,
                new_partner_fee_percent: e.newPartnerFeePercent,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceEvents::SetTotalFeePercent(e) => self.store.save(&SetTotalFeePercent {
                id,
                new_total_fee_percent: e.newTotalFeePercent,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceEvents::SetMinimumTradePrice(e) => self.store.save(&SetMinimumTradePrice {
                id,
                new_minimum_trade_price: e.newMinimumTradePrice,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
            MarketplaceEvents::Sold(e) => self.store.save(&Sold {
                id,
                seller: e.seller,
                buyer: e.buyer,
                token_id: e.tokenId,
                amount: e.amount,
                price: e.price,
                price_after_fee: e.priceAfterFee,
                is_buy_limit: e.isBuyLimit,
                block_number,
                block_timestamp,
                transaction_hash,
            })?,
        }
        Ok(())
    }
}
