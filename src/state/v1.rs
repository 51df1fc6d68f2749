//! Projection of the first marketplace revision.
//!
//! Fees are a percentage of the trade price, split between the platform
//! treasury and a partner wallet. The split percentages live in the
//! configuration singleton and are read at processing time, so trade records
//! and bucket subtotals always reflect the latest observed percentages.

use alloy::primitives::{Address, TxHash, U256};
use fastnum::UD256;
use serde::{Deserialize, Serialize};

use crate::{
    abi::v1::Marketplace::{MarketplaceEvents, Sold},
    error::MarketError,
    num,
    store::{Entity, EntityStore},
    stream,
    types::{BlockCursor, EventContext, StateInstant},
};

use super::{CONFIG_ID, DAY_SECS, HOUR_SECS, MONTH_SECS, bucket_start};

/// Marketplace configuration singleton.
///
/// Defaults to all-zero/unpaused until the first configuration event is
/// observed; that is the defined initial state, not missing data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    pub total_fee_percent: U256,
    pub platform_fee_percent: U256,
    pub partner_fee_percent: U256,
    pub minimum_trade_price: U256,
    pub paused: bool,
}

impl Entity for MarketplaceConfig {
    const KIND: &'static str = "MarketplaceConfig";

    fn id(&self) -> String {
        CONFIG_ID.to_string()
    }
}

/// One settled trade, immutable once written.
///
/// Monetary fields are decimal-normalized from the 10^18-scaled event
/// payload. The platform/partner amounts re-split `total_fee` with the
/// configuration percentages current at processing time.
#[derive(Clone, derive_more::Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub seller: Address,
    pub buyer: Address,
    pub token_id: U256,
    #[debug("{amount}")]
    pub amount: UD256,
    #[debug("{price}")]
    pub price: UD256,
    #[debug("{price_after_fee}")]
    pub price_after_fee: UD256,
    #[debug("{total_fee}")]
    pub total_fee: UD256,
    #[debug("{platform_fee_amount}")]
    pub platform_fee_amount: UD256,
    #[debug("{partner_fee_amount}")]
    pub partner_fee_amount: UD256,
    pub is_buy_limit: bool,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub transaction_hash: TxHash,
}

impl Entity for Transaction {
    const KIND: &'static str = "Transaction";

    fn id(&self) -> String {
        self.id.clone()
    }
}

/// Rolling trade statistics over one time window.
pub(crate) trait TradeStats: Entity {
    const WIDTH_SECS: u64;

    fn open(start_unix_time: u64) -> Self;

    fn absorb(
        &mut self,
        amount: U256,
        price: UD256,
        price_after_fee: UD256,
        config: &MarketplaceConfig,
    );
}

macro_rules! trade_stats {
    ($(#[$doc:meta])* $name:ident, $kind:literal, $width:expr) => {
        $(#[$doc])*
        #[derive(Clone, derive_more::Debug, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub start_unix_time: u64,
            /// Sum of raw (unscaled) traded NFT amounts.
            pub total_amount: U256,
            #[debug("{total_price}")]
            pub total_price: UD256,
            #[debug("{total_price_after_fee}")]
            pub total_price_after_fee: UD256,
            #[debug("{total_fee}")]
            pub total_fee: UD256,
            #[debug("{total_platform_fee}")]
            pub total_platform_fee: UD256,
            #[debug("{total_partner_fee}")]
            pub total_partner_fee: UD256,
            pub total_transaction: u64,
        }

        impl Entity for $name {
            const KIND: &'static str = $kind;

            fn id(&self) -> String {
                self.start_unix_time.to_string()
            }
        }

        impl TradeStats for $name {
            const WIDTH_SECS: u64 = $width;

            fn open(start_unix_time: u64) -> Self {
                Self {
                    start_unix_time,
                    total_amount: U256::ZERO,
                    total_price: UD256::ZERO,
                    total_price_after_fee: UD256::ZERO,
                    total_fee: UD256::ZERO,
                    total_platform_fee: UD256::ZERO,
                    total_partner_fee: UD256::ZERO,
                    total_transaction: 0,
                }
            }

            fn absorb(
                &mut self,
                amount: U256,
                price: UD256,
                price_after_fee: UD256,
                config: &MarketplaceConfig,
            ) {
                self.total_amount += amount;
                self.total_price += price;
                self.total_price_after_fee += price_after_fee;
                self.total_transaction += 1;
                // Recomputed from the running totals rather than accumulated
                // per event, so the fee identity holds exactly at every
                // observation point.
                self.total_fee = self.total_price - self.total_price_after_fee;
                self.total_platform_fee =
                    num::fee_share(self.total_fee, config.platform_fee_percent);
                self.total_partner_fee = num::fee_share(self.total_fee, config.partner_fee_percent);
            }
        }
    };
}

trade_stats!(
    /// Hourly trade statistics, keyed by the window start timestamp.
    TransactionHourData,
    "TransactionHourData",
    HOUR_SECS
);
trade_stats!(
    /// Daily trade statistics, keyed by the window start timestamp.
    TransactionDayData,
    "TransactionDayData",
    DAY_SECS
);
trade_stats!(
    /// Monthly (30-day) trade statistics, keyed by the window start timestamp.
    TransactionMonthData,
    "TransactionMonthData",
    MONTH_SECS
);

/// Stateful projection over a V1 marketplace deployment.
///
/// Owns the entity store and a block cursor; [`Self::apply_events`] folds one
/// block of decoded events at a time, in chain order.
#[derive(Debug)]
pub struct Projection<S> {
    cursor: BlockCursor,
    converter: num::Converter,
    store: S,
}

impl<S: EntityStore> Projection<S> {
    pub fn new(store: S) -> Self {
        Self {
            cursor: BlockCursor::default(),
            converter: num::Converter::token(),
            store,
        }
    }

    /// Instant of the last applied block, if any block was applied yet.
    pub fn instant(&self) -> Option<StateInstant> {
        self.cursor.instant()
    }

    /// Read access to the projected entities.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Applies one block of raw marketplace events.
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
            self.apply(next, event)?;
        }
        self.cursor.advance(next);
        Ok(())
    }

    /// Current configuration; constructs and persists the default singleton
    /// on first access so every handler observes a configuration record.
    pub fn config(&mut self) -> Result<MarketplaceConfig, MarketError> {
        match self.store.load::<MarketplaceConfig>(CONFIG_ID)? {
            Some(config) => Ok(config),
            None => {
                let config = MarketplaceConfig::default();
                self.store.save(&config)?;
                Ok(config)
            }
        }
    }

    fn apply(
        &mut self,
        instant: StateInstant,
        event: &EventContext<MarketplaceEvents>,
    ) -> Result<(), MarketError> {
        match event.event() {
            MarketplaceEvents::Sold(e) => self.handle_sold(instant, event, e),
            MarketplaceEvents::SetFeePercent(e) => {
                let mut config = self.config()?;
                config.platform_fee_percent = e.newPlatformFeePercent;
                config.partner_fee_percent = e.newPartnerFeePercent;
                Ok(self.store.save(&config)?)
            }
            MarketplaceEvents::SetTotalFeePercent(e) => {
                let mut config = self.config()?;
                config.total_fee_percent = e.newTotalFeePercent;
                Ok(self.store.save(&config)?)
            }
            MarketplaceEvents::SetMinimumTradePrice(e) => {
                let mut config = self.config()?;
                config.minimum_trade_price = e.newMinimumTradePrice;
                Ok(self.store.save(&config)?)
            }
            MarketplaceEvents::Paused(_) => self.set_paused(true),
            MarketplaceEvents::Unpaused(_) => self.set_paused(false),
            // Role membership is not part of the projected read state
            MarketplaceEvents::RoleAdminChanged(_)
            | MarketplaceEvents::RoleGranted(_)
            | MarketplaceEvents::RoleRevoked(_) => Ok(()),
        }
    }

    fn set_paused(&mut self, paused: bool) -> Result<(), MarketError> {
        let mut config = self.config()?;
        config.paused = paused;
        Ok(self.store.save(&config)?)
    }

    fn handle_sold(
        &mut self,
        instant: StateInstant,
        ctx: &EventContext<MarketplaceEvents>,
        e: &Sold,
    ) -> Result<(), MarketError> {
        let config = self.config()?;
        let price = self.converter.from_unsigned(e.price);
        let price_after_fee = self.converter.from_unsigned(e.priceAfterFee);
        let total_fee = price - price_after_fee;

        self.store.save(&Transaction {
            id: ctx.entity_id(),
            seller: e.seller,
            buyer: e.buyer,
            token_id: e.tokenId,
            amount: self.converter.from_unsigned(e.amount),
            price,
            price_after_fee,
            total_fee,
            platform_fee_amount: num::fee_share(total_fee, config.platform_fee_percent),
            partner_fee_amount: num::fee_share(total_fee, config.partner_fee_percent),
            is_buy_limit: e.isBuyLimit,
            block_number: instant.block_number(),
            block_timestamp: instant.block_timestamp(),
            transaction_hash: ctx.tx_hash(),
        })?;

        self.roll::<TransactionHourData>(instant, e.amount, price, price_after_fee, &config)?;
        self.roll::<TransactionDayData>(instant, e.amount, price, price_after_fee, &config)?;
        self.roll::<TransactionMonthData>(instant, e.amount, price, price_after_fee, &config)?;
        Ok(())
    }

    fn roll<B: TradeStats>(
        &mut self,
        instant: StateInstant,
        amount: U256,
        price: UD256,
        price_after_fee: UD256,
        config: &MarketplaceConfig,
    ) -> Result<(), MarketError> {
        let start = bucket_start(instant.block_timestamp(), B::WIDTH_SECS);
        let mut bucket = self
            .store
            .load::<B>(&start.to_string())?
            .unwrap_or_else(|| B::open(start));
        bucket.absorb(amount, price, price_after_fee, config);
        Ok(self.store.save(&bucket)?)
    }
}
