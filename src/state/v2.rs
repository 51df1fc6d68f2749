//! Projection of the second marketplace revision.
//!
//! V2 charges one percentage fee plus a flat fixed fee and names the NFT
//! receiver on every trade. The percentage fee amount arrives in the `Sold`
//! payload itself; the fixed fee is read from the configuration singleton at
//! processing time.

use alloy::primitives::{Address, TxHash, U256};
use fastnum::UD256;
use serde::{Deserialize, Serialize};

use crate::{
    abi::v2::MarketplaceV2::{MarketplaceV2Events, Sold},
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
    /// Percentage fee, fixed-point 10^8 scale (raw 10^10 == 100%).
    pub fee_percentage: U256,
    /// Flat fee per trade in payment-token base units.
    pub fixed_fee: U256,
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
#[derive(Clone, derive_more::Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub seller: Address,
    pub buyer: Address,
    /// Account the NFT was delivered to; differs from `buyer` on gift trades.
    pub nft_to: Address,
    pub token_id: U256,
    #[debug("{amount}")]
    pub amount: UD256,
    #[debug("{price}")]
    pub price: UD256,
    #[debug("{net_amount}")]
    pub net_amount: UD256,
    #[debug("{total_fee}")]
    pub total_fee: UD256,
    /// Percentage fee, decimal-normalized from the event payload.
    #[debug("{percentage_fee_amount}")]
    pub percentage_fee_amount: UD256,
    /// Flat fee, decimal-normalized from the configuration current at
    /// processing time.
    #[debug("{fixed_fee_amount}")]
    pub fixed_fee_amount: UD256,
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
        net_amount: UD256,
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
            #[debug("{total_net_amount}")]
            pub total_net_amount: UD256,
            #[debug("{total_fee}")]
            pub total_fee: UD256,
            #[debug("{total_percentage_fee}")]
            pub total_percentage_fee: UD256,
            #[debug("{total_fixed_fee}")]
            pub total_fixed_fee: UD256,
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
                    total_net_amount: UD256::ZERO,
                    total_fee: UD256::ZERO,
                    total_percentage_fee: UD256::ZERO,
                    total_fixed_fee: UD256::ZERO,
                    total_transaction: 0,
                }
            }

            fn absorb(
                &mut self,
                amount: U256,
                price: UD256,
                net_amount: UD256,
                config: &MarketplaceConfig,
            ) {
                self.total_amount += amount;
                self.total_price += price;
                self.total_net_amount += net_amount;
                self.total_transaction += 1;
                // Recomputed from the running totals rather than accumulated
                // per event, so the fee identity holds exactly at every
                // observation point.
                self.total_fee = self.total_price - self.total_net_amount;
                self.total_fixed_fee = num::Converter::token().from_unsigned(config.fixed_fee)
                    * UD256::from(self.total_transaction);
                self.total_percentage_fee = self.total_fee - self.total_fixed_fee;
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

/// Stateful projection over a V2 marketplace deployment.
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
        events: &stream::RawBlockEvents<MarketplaceV2Events>,
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
        event: &EventContext<MarketplaceV2Events>,
    ) -> Result<(), MarketError> {
        match event.event() {
            MarketplaceV2Events::Sold(e) => self.handle_sold(instant, event, e),
            MarketplaceV2Events::FeeUpdated(e) => {
                let mut config = self.config()?;
                config.fee_percentage = e.newPercentageFee;
                config.fixed_fee = e.newFixedFee;
                Ok(self.store.save(&config)?)
            }
            MarketplaceV2Events::MinimumTradePriceUpdated(e) => {
                let mut config = self.config()?;
                config.minimum_trade_price = e.newMinimumTradePrice;
                Ok(self.store.save(&config)?)
            }
            MarketplaceV2Events::Paused(_) => self.set_paused(true),
            MarketplaceV2Events::Unpaused(_) => self.set_paused(false),
            // Role membership is not part of the projected read state
            MarketplaceV2Events::RoleAdminChanged(_)
            | MarketplaceV2Events::RoleGranted(_)
            | MarketplaceV2Events::RoleRevoked(_) => Ok(()),
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
        ctx: &EventContext<MarketplaceV2Events>,
        e: &Sold,
    ) -> Result<(), MarketError> {
        let config = self.config()?;
        let price = self.converter.from_unsigned(e.price);
        let net_amount = self.converter.from_unsigned(e.netAmount);

        self.store.save(&Transaction {
            id: ctx.entity_id(),
            seller: e.seller,
            buyer: e.buyer,
            nft_to: e.nftTo,
            token_id: e.tokenId,
            amount: self.converter.from_unsigned(e.amount),
            price,
            net_amount,
            total_fee: price - net_amount,
            percentage_fee_amount: self.converter.from_unsigned(e.percentageFeeAmount),
            fixed_fee_amount: self.converter.from_unsigned(config.fixed_fee),
            is_buy_limit: e.isBuyLimit,
            block_number: instant.block_number(),
            block_timestamp: instant.block_timestamp(),
            transaction_hash: ctx.tx_hash(),
        })?;

        self.roll::<TransactionHourData>(instant, e.amount, price, net_amount, &config)?;
        self.roll::<TransactionDayData>(instant, e.amount, price, net_amount, &config)?;
        self.roll::<TransactionMonthData>(instant, e.amount, price, net_amount, &config)?;
        Ok(())
    }

    fn roll<B: TradeStats>(
        &mut self,
        instant: StateInstant,
        amount: U256,
        price: UD256,
        net_amount: UD256,
        config: &MarketplaceConfig,
    ) -> Result<(), MarketError> {
        let start = bucket_start(instant.block_timestamp(), B::WIDTH_SECS);
        let mut bucket = self
            .store
            .load::<B>(&start.to_string())?
            .unwrap_or_else(|| B::open(start));
        bucket.absorb(amount, price, net_amount, config);
        Ok(self.store.save(&bucket)?)
    }
}
