//! Test fixtures: mock marketplace events with controllable envelopes.
//!
//! Builders return the decoded event enums directly, so tests assemble a
//! block the same way [`crate::stream::raw`] would have produced it:
//!
//! ```ignore
//! let block = testing::block(1, 1000, vec![testing::ctx(testing::v1::sold(..))]);
//! projection.apply_events(&block)?;
//! ```

use alloy::primitives::{Address, B256, TxHash, U256, b256};

use crate::types::{BlockEvents, EventContext, StateInstant};

/// Transaction hash used by [`ctx`] when the test does not care.
pub const DEFAULT_TX_HASH: TxHash =
    b256!("0xa16081f360e3847006db660bae1c6d1b2e17ec2aa16081f360e3847006db660b");

/// `n`, scaled to payment-token base units (10^18).
pub fn eth(n: u64) -> U256 {
    U256::from(n) * U256::from(10).pow(U256::from(18))
}

/// `n` percent as the raw fixed-point percentage (10^8 scale).
pub fn pct(n: u64) -> U256 {
    U256::from(n) * U256::from(10).pow(U256::from(8))
}

/// Deterministic test account.
pub fn account(n: u8) -> Address {
    Address::repeat_byte(n)
}

/// Deterministic test role id.
pub fn role(n: u8) -> B256 {
    B256::repeat_byte(n)
}

/// Wraps an event with the default envelope (log index 1).
pub fn ctx<T>(event: T) -> EventContext<T> {
    with_ctx(DEFAULT_TX_HASH, 1, event)
}

/// Wraps an event with an explicit envelope.
pub fn with_ctx<T>(tx_hash: TxHash, log_index: u64, event: T) -> EventContext<T> {
    EventContext::new(tx_hash, log_index, event)
}

/// One block of events at the given height and timestamp.
pub fn block<T>(
    block_number: u64,
    block_timestamp: u64,
    events: Vec<EventContext<T>>,
) -> BlockEvents<T> {
    BlockEvents::new(StateInstant::new(block_number, block_timestamp), events)
}

/// Builders for first-revision events.
pub mod v1 {
    use super::*;
    use crate::abi::v1::Marketplace::{self, MarketplaceEvents};

    pub fn sold(
        seller: Address,
        buyer: Address,
        token_id: U256,
        amount: U256,
        price: U256,
        price_after_fee: U256,
        is_buy_limit: bool,
    ) -> MarketplaceEvents {
        MarketplaceEvents::Sold(Marketplace::Sold {
            seller,
            buyer,
            tokenId: token_id,
            amount,
            price,
            priceAfterFee: price_after_fee,
            isBuyLimit: is_buy_limit,
        })
    }

    pub fn set_fee_percent(platform: U256, partner: U256) -> MarketplaceEvents {
        MarketplaceEvents::SetFeePercent(Marketplace::SetFeePercent {
            newPlatformFeePercent: platform,
            newPartnerFeePercent: partner,
        })
    }

    pub fn set_total_fee_percent(total: U256) -> MarketplaceEvents {
        MarketplaceEvents::SetTotalFeePercent(Marketplace::SetTotalFeePercent {
            newTotalFeePercent: total,
        })
    }

    pub fn set_minimum_trade_price(price: U256) -> MarketplaceEvents {
        MarketplaceEvents::SetMinimumTradePrice(Marketplace::SetMinimumTradePrice {
            newMinimumTradePrice: price,
        })
    }

    pub fn paused(account: Address) -> MarketplaceEvents {
        MarketplaceEvents::Paused(Marketplace::Paused { account })
    }

    pub fn unpaused(account: Address) -> MarketplaceEvents {
        MarketplaceEvents::Unpaused(Marketplace::Unpaused { account })
    }

    pub fn role_admin_changed(
        role: B256,
        previous_admin_role: B256,
        new_admin_role: B256,
    ) -> MarketplaceEvents {
        MarketplaceEvents::RoleAdminChanged(Marketplace::RoleAdminChanged {
            role,
            previousAdminRole: previous_admin_role,
            newAdminRole: new_admin_role,
        })
    }

    pub fn role_granted(role: B256, account: Address, sender: Address) -> MarketplaceEvents {
        MarketplaceEvents::RoleGranted(Marketplace::RoleGranted {
            role,
            account,
            sender,
        })
    }

    pub fn role_revoked(role: B256, account: Address, sender: Address) -> MarketplaceEvents {
        MarketplaceEvents::RoleRevoked(Marketplace::RoleRevoked {
            role,
            account,
            sender,
        })
    }
}

/// Builders for second-revision events.
pub mod v2 {
    use super::*;
    use crate::abi::v2::MarketplaceV2::{self, MarketplaceV2Events};

    #[allow(clippy::too_many_arguments)]
    pub fn sold(
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
    ) -> MarketplaceV2Events {
        MarketplaceV2Events::Sold(MarketplaceV2::Sold {
            seller,
            buyer,
            nftTo: nft_to,
            tokenId: token_id,
            amount,
            price,
            netAmount: net_amount,
            percentageFeeAmount: percentage_fee_amount,
            fixedFeeAmount: fixed_fee_amount,
            isBuyLimit: is_buy_limit,
        })
    }

    pub fn fee_updated(percentage_fee: U256, fixed_fee: U256) -> MarketplaceV2Events {
        MarketplaceV2Events::FeeUpdated(MarketplaceV2::FeeUpdated {
            newPercentageFee: percentage_fee,
            newFixedFee: fixed_fee,
        })
    }

    pub fn minimum_trade_price_updated(price: U256) -> MarketplaceV2Events {
        MarketplaceV2Events::MinimumTradePriceUpdated(MarketplaceV2::MinimumTradePriceUpdated {
            newMinimumTradePrice: price,
        })
    }

    pub fn paused(account: Address) -> MarketplaceV2Events {
        MarketplaceV2Events::Paused(MarketplaceV2::Paused { account })
    }

    pub fn unpaused(account: Address) -> MarketplaceV2Events {
        MarketplaceV2Events::Unpaused(MarketplaceV2::Unpaused { account })
    }

    pub fn role_granted(role: B256, account: Address, sender: Address) -> MarketplaceV2Events {
        MarketplaceV2Events::RoleGranted(MarketplaceV2::RoleGranted {
            role,
            account,
            sender,
        })
    }
}
