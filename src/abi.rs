//! Event interfaces of the marketplace contract revisions.
//!
//! Only events are declared: the indexer is a pure log consumer and never
//! calls into the contracts. The generated `*Events` enums are closed over
//! the full event set of each revision, so handler dispatch is an exhaustive
//! `match` checked at compile time.

/// First marketplace revision: percentage fees split between the platform
/// treasury and a partner wallet.
pub mod v1 {
    alloy::sol! {
        #[derive(Debug)]
        contract Marketplace {
            event Sold(
                address seller,
                address buyer,
                uint256 tokenId,
                uint256 amount,
                uint256 price,
                uint256 priceAfterFee,
                bool isBuyLimit
            );

            event SetFeePercent(uint256 newPlatformFeePercent, uint256 newPartnerFeePercent);

            event SetTotalFeePercent(uint256 newTotalFeePercent);

            event SetMinimumTradePrice(uint256 newMinimumTradePrice);

            event Paused(address account);

            event Unpaused(address account);

            event RoleAdminChanged(
                bytes32 indexed role,
                bytes32 indexed previousAdminRole,
                bytes32 indexed newAdminRole
            );

            event RoleGranted(bytes32 indexed role, address indexed account, address indexed sender);

            event RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender);
        }
    }
}

/// Second marketplace revision: one percentage fee plus a flat fixed fee,
/// with an explicit NFT receiver on each trade.
pub mod v2 {
    alloy::sol! {
        #[derive(Debug)]
        contract MarketplaceV2 {
            event Sold(
                address seller,
                address buyer,
                address nftTo,
                uint256 tokenId,
                uint256 amount,
                uint256 price,
                uint256 netAmount,
                uint256 percentageFeeAmount,
                uint256 fixedFeeAmount,
                bool isBuyLimit
            );

            event FeeUpdated(uint256 newPercentageFee, uint256 newFixedFee);

            event MinimumTradePriceUpdated(uint256 newMinimumTradePrice);

            event Paused(address account);

            event Unpaused(address account);

            event RoleAdminChanged(
                bytes32 indexed role,
                bytes32 indexed previousAdminRole,
                bytes32 indexed newAdminRole
            );

            event RoleGranted(bytes32 indexed role, address indexed account, address indexed sender);

            event RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender);
        }
    }
}
