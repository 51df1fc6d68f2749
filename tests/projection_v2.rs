//! End-to-end scenarios for the V2 stateful projection.

use alloy::primitives::U256;
use fastnum::udec256;
use market_indexer::{
    state::v2::{
        MarketplaceConfig, Projection, Transaction, TransactionDayData, TransactionHourData,
        TransactionMonthData,
    },
    store::{Entity, EntityStore, MemoryStore},
    testing::{self, account, eth, pct},
};

fn projection() -> Projection<MemoryStore> {
    Projection::new(MemoryStore::new())
}

/// Configures a 10% percentage fee and a 1-token fixed fee.
fn configure_fees(projection: &mut Projection<MemoryStore>, block_number: u64, timestamp: u64) {
    projection
        .apply_events(&testing::block(
            block_number,
            timestamp,
            vec![testing::ctx(testing::v2::fee_updated(pct(10), eth(1)))],
        ))
        .unwrap();
}

#[test]
fn test_fee_updated_sets_both_fee_fields() {
    let mut projection = projection();
    configure_fees(&mut projection, 1, 1000);

    let config = projection.config().unwrap();
    assert_eq!(config.fee_percentage, pct(10));
    assert_eq!(config.fixed_fee, eth(1));
    assert_eq!(config.minimum_trade_price, U256::ZERO);
    assert!(!config.paused);
}

#[test]
fn test_minimum_trade_price_updated() {
    let mut projection = projection();
    projection
        .apply_events(&testing::block(
            1,
            1000,
            vec![testing::ctx(testing::v2::minimum_trade_price_updated(eth(
                3,
            )))],
        ))
        .unwrap();
    let config = projection.config().unwrap();
    assert_eq!(config.minimum_trade_price, eth(3));
    assert_eq!(config.fee_percentage, U256::ZERO);
}

#[test]
fn test_pause_events_toggle_the_flag() {
    let mut projection = projection();
    projection
        .apply_events(&testing::block(
            1,
            1000,
            vec![testing::ctx(testing::v2::paused(account(9)))],
        ))
        .unwrap();
    assert!(projection.config().unwrap().paused);

    projection
        .apply_events(&testing::block(
            2,
            1012,
            vec![testing::ctx(testing::v2::unpaused(account(9)))],
        ))
        .unwrap();
    assert!(!projection.config().unwrap().paused);
}

#[test]
fn test_sold_records_receiver_and_fee_breakdown() {
    let mut projection = projection();
    configure_fees(&mut projection, 1, 1000);

    // price 100, percentage fee 10, fixed fee 1 -> net 89
    projection
        .apply_events(&testing::block(
            2,
            1012,
            vec![testing::with_ctx(
                testing::DEFAULT_TX_HASH,
                2,
                testing::v2::sold(
                    account(1),
                    account(2),
                    account(3),
                    U256::from(7),
                    eth(1),
                    eth(100),
                    eth(89),
                    eth(10),
                    eth(1),
                    false,
                ),
            )],
        ))
        .unwrap();

    let trades = projection.store().all::<Transaction>().unwrap();
    assert_eq!(trades.len(), 1);
    let trade = &trades[0];
    assert_eq!(trade.seller, account(1));
    assert_eq!(trade.buyer, account(2));
    assert_eq!(trade.nft_to, account(3));
    assert_eq!(trade.token_id, U256::from(7));
    assert_eq!(trade.amount, udec256!(1));
    assert_eq!(trade.price, udec256!(100));
    assert_eq!(trade.net_amount, udec256!(89));
    assert_eq!(trade.total_fee, udec256!(11));
    assert_eq!(trade.percentage_fee_amount, udec256!(10));
    // Fixed fee comes from the live configuration, not the event payload
    assert_eq!(trade.fixed_fee_amount, udec256!(1));
    assert_eq!(trade.block_number, 2);
    assert_eq!(trade.block_timestamp, 1012);
    assert_eq!(trade.transaction_hash, testing::DEFAULT_TX_HASH);
}

#[test]
fn test_sold_without_configuration_yields_zero_fixed_fee() {
    let mut projection = projection();
    projection
        .apply_events(&testing::block(
            1,
            1000,
            vec![testing::ctx(testing::v2::sold(
                account(1),
                account(2),
                account(2),
                U256::from(1),
                eth(1),
                eth(100),
                eth(90),
                eth(10),
                U256::ZERO,
                true,
            ))],
        ))
        .unwrap();

    let trade = &projection.store().all::<Transaction>().unwrap()[0];
    assert_eq!(trade.total_fee, udec256!(10));
    assert_eq!(trade.percentage_fee_amount, udec256!(10));
    assert_eq!(trade.fixed_fee_amount, udec256!(0));
    assert!(trade.is_buy_limit);
}

#[test]
fn test_buckets_split_fee_into_fixed_and_percentage_parts() {
    let mut projection = projection();
    configure_fees(&mut projection, 1, 900);

    let sold = || {
        testing::ctx(testing::v2::sold(
            account(1),
            account(2),
            account(2),
            U256::from(1),
            eth(2),
            eth(100),
            eth(89),
            eth(10),
            eth(1),
            false,
        ))
    };
    projection
        .apply_events(&testing::block(2, 1000, vec![sold()]))
        .unwrap();
    projection
        .apply_events(&testing::block(3, 2000, vec![sold()]))
        .unwrap();

    let hour = projection
        .store()
        .load::<TransactionHourData>("0")
        .unwrap()
        .unwrap();
    assert_eq!(hour.total_transaction, 2);
    assert_eq!(hour.total_amount, eth(4));
    assert_eq!(hour.total_price, udec256!(200));
    assert_eq!(hour.total_net_amount, udec256!(178));
    assert_eq!(hour.total_fee, udec256!(22));
    // Fixed part is the flat fee times the trade count; the rest is the
    // percentage part
    assert_eq!(hour.total_fixed_fee, udec256!(2));
    assert_eq!(hour.total_percentage_fee, udec256!(20));

    let day = projection
        .store()
        .load::<TransactionDayData>("0")
        .unwrap()
        .unwrap();
    assert_eq!(day.total_transaction, 2);
    assert_eq!(day.total_fee, day.total_price - day.total_net_amount);
    let month = projection
        .store()
        .load::<TransactionMonthData>("0")
        .unwrap()
        .unwrap();
    assert_eq!(month.total_transaction, 2);
}

#[test]
fn test_replayed_block_is_ignored() {
    let mut projection = projection();
    let block = testing::block(
        1,
        1000,
        vec![testing::ctx(testing::v2::sold(
            account(1),
            account(2),
            account(2),
            U256::from(1),
            eth(1),
            eth(10),
            eth(9),
            eth(1),
            U256::ZERO,
            false,
        ))],
    );

    projection.apply_events(&block).unwrap();
    projection.apply_events(&block).unwrap();

    assert_eq!(projection.store().count(Transaction::KIND), 1);
    assert_eq!(
        projection.store().count(MarketplaceConfig::KIND),
        1
    );
}
