use std::time::Duration;

use alloy::{providers::Provider, rpc::types::Filter, sol_types::SolEventInterface};
use futures::{Stream, stream};

use crate::{Chain, error::MarketError, types};

/// One block of decoded marketplace events.
pub type RawBlockEvents<E> = types::BlockEvents<types::EventContext<E>>;

/// Returns the stream of raw events emitted by the marketplace contract,
/// batched per block, starting from the specified instant.
///
/// Polls logs via the given [`Provider`] one block at a time to produce a
/// strictly continuous block sequence, waiting with `sleep` while the chain
/// tip is behind. Logs from the marketplace address that do not decode as
/// `E` (proxy/initializer events and other unrouted interfaces) are skipped.
///
/// It is recommended to set the provider up with
/// [`alloy::transports::layers::FallbackLayer`]
/// and/or [`alloy::transports::layers::RetryBackoffLayer`].
pub fn raw<E, P, S, SFut>(
    chain: &Chain,
    provider: P,
    from: types::StateInstant,
    sleep: S,
) -> impl Stream<Item = Result<RawBlockEvents<E>, MarketError>>
where
    E: SolEventInterface,
    P: Provider,
    S: Fn(Duration) -> SFut + Copy,
    SFut: Future<Output = ()>,
{
    let address = chain.marketplace();
    stream::unfold(
        (provider, from.block_number()),
        move |(provider, mut block_num)| async move {
            let filter = Filter::new()
                .address(address)
                .from_block(block_num)
                .to_block(block_num);
            loop {
                // Some RPC providers produce an empty response instead of an
                // error when the block in the filter does not exist yet, so
                // the chain tip is checked alongside the log query
                let result =
                    futures::try_join!(provider.get_block_number(), provider.get_logs(&filter))
                        .map_err(MarketError::from)
                        .and_then(|(head_block_num, logs)| {
                            if head_block_num < block_num {
                                return Err(MarketError::InvalidRequest(
                                    "block is not available yet".to_string(),
                                ));
                            }
                            let mut events = Vec::with_capacity(logs.len());
                            let block_ts = logs.first().and_then(|l| l.block_timestamp);
                            for log in &logs {
                                match E::decode_log(&log.inner) {
                                    Ok(decoded) => events.push(types::EventContext::new(
                                        log.transaction_hash.unwrap_or_default(),
                                        log.log_index.unwrap_or_default(),
                                        decoded.data,
                                    )),
                                    Err(_) => {
                                        tracing::debug!(
                                            block = block_num,
                                            topic = ?log.topic0(),
                                            "skipping unrouted event"
                                        );
                                    }
                                }
                            }
                            Ok(RawBlockEvents::new(
                                types::StateInstant::new(block_num, block_ts.unwrap_or_default()),
                                events,
                            ))
                        });
                if result.is_ok() {
                    block_num += 1;
                    return Some((result, (provider, block_num)));
                }
                if matches!(result, Err(MarketError::InvalidRequest(_))) {
                    // Block is not available yet
                    sleep(provider.client().poll_interval()).await;
                    continue;
                }
                return Some((result, (provider, block_num)));
            }
        },
    )
}
