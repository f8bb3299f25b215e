use anyhow::Context;
use coinbridge::exchanges::bitbank::BitbankRestClient;
use coinbridge::exchanges::bitflyer::BitFlyerRestClient;
use coinbridge::{Exchange, ExchangeSession, LocalRateLimiter, RateLimitConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let limiter = Arc::new(LocalRateLimiter::new(
        RateLimitConfig::default().with_default_quota(10, Duration::from_secs(1)),
    ));

    let bitflyer = BitFlyerRestClient::new(
        ExchangeSession::builder(Exchange::BitFlyer)
            .with_rate_limiter(limiter.clone())
            .with_default_validator()
            .build()
            .context("building bitFlyer session")?,
    );
    let ticker = bitflyer
        .get_ticker("BTC_JPY")
        .await
        .context("fetching bitFlyer ticker")?;
    info!(
        product = %ticker.product_code,
        ltp = ?ticker.ltp,
        best_bid = ?ticker.best_bid,
        best_ask = ?ticker.best_ask,
        "bitFlyer ticker"
    );

    let bitbank = BitbankRestClient::new(
        ExchangeSession::builder(Exchange::Bitbank)
            .with_rate_limiter(limiter)
            .with_default_validator()
            .build()
            .context("building bitbank session")?,
    );
    let depth = bitbank
        .get_depth("btc_jpy")
        .await
        .context("fetching bitbank depth")?;
    info!(
        asks = depth.asks.len(),
        bids = depth.bids.len(),
        spread = ?depth.spread(),
        "bitbank depth"
    );

    Ok(())
}
