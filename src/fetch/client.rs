use std::time::Duration;

use log::{info, warn};
use serde_json::Value;

use crate::config::FetchConfig;
use crate::records::{self, Candle, KlineInterval, SeriesRequest, StaticInfo, Tick};

use super::batch::{collect_series, run_chunked};
use super::FetchResult;
use super::endpoints::Endpoint;
use super::query;
use super::queue::SerialQueue;
use super::symbols::{classify, group_by_market, Market};
use super::transport::{CallRequest, Transport};

/// Live ticks plus the codes the remote rejected, per `live_ticks` call.
#[derive(Debug, Default)]
pub struct TickReport {
    pub ticks: Vec<Tick>,
    pub invalid_codes: Vec<String>,
}

/// Listing metadata plus the codes that were skipped locally or rejected by
/// the remote, per `static_info` call.
#[derive(Debug, Default)]
pub struct StaticInfoReport {
    pub records: Vec<StaticInfo>,
    pub invalid_codes: Vec<String>,
}

/// Throttled, strictly serialized client for the quote service.
///
/// Every operation funnels through one dispatch queue, so no two calls are
/// ever in flight at once no matter how many tasks hold a reference to the
/// fetcher, and consecutive calls honour the configured minimum spacing.
pub struct QuoteFetcher {
    transport: Transport,
    queue: SerialQueue<Value>,
    max_codes_per_request: usize,
}

impl QuoteFetcher {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let transport = Transport::new(&config)?;
        Ok(Self {
            transport,
            queue: SerialQueue::new(config.request_interval),
            max_codes_per_request: config.max_codes_per_request.max(1),
        })
    }

    /// Retargets the spacing between outbound calls. The next scheduled call
    /// picks it up; a wait already in progress keeps its old deadline.
    pub fn set_request_interval(&self, interval: Duration) {
        info!("setting request interval to {}ms", interval.as_millis());
        self.queue.set_interval(interval);
    }

    pub fn request_interval(&self) -> Duration {
        self.queue.interval()
    }

    /// Appends one call to the global queue and waits for its payload.
    async fn request(&self, request: CallRequest) -> FetchResult<Value> {
        let transport = self.transport.clone();
        self.queue
            .dispatch(move || async move { transport.execute(request).await })
            .await
    }

    /// Most recent `count` bars for one code.
    pub async fn series(
        &self,
        code: &str,
        interval: KlineInterval,
        count: u32,
    ) -> FetchResult<Vec<Candle>> {
        let endpoint = Endpoint::Kline.path(classify(code));
        let payload = self
            .request(CallRequest::Get {
                endpoint,
                query: query::kline_query(code, interval, count),
            })
            .await?;
        records::decode_candles(&payload)
    }

    /// Latest trade ticks for a mixed list of codes. Codes are grouped by
    /// market, chunked to the per-call cap, and invalid ones are isolated via
    /// single-code probing instead of failing the whole batch.
    pub async fn live_ticks(&self, codes: &[String]) -> FetchResult<TickReport> {
        let (stock, general) = group_by_market(codes);
        let mut report = TickReport::default();
        self.collect_ticks(&stock, Market::Stock, &mut report)
            .await?;
        self.collect_ticks(&general, Market::General, &mut report)
            .await?;
        Ok(report)
    }

    async fn collect_ticks(
        &self,
        codes: &[String],
        market: Market,
        report: &mut TickReport,
    ) -> FetchResult<()> {
        if codes.is_empty() {
            return Ok(());
        }
        let endpoint = Endpoint::TradeTick.path(market);
        let outcome = run_chunked(codes, self.max_codes_per_request, |chunk| {
            self.tick_chunk(endpoint, chunk)
        })
        .await?;
        report.ticks.extend(outcome.records);
        report.invalid_codes.extend(outcome.invalid_codes);
        Ok(())
    }

    async fn tick_chunk(&self, endpoint: &'static str, chunk: Vec<String>) -> FetchResult<Vec<Tick>> {
        let payload = self
            .request(CallRequest::Get {
                endpoint,
                query: query::symbol_list_query(&chunk),
            })
            .await?;
        records::decode_ticks(&payload)
    }

    /// One series call per request, strictly sequentially through the same
    /// queue. Per-item failures become empty placeholders, so the result
    /// always has exactly `requests.len()` entries.
    pub async fn batch_series(&self, requests: &[SeriesRequest]) -> Vec<Vec<Candle>> {
        info!("fetching series for {} requests", requests.len());
        collect_series(requests.to_vec(), |request| async move {
            self.series(&request.code, request.interval, request.count)
                .await
        })
        .await
    }

    /// Listing metadata for stock codes. Non-stock codes never reach the
    /// remote (the endpoint would reject the whole call); they are reported
    /// as invalid alongside any the remote itself rejects.
    pub async fn static_info(&self, codes: &[String]) -> FetchResult<StaticInfoReport> {
        let (stock, general) = group_by_market(codes);
        let mut report = StaticInfoReport::default();

        if !general.is_empty() {
            warn!(
                "static info only covers stock codes, skipping: {}",
                general.join(", ")
            );
            report.invalid_codes.extend(general);
        }
        if stock.is_empty() {
            return Ok(report);
        }

        let endpoint = Endpoint::StaticInfo.path(Market::Stock);
        let outcome = run_chunked(&stock, self.max_codes_per_request, |chunk| {
            self.info_chunk(endpoint, chunk)
        })
        .await?;
        report.records.extend(outcome.records);
        report.invalid_codes.extend(outcome.invalid_codes);
        Ok(report)
    }

    async fn info_chunk(
        &self,
        endpoint: &'static str,
        chunk: Vec<String>,
    ) -> FetchResult<Vec<StaticInfo>> {
        let payload = self
            .request(CallRequest::Get {
                endpoint,
                query: query::symbol_list_query(&chunk),
            })
            .await?;
        records::decode_static_info(&payload)
    }
}
