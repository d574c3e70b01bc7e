use super::symbols::Market;

/// Remote operation families exposed by the quote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Historical bars.
    Kline,
    /// Latest trade ticks.
    TradeTick,
    /// Listing metadata (stock endpoint family only upstream).
    StaticInfo,
}

impl Endpoint {
    /// Concrete remote path for this operation on the given market. Total
    /// over the (operation, market) table; static info ignores the market
    /// because only the stock family serves it.
    pub fn path(self, market: Market) -> &'static str {
        match (self, market) {
            (Endpoint::StaticInfo, _) => "/quote-stock-b-api/static_info",
            (Endpoint::Kline, Market::Stock) => "/quote-stock-b-api/kline",
            (Endpoint::Kline, Market::General) => "/quote-b-api/kline",
            (Endpoint::TradeTick, Market::Stock) => "/quote-stock-b-api/trade-tick",
            (Endpoint::TradeTick, Market::General) => "/quote-b-api/trade-tick",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_and_general_families_diverge() {
        assert_eq!(
            Endpoint::Kline.path(Market::Stock),
            "/quote-stock-b-api/kline"
        );
        assert_eq!(Endpoint::Kline.path(Market::General), "/quote-b-api/kline");
        assert_eq!(
            Endpoint::TradeTick.path(Market::Stock),
            "/quote-stock-b-api/trade-tick"
        );
        assert_eq!(
            Endpoint::TradeTick.path(Market::General),
            "/quote-b-api/trade-tick"
        );
    }

    #[test]
    fn static_info_ignores_market() {
        assert_eq!(
            Endpoint::StaticInfo.path(Market::Stock),
            Endpoint::StaticInfo.path(Market::General)
        );
    }
}
