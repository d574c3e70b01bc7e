/// Major mainland index codes, used as the default tick watchlist.
pub fn main_index_codes() -> Vec<String> {
    to_owned(&[
        "000001.SH", // SSE Composite
        "399001.SZ", // SZSE Component
        "399006.SZ", // ChiNext
        "000688.SH", // STAR 50
        "000300.SH", // CSI 300
        "000905.SH", // CSI 500
        "000852.SH", // CSI 1000
    ])
}

/// Liquid broad-market ETFs.
pub fn main_etf_codes() -> Vec<String> {
    to_owned(&[
        "510050.SH", // SSE 50 ETF
        "510300.SH", // CSI 300 ETF
        "510500.SH", // CSI 500 ETF
        "159919.SZ", // CSI 300 ETF (Shenzhen listing)
        "159915.SZ", // ChiNext ETF
        "512100.SH", // CSI 1000 ETF
    ])
}

/// A handful of heavily traded A-share names for batch demos.
pub fn main_stock_codes() -> Vec<String> {
    to_owned(&[
        "000001.SZ", // Ping An Bank
        "000002.SZ", // Vanke
        "600000.SH", // SPD Bank
        "600036.SH", // China Merchants Bank
        "000858.SZ", // Wuliangye
        "600519.SH", // Kweichow Moutai
        "002415.SZ", // Hikvision
    ])
}

fn to_owned(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| code.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use crate::fetch::symbols::{classify, Market};

    use super::*;

    #[test]
    fn preset_codes_all_carry_market_suffixes() {
        for code in main_index_codes()
            .iter()
            .chain(main_etf_codes().iter())
            .chain(main_stock_codes().iter())
        {
            assert_eq!(classify(code), Market::Stock, "{code}");
        }
    }
}
