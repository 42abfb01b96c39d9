//! API info endpoint served at `/`

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
    pub notes: &'static str,
    pub indexed_tickers: usize,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub get_logo_path_param: &'static str,
    pub get_logo_query_param: &'static str,
}

impl ApiInfo {
    pub const fn new(indexed_tickers: usize) -> Self {
        Self {
            name: "Ticker Logos API",
            version: env!("CARGO_PKG_VERSION"),
            endpoints: Endpoints {
                get_logo_path_param: "/logo/{ticker}",
                get_logo_query_param: "/logo?ticker=ETSY",
            },
            notes: "Searches recursively under the logos directory and returns the best match image by ticker (case-insensitive).",
            indexed_tickers,
        }
    }
}
