use std::{net::SocketAddr, path::PathBuf, time::Duration};

use familyfolio_core::LOCAL_FAMILY;

/// Which upstream serves latest quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteProviderKind {
    Finnhub,
    Stooq,
    Proxy,
}

impl QuoteProviderKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "finnhub" => Some(Self::Finnhub),
            "stooq" => Some(Self::Stooq),
            "proxy" => Some(Self::Proxy),
            _ => None,
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub quote_provider: QuoteProviderKind,
    pub finnhub_api_key: Option<String>,
    pub quote_proxy_url: Option<String>,
    pub fixtures_dir: PathBuf,
    pub site_family: String,
    pub quote_ttl: Duration,
    pub quote_negative_ttl: Duration,
    pub history_ttl: Duration,
    pub target_currency: Option<String>,
    pub cache_tag: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("FF_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8088".to_string())
            .parse()
            .expect("Invalid FF_LISTEN_ADDR");

        let finnhub_api_key = non_empty_var("FINNHUB_API_KEY");
        let quote_provider = match non_empty_var("FF_QUOTE_PROVIDER") {
            Some(value) => QuoteProviderKind::parse(&value).expect("Invalid FF_QUOTE_PROVIDER"),
            None if finnhub_api_key.is_some() => QuoteProviderKind::Finnhub,
            None => QuoteProviderKind::Stooq,
        };

        let quote_ttl = millis_var("FF_QUOTE_TTL_MS", 60_000);
        let quote_negative_ttl = std::env::var("FF_QUOTE_NEGATIVE_TTL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(quote_ttl);

        let cors_allow = std::env::var("FF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            listen_addr,
            quote_provider,
            finnhub_api_key,
            quote_proxy_url: non_empty_var("FF_QUOTE_PROXY_URL"),
            fixtures_dir: std::env::var("FF_FIXTURES_DIR")
                .unwrap_or_else(|_| "./fixtures".into())
                .into(),
            site_family: non_empty_var("FF_SITE_FAMILY").unwrap_or_else(|| LOCAL_FAMILY.into()),
            quote_ttl,
            quote_negative_ttl,
            history_ttl: millis_var("FF_HISTORY_TTL_MS", 3_600_000),
            target_currency: non_empty_var("FF_TARGET_CURRENCY").map(|c| c.to_uppercase()),
            cache_tag: non_empty_var("FF_CACHE_TAG").unwrap_or_else(|| "familyfolio".into()),
            cors_allow,
            request_timeout: millis_var("FF_REQUEST_TIMEOUT_MS", 30_000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8088)),
            quote_provider: QuoteProviderKind::Stooq,
            finnhub_api_key: None,
            quote_proxy_url: None,
            fixtures_dir: PathBuf::from("./fixtures"),
            site_family: LOCAL_FAMILY.to_string(),
            quote_ttl: Duration::from_secs(60),
            quote_negative_ttl: Duration::from_secs(60),
            history_ttl: Duration::from_secs(60 * 60),
            target_currency: None,
            cache_tag: "familyfolio".to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn millis_var(key: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}
