use std::sync::Arc;

use anyhow::{bail, Context};
use familyfolio_core::{HoldingsEnricher, PortfolioRegistry};
use familyfolio_market_data::{
    ConvertingQuoteProvider, FinnhubProvider, FxRates, HistoryCache, HistoryProvider,
    ProxyProvider, QuoteCache, QuoteCacheConfig, QuoteProvider, StooqProvider,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, QuoteProviderKind};

pub struct AppState {
    pub quotes: Arc<QuoteCache>,
    pub history: Arc<HistoryCache>,
    pub enricher: HoldingsEnricher,
    pub registry: PortfolioRegistry,
    pub site_family: String,
    pub cache_tag: String,
}

impl AppState {
    /// Wire caches around already constructed providers.
    pub fn new(
        config: &Config,
        quote_provider: Arc<dyn QuoteProvider>,
        history_provider: Arc<dyn HistoryProvider>,
        registry: PortfolioRegistry,
    ) -> Self {
        let quotes = Arc::new(QuoteCache::with_config(
            quote_provider,
            QuoteCacheConfig {
                ttl: config.quote_ttl,
                negative_ttl: config.quote_negative_ttl,
                ..QuoteCacheConfig::default()
            },
        ));
        let history = Arc::new(HistoryCache::with_ttl(history_provider, config.history_ttl));

        Self {
            enricher: HoldingsEnricher::new(quotes.clone()),
            quotes,
            history,
            registry,
            site_family: config.site_family.clone(),
            cache_tag: config.cache_tag.clone(),
        }
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("FF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn build_quote_provider(config: &Config) -> anyhow::Result<Arc<dyn QuoteProvider>> {
    let provider: Arc<dyn QuoteProvider> = match config.quote_provider {
        QuoteProviderKind::Finnhub => {
            let Some(api_key) = config.finnhub_api_key.as_deref() else {
                bail!("FF_QUOTE_PROVIDER=finnhub requires FINNHUB_API_KEY");
            };
            Arc::new(FinnhubProvider::new(api_key.to_string()))
        }
        QuoteProviderKind::Stooq => Arc::new(StooqProvider::new()),
        QuoteProviderKind::Proxy => {
            let Some(url) = config.quote_proxy_url.as_deref() else {
                bail!("FF_QUOTE_PROVIDER=proxy requires FF_QUOTE_PROXY_URL");
            };
            Arc::new(ProxyProvider::from_base_url(url))
        }
    };

    Ok(match config.target_currency.as_deref() {
        Some(target) => {
            tracing::info!("Converting quotes to {}", target);
            let fx = Arc::new(FxRates::new(Arc::new(StooqProvider::new())));
            Arc::new(ConvertingQuoteProvider::new(provider, fx, target.to_string()))
        }
        None => provider,
    })
}

fn build_history_provider(config: &Config) -> Arc<dyn HistoryProvider> {
    match (config.quote_provider, config.quote_proxy_url.as_deref()) {
        (QuoteProviderKind::Proxy, Some(url)) => Arc::new(ProxyProvider::from_base_url(url)),
        _ => Arc::new(StooqProvider::new()),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let quote_provider = build_quote_provider(config)?;
    tracing::info!("Quote provider: {}", quote_provider.id());
    let history_provider = build_history_provider(config);

    let registry = PortfolioRegistry::load(&config.fixtures_dir).with_context(|| {
        format!(
            "Failed to load portfolio fixtures from {}",
            config.fixtures_dir.display()
        )
    })?;
    tracing::info!(
        "Serving {} of {} portfolios for family '{}'",
        registry.for_family(&config.site_family).len(),
        registry.len(),
        config.site_family
    );

    Ok(Arc::new(AppState::new(
        config,
        quote_provider,
        history_provider,
        registry,
    )))
}
