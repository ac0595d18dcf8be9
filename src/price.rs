//! Battery price resolution with a per-URL cache.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::vendor::BatteryModel;

/// Fetches a current price for a product URL.
pub trait PriceSource {
    /// Returns `Ok(None)` when the source has no price for `url`.
    ///
    /// # Errors
    ///
    /// Implementations return [`crate::Error::PriceFetch`] when the lookup itself fails.
    fn fetch(&self, url: &str) -> Result<Option<f64>>;
}

/// Source that never goes online and therefore never knows a price.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflinePriceSource;

impl PriceSource for OfflinePriceSource {
    fn fetch(&self, url: &str) -> Result<Option<f64>> {
        debug!(url, "offline price source, no lookup performed");
        Ok(None)
    }
}

/// Resolves battery prices, remembering every price it has seen per URL.
#[derive(Debug)]
pub struct PriceLookup<S> {
    source: S,
    cache: HashMap<String, Option<f64>>,
}

impl<S: PriceSource> PriceLookup<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    /// Price of `battery`, or `None` if it cannot be determined.
    ///
    /// Lookup order: a model without URL yields its fixed price; a cached
    /// URL yields the cached value; a fixed price is cached under the URL
    /// and returned; otherwise the source is asked. Only found prices are
    /// cached, so a failed or empty fetch is retried next time.
    pub fn price_for(&mut self, battery: &BatteryModel) -> Option<f64> {
        let Some(url) = battery.price_url.as_deref() else {
            return battery.price;
        };

        if let Some(&cached) = self.cache.get(url) {
            return cached;
        }

        if let Some(price) = battery.price {
            self.cache.insert(url.to_string(), Some(price));
            return Some(price);
        }

        match self.source.fetch(url) {
            Ok(Some(price)) => {
                debug!(url, price, "price fetched");
                self.cache.insert(url.to_string(), Some(price));
                Some(price)
            }
            Ok(None) => {
                debug!(url, battery = %battery.name, "no price available");
                None
            }
            Err(e) => {
                warn!(url, error = %e, "price lookup failed");
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for PriceLookup<OfflinePriceSource> {
    fn default() -> Self {
        Self::new(OfflinePriceSource)
    }
}
