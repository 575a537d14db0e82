use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marketplace codes seeded by the schema. Further marketplaces are plain rows in the
/// `marketplaces` table.
pub const YANDEX_MARKET: &str = "yandex_market";
pub const OZON: &str = "ozon";
pub const WILDBERRIES: &str = "wildberries";
pub const SBERMEGAMARKET: &str = "sbermegamarket";
pub const AVITO: &str = "avito";

/// Export settings of one product on one marketplace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceExport {
    pub enabled: bool,
    /// Marketplace-specific price; the catalog price is used when absent.
    pub price: Option<Decimal>,
}

impl MarketplaceExport {
    pub fn enabled_at(price: Option<Decimal>) -> Self {
        Self {
            enabled: true,
            price,
        }
    }

    pub fn effective_price(&self, base_price: Decimal) -> Decimal {
        self.price.unwrap_or(base_price)
    }
}

/// Export settings of one product keyed by marketplace code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketplaceExports(BTreeMap<String, MarketplaceExport>);

impl MarketplaceExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, marketplace: impl Into<String>, export: MarketplaceExport) {
        self.0.insert(marketplace.into(), export);
    }

    /// Settings for a marketplace; a product never configured for it is not exported.
    pub fn get(&self, marketplace: &str) -> MarketplaceExport {
        self.0.get(marketplace).cloned().unwrap_or_default()
    }

    pub fn is_enabled(&self, marketplace: &str) -> bool {
        self.0.get(marketplace).map(|e| e.enabled).unwrap_or(false)
    }

    pub fn enabled_codes(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, export)| export.enabled)
            .map(|(code, _)| code.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MarketplaceExport)> {
        self.0.iter().map(|(code, export)| (code.as_str(), export))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, MarketplaceExport)> for MarketplaceExports {
    fn from_iter<T: IntoIterator<Item = (String, MarketplaceExport)>>(iter: T) -> Self {
        MarketplaceExports(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unknown_marketplace_is_disabled() {
        let exports = MarketplaceExports::new();
        assert!(!exports.is_enabled(OZON));
        assert_eq!(exports.get(OZON), MarketplaceExport::default());
    }

    #[test]
    fn effective_price_falls_back_to_catalog_price() {
        let mut exports = MarketplaceExports::new();
        exports.set(OZON, MarketplaceExport::enabled_at(Some(dec!(1490))));
        exports.set(WILDBERRIES, MarketplaceExport::enabled_at(None));
        exports.set(AVITO, MarketplaceExport::default());

        assert_eq!(exports.get(OZON).effective_price(dec!(1290)), dec!(1490));
        assert_eq!(exports.get(WILDBERRIES).effective_price(dec!(1290)), dec!(1290));
        assert_eq!(
            exports.enabled_codes().collect::<Vec<_>>(),
            vec![OZON, WILDBERRIES]
        );
    }

    #[test]
    fn new_marketplace_needs_no_structural_change() {
        let mut exports = MarketplaceExports::new();
        exports.set("megamarket_kz", MarketplaceExport::enabled_at(None));
        assert!(exports.is_enabled("megamarket_kz"));
        assert_eq!(exports.len(), 1);
    }
}
