//! Store Config

use clap::Args;
use krua::vat::VatRate;

/// Pricing settings.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// VAT rate included in catalogue prices, as `15%` or `0.15`
    #[arg(long, env = "VAT_RATE", default_value = "15%")]
    pub vat_rate: VatRate,

    /// ISO 4217 code of the store currency
    #[arg(long, env = "STORE_CURRENCY", default_value = "ZAR")]
    pub currency: String,
}
