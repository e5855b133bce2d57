/// Calibrated constants for the projection model. These are configuration
/// values (a 400 W panel in a temperate climate, a ~400 g CO2/kWh grid),
/// not physics; per-call overrides live on `SiteFactors` in the input module.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Slightly more than a calendar year; carries an availability adjustment
/// from the calibration of the daily average below.
pub const DAYS_PER_YEAR: f64 = 365.4;

/// Average daily yield of a single 400 W panel, in kWh. Used only when no
/// calibration table is available for the site.
pub const DAY_POWER_AVG_KWH: f64 = 1.85;

/// Annual yield assumed per kWp of installed capacity, used to size a system
/// from its yearly energy estimate.
pub const KWH_PER_KWP_PER_YEAR: f64 = 1_000.;

/// Tonnes of CO2 avoided per kWh generated (~400 g CO2/kWh grid factor).
pub const CO2_TONNES_PER_KWH: f64 = 0.0004;

pub const SYSTEM_LIFETIME_YEARS: u32 = 25;

/// Output decline per year of panel age (0.5%/yr).
pub const SOLAR_PANEL_DEGRADATION_PER_YEAR: f64 = 0.005;

// Installer pricing bands, in currency units per kWp of installed capacity.
// Bulk-discount pricing: the first 100 kWp is charged at the tier-1 rate,
// the next 150 kWp at tier 2, anything beyond 250 kWp at tier 3.
pub const COST_TIER_1_LIMIT_KWP: f64 = 100.;
pub const COST_TIER_2_LIMIT_KWP: f64 = 250.;
pub const COST_TIER_1_RATE_PER_KWP: f64 = 1_500.;
pub const COST_TIER_2_RATE_PER_KWP: f64 = 1_300.;
pub const COST_TIER_3_RATE_PER_KWP: f64 = 1_100.;

// Canonical input defaults. Several divergent copies of these existed
// upstream; this set is the authoritative one.
pub const DEFAULT_RETAIL_RATE: f64 = 0.35;
pub const DEFAULT_EXPORT_RATE: f64 = 0.4;
pub const DEFAULT_FEED_IN_TARIFF: f64 = 0.21;
pub const DEFAULT_LOAN_APR_PERCENT: f64 = 7.0;
pub const DEFAULT_LOAN_TERM_YEARS: u32 = 7;
pub const DEFAULT_ANNUAL_PRICE_INCREASE_PERCENT: f64 = 5.0;
pub const DEFAULT_GRANT_RATE_PERCENT: f64 = 30.0;
pub const DEFAULT_GRANT_CAP_AMOUNT: f64 = 162_000.;
pub const DEFAULT_TAX_ALLOWANCE_RATE_PERCENT: f64 = 12.5;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

/// Slider ceiling carried over from the input layer; panel counts above this
/// are treated as malformed and clamped.
pub(crate) const MAX_PANEL_COUNT: i64 = 10_000;

// A degradation rate of 1 or more would zero the production array from year
// 1 onwards, so the clamp stops just short of it.
pub(crate) const DEGRADATION_RATE_CEILING: f64 = 0.999;

/// Upper bound on loan terms and evaluation horizons, in years. Keeps the
/// monthly repayment count within `u32` and the series allocations bounded
/// for arbitrary request payloads.
pub(crate) const MAX_TERM_YEARS: u32 = 100;

/// Round a monetary amount to the nearest whole currency unit. Applied once,
/// at the boundary of the cost calculation; fractional precision is retained
/// internally up to that point.
pub fn round_currency(amount: f64) -> f64 {
    amount.round()
}
