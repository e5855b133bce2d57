use crate::core::units::{
    DAYS_PER_YEAR, DAY_POWER_AVG_KWH, CO2_TONNES_PER_KWH, DEFAULT_ANNUAL_PRICE_INCREASE_PERCENT,
    DEFAULT_CURRENCY_SYMBOL, DEFAULT_EXPORT_RATE, DEFAULT_FEED_IN_TARIFF,
    DEFAULT_GRANT_CAP_AMOUNT, DEFAULT_GRANT_RATE_PERCENT, DEFAULT_LOAN_APR_PERCENT,
    DEFAULT_LOAN_TERM_YEARS, DEFAULT_RETAIL_RATE, DEFAULT_TAX_ALLOWANCE_RATE_PERCENT,
    DEGRADATION_RATE_CEILING, MAX_PANEL_COUNT, MAX_TERM_YEARS,
    SOLAR_PANEL_DEGRADATION_PER_YEAR, SYSTEM_LIFETIME_YEARS,
};
use crate::errors::SolarRoiError;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};

/// Read a JSON calculation request and return an input the engine can run
/// directly: malformed JSON is an error, but out-of-range numeric values are
/// clamped rather than rejected, because the calculation layer must stay
/// permissive over raw form input.
pub fn ingest_for_calculation(json: impl Read) -> Result<CalculationInput, SolarRoiError> {
    let input: CalculationInput = serde_json::from_reader(BufReader::new(json))?;
    if let Err(report) = input.validate() {
        tracing::warn!("calculation input outside documented ranges, clamping: {report}");
    }
    Ok(input.sanitised())
}

/// One calibration point from the solar-potential data provider: a panel
/// count and the yearly DC energy that layout was predicted to produce.
/// Field names follow the provider's payloads, which carry more fields than
/// these two; the extras are ignored.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPanelConfig {
    pub panels_count: u32,
    pub yearly_energy_dc_kwh: f64,
}

/// Grant scheme parameters for one (country, building type) combination.
/// Which rule applies is a configuration lookup made by the caller.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GrantRule {
    #[serde(default = "default_grant_rate_percent")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 100.)]
    pub rate_percent: f64,
    #[serde(default = "default_grant_cap_amount")]
    #[validate(minimum = 0.)]
    pub cap_amount: f64,
}

impl Default for GrantRule {
    fn default() -> Self {
        Self {
            rate_percent: DEFAULT_GRANT_RATE_PERCENT,
            cap_amount: DEFAULT_GRANT_CAP_AMOUNT,
        }
    }
}

/// Site- and grid-specific calibration, passed explicitly with every request.
/// (An earlier incarnation of this model kept the currency symbol and grant
/// settings in process-wide mutable state, which went stale across requests;
/// carrying them on the input removes that failure mode.)
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFactors {
    /// Average daily yield per panel in kWh, used by the fallback estimate
    /// when no calibration table is supplied.
    #[serde(default = "default_day_power_avg_kwh")]
    pub day_power_avg_kwh: f64,
    #[serde(default = "default_days_per_year")]
    pub days_per_year: f64,
    /// Grid emissions factor, tonnes of CO2 per kWh.
    #[serde(default = "default_co2_tonnes_per_kwh")]
    pub co2_tonnes_per_kwh: f64,
    /// Used by output writers only; the engine itself is currency-agnostic.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for SiteFactors {
    fn default() -> Self {
        Self {
            day_power_avg_kwh: DAY_POWER_AVG_KWH,
            days_per_year: DAYS_PER_YEAR,
            co2_tonnes_per_kwh: CO2_TONNES_PER_KWH,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// The engine's sole parameter object, immutable per invocation. The
/// `validate` ranges document intent; `sanitised` is what enforces them.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalculationInput {
    #[serde(default)]
    #[validate(minimum = 0)]
    pub panel_count: i64,
    /// Retail electricity price, currency/kWh.
    #[serde(default = "default_electricity_rate")]
    #[validate(exclusive_minimum = 0.)]
    pub electricity_rate: f64,
    /// Share of production exported rather than self-consumed, as a fraction.
    #[serde(default = "default_export_rate")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub export_rate: f64,
    /// Price paid per exported kWh.
    #[serde(default = "default_feed_in_tariff")]
    #[validate(minimum = 0.)]
    pub feed_in_tariff: f64,
    /// The household's current monthly electricity bill; caps how much of
    /// the production can be self-consumed.
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub monthly_bill_current: f64,
    #[serde(default)]
    pub include_grant: bool,
    #[serde(default)]
    pub include_tax_allowance: bool,
    #[serde(default)]
    pub include_loan: bool,
    #[serde(default = "default_loan_apr_percent")]
    #[validate(minimum = 0.)]
    pub loan_apr_percent: f64,
    #[serde(default = "default_loan_term_years")]
    #[validate(minimum = 1)]
    #[validate(maximum = 100)]
    pub loan_term_years: u32,
    #[serde(default = "default_annual_price_increase_percent")]
    #[validate(minimum = 0.)]
    pub annual_price_increase_percent: f64,
    #[serde(default = "default_degradation_rate_per_year")]
    #[validate(minimum = 0.)]
    #[validate(exclusive_maximum = 1.)]
    pub degradation_rate_per_year: f64,
    #[serde(default = "default_horizon_years")]
    #[validate(minimum = 1)]
    #[validate(maximum = 100)]
    pub horizon_years: u32,
    /// Calibration table from the solar-potential provider; may be empty,
    /// in which case the per-panel daily-average heuristic applies.
    #[serde(default)]
    pub panel_configs: Vec<SolarPanelConfig>,
    #[serde(default)]
    pub grant_rule: GrantRule,
    #[serde(default = "default_tax_allowance_rate_percent")]
    #[validate(minimum = 0.)]
    pub tax_allowance_rate_percent: f64,
    #[serde(default)]
    pub site: SiteFactors,
}

impl Default for CalculationInput {
    fn default() -> Self {
        Self {
            panel_count: 0,
            electricity_rate: DEFAULT_RETAIL_RATE,
            export_rate: DEFAULT_EXPORT_RATE,
            feed_in_tariff: DEFAULT_FEED_IN_TARIFF,
            monthly_bill_current: 0.,
            include_grant: false,
            include_tax_allowance: false,
            include_loan: false,
            loan_apr_percent: DEFAULT_LOAN_APR_PERCENT,
            loan_term_years: DEFAULT_LOAN_TERM_YEARS,
            annual_price_increase_percent: DEFAULT_ANNUAL_PRICE_INCREASE_PERCENT,
            degradation_rate_per_year: SOLAR_PANEL_DEGRADATION_PER_YEAR,
            horizon_years: SYSTEM_LIFETIME_YEARS,
            panel_configs: vec![],
            grant_rule: GrantRule::default(),
            tax_allowance_rate_percent: DEFAULT_TAX_ALLOWANCE_RATE_PERCENT,
            site: SiteFactors::default(),
        }
    }
}

impl CalculationInput {
    /// Clamp every field into its documented range. Negative amounts floor
    /// to zero, fractions clamp into [0, 1], a non-positive retail rate
    /// falls back to the default (it is a divisor), loan terms and horizons
    /// are capped so the repayment and series arithmetic stays bounded, and
    /// the calibration table is sorted by panel count so the estimator can
    /// bracket.
    pub fn sanitised(&self) -> Self {
        let mut panel_configs = self.panel_configs.clone();
        panel_configs.sort_by_key(|config| config.panels_count);

        Self {
            panel_count: self.panel_count.clamp(0, MAX_PANEL_COUNT),
            electricity_rate: if self.electricity_rate > 0. {
                self.electricity_rate
            } else {
                DEFAULT_RETAIL_RATE
            },
            export_rate: self.export_rate.clamp(0., 1.),
            feed_in_tariff: self.feed_in_tariff.max(0.),
            monthly_bill_current: self.monthly_bill_current.max(0.),
            include_grant: self.include_grant,
            include_tax_allowance: self.include_tax_allowance,
            include_loan: self.include_loan,
            loan_apr_percent: self.loan_apr_percent.max(0.),
            loan_term_years: self.loan_term_years.clamp(1, MAX_TERM_YEARS),
            annual_price_increase_percent: self.annual_price_increase_percent.max(0.),
            degradation_rate_per_year: self
                .degradation_rate_per_year
                .clamp(0., DEGRADATION_RATE_CEILING),
            horizon_years: self.horizon_years.clamp(1, MAX_TERM_YEARS),
            panel_configs,
            grant_rule: GrantRule {
                rate_percent: self.grant_rule.rate_percent.clamp(0., 100.),
                cap_amount: self.grant_rule.cap_amount.max(0.),
            },
            tax_allowance_rate_percent: self.tax_allowance_rate_percent.max(0.),
            site: SiteFactors {
                day_power_avg_kwh: self.site.day_power_avg_kwh.max(0.),
                days_per_year: self.site.days_per_year.max(0.),
                co2_tonnes_per_kwh: self.site.co2_tonnes_per_kwh.max(0.),
                currency_symbol: self.site.currency_symbol.clone(),
            },
        }
    }
}

fn default_electricity_rate() -> f64 {
    DEFAULT_RETAIL_RATE
}

fn default_export_rate() -> f64 {
    DEFAULT_EXPORT_RATE
}

fn default_feed_in_tariff() -> f64 {
    DEFAULT_FEED_IN_TARIFF
}

fn default_loan_apr_percent() -> f64 {
    DEFAULT_LOAN_APR_PERCENT
}

fn default_loan_term_years() -> u32 {
    DEFAULT_LOAN_TERM_YEARS
}

fn default_annual_price_increase_percent() -> f64 {
    DEFAULT_ANNUAL_PRICE_INCREASE_PERCENT
}

fn default_degradation_rate_per_year() -> f64 {
    SOLAR_PANEL_DEGRADATION_PER_YEAR
}

fn default_horizon_years() -> u32 {
    SYSTEM_LIFETIME_YEARS
}

fn default_grant_rate_percent() -> f64 {
    DEFAULT_GRANT_RATE_PERCENT
}

fn default_grant_cap_amount() -> f64 {
    DEFAULT_GRANT_CAP_AMOUNT
}

fn default_tax_allowance_rate_percent() -> f64 {
    DEFAULT_TAX_ALLOWANCE_RATE_PERCENT
}

fn default_day_power_avg_kwh() -> f64 {
    DAY_POWER_AVG_KWH
}

fn default_days_per_year() -> f64 {
    DAYS_PER_YEAR
}

fn default_co2_tonnes_per_kwh() -> f64 {
    CO2_TONNES_PER_KWH
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}
