mod compare_floats;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;

#[macro_use]
extern crate is_close;

pub use crate::core::cost::CostBreakdown;
pub use crate::core::projection::CalculationResult;
pub use crate::input::{
    ingest_for_calculation, CalculationInput, GrantRule, SiteFactors, SolarPanelConfig,
};

use crate::core::cost::calculate_cost;
use crate::core::energy::estimate_yearly_energy;
use crate::core::projection::project;
use crate::errors::SolarRoiError;
use crate::output::Output;
use csv::WriterBuilder;
use std::io::Read;

/// Run the full calculation pipeline over one input: estimate yearly energy
/// from the calibration table, derive costs and incentives, then project
/// over the horizon. Pure and stateless; identical inputs give identical
/// results, and concurrent calls need no coordination.
pub fn calculate(input: &CalculationInput) -> CalculationResult {
    let input = input.sanitised();

    let yearly_energy_kwh =
        estimate_yearly_energy(input.panel_count as u32, &input.panel_configs, &input.site);
    let costs = calculate_cost(
        yearly_energy_kwh,
        &input.grant_rule,
        input.include_grant,
        input.tax_allowance_rate_percent,
        input.include_tax_allowance,
    );

    tracing::debug!(
        yearly_energy_kwh,
        install_cost = costs.install_cost,
        horizon_years = input.horizon_years,
        "projecting system"
    );

    project(&input, yearly_energy_kwh, &costs)
}

/// Ingest a JSON calculation request, calculate, and write the summary and
/// series CSV files to the given output.
pub fn run_calculation(
    input: impl Read,
    output: impl Output,
) -> Result<CalculationResult, SolarRoiError> {
    let calculation_input = ingest_for_calculation(input)?;
    let result = calculate(&calculation_input);

    if !output.is_noop() {
        write_summary_file(&output, &calculation_input.site, &result)?;
        write_series_file(&output, &calculation_input.site, &result)?;
    }

    Ok(result)
}

/// One record of headline figures, preceded by a headings row and a units
/// row so the file is self-describing.
fn write_summary_file(
    output: &impl Output,
    site: &SiteFactors,
    result: &CalculationResult,
) -> Result<(), anyhow::Error> {
    let writer = output.writer_for_location_key("summary")?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    let currency_unit = format!("[{}]", site.currency_symbol);

    writer.write_record([
        "Yearly energy",
        "Install cost",
        "Grant",
        "Tax allowance",
        "Net install cost",
        "First year savings",
        "Monthly net cash flow",
        "Payback period",
        "25-year ROI",
        "CO2 offset",
        "Break-even year",
    ])?;
    writer.write_record([
        "[kWh]",
        &currency_unit,
        &currency_unit,
        &currency_unit,
        &currency_unit,
        &currency_unit,
        &currency_unit,
        "[years]",
        "[%]",
        "[tonnes]",
        "[count]",
    ])?;
    writer.write_record([
        result.yearly_energy_kwh.to_string(),
        result.install_cost.to_string(),
        result.grant_amount.to_string(),
        result.tax_allowance_amount.to_string(),
        result.net_install_cost.to_string(),
        result.first_year_savings.to_string(),
        result.monthly_net_cash_flow.to_string(),
        // undefined figures are left blank rather than written as a number
        result
            .payback_period_years
            .map(|years| years.to_string())
            .unwrap_or_default(),
        result
            .roi_25_year_percent
            .map(|percent| percent.to_string())
            .unwrap_or_default(),
        result.co2_offset_tonnes.to_string(),
        result
            .break_even_year
            .map(|year| year.to_string())
            .unwrap_or_default(),
    ])?;

    writer.flush()?;

    Ok(())
}

/// The two chart series, one row per year of the horizon.
fn write_series_file(
    output: &impl Output,
    site: &SiteFactors,
    result: &CalculationResult,
) -> Result<(), anyhow::Error> {
    let writer = output.writer_for_location_key("series")?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record([
        "Year",
        "Net financial position",
        "Annual energy production",
    ])?;
    writer.write_record([
        "[count]",
        &format!("[{}]", site.currency_symbol),
        "[kWh]",
    ])?;

    for (year, (position, production)) in result
        .break_even_series
        .iter()
        .zip(result.energy_production_series.iter())
        .enumerate()
    {
        writer.write_record([
            year.to_string(),
            position.to_string(),
            production.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
