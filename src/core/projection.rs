//! Year-by-year financial projection: degraded production, self-consumption
//! against the household's actual usage, an escalating retail rate, loan
//! amortisation, and the derived headline figures (payback, ROI, CO2 offset)
//! with their chart series.

use crate::compare_floats::{max_of_2, min_of_2};
use crate::core::cost::CostBreakdown;
use crate::core::units::MONTHS_PER_YEAR;
use crate::input::CalculationInput;
use serde::Serialize;

/// Everything the engine derives for one calculation, fully determined by
/// the input. Payback and ROI are `None` when undefined (savings that never
/// repay the investment, or a zero cost basis); no NaN or infinity ever
/// appears here.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub yearly_energy_kwh: f64,
    pub install_cost: f64,
    pub grant_amount: f64,
    pub tax_allowance_amount: f64,
    pub net_install_cost: f64,
    pub monthly_net_cash_flow: f64,
    pub first_year_savings: f64,
    pub payback_period_years: Option<f64>,
    pub roi_25_year_percent: Option<f64>,
    pub co2_offset_tonnes: f64,
    /// First year index at which the cumulative position is non-negative.
    pub break_even_year: Option<u32>,
    /// Cumulative net financial position per year of the horizon.
    pub break_even_series: Vec<f64>,
    /// Degraded annual production per year of the horizon, in kWh.
    pub energy_production_series: Vec<f64>,
}

impl CalculationResult {
    /// The zero-state result: what the caller renders before any meaningful
    /// input exists. Both series keep the horizon length so charts retain
    /// their axes.
    pub fn zero(horizon_years: u32) -> Self {
        Self {
            yearly_energy_kwh: 0.,
            install_cost: 0.,
            grant_amount: 0.,
            tax_allowance_amount: 0.,
            net_install_cost: 0.,
            monthly_net_cash_flow: 0.,
            first_year_savings: 0.,
            payback_period_years: None,
            roi_25_year_percent: None,
            co2_offset_tonnes: 0.,
            break_even_year: None,
            break_even_series: vec![0.; horizon_years as usize],
            energy_production_series: vec![0.; horizon_years as usize],
        }
    }
}

/// A fixed-rate amortising loan over the financed principal.
#[derive(Clone, Copy, Debug)]
struct LoanSchedule {
    monthly_repayment: f64,
    term_years: u32,
}

impl LoanSchedule {
    fn new(principal: f64, apr_percent: f64, term_years: u32) -> Self {
        let monthly_rate = apr_percent / 100. / MONTHS_PER_YEAR as f64;
        let repayment_count = (term_years * MONTHS_PER_YEAR) as i32;
        let monthly_repayment = if monthly_rate > 0. {
            principal * monthly_rate / (1. - (1. + monthly_rate).powi(-repayment_count))
        } else {
            // limit of the annuity formula as the rate goes to zero
            principal / repayment_count as f64
        };
        Self {
            monthly_repayment,
            term_years,
        }
    }

    fn annual_repayment(&self) -> f64 {
        self.monthly_repayment * MONTHS_PER_YEAR as f64
    }

    /// Repayments only run for the loan term; years of the evaluation
    /// horizon beyond it cost nothing.
    fn total_repaid_within(&self, horizon_years: u32) -> f64 {
        self.annual_repayment() * self.term_years.min(horizon_years) as f64
    }
}

/// Project `yearly_energy_kwh` of first-year production over the input's
/// horizon and derive the full `CalculationResult`.
///
/// A household with no electricity bill (or a system producing nothing)
/// short-circuits to the zero-state result: there is nothing to offset, and
/// downstream consumers rely on getting an explicit all-zero baseline
/// rather than a degenerate projection.
pub fn project(
    input: &CalculationInput,
    yearly_energy_kwh: f64,
    costs: &CostBreakdown,
) -> CalculationResult {
    let horizon_years = input.horizon_years;

    if input.monthly_bill_current <= 0.
        || yearly_energy_kwh <= 0.
        || is_close!(yearly_energy_kwh, 0., rel_tol = 1e-09, abs_tol = 1e-10)
    {
        return CalculationResult::zero(horizon_years);
    }

    let production = (0..horizon_years)
        .map(|year| yearly_energy_kwh * (1. - input.degradation_rate_per_year).powi(year as i32))
        .collect::<Vec<_>>();

    // Self-consumption is capped by what the household actually uses, as
    // implied by its current bill; everything else is exported.
    let current_usage_kwh =
        input.monthly_bill_current * MONTHS_PER_YEAR as f64 / input.electricity_rate;
    let annual_benefits = production
        .iter()
        .enumerate()
        .map(|(year, produced)| {
            let self_consumed = min_of_2(produced * (1. - input.export_rate), current_usage_kwh);
            let exported = produced - self_consumed;
            let retail_rate = input.electricity_rate
                * (1. + input.annual_price_increase_percent / 100.).powi(year as i32);
            self_consumed * retail_rate + exported * input.feed_in_tariff
        })
        .collect::<Vec<_>>();

    let principal = max_of_2(costs.install_cost - costs.grant_amount, 0.);
    let loan = input
        .include_loan
        .then(|| LoanSchedule::new(principal, input.loan_apr_percent, input.loan_term_years));

    // Investment basis: with a loan, the total repaid within the horizon;
    // without, the net (post-grant) install cost.
    let investment = match &loan {
        Some(loan) => loan.total_repaid_within(horizon_years),
        None => costs.net_install_cost,
    };

    // Year 0 is the baseline year of the chart: no benefit has accrued yet,
    // so the series starts at the full investment deficit.
    let break_even_series = annual_benefits
        .iter()
        .enumerate()
        .scan(0., |accrued_benefit, (year, benefit)| {
            if year > 0 {
                *accrued_benefit += benefit;
            }
            Some(*accrued_benefit - investment)
        })
        .collect::<Vec<_>>();
    let break_even_year = break_even_series
        .iter()
        .position(|position| *position >= 0.)
        .map(|year| year as u32);

    let first_year_loan_cost = loan
        .as_ref()
        .map(LoanSchedule::annual_repayment)
        .unwrap_or(0.);
    let first_year_savings =
        annual_benefits[0] - first_year_loan_cost + costs.tax_allowance_amount;

    let payback_period_years =
        (first_year_savings > 0.).then(|| investment / first_year_savings);

    let total_benefit: f64 = annual_benefits.iter().sum();
    let roi_25_year_percent =
        (investment > 0.).then(|| (total_benefit - investment) / investment * 100.);

    let co2_offset_tonnes =
        production.iter().sum::<f64>() * input.site.co2_tonnes_per_kwh;

    // Negative means the household still nets an expense after solar; the
    // sign is preserved, never clamped.
    let monthly_net_cash_flow =
        first_year_savings / MONTHS_PER_YEAR as f64 - input.monthly_bill_current;

    CalculationResult {
        yearly_energy_kwh,
        install_cost: costs.install_cost,
        grant_amount: costs.grant_amount,
        tax_allowance_amount: costs.tax_allowance_amount,
        net_install_cost: costs.net_install_cost,
        monthly_net_cash_flow,
        first_year_savings,
        payback_period_years,
        roi_25_year_percent,
        co2_offset_tonnes,
        break_even_year,
        break_even_series,
        energy_production_series: production,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cost::calculate_cost;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use pretty_assertions::assert_eq;
    use rstest::*;

    // A deliberately round-numbered household: 6000 kWh produced and 6000
    // kWh consumed per year, no degradation or price escalation, so every
    // year's benefit is 3000 * 0.40 + 3000 * 0.20 = 1800.
    #[fixture]
    fn steady_state_input() -> CalculationInput {
        CalculationInput {
            panel_count: 10,
            electricity_rate: 0.40,
            export_rate: 0.5,
            feed_in_tariff: 0.20,
            monthly_bill_current: 200.,
            degradation_rate_per_year: 0.,
            annual_price_increase_percent: 0.,
            ..Default::default()
        }
    }

    fn costs_for(input: &CalculationInput, yearly_energy_kwh: f64) -> CostBreakdown {
        calculate_cost(
            yearly_energy_kwh,
            &input.grant_rule,
            input.include_grant,
            input.tax_allowance_rate_percent,
            input.include_tax_allowance,
        )
    }

    #[rstest]
    fn test_steady_state_headline_figures(steady_state_input: CalculationInput) {
        let costs = costs_for(&steady_state_input, 6_000.);
        // 6 kWp at 1500/kWp
        assert_eq!(costs.install_cost, 9_000.);

        let result = project(&steady_state_input, 6_000., &costs);
        assert_relative_eq!(result.first_year_savings, 1_800.);
        assert_relative_eq!(result.payback_period_years.unwrap(), 5.);
        // 25 years of 1800 against a 9000 outlay
        assert_relative_eq!(result.roi_25_year_percent.unwrap(), 400.);
        // savings of 150/month against a 200 bill
        assert_relative_eq!(result.monthly_net_cash_flow, -50.);
        // 6000 kWh * 25 years * 0.0004 t/kWh
        assert_relative_eq!(result.co2_offset_tonnes, 60.);
    }

    #[rstest]
    fn test_break_even_series_starts_at_investment_deficit(
        steady_state_input: CalculationInput,
    ) {
        let costs = costs_for(&steady_state_input, 6_000.);
        let result = project(&steady_state_input, 6_000., &costs);

        assert_eq!(result.break_even_series.len(), 25);
        assert_relative_eq!(result.break_even_series[0], -9_000.);
        assert_relative_eq!(result.break_even_series[1], -7_200.);
        assert_relative_eq!(result.break_even_series[5], 0.);
        assert_relative_eq!(result.break_even_series[24], 34_200.);
        assert_eq!(result.break_even_year, Some(5));
    }

    #[rstest]
    fn test_production_series_degrades_geometrically() {
        let input = CalculationInput {
            monthly_bill_current: 150.,
            ..Default::default()
        };
        let costs = costs_for(&input, 4_000.);
        let result = project(&input, 4_000., &costs);

        assert_eq!(result.energy_production_series.len(), 25);
        assert_relative_eq!(result.energy_production_series[0], 4_000.);
        for year in 1..25 {
            assert!(
                result.energy_production_series[year]
                    < result.energy_production_series[year - 1]
            );
        }
        assert_relative_eq!(
            result.energy_production_series[24],
            4_000. * (1. - 0.005_f64).powi(24),
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_self_consumption_is_capped_by_household_usage() {
        // usage = 50 * 12 / 0.40 = 1500 kWh, far below 80% of production
        let input = CalculationInput {
            electricity_rate: 0.40,
            export_rate: 0.2,
            feed_in_tariff: 0.10,
            monthly_bill_current: 50.,
            degradation_rate_per_year: 0.,
            annual_price_increase_percent: 0.,
            ..Default::default()
        };
        let costs = costs_for(&input, 10_000.);
        let result = project(&input, 10_000., &costs);

        // 1500 self-consumed at 0.40, the remaining 8500 exported at 0.10
        assert_relative_eq!(result.first_year_savings, 1_500. * 0.40 + 8_500. * 0.10);
    }

    #[rstest]
    fn test_zero_apr_loan_amortises_linearly(steady_state_input: CalculationInput) {
        let input = CalculationInput {
            include_loan: true,
            loan_apr_percent: 0.,
            loan_term_years: 7,
            ..steady_state_input
        };
        let costs = costs_for(&input, 6_000.);
        let result = project(&input, 6_000., &costs);

        // 9000 over 84 months, interest-free: repayments total the principal
        assert_relative_eq!(
            result.first_year_savings,
            1_800. - 9_000. / 7.,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            result.payback_period_years.unwrap(),
            17.5,
            max_relative = 1e-12
        );
        // the cost basis is unchanged, so ROI matches the unfinanced case
        assert_relative_eq!(result.roi_25_year_percent.unwrap(), 400.);
    }

    #[rstest]
    fn test_loan_repayments_stop_after_term(steady_state_input: CalculationInput) {
        let input = CalculationInput {
            include_loan: true,
            loan_apr_percent: 6.,
            loan_term_years: 7,
            ..steady_state_input
        };
        let costs = costs_for(&input, 6_000.);
        let result = project(&input, 6_000., &costs);

        let loan = LoanSchedule::new(9_000., 6., 7);
        // standard annuity on 9000 at 0.5%/month over 84 payments
        assert_abs_diff_eq!(loan.monthly_repayment, 131.48, epsilon = 1e-2);
        // only 7 of the 25 years carry repayments
        let expected_investment = loan.monthly_repayment * 12. * 7.;
        assert_relative_eq!(
            result.break_even_series[0],
            -expected_investment,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            result.break_even_series[24],
            1_800. * 24. - expected_investment,
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_payback_is_undefined_when_savings_never_accrue() {
        // a 1-year loan on the full cost dwarfs the first-year benefit
        let input = CalculationInput {
            panel_count: 1,
            monthly_bill_current: 100.,
            include_loan: true,
            loan_term_years: 1,
            ..Default::default()
        };
        let costs = costs_for(&input, 500.);
        let result = project(&input, 500., &costs);

        assert!(result.first_year_savings < 0.);
        assert_eq!(result.payback_period_years, None);
        // the cash-flow sign survives into the monthly figure
        assert!(result.monthly_net_cash_flow < 0.);
    }

    #[rstest]
    fn test_zero_bill_short_circuits_to_zero_state(steady_state_input: CalculationInput) {
        let input = CalculationInput {
            monthly_bill_current: 0.,
            ..steady_state_input
        };
        let costs = costs_for(&input, 6_000.);
        let result = project(&input, 6_000., &costs);

        assert_eq!(result, CalculationResult::zero(25));
        assert!(result.break_even_series.iter().all(|position| *position == 0.));
        assert!(result
            .energy_production_series
            .iter()
            .all(|produced| *produced == 0.));
    }

    #[rstest]
    fn test_zero_production_short_circuits_to_zero_state(
        steady_state_input: CalculationInput,
    ) {
        let costs = costs_for(&steady_state_input, 0.);
        let result = project(&steady_state_input, 0., &costs);
        assert_eq!(result, CalculationResult::zero(25));
    }

    #[rstest]
    fn test_roi_is_undefined_with_zero_cost_basis(steady_state_input: CalculationInput) {
        // a grant covering the entire install cost leaves nothing to repay
        let input = CalculationInput {
            include_grant: true,
            grant_rule: crate::input::GrantRule {
                rate_percent: 100.,
                cap_amount: 1_000_000.,
            },
            ..steady_state_input
        };
        let costs = costs_for(&input, 6_000.);
        assert_eq!(costs.net_install_cost, 0.);

        let result = project(&input, 6_000., &costs);
        assert_eq!(result.roi_25_year_percent, None);
        // nothing to pay back: the series never dips below zero
        assert_eq!(result.break_even_year, Some(0));
    }

    #[rstest]
    fn test_tax_allowance_feeds_first_year_savings(steady_state_input: CalculationInput) {
        let input = CalculationInput {
            include_tax_allowance: true,
            ..steady_state_input
        };
        let costs = costs_for(&input, 6_000.);
        // 12.5% of 9000
        assert_eq!(costs.tax_allowance_amount, 1_125.);

        let result = project(&input, 6_000., &costs);
        assert_relative_eq!(result.first_year_savings, 1_800. + 1_125.);
    }

    #[rstest]
    fn test_escalating_retail_rate_compounds_yearly(steady_state_input: CalculationInput) {
        let input = CalculationInput {
            annual_price_increase_percent: 5.,
            ..steady_state_input
        };
        let costs = costs_for(&input, 6_000.);
        let result = project(&input, 6_000., &costs);

        // year-1 benefit: self-consumption at 0.40 * 1.05, export unchanged
        let year_1_retail = 0.40 * (1. + 5. / 100.);
        let year_1_benefit = 3_000. * year_1_retail + 3_000. * 0.20;
        assert_relative_eq!(
            result.break_even_series[1],
            year_1_benefit - costs.net_install_cost
        );
    }
}
