use crate::compare_floats::min_of_2;
use crate::core::units::{
    round_currency, COST_TIER_1_LIMIT_KWP, COST_TIER_1_RATE_PER_KWP, COST_TIER_2_LIMIT_KWP,
    COST_TIER_2_RATE_PER_KWP, COST_TIER_3_RATE_PER_KWP, KWH_PER_KWP_PER_YEAR,
};
use crate::input::GrantRule;
use serde::Serialize;

/// Installation cost and incentive amounts for one system size, all rounded
/// to whole currency units. Financing is deliberately absent here; loan
/// interest is handled by the amortisation in the projection module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub install_cost: f64,
    pub grant_amount: f64,
    pub tax_allowance_amount: f64,
    pub net_install_cost: f64,
}

/// Calculate the installed cost of a system sized to produce
/// `yearly_energy_kwh`, and the grant and tax-allowance amounts against it.
///
/// Capacity is derived from yearly energy at 1000 kWh per kWp. The grant is
/// a percentage of the install cost capped at the scheme maximum; the tax
/// allowance is a percentage of the install cost but can never exceed the
/// post-grant cost base.
pub fn calculate_cost(
    yearly_energy_kwh: f64,
    grant_rule: &GrantRule,
    include_grant: bool,
    tax_allowance_rate_percent: f64,
    include_tax_allowance: bool,
) -> CostBreakdown {
    let installed_capacity_kwp = yearly_energy_kwh / KWH_PER_KWP_PER_YEAR;
    let install_cost = tiered_install_cost(installed_capacity_kwp);

    let grant_amount = if include_grant {
        min_of_2(
            install_cost * grant_rule.rate_percent / 100.,
            grant_rule.cap_amount,
        )
    } else {
        0.
    };

    let tax_allowance_amount = if include_tax_allowance {
        min_of_2(
            install_cost - grant_amount,
            install_cost * tax_allowance_rate_percent / 100.,
        )
    } else {
        0.
    };

    CostBreakdown {
        install_cost: round_currency(install_cost),
        grant_amount: round_currency(grant_amount),
        tax_allowance_amount: round_currency(tax_allowance_amount),
        net_install_cost: round_currency(install_cost - grant_amount),
    }
}

/// Sliding-scale installer pricing: the first 100 kWp at the tier-1 rate,
/// the next 150 kWp at tier 2, the remainder at tier 3. The bands are
/// inclusive of their upper bound.
fn tiered_install_cost(installed_capacity_kwp: f64) -> f64 {
    if installed_capacity_kwp <= COST_TIER_1_LIMIT_KWP {
        installed_capacity_kwp * COST_TIER_1_RATE_PER_KWP
    } else if installed_capacity_kwp <= COST_TIER_2_LIMIT_KWP {
        COST_TIER_1_LIMIT_KWP * COST_TIER_1_RATE_PER_KWP
            + (installed_capacity_kwp - COST_TIER_1_LIMIT_KWP) * COST_TIER_2_RATE_PER_KWP
    } else {
        COST_TIER_1_LIMIT_KWP * COST_TIER_1_RATE_PER_KWP
            + (COST_TIER_2_LIMIT_KWP - COST_TIER_1_LIMIT_KWP) * COST_TIER_2_RATE_PER_KWP
            + (installed_capacity_kwp - COST_TIER_2_LIMIT_KWP) * COST_TIER_3_RATE_PER_KWP
    }
}
