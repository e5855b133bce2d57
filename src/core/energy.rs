//! Maps a panel count to an annual energy yield in kWh, using the
//! calibration table supplied by the solar-potential data provider.

use crate::input::{SiteFactors, SolarPanelConfig};
use interp::{interp, InterpMode};

/// Estimate the yearly AC energy (kWh) produced by `panel_count` panels.
///
/// The calibration table holds discrete known layouts; counts between two
/// known layouts interpolate linearly, counts outside the table scale
/// proportionally from the nearest known layout, and an empty table falls
/// back to a flat per-panel daily average. The table must be sorted
/// ascending by panel count (ingestion guarantees this).
pub fn estimate_yearly_energy(
    panel_count: u32,
    panel_configs: &[SolarPanelConfig],
    site: &SiteFactors,
) -> f64 {
    if panel_count == 0 {
        return 0.;
    }

    // A zero-panel calibration point would put a division by zero in the
    // proportional-scaling branches, so such entries are not usable.
    let configs = panel_configs
        .iter()
        .filter(|config| config.panels_count > 0)
        .copied()
        .collect::<Vec<_>>();

    if configs.is_empty() {
        return panel_count as f64 * site.day_power_avg_kwh * site.days_per_year;
    }

    if let Some(exact) = configs
        .iter()
        .find(|config| config.panels_count == panel_count)
    {
        return exact.yearly_energy_dc_kwh;
    }

    let smallest = configs[0];
    let largest = configs[configs.len() - 1];

    if panel_count < smallest.panels_count {
        return panel_count as f64 / smallest.panels_count as f64 * smallest.yearly_energy_dc_kwh;
    }
    if panel_count > largest.panels_count {
        return panel_count as f64 / largest.panels_count as f64 * largest.yearly_energy_dc_kwh;
    }

    let panel_counts = configs
        .iter()
        .map(|config| config.panels_count as f64)
        .collect::<Vec<_>>();
    let yearly_energies = configs
        .iter()
        .map(|config| config.yearly_energy_dc_kwh)
        .collect::<Vec<_>>();

    // the query is always inside the table here; counts outside it took the
    // proportional-scaling branches above, so the mode never applies
    interp(
        &panel_counts,
        &yearly_energies,
        panel_count as f64,
        &InterpMode::Extrapolate,
    )
}
