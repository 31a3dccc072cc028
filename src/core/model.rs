use super::types::{CoverageBreakdown, CoverageParams};

/// Maps a sanitized parameter set to categorized coverage totals.
///
/// Pure and total: no I/O, no hidden state, no failure path. The caller must
/// have already normalized every field to a finite, non-negative number
/// (`update_field` does this); no clamping happens here, so non-negative
/// inputs always yield non-negative totals.
pub fn compute(params: &CoverageParams, fee_rate: f64) -> CoverageBreakdown {
    let income_replacement_total =
        params.monthly_expenses * 12.0 * f64::from(params.years_to_cover);

    let liabilities_total =
        params.housing_loan + params.car_loan + params.credit_card_debt + params.personal_loans;

    let liquidation_cost_total =
        fee_rate * (params.estimated_property_value + params.total_asset_value);

    let other_needs_total =
        params.children_education + params.emergency_fund + params.funeral_expenses;

    let grand_total =
        income_replacement_total + liabilities_total + liquidation_cost_total + other_needs_total;

    CoverageBreakdown {
        income_replacement_total,
        liabilities_total,
        liquidation_cost_total,
        other_needs_total,
        grand_total,
    }
}
