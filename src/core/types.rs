use serde::{Deserialize, Serialize};

/// Percentage cost of converting illiquid assets (property, investments)
/// into cash, applied identically to both asset categories.
pub const ASSET_LIQUIDATION_FEE_RATE: f64 = 0.05;

pub const MONTHLY_EXPENSES_MAX: f64 = 50_000.0;
pub const YEARS_TO_COVER_MIN: u32 = 1;
pub const YEARS_TO_COVER_MAX: u32 = 30;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Field {
    MonthlyExpenses,
    YearsToCover,
    HousingLoan,
    CarLoan,
    CreditCardDebt,
    PersonalLoans,
    EstimatedPropertyValue,
    TotalAssetValue,
    ChildrenEducation,
    EmergencyFund,
    FuneralExpenses,
}

impl Field {
    /// Slider-bound fields arrive as already-bounded numbers and are clamped
    /// to their documented range; everything else is free-text currency.
    pub fn is_slider(self) -> bool {
        matches!(self, Field::MonthlyExpenses | Field::YearsToCover)
    }
}

/// The complete set of user-supplied financial inputs.
///
/// Invariant: every stored number is finite and non-negative, and
/// `years_to_cover` stays within [YEARS_TO_COVER_MIN, YEARS_TO_COVER_MAX].
/// All mutation goes through `update_field`, which upholds this.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageParams {
    pub monthly_expenses: f64,
    pub years_to_cover: u32,
    pub housing_loan: f64,
    pub car_loan: f64,
    pub credit_card_debt: f64,
    pub personal_loans: f64,
    pub estimated_property_value: f64,
    pub total_asset_value: f64,
    pub children_education: f64,
    pub emergency_fund: f64,
    pub funeral_expenses: f64,
}

impl Default for CoverageParams {
    fn default() -> Self {
        Self {
            monthly_expenses: 5_000.0,
            years_to_cover: 5,
            housing_loan: 0.0,
            car_loan: 0.0,
            credit_card_debt: 0.0,
            personal_loans: 0.0,
            estimated_property_value: 0.0,
            total_asset_value: 0.0,
            children_education: 0.0,
            emergency_fund: 0.0,
            funeral_expenses: 0.0,
        }
    }
}

/// Categorized coverage totals derived from a `CoverageParams`.
///
/// Recomputed whole on every accepted parameter change, never patched
/// incrementally; `grand_total` always equals the sum of the other four.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageBreakdown {
    pub income_replacement_total: f64,
    pub liabilities_total: f64,
    pub liquidation_cost_total: f64,
    pub other_needs_total: f64,
    pub grand_total: f64,
}
