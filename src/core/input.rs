use thiserror::Error;

use super::model::compute;
use super::types::{
    CoverageBreakdown, CoverageParams, Field, MONTHLY_EXPENSES_MAX, YEARS_TO_COVER_MAX,
    YEARS_TO_COVER_MIN,
};

/// Raw value for a single field edit: sliders hand over numbers, currency
/// text boxes hand over whatever the user typed.
#[derive(Copy, Clone, Debug)]
pub enum RawInput<'a> {
    Number(f64),
    Text(&'a str),
}

/// A rejected field update. The update is a no-op: the caller keeps the
/// previous parameter set and skips re-derivation. Never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("{0:?}: expected digits only")]
    NonNumeric(Field),
    #[error("{0:?}: value is not a finite number")]
    NonFinite(Field),
}

/// Applies one field edit to a parameter set and returns the resulting set
/// by value; the input set is never mutated, so previously taken snapshots
/// stay valid. Exactly one field differs from `params` on success.
///
/// Slider fields are clamped to their documented range. Currency fields
/// accept digit-only text after stripping thousands separators; empty text
/// normalizes to 0; anything else is rejected.
pub fn update_field(
    params: &CoverageParams,
    field: Field,
    input: RawInput<'_>,
) -> Result<CoverageParams, UpdateError> {
    let mut next = *params;
    match field {
        Field::MonthlyExpenses => {
            next.monthly_expenses = numeric_value(field, input)?.clamp(0.0, MONTHLY_EXPENSES_MAX);
        }
        Field::YearsToCover => {
            let years = numeric_value(field, input)?
                .round()
                .clamp(f64::from(YEARS_TO_COVER_MIN), f64::from(YEARS_TO_COVER_MAX));
            next.years_to_cover = years as u32;
        }
        Field::HousingLoan => next.housing_loan = currency_value(field, input)?,
        Field::CarLoan => next.car_loan = currency_value(field, input)?,
        Field::CreditCardDebt => next.credit_card_debt = currency_value(field, input)?,
        Field::PersonalLoans => next.personal_loans = currency_value(field, input)?,
        Field::EstimatedPropertyValue => {
            next.estimated_property_value = currency_value(field, input)?;
        }
        Field::TotalAssetValue => next.total_asset_value = currency_value(field, input)?,
        Field::ChildrenEducation => next.children_education = currency_value(field, input)?,
        Field::EmergencyFund => next.emergency_fund = currency_value(field, input)?,
        Field::FuneralExpenses => next.funeral_expenses = currency_value(field, input)?,
    }
    Ok(next)
}

fn numeric_value(field: Field, input: RawInput<'_>) -> Result<f64, UpdateError> {
    let value = match input {
        RawInput::Number(v) => v,
        RawInput::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| UpdateError::NonNumeric(field))?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(UpdateError::NonFinite(field))
    }
}

fn currency_value(field: Field, input: RawInput<'_>) -> Result<f64, UpdateError> {
    match input {
        // JSON clients send plain numbers; invalid ones are normalized or
        // rejected so a negative or non-finite amount is never stored.
        RawInput::Number(v) => {
            if v.is_finite() {
                Ok(v.max(0.0))
            } else {
                Err(UpdateError::NonFinite(field))
            }
        }
        RawInput::Text(raw) => {
            let stripped: String = raw.chars().filter(|c| *c != ',').collect();
            if stripped.is_empty() {
                return Ok(0.0);
            }
            if !stripped.chars().all(|c| c.is_ascii_digit()) {
                return Err(UpdateError::NonNumeric(field));
            }
            let value = stripped
                .parse::<f64>()
                .map_err(|_| UpdateError::NonNumeric(field))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(UpdateError::NonFinite(field))
            }
        }
    }
}

/// Owns the authoritative parameter set and keeps the derived breakdown in
/// lockstep with it: every accepted edit replaces the parameter set and
/// recomputes the whole breakdown before control returns to the caller.
/// Rejected edits change nothing and trigger no recomputation.
#[derive(Debug, Clone)]
pub struct Calculator {
    fee_rate: f64,
    params: CoverageParams,
    breakdown: CoverageBreakdown,
    revision: u64,
}

impl Calculator {
    pub fn new(fee_rate: f64) -> Self {
        let params = CoverageParams::default();
        let breakdown = compute(&params, fee_rate);
        Self {
            fee_rate,
            params,
            breakdown,
            revision: 0,
        }
    }

    pub fn update(&mut self, field: Field, input: RawInput<'_>) -> Result<(), UpdateError> {
        let next = update_field(&self.params, field, input)?;
        self.params = next;
        self.breakdown = compute(&self.params, self.fee_rate);
        self.revision += 1;
        Ok(())
    }

    pub fn params(&self) -> CoverageParams {
        self.params
    }

    pub fn breakdown(&self) -> CoverageBreakdown {
        self.breakdown
    }

    /// Counts accepted updates; unchanged across rejected ones, so consumers
    /// can skip redundant re-reads.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ASSET_LIQUIDATION_FEE_RATE;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn non_digit_text_is_rejected_and_params_unchanged() {
        let params = CoverageParams::default();
        let err = update_field(&params, Field::HousingLoan, RawInput::Text("12a3"))
            .expect_err("must reject mixed digits and letters");
        assert_eq!(err, UpdateError::NonNumeric(Field::HousingLoan));
    }

    #[test]
    fn empty_text_normalizes_to_zero() {
        let params = CoverageParams {
            housing_loan: 250_000.0,
            ..CoverageParams::default()
        };
        let next = update_field(&params, Field::HousingLoan, RawInput::Text(""))
            .expect("empty input must be accepted");
        assert_approx(next.housing_loan, 0.0);
    }

    #[test]
    fn thousands_separators_are_stripped() {
        let params = CoverageParams::default();
        let next = update_field(&params, Field::CarLoan, RawInput::Text("1,250,000"))
            .expect("comma-separated digits must be accepted");
        assert_approx(next.car_loan, 1_250_000.0);
    }

    #[test]
    fn decimal_point_counts_as_non_digit() {
        let params = CoverageParams::default();
        let err = update_field(&params, Field::EmergencyFund, RawInput::Text("10.5"))
            .expect_err("currency fields are whole-unit only");
        assert_eq!(err, UpdateError::NonNumeric(Field::EmergencyFund));
    }

    #[test]
    fn years_to_cover_clamps_to_documented_range() {
        let params = CoverageParams::default();

        let high = update_field(&params, Field::YearsToCover, RawInput::Number(45.0))
            .expect("slider input must be accepted");
        assert_eq!(high.years_to_cover, 30);

        let low = update_field(&params, Field::YearsToCover, RawInput::Number(0.0))
            .expect("slider input must be accepted");
        assert_eq!(low.years_to_cover, 1);
    }

    #[test]
    fn monthly_expenses_clamps_to_slider_range() {
        let params = CoverageParams::default();

        let high = update_field(&params, Field::MonthlyExpenses, RawInput::Number(80_000.0))
            .expect("slider input must be accepted");
        assert_approx(high.monthly_expenses, 50_000.0);

        let negative = update_field(&params, Field::MonthlyExpenses, RawInput::Number(-500.0))
            .expect("slider input must be accepted");
        assert_approx(negative.monthly_expenses, 0.0);
    }

    #[test]
    fn non_finite_slider_input_is_rejected() {
        let params = CoverageParams::default();
        let err = update_field(&params, Field::MonthlyExpenses, RawInput::Number(f64::NAN))
            .expect_err("NaN must never be stored");
        assert_eq!(err, UpdateError::NonFinite(Field::MonthlyExpenses));
    }

    #[test]
    fn negative_currency_number_normalizes_to_zero() {
        let params = CoverageParams::default();
        let next = update_field(&params, Field::TotalAssetValue, RawInput::Number(-42.0))
            .expect("negative amounts normalize rather than reject");
        assert_approx(next.total_asset_value, 0.0);
    }

    #[test]
    fn accepted_update_replaces_exactly_one_field() {
        let params = CoverageParams {
            monthly_expenses: 7_000.0,
            years_to_cover: 12,
            car_loan: 30_000.0,
            emergency_fund: 10_000.0,
            ..CoverageParams::default()
        };
        let next = update_field(&params, Field::HousingLoan, RawInput::Text("400,000"))
            .expect("valid input must be accepted");

        assert_approx(next.housing_loan, 400_000.0);
        let mut expected = params;
        expected.housing_loan = next.housing_loan;
        assert_eq!(next, expected);
    }

    #[test]
    fn calculator_starts_with_defaults_and_derived_breakdown() {
        let calc = Calculator::new(ASSET_LIQUIDATION_FEE_RATE);
        assert_eq!(calc.params(), CoverageParams::default());
        assert_approx(calc.breakdown().grand_total, 300_000.0);
        assert_eq!(calc.revision(), 0);
    }

    #[test]
    fn calculator_recomputes_only_on_accepted_updates() {
        let mut calc = Calculator::new(ASSET_LIQUIDATION_FEE_RATE);

        calc.update(Field::HousingLoan, RawInput::Text("200,000"))
            .expect("valid input must be accepted");
        assert_eq!(calc.revision(), 1);
        assert_approx(calc.breakdown().liabilities_total, 200_000.0);
        assert_approx(calc.breakdown().grand_total, 500_000.0);

        let before = calc.breakdown();
        calc.update(Field::HousingLoan, RawInput::Text("not a number"))
            .expect_err("invalid input must be rejected");
        assert_eq!(calc.revision(), 1);
        assert_eq!(calc.breakdown(), before);
        assert_approx(calc.params().housing_loan, 200_000.0);
    }

    #[test]
    fn calculator_uses_configured_fee_rate() {
        let mut calc = Calculator::new(0.10);
        calc.update(Field::EstimatedPropertyValue, RawInput::Text("500,000"))
            .expect("valid input must be accepted");
        assert_approx(calc.breakdown().liquidation_cost_total, 50_000.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_digit_text_is_stored_verbatim(amount in 0u64..1_000_000_000_000) {
            let params = CoverageParams::default();
            let text = amount.to_string();
            let next = update_field(&params, Field::PersonalLoans, RawInput::Text(&text)).unwrap();
            prop_assert!((next.personal_loans - amount as f64).abs() <= EPS);
        }

        #[test]
        fn prop_arbitrary_text_never_leaves_invalid_state(raw in ".{0,24}") {
            let params = CoverageParams::default();
            match update_field(&params, Field::ChildrenEducation, RawInput::Text(&raw)) {
                Ok(next) => {
                    prop_assert!(next.children_education.is_finite());
                    prop_assert!(next.children_education >= 0.0);
                }
                Err(_) => {
                    // Rejection is a no-op; nothing to check beyond the
                    // original set still being the caller's value.
                }
            }
        }

        #[test]
        fn prop_slider_numbers_always_land_in_range(value in -1.0e9f64..1.0e9) {
            let params = CoverageParams::default();

            let expenses =
                update_field(&params, Field::MonthlyExpenses, RawInput::Number(value)).unwrap();
            prop_assert!(expenses.monthly_expenses >= 0.0);
            prop_assert!(expenses.monthly_expenses <= MONTHLY_EXPENSES_MAX);

            let years =
                update_field(&params, Field::YearsToCover, RawInput::Number(value)).unwrap();
            prop_assert!(years.years_to_cover >= YEARS_TO_COVER_MIN);
            prop_assert!(years.years_to_cover <= YEARS_TO_COVER_MAX);
        }

        #[test]
        fn prop_calculator_breakdown_tracks_params(
            housing in 0u32..1_000_000_000,
            education in 0u32..1_000_000_000,
            years in 0.0f64..40.0
        ) {
            let mut calc = Calculator::new(ASSET_LIQUIDATION_FEE_RATE);
            let housing_text = housing.to_string();
            let education_text = education.to_string();

            calc.update(Field::HousingLoan, RawInput::Text(&housing_text)).unwrap();
            calc.update(Field::ChildrenEducation, RawInput::Text(&education_text)).unwrap();
            calc.update(Field::YearsToCover, RawInput::Number(years)).unwrap();
            prop_assert_eq!(calc.revision(), 3);

            let expected = compute(&calc.params(), ASSET_LIQUIDATION_FEE_RATE);
            prop_assert_eq!(calc.breakdown(), expected);
        }
    }
}
