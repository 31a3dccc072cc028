mod input;
mod model;
mod types;

pub use input::{Calculator, RawInput, UpdateError, update_field};
pub use model::compute;
pub use types::{
    ASSET_LIQUIDATION_FEE_RATE, CoverageBreakdown, CoverageParams, Field, MONTHLY_EXPENSES_MAX,
    YEARS_TO_COVER_MAX, YEARS_TO_COVER_MIN,
};
