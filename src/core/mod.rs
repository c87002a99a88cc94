mod edit;
mod engine;
pub mod format;
mod types;

pub use edit::{EditError, InputField};
pub use engine::{
    CROSS_SELL_PRODUCT_VALUE, FASTER_PROCESSING_CAPTURE, MAX_CONTRACT_YEARS,
    NIM_IMPROVEMENT_RATE, SIMPLE_SAVINGS_RATE, TRAINING_SAVINGS_SHARE, calculate, compute,
    compute_simple, net_present_value, project_years,
};
pub use types::{
    Calculation, CalculationMode, DerivedMetrics, Inputs, Metric, ProjectionYear, SimpleMetrics,
};
