pub mod capacity;
pub mod financing;
pub mod format;
pub mod resolver;
pub mod session;
mod types;

pub use capacity::{CapacityCalculator, CapacityField, CapacityInputs, CapacityMetrics};
pub use financing::{
    AltCost, AltRate, AltRateTable, FinancingCalculator, FinancingField, FinancingInputs,
    FinancingMetrics, RateSchedule, RateTableError, RateTier,
};
pub use format::{
    CalculatorReport, MetricsDisplay, ReportFor, format_currency, format_percent,
};
pub use resolver::{SliderAction, apply_action, apply_change, normalize, revenue_step};
pub use session::CalculatorSession;
pub use types::{Bound, CalculatorModel, DisplayStyle, FieldSpec, SliderRange, StepRule};
