use serde::Serialize;

use super::types::{Bound, CalculatorModel, DisplayStyle, FieldSpec, StepRule};

pub const DEFAULT_MONTHLY_FEE_PER_UNIT: f64 = 5_500.0;
const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapacityField {
    UnitCount,
    HoursPerDay,
    UtilizationPercent,
    UnitPrice,
    OperatingDaysPerYear,
    OtherAnnualCosts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityInputs {
    pub unit_count: u32,
    pub hours_per_day: u32,
    pub utilization_percent: u32,
    pub unit_price: f64,
    pub operating_days_per_year: u32,
    pub other_annual_costs: f64,
}

impl Default for CapacityInputs {
    fn default() -> Self {
        Self {
            unit_count: 1,
            hours_per_day: 12,
            utilization_percent: 60,
            unit_price: 160.0,
            operating_days_per_year: 340,
            other_annual_costs: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityMetrics {
    pub monthly_fee: f64,
    pub annual_revenue: f64,
    pub net_profit: f64,
}

static FIELDS: [FieldSpec<CapacityField>; 6] = [
    FieldSpec {
        id: CapacityField::UnitCount,
        key: "unitCount",
        label: "Select the number of Aescape massage tables you'll need",
        min: Bound::Fixed(1.0),
        max: Bound::Fixed(10.0),
        step: StepRule::Fixed(1.0),
        decimals: 0,
        display: DisplayStyle::Plain,
        default: 1.0,
    },
    FieldSpec {
        id: CapacityField::HoursPerDay,
        key: "hoursPerDay",
        label: "Select the number of hours the Aescape table will be available each day",
        min: Bound::Fixed(1.0),
        max: Bound::Fixed(24.0),
        step: StepRule::Fixed(1.0),
        decimals: 0,
        display: DisplayStyle::Plain,
        default: 12.0,
    },
    FieldSpec {
        id: CapacityField::UtilizationPercent,
        key: "utilizationPercent",
        label: "Select the percent utilization of the Aescape table",
        min: Bound::Fixed(10.0),
        max: Bound::Fixed(100.0),
        step: StepRule::Fixed(1.0),
        decimals: 0,
        display: DisplayStyle::Percent,
        default: 60.0,
    },
    FieldSpec {
        id: CapacityField::UnitPrice,
        key: "unitPrice",
        label: "Select the price of a 60-minute Aescape massage",
        min: Bound::Fixed(50.0),
        max: Bound::Fixed(300.0),
        step: StepRule::Fixed(10.0),
        decimals: 0,
        display: DisplayStyle::Currency,
        default: 160.0,
    },
    FieldSpec {
        id: CapacityField::OperatingDaysPerYear,
        key: "operatingDaysPerYear",
        label: "Select the number of days your business is open each year",
        min: Bound::Fixed(100.0),
        max: Bound::Fixed(365.0),
        step: StepRule::Fixed(1.0),
        decimals: 0,
        display: DisplayStyle::Plain,
        default: 340.0,
    },
    FieldSpec {
        id: CapacityField::OtherAnnualCosts,
        key: "otherAnnualCosts",
        label: "(Optional): Other annual costs, on a per-table basis",
        min: Bound::Fixed(0.0),
        max: Bound::Fixed(100_000.0),
        step: StepRule::Fixed(1_000.0),
        decimals: 0,
        display: DisplayStyle::CurrencyOrZero,
        default: 0.0,
    },
];

#[derive(Debug, Clone)]
pub struct CapacityCalculator {
    monthly_fee_per_unit: f64,
}

impl CapacityCalculator {
    pub fn new(monthly_fee_per_unit: f64) -> Self {
        Self {
            monthly_fee_per_unit,
        }
    }
}

impl Default for CapacityCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_MONTHLY_FEE_PER_UNIT)
    }
}

impl CalculatorModel for CapacityCalculator {
    type Field = CapacityField;
    type Inputs = CapacityInputs;
    type Metrics = CapacityMetrics;

    const NAME: &'static str = "capacity";

    fn fields(&self) -> &'static [FieldSpec<CapacityField>] {
        &FIELDS
    }

    fn spec(&self, field: CapacityField) -> &'static FieldSpec<CapacityField> {
        &FIELDS[field as usize]
    }

    fn value(inputs: &CapacityInputs, field: CapacityField) -> f64 {
        match field {
            CapacityField::UnitCount => f64::from(inputs.unit_count),
            CapacityField::HoursPerDay => f64::from(inputs.hours_per_day),
            CapacityField::UtilizationPercent => f64::from(inputs.utilization_percent),
            CapacityField::UnitPrice => inputs.unit_price,
            CapacityField::OperatingDaysPerYear => f64::from(inputs.operating_days_per_year),
            CapacityField::OtherAnnualCosts => inputs.other_annual_costs,
        }
    }

    fn set_value(inputs: &mut CapacityInputs, field: CapacityField, value: f64) {
        // Float-to-int casts saturate, so stray negatives land on 0 until clamped.
        match field {
            CapacityField::UnitCount => inputs.unit_count = value.round() as u32,
            CapacityField::HoursPerDay => inputs.hours_per_day = value.round() as u32,
            CapacityField::UtilizationPercent => inputs.utilization_percent = value.round() as u32,
            CapacityField::UnitPrice => inputs.unit_price = value,
            CapacityField::OperatingDaysPerYear => {
                inputs.operating_days_per_year = value.round() as u32
            }
            CapacityField::OtherAnnualCosts => inputs.other_annual_costs = value,
        }
    }

    fn derive(&self, inputs: &CapacityInputs) -> CapacityMetrics {
        let units = f64::from(inputs.unit_count);
        let utilization = f64::from(inputs.utilization_percent) / 100.0;
        let billable_hours_per_day = f64::from(inputs.hours_per_day) * utilization;

        let monthly_fee = units * self.monthly_fee_per_unit;
        let annual_revenue = (inputs.unit_price
            * billable_hours_per_day
            * f64::from(inputs.operating_days_per_year)
            * units)
            .round();
        let net_profit =
            (annual_revenue - monthly_fee * MONTHS_PER_YEAR - inputs.other_annual_costs).round();

        CapacityMetrics {
            monthly_fee,
            annual_revenue,
            net_profit,
        }
    }
}
