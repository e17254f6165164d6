use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Bound, CalculatorModel, DisplayStyle, FieldSpec, StepRule};

pub const CREDIT_LINE_RATIO: f64 = 0.25;
pub const DAYS_IN_MONTH: f64 = 30.0;
const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FinancingField {
    MonthlyRevenue,
    SupplierSpend,
    EarlyPayDiscountPercent,
    DiscountWindowDays,
    StandardTermsDays,
    RepayDay,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingInputs {
    pub monthly_revenue: f64,
    pub supplier_spend: f64,
    pub early_pay_discount_percent: f64,
    pub discount_window_days: u32,
    /// Collected and kept valid, but no formula reads it.
    pub standard_terms_days: u32,
    pub repay_day: u32,
}

impl Default for FinancingInputs {
    fn default() -> Self {
        Self {
            monthly_revenue: 2_000_000.0,
            supplier_spend: 1_000_000.0,
            early_pay_discount_percent: 1.0,
            discount_window_days: 10,
            standard_terms_days: 30,
            repay_day: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AltCost {
    pub name: String,
    pub monthly_rate: f64,
    pub monthly_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingMetrics {
    pub monthly_rate: f64,
    pub loan_days: u32,
    pub financing_factor: f64,
    pub paylater_line: f64,
    pub spend_used: f64,
    pub discount_benefit: f64,
    pub paylater_cost: f64,
    pub normal_rate_monthly: f64,
    pub effective_rate_monthly: f64,
    pub net_saving_annual: f64,
    pub alt_cost_monthly: Vec<AltCost>,
    /// PayLater cost on the full supplier spend, as shown beside the alternatives.
    pub headline_cost_monthly: f64,
}

impl FinancingMetrics {
    pub fn alt_cost(&self, name: &str) -> Option<f64> {
        self.alt_cost_monthly
            .iter()
            .find(|cost| cost.name == name)
            .map(|cost| cost.monthly_cost)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateTableError {
    #[error("rate schedule must contain at least one tier")]
    EmptySchedule,
    #[error("rate tier {index} has a non-finite or negative revenue ceiling")]
    InvalidCeiling { index: usize },
    #[error("rate tier {index} must have a higher revenue ceiling than the tier before it")]
    UnorderedTier { index: usize },
    #[error("rate tier {index} has a non-finite or negative monthly rate")]
    InvalidTierRate { index: usize },
    #[error("alternative rate table must contain at least one product")]
    EmptyAlternatives,
    #[error("alternative product {0:?} is listed more than once")]
    DuplicateAlternative(String),
    #[error("alternative product {0:?} has a non-finite or negative monthly rate")]
    InvalidAlternativeRate(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RateTier {
    pub revenue_max: f64,
    pub monthly_rate: f64,
}

/// Revenue tiers in ascending order of ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSchedule {
    tiers: Vec<RateTier>,
}

impl RateSchedule {
    pub fn new(tiers: Vec<RateTier>) -> Result<Self, RateTableError> {
        if tiers.is_empty() {
            return Err(RateTableError::EmptySchedule);
        }
        for (index, tier) in tiers.iter().enumerate() {
            if !tier.revenue_max.is_finite() || tier.revenue_max < 0.0 {
                return Err(RateTableError::InvalidCeiling { index });
            }
            if !tier.monthly_rate.is_finite() || tier.monthly_rate < 0.0 {
                return Err(RateTableError::InvalidTierRate { index });
            }
            if index > 0 && tier.revenue_max <= tiers[index - 1].revenue_max {
                return Err(RateTableError::UnorderedTier { index });
            }
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    /// Rate of the first tier whose ceiling covers `monthly_revenue`. Revenue
    /// above every ceiling gets the last tier's rate.
    pub fn monthly_rate(&self, monthly_revenue: f64) -> f64 {
        self.tiers
            .iter()
            .find(|tier| monthly_revenue <= tier.revenue_max)
            .or_else(|| self.tiers.last())
            .map_or(0.0, |tier| tier.monthly_rate)
    }
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![
                RateTier {
                    revenue_max: 250_000.0,
                    monthly_rate: 0.025,
                },
                RateTier {
                    revenue_max: 1_000_000.0,
                    monthly_rate: 0.0208,
                },
                RateTier {
                    revenue_max: 10_000_000.0,
                    monthly_rate: 0.0167,
                },
                RateTier {
                    revenue_max: 50_000_000.0,
                    monthly_rate: 0.015,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AltRate {
    pub name: String,
    pub monthly_rate: f64,
}

/// Competing financing products, kept in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AltRateTable {
    entries: Vec<AltRate>,
}

impl AltRateTable {
    pub fn new(entries: Vec<AltRate>) -> Result<Self, RateTableError> {
        if entries.is_empty() {
            return Err(RateTableError::EmptyAlternatives);
        }
        for (index, entry) in entries.iter().enumerate() {
            if !entry.monthly_rate.is_finite() || entry.monthly_rate < 0.0 {
                return Err(RateTableError::InvalidAlternativeRate(entry.name.clone()));
            }
            if entries[..index].iter().any(|prior| prior.name == entry.name) {
                return Err(RateTableError::DuplicateAlternative(entry.name.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[AltRate] {
        &self.entries
    }
}

impl Default for AltRateTable {
    fn default() -> Self {
        let entry = |name: &str, monthly_rate: f64| AltRate {
            name: name.to_string(),
            monthly_rate,
        };
        Self {
            entries: vec![
                entry("Credit Card", 0.245),
                entry("MCA", 0.62),
                entry("Factoring", 0.30),
            ],
        }
    }
}

static FIELDS: [FieldSpec<FinancingField>; 6] = [
    FieldSpec {
        id: FinancingField::MonthlyRevenue,
        key: "monthlyRevenue",
        label: "Monthly revenue",
        min: Bound::Fixed(50_000.0),
        max: Bound::Fixed(50_000_000.0),
        step: StepRule::RevenueScaled,
        decimals: 0,
        display: DisplayStyle::Currency,
        default: 2_000_000.0,
    },
    FieldSpec {
        id: FinancingField::SupplierSpend,
        key: "supplierSpend",
        label: "Monthly supplier spend",
        min: Bound::Fixed(0.0),
        max: Bound::Linked {
            field: FinancingField::MonthlyRevenue,
            offset: 0.0,
        },
        step: StepRule::RevenueScaled,
        decimals: 0,
        display: DisplayStyle::Currency,
        default: 1_000_000.0,
    },
    FieldSpec {
        id: FinancingField::EarlyPayDiscountPercent,
        key: "earlyPayDiscountPercent",
        label: "Early-pay discount (%)",
        min: Bound::Fixed(0.0),
        max: Bound::Fixed(5.0),
        step: StepRule::Fixed(0.1),
        decimals: 1,
        display: DisplayStyle::Percent,
        default: 1.0,
    },
    FieldSpec {
        id: FinancingField::DiscountWindowDays,
        key: "discountWindowDays",
        label: "Discount window (days)",
        min: Bound::Fixed(1.0),
        max: Bound::Fixed(30.0),
        step: StepRule::Fixed(1.0),
        decimals: 0,
        display: DisplayStyle::Plain,
        default: 10.0,
    },
    FieldSpec {
        id: FinancingField::StandardTermsDays,
        key: "standardTermsDays",
        label: "Standard terms (Net-days)",
        min: Bound::Linked {
            field: FinancingField::DiscountWindowDays,
            offset: 1.0,
        },
        max: Bound::Fixed(120.0),
        step: StepRule::Fixed(1.0),
        decimals: 0,
        display: DisplayStyle::Plain,
        default: 30.0,
    },
    FieldSpec {
        id: FinancingField::RepayDay,
        key: "repayDay",
        label: "Repay Lendica on day (invoice date)",
        // The slider's nominal floor is day 0; repaying inside the discount
        // window is never allowed, so the window is the effective floor.
        min: Bound::Linked {
            field: FinancingField::DiscountWindowDays,
            offset: 0.0,
        },
        max: Bound::Fixed(60.0),
        step: StepRule::Fixed(1.0),
        decimals: 0,
        display: DisplayStyle::Plain,
        default: 60.0,
    },
];

#[derive(Debug, Clone)]
pub struct FinancingCalculator {
    schedule: RateSchedule,
    alternatives: AltRateTable,
}

impl FinancingCalculator {
    pub fn new(schedule: RateSchedule, alternatives: AltRateTable) -> Self {
        Self {
            schedule,
            alternatives,
        }
    }

    pub fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    pub fn alternatives(&self) -> &AltRateTable {
        &self.alternatives
    }
}

impl Default for FinancingCalculator {
    fn default() -> Self {
        Self::new(RateSchedule::default(), AltRateTable::default())
    }
}

impl CalculatorModel for FinancingCalculator {
    type Field = FinancingField;
    type Inputs = FinancingInputs;
    type Metrics = FinancingMetrics;

    const NAME: &'static str = "financing";

    fn fields(&self) -> &'static [FieldSpec<FinancingField>] {
        &FIELDS
    }

    fn spec(&self, field: FinancingField) -> &'static FieldSpec<FinancingField> {
        &FIELDS[field as usize]
    }

    fn value(inputs: &FinancingInputs, field: FinancingField) -> f64 {
        match field {
            FinancingField::MonthlyRevenue => inputs.monthly_revenue,
            FinancingField::SupplierSpend => inputs.supplier_spend,
            FinancingField::EarlyPayDiscountPercent => inputs.early_pay_discount_percent,
            FinancingField::DiscountWindowDays => f64::from(inputs.discount_window_days),
            FinancingField::StandardTermsDays => f64::from(inputs.standard_terms_days),
            FinancingField::RepayDay => f64::from(inputs.repay_day),
        }
    }

    fn set_value(inputs: &mut FinancingInputs, field: FinancingField, value: f64) {
        match field {
            FinancingField::MonthlyRevenue => inputs.monthly_revenue = value,
            FinancingField::SupplierSpend => inputs.supplier_spend = value,
            FinancingField::EarlyPayDiscountPercent => inputs.early_pay_discount_percent = value,
            FinancingField::DiscountWindowDays => {
                inputs.discount_window_days = value.round() as u32
            }
            FinancingField::StandardTermsDays => inputs.standard_terms_days = value.round() as u32,
            FinancingField::RepayDay => inputs.repay_day = value.round() as u32,
        }
    }

    fn derive(&self, inputs: &FinancingInputs) -> FinancingMetrics {
        let monthly_rate = self.schedule.monthly_rate(inputs.monthly_revenue);
        let loan_days = inputs.repay_day.saturating_sub(inputs.discount_window_days);
        let financing_factor = f64::from(loan_days) / DAYS_IN_MONTH;

        let paylater_line = inputs.monthly_revenue * CREDIT_LINE_RATIO * financing_factor;
        let spend_used = inputs.supplier_spend.min(paylater_line);
        let discount_benefit = spend_used * (inputs.early_pay_discount_percent / 100.0);
        let paylater_cost = spend_used * monthly_rate * financing_factor;

        let effective_rate_monthly = if financing_factor > 0.0 && spend_used > 0.0 {
            ((paylater_cost - discount_benefit) / spend_used / financing_factor) * 100.0
        } else {
            0.0
        };
        let net_saving_annual = MONTHS_PER_YEAR
            * (spend_used * monthly_rate * financing_factor
                - spend_used * (effective_rate_monthly / 100.0) * financing_factor);

        let alt_cost_monthly = self
            .alternatives
            .entries()
            .iter()
            .map(|alt| AltCost {
                name: alt.name.clone(),
                monthly_rate: alt.monthly_rate,
                monthly_cost: spend_used * alt.monthly_rate * financing_factor,
            })
            .collect();

        FinancingMetrics {
            monthly_rate,
            loan_days,
            financing_factor,
            paylater_line,
            spend_used,
            discount_benefit,
            paylater_cost,
            normal_rate_monthly: monthly_rate * 100.0,
            effective_rate_monthly,
            net_saving_annual,
            alt_cost_monthly,
            headline_cost_monthly: inputs.supplier_spend * monthly_rate * financing_factor,
        }
    }
}
