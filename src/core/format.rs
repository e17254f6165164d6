use serde::Serialize;

use super::capacity::CapacityMetrics;
use super::financing::FinancingMetrics;
use super::resolver::{bounds, step};
use super::types::{CalculatorModel, DisplayStyle};

pub const PAYLATER_PRODUCT_NAME: &str = "Lendica PayLater";
const APPLY_ENABLED_LABEL: &str = "Start Apply";
const APPLY_DISABLED_LABEL: &str = "Enter Valid Data";

/// Whole-number amount with thousands separators and no currency symbol.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    if !rounded.is_finite() {
        return rounded.to_string();
    }
    if rounded == 0.0 {
        return "0".to_string();
    }

    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Two decimals, with exact halfway values rounded away from zero.
pub fn format_percent(value: f64) -> String {
    // A two-decimal tie is representable only as an odd multiple of 1/8.
    let eighths = value * 8.0;
    let is_tie = eighths.fract() == 0.0 && eighths % 2.0 != 0.0;
    let fixed = if is_tie {
        format!("{:.2}", (value * 100.0).round() / 100.0)
    } else {
        format!("{value:.2}")
    };
    if fixed == "-0.00" {
        return "0.00%".to_string();
    }
    format!("{fixed}%")
}

pub fn format_field_value(style: DisplayStyle, value: f64) -> String {
    match style {
        DisplayStyle::Currency => format!("${}", format_currency(value)),
        DisplayStyle::CurrencyOrZero if value == 0.0 => "0".to_string(),
        DisplayStyle::CurrencyOrZero => format!("${}", format_currency(value)),
        DisplayStyle::Percent => format!("{value}%"),
        DisplayStyle::Plain => format!("{value}"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
    pub display: String,
}

pub fn field_views<M: CalculatorModel>(model: &M, inputs: &M::Inputs) -> Vec<FieldView> {
    model
        .fields()
        .iter()
        .map(|spec| {
            let range = bounds(model, inputs, spec.id);
            let value = M::value(inputs, spec.id);
            FieldView {
                key: spec.key,
                label: spec.label,
                min: range.min,
                max: range.max,
                step: step(model, inputs, spec.id),
                value,
                display: format_field_value(spec.display, value),
            }
        })
        .collect()
}

pub trait MetricsDisplay {
    type Display: Serialize;

    fn display(&self) -> Self::Display;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityDisplay {
    pub monthly_fee: String,
    pub annual_revenue: String,
    pub net_profit: String,
}

impl MetricsDisplay for CapacityMetrics {
    type Display = CapacityDisplay;

    fn display(&self) -> CapacityDisplay {
        CapacityDisplay {
            monthly_fee: format_currency(self.monthly_fee),
            annual_revenue: format_currency(self.annual_revenue),
            net_profit: format_currency(self.net_profit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub product: String,
    pub monthly_rate: String,
    pub monthly_cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingDisplay {
    pub paylater_line: String,
    pub normal_rate_monthly: String,
    pub effective_rate_monthly: String,
    pub net_saving_annual: String,
    /// Alternatives in table order, then the PayLater row.
    pub comparison: Vec<ComparisonRow>,
    pub apply_enabled: bool,
    pub apply_label: &'static str,
}

impl MetricsDisplay for FinancingMetrics {
    type Display = FinancingDisplay;

    fn display(&self) -> FinancingDisplay {
        let mut comparison: Vec<ComparisonRow> = self
            .alt_cost_monthly
            .iter()
            .map(|alt| ComparisonRow {
                product: alt.name.clone(),
                monthly_rate: format_percent(alt.monthly_rate * 100.0),
                monthly_cost: format_currency(alt.monthly_cost),
            })
            .collect();
        comparison.push(ComparisonRow {
            product: PAYLATER_PRODUCT_NAME.to_string(),
            monthly_rate: format_percent(self.normal_rate_monthly),
            monthly_cost: format_currency(self.headline_cost_monthly),
        });

        let apply_enabled = self.net_saving_annual > 0.0;
        FinancingDisplay {
            paylater_line: format_currency(self.paylater_line),
            normal_rate_monthly: format_percent(self.normal_rate_monthly),
            effective_rate_monthly: format_percent(self.effective_rate_monthly),
            net_saving_annual: format_currency(self.net_saving_annual),
            comparison,
            apply_enabled,
            apply_label: if apply_enabled {
                APPLY_ENABLED_LABEL
            } else {
                APPLY_DISABLED_LABEL
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorReport<I, Mt, D> {
    pub calculator: &'static str,
    pub inputs: I,
    pub fields: Vec<FieldView>,
    pub metrics: Mt,
    pub display: D,
}

pub type ReportFor<M> = CalculatorReport<
    <M as CalculatorModel>::Inputs,
    <M as CalculatorModel>::Metrics,
    <<M as CalculatorModel>::Metrics as MetricsDisplay>::Display,
>;

pub fn build_report<M>(model: &M, inputs: &M::Inputs, metrics: &M::Metrics) -> ReportFor<M>
where
    M: CalculatorModel,
    M::Metrics: MetricsDisplay,
{
    CalculatorReport {
        calculator: M::NAME,
        inputs: inputs.clone(),
        fields: field_views(model, inputs),
        metrics: metrics.clone(),
        display: metrics.display(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capacity::{CapacityCalculator, CapacityInputs};
    use crate::core::financing::{FinancingCalculator, FinancingInputs};

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(313_280.0), "313,280");
        assert_eq!(format_currency(50_000_000.0), "50,000,000");
        assert_eq!(format_currency(5_500.0), "5,500");
        assert_eq!(format_currency(999.0), "999");
        assert_eq!(format_currency(100_000.0), "100,000");
    }

    #[test]
    fn currency_rounds_half_away_from_zero() {
        assert_eq!(format_currency(999.5), "1,000");
        assert_eq!(format_currency(833_333.333), "833,333");
        assert_eq!(format_currency(-1_234.4), "-1,234");
        assert_eq!(format_currency(-1_234.5), "-1,235");
    }

    #[test]
    fn currency_never_prints_negative_zero() {
        assert_eq!(format_currency(0.4), "0");
        assert_eq!(format_currency(-0.4), "0");
        assert_eq!(format_currency(-0.0), "0");
    }

    #[test]
    fn percent_uses_two_decimals() {
        assert_eq!(format_percent(2.08), "2.08%");
        assert_eq!(format_percent(1.67), "1.67%");
        assert_eq!(format_percent(24.5), "24.50%");
        assert_eq!(format_percent(-5.83), "-5.83%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(-0.0), "0.00%");
        assert_eq!(format_percent(-0.001), "0.00%");
    }

    #[test]
    fn percent_rounds_exact_halves_away_from_zero() {
        assert_eq!(format_percent(2.125), "2.13%");
        assert_eq!(format_percent(0.375), "0.38%");
        assert_eq!(format_percent(1.125), "1.13%");
        assert_eq!(format_percent(0.625), "0.63%");
        assert_eq!(format_percent(-2.125), "-2.13%");
        // 1.005 is stored just below the halfway point.
        assert_eq!(format_percent(1.005), "1.00%");
        assert_eq!(format_percent(1.015), "1.01%");
    }

    #[test]
    fn effective_rate_on_a_halfway_value_rounds_up() {
        let model = FinancingCalculator::default();
        let inputs = FinancingInputs {
            monthly_revenue: 200_000.0,
            supplier_spend: 200_000.0,
            early_pay_discount_percent: 0.3,
            discount_window_days: 1,
            standard_terms_days: 30,
            repay_day: 25,
        };
        let metrics = model.derive(&inputs);
        assert_eq!(metrics.effective_rate_monthly, 2.125);
        assert_eq!(metrics.display().effective_rate_monthly, "2.13%");
    }

    #[test]
    fn field_values_render_by_style() {
        assert_eq!(
            format_field_value(DisplayStyle::Currency, 2_000_000.0),
            "$2,000,000"
        );
        assert_eq!(format_field_value(DisplayStyle::CurrencyOrZero, 0.0), "0");
        assert_eq!(
            format_field_value(DisplayStyle::CurrencyOrZero, 12_000.0),
            "$12,000"
        );
        assert_eq!(format_field_value(DisplayStyle::Percent, 1.0), "1%");
        assert_eq!(format_field_value(DisplayStyle::Percent, 1.5), "1.5%");
        assert_eq!(format_field_value(DisplayStyle::Plain, 10.0), "10");
    }

    #[test]
    fn field_views_report_effective_bounds_and_steps() {
        let model = FinancingCalculator::default();
        let views = field_views(&model, &FinancingInputs::default());
        let spend = views
            .iter()
            .find(|view| view.key == "supplierSpend")
            .expect("supplier spend view");
        assert_eq!(spend.max, 2_000_000.0);
        assert_eq!(spend.step, 10_000.0);
        assert_eq!(spend.display, "$1,000,000");

        let terms = views
            .iter()
            .find(|view| view.key == "standardTermsDays")
            .expect("standard terms view");
        assert_eq!(terms.min, 11.0);
        assert_eq!(terms.max, 120.0);
    }

    #[test]
    fn capacity_display_formats_cards() {
        let model = CapacityCalculator::default();
        let metrics = model.derive(&CapacityInputs::default());
        let display = metrics.display();
        assert_eq!(display.monthly_fee, "5,500");
        assert_eq!(display.annual_revenue, "391,680");
        assert_eq!(display.net_profit, "325,680");
    }

    #[test]
    fn financing_display_builds_comparison_table() {
        let model = FinancingCalculator::default();
        let display = model.derive(&FinancingInputs::default()).display();
        assert_eq!(display.paylater_line, "833,333");
        assert_eq!(display.normal_rate_monthly, "1.67%");
        assert_eq!(display.effective_rate_monthly, "1.07%");
        assert_eq!(display.net_saving_annual, "100,000");
        assert!(display.apply_enabled);
        assert_eq!(display.apply_label, "Start Apply");

        let products: Vec<&str> = display
            .comparison
            .iter()
            .map(|row| row.product.as_str())
            .collect();
        assert_eq!(
            products,
            ["Credit Card", "MCA", "Factoring", PAYLATER_PRODUCT_NAME]
        );
        assert_eq!(display.comparison[0].monthly_rate, "24.50%");
        assert_eq!(display.comparison[1].monthly_rate, "62.00%");
        assert_eq!(display.comparison[2].monthly_rate, "30.00%");
        // 1,000,000 * 0.0167 * 50/30
        assert_eq!(display.comparison[3].monthly_cost, "27,833");
    }

    #[test]
    fn financing_display_disables_apply_without_savings() {
        let model = FinancingCalculator::default();
        let inputs = FinancingInputs {
            repay_day: 10,
            ..FinancingInputs::default()
        };
        let display = model.derive(&inputs).display();
        assert!(!display.apply_enabled);
        assert_eq!(display.apply_label, "Enter Valid Data");
        assert_eq!(display.effective_rate_monthly, "0.00%");
    }

    #[test]
    fn report_serializes_camel_case_sections() {
        let model = FinancingCalculator::default();
        let inputs = FinancingInputs::default();
        let metrics = model.derive(&inputs);
        let report = build_report(&model, &inputs, &metrics);
        let json = serde_json::to_string(&report).expect("report should serialize");
        assert!(json.contains("\"calculator\":\"financing\""));
        assert!(json.contains("\"monthlyRevenue\""));
        assert!(json.contains("\"paylaterLine\""));
        assert!(json.contains("\"altCostMonthly\""));
        assert!(json.contains("\"applyEnabled\":true"));
    }
}
