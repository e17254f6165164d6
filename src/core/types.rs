use std::fmt::Debug;

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Bound<F> {
    Fixed(f64),
    /// The current value of another field plus `offset`. The referenced field
    /// must be declared earlier in the same field table.
    Linked { field: F, offset: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepRule {
    Fixed(f64),
    RevenueScaled,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DisplayStyle {
    Currency,
    /// Currency, except that zero renders as a bare "0".
    CurrencyOrZero,
    Percent,
    Plain,
}

#[derive(Copy, Clone, Debug)]
pub struct FieldSpec<F: 'static> {
    pub id: F,
    pub key: &'static str,
    pub label: &'static str,
    pub min: Bound<F>,
    pub max: Bound<F>,
    pub step: StepRule,
    pub decimals: u8,
    pub display: DisplayStyle,
    pub default: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
}

impl SliderRange {
    pub fn clamp(self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub trait CalculatorModel {
    type Field: Copy + Eq + Debug + 'static;
    type Inputs: Clone + Debug + PartialEq + Default + Serialize;
    type Metrics: Clone + Debug + PartialEq + Serialize;

    const NAME: &'static str;

    /// Field table in resolution order.
    fn fields(&self) -> &'static [FieldSpec<Self::Field>];

    fn spec(&self, field: Self::Field) -> &'static FieldSpec<Self::Field>;

    fn value(inputs: &Self::Inputs, field: Self::Field) -> f64;

    // No range checks; integer fields round.
    fn set_value(inputs: &mut Self::Inputs, field: Self::Field, value: f64);

    fn derive(&self, inputs: &Self::Inputs) -> Self::Metrics;

    fn field_by_key(&self, key: &str) -> Option<Self::Field> {
        self.fields()
            .iter()
            .find(|spec| spec.key == key)
            .map(|spec| spec.id)
    }
}
