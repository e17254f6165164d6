use tracing::debug;

use super::types::{Bound, CalculatorModel, SliderRange, StepRule};

const SMALL_RANGE_LIMIT: f64 = 1_000_000.0;
const SMALL_RANGE_STEP: f64 = 1_000.0;
const SCALED_STEP_FRACTION: f64 = 0.005;
const SCALED_STEP_ROUNDING: f64 = 1_000.0;
const SCALED_STEP_FLOOR: f64 = 10_000.0;
const COARSE_STEP_MULTIPLIER: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub enum SliderAction {
    Set(f64),
    Increase,
    Decrease,
    /// Ten steps at once.
    IncreaseCoarse,
    DecreaseCoarse,
    /// Free-text edit of the value badge.
    Entry(String),
}

/// Step size for a currency slider whose range tops out at `range_max`.
pub fn revenue_step(range_max: f64) -> f64 {
    if range_max < SMALL_RANGE_LIMIT {
        return SMALL_RANGE_STEP;
    }
    let scaled =
        (range_max * SCALED_STEP_FRACTION / SCALED_STEP_ROUNDING).ceil() * SCALED_STEP_ROUNDING;
    scaled.max(SCALED_STEP_FLOOR)
}

pub fn bounds<M: CalculatorModel>(model: &M, inputs: &M::Inputs, field: M::Field) -> SliderRange {
    let spec = model.spec(field);
    let min = resolve_bound::<M>(inputs, spec.min);
    let max = resolve_bound::<M>(inputs, spec.max);
    SliderRange {
        min: min.min(max),
        max,
    }
}

pub fn step<M: CalculatorModel>(model: &M, inputs: &M::Inputs, field: M::Field) -> f64 {
    match model.spec(field).step {
        StepRule::Fixed(step) => step,
        StepRule::RevenueScaled => revenue_step(bounds(model, inputs, field).max),
    }
}

/// Clamps every field into its effective range, walking the field table in
/// order so linked bounds always see already-resolved values.
pub fn normalize<M: CalculatorModel>(model: &M, mut inputs: M::Inputs) -> M::Inputs {
    for spec in model.fields() {
        let range = bounds(model, &inputs, spec.id);
        let current = M::value(&inputs, spec.id);
        let resolved = if current.is_finite() {
            range.clamp(snap(current, spec.decimals))
        } else {
            range.clamp(spec.default)
        };
        if resolved != current {
            debug!(
                calculator = M::NAME,
                field = spec.key,
                from = current,
                to = resolved,
                "adjusted input to its range"
            );
            M::set_value(&mut inputs, spec.id, resolved);
        }
    }
    inputs
}

/// Stores `raw` into `field` and restores every cross-field constraint.
///
/// A non-finite `raw` leaves the field at its current value.
pub fn apply_change<M: CalculatorModel>(
    model: &M,
    inputs: &M::Inputs,
    field: M::Field,
    raw: f64,
) -> M::Inputs {
    let mut next = normalize(model, inputs.clone());
    if raw.is_finite() {
        let spec = model.spec(field);
        let range = bounds(model, &next, field);
        M::set_value(&mut next, field, range.clamp(snap(raw, spec.decimals)));
    }
    normalize(model, next)
}

pub fn apply_action<M: CalculatorModel>(
    model: &M,
    inputs: &M::Inputs,
    field: M::Field,
    action: &SliderAction,
) -> M::Inputs {
    let current = normalize(model, inputs.clone());
    let value = M::value(&current, field);
    let step = step(model, &current, field);
    let raw = match action {
        SliderAction::Set(value) => *value,
        SliderAction::Increase => value + step,
        SliderAction::Decrease => value - step,
        SliderAction::IncreaseCoarse => value + step * COARSE_STEP_MULTIPLIER,
        SliderAction::DecreaseCoarse => value - step * COARSE_STEP_MULTIPLIER,
        SliderAction::Entry(text) => parse_entry(text).unwrap_or(value),
    };
    apply_change(model, &current, field, raw)
}

/// Parses badge text such as "$1,250,000" or "2.5%".
pub fn parse_entry(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn resolve_bound<M: CalculatorModel>(inputs: &M::Inputs, bound: Bound<M::Field>) -> f64 {
    match bound {
        Bound::Fixed(value) => value,
        Bound::Linked { field, offset } => M::value(inputs, field) + offset,
    }
}

fn snap(value: f64, decimals: u8) -> f64 {
    let scale = 10f64.powi(i32::from(decimals));
    (value * scale).round() / scale
}
