use tracing::trace;

use super::format::{MetricsDisplay, ReportFor, build_report};
use super::resolver::{SliderAction, apply_action, apply_change, bounds, normalize, step};
use super::types::{CalculatorModel, SliderRange};

/// One calculator widget: its current input set and the metrics derived
/// from it. Metrics are only recomputed when a change alters the input set.
#[derive(Debug, Clone)]
pub struct CalculatorSession<'a, M: CalculatorModel> {
    model: &'a M,
    inputs: M::Inputs,
    metrics: M::Metrics,
    derivations: u64,
}

impl<'a, M: CalculatorModel> CalculatorSession<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self::with_inputs(model, M::Inputs::default())
    }

    pub fn with_inputs(model: &'a M, inputs: M::Inputs) -> Self {
        let inputs = normalize(model, inputs);
        let metrics = model.derive(&inputs);
        Self {
            model,
            inputs,
            metrics,
            derivations: 1,
        }
    }

    pub fn inputs(&self) -> &M::Inputs {
        &self.inputs
    }

    pub fn metrics(&self) -> &M::Metrics {
        &self.metrics
    }

    pub fn derivations(&self) -> u64 {
        self.derivations
    }

    pub fn range(&self, field: M::Field) -> SliderRange {
        bounds(self.model, &self.inputs, field)
    }

    pub fn step(&self, field: M::Field) -> f64 {
        step(self.model, &self.inputs, field)
    }

    pub fn change(&mut self, field: M::Field, raw: f64) -> &M::Metrics {
        let next = apply_change(self.model, &self.inputs, field, raw);
        self.commit(next)
    }

    pub fn act(&mut self, field: M::Field, action: &SliderAction) -> &M::Metrics {
        let next = apply_action(self.model, &self.inputs, field, action);
        self.commit(next)
    }

    pub fn report(&self) -> ReportFor<M>
    where
        M::Metrics: MetricsDisplay,
    {
        build_report(self.model, &self.inputs, &self.metrics)
    }

    fn commit(&mut self, next: M::Inputs) -> &M::Metrics {
        if next == self.inputs {
            trace!(calculator = M::NAME, "input set unchanged, reusing metrics");
        } else {
            self.metrics = self.model.derive(&next);
            self.inputs = next;
            self.derivations += 1;
        }
        &self.metrics
    }
}
