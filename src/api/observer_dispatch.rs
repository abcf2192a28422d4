use tracing::trace;

use crate::extensions::ObserverContext;

use super::{ChartEvent, ScenarioChart};

impl ScenarioChart {
    pub(super) fn observer_context(&self) -> ObserverContext {
        ObserverContext {
            span: self.dataset.len(),
            original_len: self.dataset.original_len(),
            extension: self.dataset.extension(),
            dataset_version: self.dataset.version(),
            interaction_mode: self.editor.mode(),
        }
    }

    pub(super) fn emit_event(&mut self, event: ChartEvent) {
        if self.observers.is_empty() {
            return;
        }
        let context = self.observer_context();
        trace!(?event, observers = self.observers.len(), "dispatch chart event");
        for observer in &mut self.observers {
            observer.on_event(&event, context);
        }
    }
}
