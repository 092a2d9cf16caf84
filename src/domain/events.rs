use crate::domain::market_data::Candle;
use std::fmt::Debug;

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
}

/// Events related to chart interaction
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// Pointer released over a highlighted candle.
    CandleSelected { index: usize, candle: Candle },
    ViewportChanged { candle_width: f64, start_offset: f64 },
    HighlightCleared,
}

impl DomainEvent for ChartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ChartEvent::CandleSelected { .. } => "CandleSelected",
            ChartEvent::ViewportChanged { .. } => "ViewportChanged",
            ChartEvent::HighlightCleared => "HighlightCleared",
        }
    }
}

/// Event dispatcher for publishing events
pub trait EventDispatcher {
    fn publish_chart_event(&self, event: ChartEvent);
}

/// Simple in-memory event dispatcher
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    chart_handlers: Vec<Box<dyn Fn(&ChartEvent)>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_to_chart_events<F>(&mut self, handler: F)
    where
        F: Fn(&ChartEvent) + 'static,
    {
        self.chart_handlers.push(Box::new(handler));
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish_chart_event(&self, event: ChartEvent) {
        for handler in &self.chart_handlers {
            handler(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_receive_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = InMemoryEventDispatcher::new();
        let sink = Rc::clone(&seen);
        dispatcher.subscribe_to_chart_events(move |e| sink.borrow_mut().push(e.event_type()));

        dispatcher.publish_chart_event(ChartEvent::HighlightCleared);
        dispatcher.publish_chart_event(ChartEvent::ViewportChanged { candle_width: 5.0, start_offset: 0.0 });

        assert_eq!(*seen.borrow(), vec!["HighlightCleared", "ViewportChanged"]);
    }
}
