//! Events module - cross-view publish/subscribe channel.
//!
//! The map view publishes country hover events; the bar chart subscribes and
//! re-selects its country filter. Neither view holds a reference to the
//! other. Dispatch is synchronous on the calling thread: `publish` returns
//! only after every subscriber has run, in registration order.

use crate::data::CountryKey;

/// The one event kind exchanged between views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// Pointer entered a country bubble on the map.
    CountryHighlighted(CountryKey),
    /// Pointer left the map's bubbles.
    HighlightReset,
}

type Subscriber = Box<dyn FnMut(&MapEvent)>;

/// Single-session broadcast channel over [`MapEvent`]. One subscriber today,
/// any number supported.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Subscribers stay registered for the session.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&MapEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Broadcast an event to every subscriber, synchronously.
    pub fn publish(&mut self, event: &MapEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn highlight_updates_subscriber_state_before_publish_returns() {
        let selected = Rc::new(RefCell::new(String::new()));
        let mut bus = EventBus::new();

        let state = Rc::clone(&selected);
        bus.subscribe(move |event| {
            if let MapEvent::CountryHighlighted(key) = event {
                *state.borrow_mut() = key.to_string();
            }
        });

        bus.publish(&MapEvent::CountryHighlighted(CountryKey::from_raw("Brazil")));
        assert_eq!(*selected.borrow(), "brazil");
    }

    #[test]
    fn dispatch_reaches_all_subscribers_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for i in 0..3 {
            let log = Rc::clone(&log);
            bus.subscribe(move |_| log.borrow_mut().push(i));
        }

        bus.publish(&MapEvent::HighlightReset);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(bus.subscriber_count(), 3);
    }

    #[test]
    fn publish_with_no_subscribers_is_a_no_op() {
        let mut bus = EventBus::new();
        bus.publish(&MapEvent::HighlightReset);
    }
}
