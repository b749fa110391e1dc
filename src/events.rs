use std::collections::HashMap;

use crate::dom::NodeId;

/// What a listener does when its event fires. Listeners are data, so the store can
/// compare, dedupe and drop them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    /// Logs `Navigating to: <href>` for the current target.
    LogNavigation,
    /// Checks required fields of the form and blocks the submit when any is empty.
    ValidateRequired,
    /// Keeps only digits, up to the configured limit.
    FilterPhone,
    /// Clamps a numeric input into its `min`/`max` range.
    ClampQuantity,
    /// Moves the `active` class to the clicked link within `group`.
    ActivateLanguage { group: Vec<NodeId> },
    /// Writes a fixed line to the page console.
    Log(String),
    /// Cancels the event's default action.
    PreventDefault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) handler: Handler,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    /// Registers a listener unless an identical one is already present, matching
    /// `addEventListener` semantics. Returns whether it was added.
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, listener: Listener) -> bool {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default();
        if listeners.contains(&listener) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Makes `listener` the only listener on `node_id`, for every event type. Returns
    /// how many previous listeners were dropped.
    pub(crate) fn take_ownership(
        &mut self,
        node_id: NodeId,
        event: &str,
        listener: Listener,
    ) -> usize {
        let dropped = self
            .map
            .remove(&node_id)
            .map(|events| {
                events
                    .into_iter()
                    .map(|(name, listeners)| {
                        listeners
                            .iter()
                            .filter(|existing| !(name == event && **existing == listener))
                            .count()
                    })
                    .sum()
            })
            .unwrap_or(0);
        self.add(node_id, event, listener);
        dropped
    }

    /// Drops every listener on `node_id`. Returns how many were dropped.
    pub(crate) fn clear_node(&mut self, node_id: NodeId) -> usize {
        self.map
            .remove(&node_id)
            .map_or(0, |events| events.values().map(Vec::len).sum())
    }

    pub(crate) fn remove(&mut self, node_id: NodeId, event: &str, listener: &Listener) -> bool {
        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };
        let Some(pos) = listeners.iter().position(|existing| existing == listener) else {
            return false;
        };
        listeners.remove(pos);
        if listeners.is_empty() {
            events.remove(event);
        }
        if events.is_empty() {
            self.map.remove(&node_id);
        }
        true
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }

    pub(crate) fn total(&self) -> usize {
        self.map
            .values()
            .flat_map(|events| events.values())
            .map(Vec::len)
            .sum()
    }

    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.total();
        self.map.clear();
        dropped
    }
}

/// Outcome of a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventState {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    pub default_prevented: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            default_prevented: false,
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}
