//! Filter Value Store
//!
//! Holds the current filter values of one table view. A store is either
//! controlled (a parent owns the values and every write is handed to it) or
//! uncontrolled (the store owns the values).

use std::sync::Arc;

use crate::values::{FilterValue, FilterValues};

/// Receives proposed filter values in controlled mode
pub trait FilterChangeHandler: Send + Sync {
    fn on_filter_change(&self, values: &FilterValues);
}

impl<F> FilterChangeHandler for F
where
    F: Fn(&FilterValues) + Send + Sync,
{
    fn on_filter_change(&self, values: &FilterValues) {
        self(values)
    }
}

pub enum FilterValueStore {
    /// Values owned by a parent; the store mirrors what the parent last pushed
    Controlled {
        values: FilterValues,
        handler: Arc<dyn FilterChangeHandler>,
    },
    /// Values owned by the store
    Uncontrolled { values: FilterValues },
}

impl std::fmt::Debug for FilterValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Controlled { values, .. } => f
                .debug_struct("Controlled")
                .field("values", values)
                .finish_non_exhaustive(),
            Self::Uncontrolled { values } => f
                .debug_struct("Uncontrolled")
                .field("values", values)
                .finish(),
        }
    }
}

impl FilterValueStore {
    pub fn controlled(values: FilterValues, handler: Arc<dyn FilterChangeHandler>) -> Self {
        Self::Controlled { values, handler }
    }

    pub fn uncontrolled(initial: FilterValues) -> Self {
        Self::Uncontrolled { values: initial }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self, Self::Controlled { .. })
    }

    /// Values the table currently filters by
    pub fn values(&self) -> &FilterValues {
        match self {
            Self::Controlled { values, .. } | Self::Uncontrolled { values } => values,
        }
    }

    /// Propose a complete set of values.
    ///
    /// Uncontrolled stores adopt them and return whether anything changed.
    /// Controlled stores pass them to the parent and return false; the values
    /// only change once the parent pushes them back with
    /// [`FilterValueStore::receive`].
    pub fn update(&mut self, next: FilterValues) -> bool {
        match self {
            Self::Controlled { handler, .. } => {
                handler.on_filter_change(&next);
                false
            }
            Self::Uncontrolled { values } => {
                if *values == next {
                    false
                } else {
                    *values = next;
                    true
                }
            }
        }
    }

    /// Propose a new value for one filter, `None` to clear it
    pub fn set_filter(&mut self, id: &str, value: Option<FilterValue>) -> bool {
        let mut next = self.values().clone();
        if !next.set(id, value) {
            return false;
        }
        self.update(next)
    }

    /// Propose clearing every filter
    pub fn clear(&mut self) -> bool {
        if self.values().is_empty() {
            return false;
        }
        self.update(FilterValues::new())
    }

    /// Adopt values pushed down by the parent of a controlled store.
    /// Uncontrolled stores ignore this and return false.
    pub fn receive(&mut self, pushed: FilterValues) -> bool {
        match self {
            Self::Controlled { values, .. } => {
                if *values == pushed {
                    false
                } else {
                    *values = pushed;
                    true
                }
            }
            Self::Uncontrolled { .. } => {
                tracing::debug!("ignoring pushed filter values for an uncontrolled store");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Parent that records proposals and decides what to adopt
    #[derive(Default)]
    struct Parent {
        proposals: Mutex<Vec<FilterValues>>,
    }

    impl FilterChangeHandler for Parent {
        fn on_filter_change(&self, values: &FilterValues) {
            self.proposals.lock().push(values.clone());
        }
    }

    #[test]
    fn test_uncontrolled_store_owns_values() {
        let mut store = FilterValueStore::uncontrolled(FilterValues::new());
        assert!(!store.is_controlled());

        assert!(store.set_filter("businessKey", Some("order-1".into())));
        assert!(!store.set_filter("businessKey", Some("order-1".into())));
        assert_eq!(
            store.values().get("businessKey").and_then(|v| v.as_text()),
            Some("order-1")
        );

        assert!(!store.receive(FilterValues::new().with("businessKey", "pushed")));
        assert!(store.clear());
        assert!(store.values().is_empty());
    }

    #[test]
    fn test_controlled_store_never_diverges_from_parent() {
        let parent = Arc::new(Parent::default());
        let adopted = FilterValues::new().with("state", "ACTIVE");
        let mut store = FilterValueStore::controlled(adopted.clone(), parent.clone());
        let mut last_adopted = adopted;

        let edits = [
            ("businessKey", Some(FilterValue::text("order-1"))),
            ("state", None),
            ("businessKey", Some(FilterValue::text("order-2"))),
        ];

        for (round, (id, value)) in edits.into_iter().enumerate() {
            assert!(!store.set_filter(id, value));
            assert_eq!(store.values(), &last_adopted);

            // The parent adopts every other proposal
            let proposal = parent.proposals.lock().last().cloned().unwrap();
            if round % 2 == 0 {
                store.receive(proposal.clone());
                last_adopted = proposal;
            }
            assert_eq!(store.values(), &last_adopted);
        }

        assert_eq!(parent.proposals.lock().len(), 3);
    }

    #[test]
    fn test_controlled_store_with_closure_handler() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let mut store = FilterValueStore::controlled(
            FilterValues::new(),
            Arc::new(move |values: &FilterValues| *sink.lock() = Some(values.clone())),
        );

        store.set_filter("businessKey", Some("order-1".into()));
        assert!(store.values().is_empty());
        assert_eq!(
            seen.lock().as_ref().and_then(|v| v.get("businessKey").cloned()),
            Some(FilterValue::text("order-1"))
        );
    }
}
