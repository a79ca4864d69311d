//! Single-Threaded Reactive Channel
//!
//! This module implements the push-based dataflow primitive the rest of the
//! store is built on. A [`Channel`] is a named source that remembers its
//! latest value and delivers every push synchronously, on the producer's
//! call stack, to all current subscribers. Derived channels ([`Channel::map`],
//! [`Channel::filter_map`]) and the multi-source combinator ([`sync`]) are
//! thin subscription wrappers over the same mechanism.
//!
//! ## Delivery Model
//!
//! - Everything is single-threaded: channels are `Rc`-backed handles and the
//!   core never blocks or suspends.
//! - [`Channel::subscribe`] replays the channel's current value to the new
//!   subscriber before registering it, so late subscribers observe state
//!   that was pushed before they attached.
//! - A subscriber must not push back into the channel that is currently
//!   delivering to it; reentrant delivery on one channel is unsupported.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

type Subscriber<T> = Box<dyn FnMut(&T)>;

struct ChannelState<T> {
    name: String,
    last: Option<T>,
    subscribers: Vec<Subscriber<T>>,
}

/// A named, independently-addressable push source
///
/// Cloning a `Channel` clones the handle, not the state: every clone pushes
/// to and reads from the same subscriber list and latest value.
pub struct Channel<T> {
    state: Rc<RefCell<ChannelState<T>>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self { state: Rc::clone(&self.state) }
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Channel")
            .field("name", &state.name)
            .field("subscribers", &state.subscribers.len())
            .field("has_value", &state.last.is_some())
            .finish()
    }
}

impl<T: Clone + 'static> Channel<T> {
    /// Create a new channel with no value and no subscribers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ChannelState {
                name: name.into(),
                last: None,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Name this channel was created with
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    /// Latest pushed value, if the channel has fired at least once
    pub fn last(&self) -> Option<T> {
        self.state.borrow().last.clone()
    }

    /// Number of currently registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// True if both handles point at the same underlying channel
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Record `value` as the current value and deliver it to every
    /// subscriber, synchronously.
    ///
    /// Subscribers registered during delivery are retained but not invoked
    /// for the in-flight value.
    pub fn push(&self, value: T) {
        let mut delivery = {
            let mut state = self.state.borrow_mut();
            state.last = Some(value.clone());
            std::mem::take(&mut state.subscribers)
        };
        for subscriber in &mut delivery {
            subscriber(&value);
        }
        // Merge back any subscribers that attached while we were delivering.
        let mut state = self.state.borrow_mut();
        let added = std::mem::take(&mut state.subscribers);
        state.subscribers = delivery;
        state.subscribers.extend(added);
    }

    /// Register a subscriber, replaying the current value first if the
    /// channel has one. This is what lets a query wired after insertions
    /// surface the already-present result instead of waiting for the next
    /// push.
    pub fn subscribe(&self, f: impl FnMut(&T) + 'static) {
        let mut f = f;
        if let Some(current) = self.last() {
            f(&current);
        }
        self.state.borrow_mut().subscribers.push(Box::new(f));
    }

    /// Register a subscriber for future pushes only (no replay)
    pub fn observe(&self, f: impl FnMut(&T) + 'static) {
        self.state.borrow_mut().subscribers.push(Box::new(f));
    }

    /// Derived channel carrying `f` applied to every delivered value
    pub fn map<U: Clone + 'static>(
        &self,
        name: impl Into<String>,
        mut f: impl FnMut(&T) -> U + 'static,
    ) -> Channel<U> {
        let derived = Channel::new(name);
        let downstream = derived.clone();
        self.subscribe(move |value| downstream.push(f(value)));
        derived
    }

    /// Derived channel carrying only the values `f` maps to `Some`
    pub fn filter_map<U: Clone + 'static>(
        &self,
        name: impl Into<String>,
        mut f: impl FnMut(&T) -> Option<U> + 'static,
    ) -> Channel<U> {
        let derived = Channel::new(name);
        let downstream = derived.clone();
        self.subscribe(move |value| {
            if let Some(mapped) = f(value) {
                downstream.push(mapped);
            }
        });
        derived
    }
}

/// Combine multiple upstream channels with a synchronizing reducer.
///
/// On every upstream push the reducer sees the latest known value from each
/// source (`None` for sources that have not fired yet) and decides what, if
/// anything, to emit downstream: `Some(update)` is pushed, `None` suppresses
/// the update. Because the reducer always works from latest-per-source
/// state, recombination is order-independent across the sources.
///
/// With `reset_on_subscribe` the wiring subscriptions replay each source's
/// current value, seeding the combined channel from state that existed
/// before it was built.
pub fn sync<T, U, F>(
    name: impl Into<String>,
    sources: &[Channel<T>],
    reduce: F,
    reset_on_subscribe: bool,
) -> Channel<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
    F: FnMut(&[Option<T>]) -> Option<U> + 'static,
{
    let combined: Channel<U> = Channel::new(name);
    debug!(
        name = %combined.name(),
        sources = sources.len(),
        reset_on_subscribe,
        "wiring sync combinator"
    );
    let latest: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new(vec![None; sources.len()]));
    let reduce = Rc::new(RefCell::new(reduce));

    for (slot, source) in sources.iter().enumerate() {
        let latest = Rc::clone(&latest);
        let reduce = Rc::clone(&reduce);
        let downstream = combined.clone();
        let deliver = move |value: &T| {
            latest.borrow_mut()[slot] = Some(value.clone());
            let reduced = {
                let slots = latest.borrow();
                let mut reduce = reduce.borrow_mut();
                (*reduce)(slots.as_slice())
            };
            if let Some(update) = reduced {
                downstream.push(update);
            }
        };
        if reset_on_subscribe {
            source.subscribe(deliver);
        } else {
            source.observe(deliver);
        }
    }
    combined
}
