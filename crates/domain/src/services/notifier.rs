//! Realtime change notifier.
//!
//! An in-process hub that fans out row-change signals to subscribers.
//! Events carry no payload beyond the table and proposal identity; a
//! subscriber re-fetches authoritative state itself. Any transport
//! (websocket push, polling bridge) can sit behind this interface
//! without leaking its semantics into calling code.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

/// Tables whose row mutations are observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTable {
    Proposals,
    ProposalSections,
    ProposalItems,
}

impl ChangeTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposals => "proposals",
            Self::ProposalSections => "proposal_sections",
            Self::ProposalItems => "proposal_items",
        }
    }
}

/// Kind of row mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A "changed" signal, not a diff. Subscribers re-fetch what they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub proposal_id: Uuid,
    pub user_id: Uuid,
}

/// What a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionScope {
    /// Changes to one proposal (and its sections/items).
    Proposal(Uuid),
    /// Changes to all proposals owned by a user.
    User(Uuid),
}

impl SubscriptionScope {
    fn matches(&self, event: &ChangeEvent) -> bool {
        match self {
            Self::Proposal(id) => event.proposal_id == *id,
            Self::User(id) => event.user_id == *id,
        }
    }
}

type Callback = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Subscriber {
    scope: SubscriptionScope,
    callback: Callback,
}

/// Fan-out hub for change events. Cheap to clone; clones share the same
/// subscriber registry.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Arc<NotifierInner>,
}

#[derive(Default)]
struct NotifierInner {
    subscribers: RwLock<HashMap<u64, Subscriber>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for events matching `scope`. Independent
    /// subscriptions on the same scope coexist; each handle cancels only
    /// itself.
    pub fn subscribe<F>(&self, scope: SubscriptionScope, callback: F) -> SubscriptionHandle
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Subscriber {
            scope,
            callback: Box::new(callback),
        };
        self.inner
            .subscribers
            .write()
            .expect("notifier registry poisoned")
            .insert(id, subscriber);

        tracing::debug!(subscription_id = id, scope = ?scope, "Change subscription registered");

        SubscriptionHandle {
            id,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Deliver an event to every matching subscriber. Delivery holds the
    /// registry read lock, so a concurrent `cancel` blocks until the
    /// fan-out completes; once `cancel` returns, no further delivery.
    pub fn publish(&self, event: ChangeEvent) {
        let subscribers = self
            .inner
            .subscribers
            .read()
            .expect("notifier registry poisoned");

        let mut delivered = 0usize;
        for subscriber in subscribers.values() {
            if subscriber.scope.matches(&event) {
                (subscriber.callback)(&event);
                delivered += 1;
            }
        }

        tracing::trace!(
            table = event.table.as_str(),
            proposal_id = %event.proposal_id,
            delivered,
            "Change event published"
        );
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .expect("notifier registry poisoned")
            .len()
    }
}

/// Cancellation handle for one subscription.
pub struct SubscriptionHandle {
    id: u64,
    inner: Arc<NotifierInner>,
}

impl SubscriptionHandle {
    /// Stop delivery for this subscription. Idempotent; siblings on the
    /// same scope are unaffected.
    pub fn cancel(&self) {
        self.inner
            .subscribers
            .write()
            .expect("notifier registry poisoned")
            .remove(&self.id);
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn event_for(proposal_id: Uuid, user_id: Uuid) -> ChangeEvent {
        ChangeEvent {
            table: ChangeTable::Proposals,
            kind: ChangeKind::Update,
            proposal_id,
            user_id,
        }
    }

    #[test]
    fn test_subscribe_and_publish() {
        let notifier = ChangeNotifier::new();
        let proposal_id = Uuid::new_v4();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let _handle = notifier.subscribe(SubscriptionScope::Proposal(proposal_id), move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish(event_for(proposal_id, Uuid::new_v4()));
        notifier.publish(event_for(proposal_id, Uuid::new_v4()));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scope_filtering() {
        let notifier = ChangeNotifier::new();
        let watched = Uuid::new_v4();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let _handle = notifier.subscribe(SubscriptionScope::Proposal(watched), move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish(event_for(Uuid::new_v4(), Uuid::new_v4()));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        notifier.publish(event_for(watched, Uuid::new_v4()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_user_scope_spans_proposals() {
        let notifier = ChangeNotifier::new();
        let user_id = Uuid::new_v4();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let _handle = notifier.subscribe(SubscriptionScope::User(user_id), move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish(event_for(Uuid::new_v4(), user_id));
        notifier.publish(event_for(Uuid::new_v4(), user_id));
        notifier.publish(event_for(Uuid::new_v4(), Uuid::new_v4()));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cancel_stops_delivery() {
        let notifier = ChangeNotifier::new();
        let proposal_id = Uuid::new_v4();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let handle = notifier.subscribe(SubscriptionScope::Proposal(proposal_id), move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish(event_for(proposal_id, Uuid::new_v4()));
        handle.cancel();
        notifier.publish(event_for(proposal_id, Uuid::new_v4()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_leaves_siblings_intact() {
        let notifier = ChangeNotifier::new();
        let proposal_id = Uuid::new_v4();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_clone = Arc::clone(&first);
        let first_handle = notifier.subscribe(SubscriptionScope::Proposal(proposal_id), move |_| {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });
        let second_clone = Arc::clone(&second);
        let _second_handle =
            notifier.subscribe(SubscriptionScope::Proposal(proposal_id), move |_| {
                second_clone.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(notifier.subscription_count(), 2);

        first_handle.cancel();
        notifier.publish(event_for(proposal_id, Uuid::new_v4()));

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.subscription_count(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let notifier = ChangeNotifier::new();
        let handle = notifier.subscribe(SubscriptionScope::User(Uuid::new_v4()), |_| {});
        handle.cancel();
        handle.cancel();
        assert_eq!(notifier.subscription_count(), 0);
    }

    #[test]
    fn test_drop_cancels() {
        let notifier = ChangeNotifier::new();
        {
            let _handle = notifier.subscribe(SubscriptionScope::User(Uuid::new_v4()), |_| {});
            assert_eq!(notifier.subscription_count(), 1);
        }
        assert_eq!(notifier.subscription_count(), 0);
    }
}
