//! Domain services.

pub mod notifier;
pub mod status;

pub use notifier::{
    ChangeEvent, ChangeKind, ChangeNotifier, ChangeTable, SubscriptionHandle, SubscriptionScope,
};
pub use status::{next_status, StatusEvent, TransitionError};
