// ── Query cache subsystem ──
//
// Keyed, de-duplicated, pollable remote reads with stale-while-revalidate
// semantics and invalidation hooks for mutations.

mod cache;
mod entry;
mod key;
mod state;
mod subscription;

pub use cache::{Invalidation, QueryCache};
pub use key::{ParamValue, QueryKey, ResourceKind};
pub use state::{QueryState, QueryStatus};
pub use subscription::{QueryOptions, Subscription, SubscriptionStream};
