//! Keyed cache of API reads shared by every view in the process.

mod cache;
mod key;
mod observer;

pub use cache::{QueryClient, QueryState, QueryStatus};
pub use key::QueryKey;
pub use observer::QueryObserver;
