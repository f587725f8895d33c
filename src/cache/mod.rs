//! Caches
//!
//! In-process stores with a time-to-live. Both are constructed by the caller
//! and handed to the components that use them; nothing here is global.

pub mod clock;
pub mod query_cache;
pub mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use query_cache::{CacheStats, CachedQuery, QueryCache};
pub use ttl::TtlCache;
