//! Persistent page cache
//!
//! Landing pages are cached by target identifier so that re-runs only hit
//! the network for targets that have never been fetched successfully.
//!
//! # Entry States
//!
//! | State | On disk | Meaning |
//! |-------|---------|---------|
//! | Miss | nothing | Never fetched, or every fetch failed |
//! | Writing | `.<uuid>.tmp` | In progress or crashed; ignored by lookups |
//! | Complete | `<id>.html` | Full payload of a successful fetch |

pub mod store;

pub use store::{CacheStats, PageCache};
