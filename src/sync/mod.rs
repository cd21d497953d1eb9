//! In-process synchronization primitives.
//!
//! - [`RecursiveMutex`]: a mutual-exclusion lock the owning thread may re-enter
//! - [`Event`]: a waitable binary signal with manual- or auto-reset behaviour
//!
//! Both block native OS threads. Neither supports cancellation; a timed
//! [`Event::wait`] is the only way to bound how long a caller blocks.

mod event;
mod mutex;

pub use event::{Event, ResetMode};
pub use mutex::{RecursiveMutex, RecursiveMutexGuard};
