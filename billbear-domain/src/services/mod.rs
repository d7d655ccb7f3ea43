pub mod allocator;
pub mod largest_remainder;

pub use allocator::{AllocationError, Allocator, SelectionIssue, allocate};
pub use largest_remainder::{ApportionError, apportion, stable_key};
