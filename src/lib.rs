//! An ordered map based on a binary search tree threaded with boundary sentinels.
//!
//! [`Map`] keeps its entries sorted by a [`Compare`](compare::Compare) implementation chosen at
//! construction. Besides the usual map operations it exposes bidirectional [`Cursor`]s that can
//! rest on either boundary of the map, and [`Handle`]s: positions that outlive borrows of the map
//! and are checked for staleness when they are used.
//!
//! # Examples
//!
//! ```
//! let mut map = ordtree::Map::new();
//!
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     map.insert(key, key * 10);
//! }
//!
//! assert_eq!(map.lower_bound(&4).key(), Some(&4));
//! assert_eq!(map.upper_bound(&4).key(), Some(&5));
//!
//! assert_eq!(map.erase(&5), 1);
//! assert_eq!(map.iter().map(|e| *e.0).collect::<Vec<_>>(), [1, 3, 4, 7, 8, 9]);
//! ```

pub use error::Error;
pub use map::{Cursor, CursorMut, Handle, Map};

mod error;
mod node;
#[cfg(feature = "ordered_iter")]
mod ordered_iter;
#[cfg(feature = "quickcheck")]
mod quickcheck;

pub mod map;
