use std::collections::TryReserveError;

/// Errors reported by the location-based operations of a [`Map`](crate::Map).
///
/// Lookups never fail; a missing key is reported through `None`, a zero count, or a cursor at
/// [`Map::end`](crate::Map::end).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The handle refers to one of the map's boundaries rather than an entry.
    #[error("handle refers to a boundary position, not an entry")]
    Boundary,
    /// The handle refers to an entry that has since been removed.
    #[error("handle refers to an entry that has been removed")]
    Stale,
    /// The start of a range is ordered after its end.
    #[error("range start is ordered after range end")]
    InvertedRange,
    /// Node storage could not be reserved.
    #[error("failed to reserve node storage: {0}")]
    Alloc(#[from] TryReserveError),
}
