use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

static NEXT_CID: AtomicU32 = AtomicU32::new(0);
static NEXT_UID: AtomicU64 = AtomicU64::new(0);

/// Constructor identifier.
///
/// Allocated from one process-wide counter, so no two constructors share a
/// cid even when they descend from different roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid(pub u32);

impl Cid {
	pub fn next() -> Self {
		Self(NEXT_CID.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for Cid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "cid:{}", self.0)
	}
}

/// Instance identifier, unique across every root in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(pub u64);

impl Uid {
	pub fn next() -> Self {
		Self(NEXT_UID.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for Uid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "uid:{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ids_are_never_reused() {
		let (a, b) = (Cid::next(), Cid::next());
		assert!(a < b);
		let (x, y) = (Uid::next(), Uid::next());
		assert!(x < y);
	}
}
