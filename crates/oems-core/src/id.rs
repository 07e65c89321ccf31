//! Identity types for sorting network participants
//!
//! A participant's rank is assigned by the execution environment, never
//! chosen by the program. Rank 0 is always the root.
//!
//! Wiring entries reuse the root's identity with two unrelated meanings:
//! on the input side it names the root as the sender (scatter or the
//! root's own comparator step), on the output side it marks an edge that
//! terminates in the root's gather. The two meanings are kept apart as
//! [`Source::Root`] and [`Destination::Gather`].

use std::fmt;

/// Participant rank within one run
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rank(pub u32);

impl Rank {
    /// The coordinating participant
    pub const ROOT: Rank = Rank(0);

    #[inline]
    pub const fn new(rank: u32) -> Self {
        Rank(rank)
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self.0 == 0
    }

    /// Index into per-participant tables
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Rank(u32::from_le_bytes(bytes))
    }
}

impl From<usize> for Rank {
    fn from(index: usize) -> Self {
        Rank(index as u32)
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank({})", self.0)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input side of a wiring entry
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Source {
    /// Sent by the root, either from the scatter or from its own comparator
    Root,
    /// Sent by another comparator
    Comparator(Rank),
}

impl Source {
    /// Decode a raw table value, where 0 means the root
    #[inline]
    pub const fn from_raw(id: u32) -> Self {
        if id == 0 {
            Source::Root
        } else {
            Source::Comparator(Rank(id))
        }
    }

    /// The rank a receive must be posted against
    #[inline]
    pub fn rank(self) -> Rank {
        match self {
            Source::Root => Rank::ROOT,
            Source::Comparator(rank) => rank,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Root => write!(f, "root"),
            Source::Comparator(rank) => write!(f, "{}", rank),
        }
    }
}

/// Output side of a wiring entry
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Destination {
    /// Edge terminates at the root's final gather
    Gather,
    /// Forwarded to another comparator
    Comparator(Rank),
}

impl Destination {
    /// Decode a raw table value, where 0 means the gather
    #[inline]
    pub const fn from_raw(id: u32) -> Self {
        if id == 0 {
            Destination::Gather
        } else {
            Destination::Comparator(Rank(id))
        }
    }

    /// The rank a send must be addressed to
    #[inline]
    pub fn rank(self) -> Rank {
        match self {
            Destination::Gather => Rank::ROOT,
            Destination::Comparator(rank) => rank,
        }
    }

    #[inline]
    pub fn is_gather(self) -> bool {
        matches!(self, Destination::Gather)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Gather => write!(f, "gather"),
            Destination::Comparator(rank) => write!(f, "{}", rank),
        }
    }
}
