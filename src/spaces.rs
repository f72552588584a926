//! Action space description and scalar action values.
//!
//! The policy selects two sequentially-dependent discrete actions per step:
//! a1 is chosen from the context encoding, a2 is chosen conditioned on the
//! realized a1. The action space is therefore always a tuple of exactly two
//! discrete slots; anything else is rejected when the model is constructed.

use std::fmt;

// ============================================================================
// ActionSpace Description
// ============================================================================

/// Declarative description of an action space.
///
/// Mirrors the shape of the space handed to the training engine. The model
/// only accepts `Tuple([Discrete, Discrete])`; the slots may have equal or
/// independent cardinalities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSpace {
    /// A single discrete choice with `n` actions.
    Discrete { n: usize },
    /// An ordered tuple of sub-spaces.
    Tuple(Vec<ActionSpace>),
}

impl ActionSpace {
    /// Convenience constructor for the canonical two-slot space with equal
    /// cardinality.
    pub fn pair(n: usize) -> Self {
        ActionSpace::Tuple(vec![
            ActionSpace::Discrete { n },
            ActionSpace::Discrete { n },
        ])
    }
}

/// Error produced when an action space cannot back the autoregressive model.
///
/// This is a fatal configuration error: there is no retry, the model
/// constructor refuses the space outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// The space is not a tuple of discrete slots.
    NotATuple,
    /// The tuple does not contain exactly two slots.
    WrongSlotCount { found: usize },
    /// A slot is not discrete, or is discrete with zero actions.
    InvalidSlot { index: usize },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceError::NotATuple => {
                write!(f, "action space must be a tuple of two discrete slots")
            }
            SpaceError::WrongSlotCount { found } => {
                write!(f, "action space must have exactly 2 slots, found {}", found)
            }
            SpaceError::InvalidSlot { index } => {
                write!(f, "slot {} must be discrete with at least one action", index)
            }
        }
    }
}

impl std::error::Error for SpaceError {}

// ============================================================================
// ActionSlots
// ============================================================================

/// Cardinalities of the two discrete action slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSlots {
    /// Number of discrete actions in the first slot.
    pub a1: usize,
    /// Number of discrete actions in the second slot.
    pub a2: usize,
}

impl ActionSlots {
    /// Create slots with explicit cardinalities.
    pub fn new(a1: usize, a2: usize) -> Self {
        Self { a1, a2 }
    }

    /// Extract slots from an [`ActionSpace`], validating its shape.
    pub fn from_space(space: &ActionSpace) -> Result<Self, SpaceError> {
        let slots = match space {
            ActionSpace::Tuple(slots) => slots,
            ActionSpace::Discrete { .. } => return Err(SpaceError::NotATuple),
        };

        if slots.len() != 2 {
            return Err(SpaceError::WrongSlotCount { found: slots.len() });
        }

        let mut ns = [0usize; 2];
        for (index, slot) in slots.iter().enumerate() {
            match slot {
                ActionSpace::Discrete { n } if *n > 0 => ns[index] = *n,
                _ => return Err(SpaceError::InvalidSlot { index }),
            }
        }

        Ok(Self { a1: ns[0], a2: ns[1] })
    }
}

// ============================================================================
// ActionPair
// ============================================================================

/// Realized action pair for one decision step.
///
/// Stored as raw indices; the float round-trip exists for buffer and
/// environment interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPair {
    /// First-slot action index.
    pub a1: u32,
    /// Second-slot action index (conditioned on `a1`).
    pub a2: u32,
}

impl ActionPair {
    /// Create an action pair.
    pub fn new(a1: u32, a2: u32) -> Self {
        Self { a1, a2 }
    }

    /// Number of floats needed to represent this pair.
    pub fn size() -> usize {
        2
    }

    /// Convert to floats for environment stepping and storage.
    pub fn as_floats(&self) -> [f32; 2] {
        [self.a1 as f32, self.a2 as f32]
    }

    /// Create from a raw float slice (buffer retrieval).
    pub fn from_floats(data: &[f32]) -> Self {
        Self {
            a1: data[0] as u32,
            a2: data[1] as u32,
        }
    }
}

impl From<(u32, u32)> for ActionPair {
    fn from((a1, a2): (u32, u32)) -> Self {
        Self { a1, a2 }
    }
}

// ============================================================================
// Tests
// ============================================================================
