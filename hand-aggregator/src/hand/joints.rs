//! Joint layout and skeleton topology
//!
//! Joints follow the 21-point hand landmark order (wrist, then four joints
//! per finger from base to tip) with one extra slot holding a mirrored copy
//! of the wrist for consumers that index it from the end of the array.

// ============================================================================
// JOINT INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;
pub const MIRRORED_WRIST: usize = 21;

/// Total joint slots per hand sample
pub const JOINT_COUNT: usize = 22;

pub const FINGER_COUNT: usize = 5;
pub const BONES_PER_FINGER: usize = 4;

// ============================================================================
// TOPOLOGY
// ============================================================================

/// Finger chains, base to tip. Every chain hangs off the wrist.
pub const FINGER_CHAINS: [[usize; BONES_PER_FINGER]; FINGER_COUNT] = [
    [THUMB_CMC, THUMB_MCP, THUMB_IP, THUMB_TIP],
    [INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP],
    [MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP],
    [RING_MCP, RING_PIP, RING_DIP, RING_TIP],
    [PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP],
];

/// Bones as (parent, child) joint pairs
pub const HAND_BONES: [(usize, usize); 20] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
];

/// Parent joint of `joint`, or `None` for the wrist and its mirror
pub fn parent_of(joint: usize) -> Option<usize> {
    HAND_BONES
        .iter()
        .find(|(_, child)| *child == joint)
        .map(|(parent, _)| *parent)
}

/// Finger names, index-aligned with [`FINGER_CHAINS`]
pub const FINGER_NAMES: [&str; FINGER_COUNT] = ["thumb", "index", "middle", "ring", "pinky"];
