//! Skeleton edge table for the 33-landmark pose topology.

/// Visibility floor for drawing a point or an edge endpoint. Points at or
/// below this are skipped entirely.
pub const DRAW_VISIBILITY: f32 = 0.1;

/// Visibility floor for the user-facing "N points visible" summary. Distinct
/// from [`DRAW_VISIBILITY`]: a point can be drawn yet not counted as
/// confidently visible.
pub const VISIBLE_POINT: f32 = 0.5;

/// Unordered landmark-index pairs drawn as skeleton edges. Iteration order is
/// stable and determines stroke z-order, nothing else. The table matches the
/// 33-point topology in `landmark::index` edge-for-edge.
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    // face
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    // arms
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    // torso
    (11, 23),
    (12, 24),
    (23, 24),
    // legs
    (23, 25),
    (25, 27),
    (27, 29),
    (29, 31),
    (31, 27),
    (24, 26),
    (26, 28),
    (28, 30),
    (30, 32),
    (32, 28),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::LANDMARK_COUNT;

    #[test]
    fn all_indices_are_in_range() {
        for &(a, b) in POSE_CONNECTIONS.iter() {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT, "bad edge ({a},{b})");
            assert_ne!(a, b, "self edge ({a},{b})");
        }
    }

    #[test]
    fn no_duplicate_edges() {
        let mut seen = std::collections::HashSet::new();
        for &(a, b) in POSE_CONNECTIONS.iter() {
            let key = (a.min(b), a.max(b));
            assert!(seen.insert(key), "duplicate edge ({a},{b})");
        }
    }
}
