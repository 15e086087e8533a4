// distance.rs - Bounded mismatch distance between consensus sequences

/// Count mismatching bytes between `a` and `b`, charging every unmatched
/// terminal base of the longer sequence as one mismatch.
///
/// Returns `None` as soon as the running count exceeds `max_allowed`, so
/// dissimilar pairs are rejected without scanning the whole sequence.
pub fn sequence_distance(a: &[u8], b: &[u8], max_allowed: usize) -> Option<usize> {
    let mut dist = a.len().abs_diff(b.len());
    if dist > max_allowed {
        return None;
    }

    for (x, y) in a.iter().zip(b.iter()) {
        if x != y {
            dist += 1;
            if dist > max_allowed {
                return None;
            }
        }
    }
    Some(dist)
}
