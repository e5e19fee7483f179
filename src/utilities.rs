/// Search and comparison helpers shared by the tabulated types

/// Index of the first element of the sorted slice `x` that is not less than `value`.
///
/// Returns `x.len()` when every element is less than `value`.
pub fn lower_bound(x: &[f64], value: f64) -> usize {
    // invariant: every index below low is < value, every index at or above high is >= value
    let mut low = 0usize;
    let mut high = x.len();
    while low < high {
        let mid = (low + high) >> 1;
        if x[mid] < value {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low
}

/// Index of the region owning the segment that ends at grid index `end`.
///
/// `boundaries` holds the last grid index of every region, so this is the
/// first region whose boundary is not below `end`.
pub fn region_of_segment(boundaries: &[usize], end: usize) -> usize {
    boundaries
        .partition_point(|&b| b < end)
        .min(boundaries.len().saturating_sub(1))
}

/// Locate `value` on a region-partitioned grid.
///
/// Returns `(region, index)` where `index` is the first grid index of the
/// owning region whose value is not below `value`. The caller guarantees that
/// `value` lies inside `[x[0], x[len - 1]]`. At a jump the first element of
/// the pair is found, so exact hits resolve to the value from the left.
pub fn locate(x: &[f64], boundaries: &[usize], value: f64) -> (usize, usize) {
    let region = boundaries
        .partition_point(|&b| x[b] < value)
        .min(boundaries.len().saturating_sub(1));
    let start = if region == 0 { 0 } else { boundaries[region - 1] };
    let end = boundaries[region];
    (region, start + lower_bound(&x[start..=end], value))
}

/// Relative comparison with an absolute floor of `epsilon` near zero.
pub fn is_close(a: f64, b: f64, epsilon: f64) -> bool {
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= epsilon * scale.max(1.0)
}
