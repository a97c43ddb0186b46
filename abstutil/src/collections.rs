/// Maps any index, including negative ones, into `0..len` as if the collection repeats forever in
/// both directions.
pub fn wraparound_index(len: usize, idx: isize) -> usize {
    assert!(len > 0, "Can't wrap around an empty collection");
    let len = len as isize;
    let idx = idx % len;
    let idx = if idx >= 0 { idx } else { idx + len };
    idx as usize
}
