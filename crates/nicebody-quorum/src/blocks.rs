//! Bounded candidate enumeration.
//!
//! Trying every subset of two regions' validators is `2^|U|`. Instead each
//! side is cut into at most [`MAX_BLOCKS_PER_SIDE`] contiguous blocks and
//! candidates are unions of whole blocks, which caps a pair at
//! `2^(2 * MAX_BLOCKS_PER_SIDE)` candidates whatever the region sizes.

use itertools::Itertools;

/// Upper bound on the number of blocks a side is cut into.
pub const MAX_BLOCKS_PER_SIDE: usize = 6;

/// Cut `members` into at most `max_blocks` blocks, keeping their order.
///
/// Short sides (fewer than `max_blocks` members) become singletons. Longer
/// sides use the narrowest width `j` for which `n / j` blocks of width `j`
/// plus `n % j` trailing singletons fit in `max_blocks`.
pub fn partition<T: Clone>(members: &[T], max_blocks: usize) -> Vec<Vec<T>> {
    let n = members.len();
    if n < max_blocks {
        return members.iter().map(|m| vec![m.clone()]).collect();
    }

    let width = (1..=n)
        .find(|&j| n / j + n % j <= max_blocks)
        .unwrap_or(n);
    let full = n / width * width;

    let mut blocks: Vec<Vec<T>> = members[..full]
        .chunks(width)
        .map(|chunk| chunk.to_vec())
        .collect();
    blocks.extend(members[full..].iter().map(|m| vec![m.clone()]));
    blocks
}

/// Lazily enumerate unions of blocks, fewest blocks first.
///
/// Yields the empty candidate, then every single block, then every pair of
/// blocks in index order, and so on. The union of *all* blocks is never
/// yielded: it would leave nothing outside the common set.
pub fn combinations<T: Clone>(blocks: Vec<Vec<T>>) -> impl Iterator<Item = Vec<T>> {
    let n = blocks.len();
    std::iter::once(Vec::new()).chain(
        (1..n)
            .flat_map(move |k| (0..n).combinations(k))
            .map(move |chosen| {
                chosen
                    .into_iter()
                    .flat_map(|i| blocks[i].iter().cloned())
                    .collect()
            }),
    )
}
