/// Sorts a pair of values into nondescending order.
pub fn sort_pair<K: Ord>(a: K, b: K) -> (K, K) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Rearranges slots `start..start + order.len()` so that slot `start + k`
/// ends up holding what slot `order[k]` holds now, using only `swap` calls.
pub fn permute_by_swaps(start: usize, order: &[usize], mut swap: impl FnMut(usize, usize)) {
    // `holder[k]`: original slot of the item now in `start + k`.
    // `location[k]`: current slot of the item originally in `start + k`.
    let mut holder: Vec<usize> = (start..start + order.len()).collect();
    let mut location = holder.clone();
    for (k, &wanted) in order.iter().enumerate() {
        let from = location[wanted - start];
        let to = start + k;
        if from != to {
            swap(from, to);
            let displaced = holder[k];
            holder[k] = wanted;
            holder[from - start] = displaced;
            location[wanted - start] = to;
            location[displaced - start] = from;
        }
    }
}
