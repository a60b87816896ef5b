/// Splits `items` into consecutive rows of `per_row` items, the last row holding whatever is
/// left over. Order is preserved.
///
/// Empty input yields a single empty row, so callers that must not reserve space for an empty
/// row should check for images first. A `per_row` of zero is treated as one.
pub fn group_images<T: Clone>(items: &[T], per_row: usize) -> Vec<Vec<T>> {
    let per_row = per_row.max(1);
    let mut groups: Vec<Vec<T>> = Vec::with_capacity(items.len() / per_row + 1);
    let mut current: Vec<T> = Vec::with_capacity(per_row);

    for (position, item) in items.iter().enumerate() {
        current.push(item.clone());
        let is_last = position + 1 == items.len();
        if current.len() == per_row && !is_last {
            groups.push(std::mem::replace(&mut current, Vec::with_capacity(per_row)));
        }
    }
    groups.push(current);

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_one_empty_group() {
        let groups = group_images::<u8>(&[], 4);
        assert_eq!(groups, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn remainder_goes_in_the_last_group() {
        let groups = group_images(&[1, 2, 3, 4, 5], 4);
        assert_eq!(groups, vec![vec![1, 2, 3, 4], vec![5]]);
    }

    #[test]
    fn exact_multiples_leave_no_trailing_group() {
        let groups = group_images(&[1, 2, 3, 4, 5, 6, 7, 8], 4);
        assert_eq!(groups, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]);
    }

    #[test]
    fn zero_per_row_means_one() {
        assert_eq!(group_images(&['a', 'b'], 0), vec![vec!['a'], vec!['b']]);
    }

    #[test]
    fn duplicates_are_grouped_by_position() {
        let groups = group_images(&["x", "x", "x", "x", "x"], 2);
        assert_eq!(groups, vec![vec!["x", "x"], vec!["x", "x"], vec!["x"]]);
    }

    #[test]
    fn counts_and_concatenation_hold_for_many_lengths() {
        for len in 0..30usize {
            for per_row in 1..7usize {
                let items: Vec<usize> = (0..len).collect();
                let groups = group_images(&items, per_row);

                let expected = if len == 0 { 1 } else { len.div_ceil(per_row) };
                assert_eq!(groups.len(), expected, "len {len}, per_row {per_row}");
                for group in &groups[..groups.len() - 1] {
                    assert_eq!(group.len(), per_row);
                }
                let flat: Vec<usize> = groups.into_iter().flatten().collect();
                assert_eq!(flat, items);
            }
        }
    }
}
