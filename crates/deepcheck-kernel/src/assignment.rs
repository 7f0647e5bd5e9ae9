//! Minimal-cost pairing of unordered elements (Hungarian method).
//!
//! Rows are actual elements, columns expected elements, and a cell is the
//! number of differences between the two. Among all pairings the one with
//! the lowest total is chosen, deterministically for a given matrix. When
//! the sides differ in size the surplus elements stay unpaired.

/// Returns, for each row, the column it is paired with.
pub fn minimal_assignment(cost: &[Vec<usize>]) -> Vec<Option<usize>> {
    let rows = cost.len();
    let cols = cost.iter().map(Vec::len).max().unwrap_or(0);
    let n = rows.max(cols);
    if n == 0 {
        return Vec::new();
    }
    let at = |i: usize, j: usize| -> i64 {
        cost.get(i)
            .and_then(|row| row.get(j))
            .map_or(0, |&c| i64::try_from(c).unwrap_or(i64::MAX / 4))
    };

    // 1-based potentials; column 0 is the virtual start column.
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    let mut owner = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        owner[0] = i;
        let mut j0 = 0usize;
        let mut min_v = vec![i64::MAX; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = i64::MAX;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = at(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < min_v[j] {
                    min_v[j] = reduced;
                    way[j] = j0;
                }
                if min_v[j] < delta {
                    delta = min_v[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_v[j] -= delta;
                }
            }
            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairing = vec![None; rows];
    for j in 1..=n {
        let i = owner[j];
        if i >= 1 && i <= rows && j <= cols && cost[i - 1].len() >= j {
            pairing[i - 1] = Some(j - 1);
        }
    }
    pairing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(cost: &[Vec<usize>], pairing: &[Option<usize>]) -> usize {
        pairing
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.map(|j| cost[i][j]))
            .sum()
    }

    #[test]
    fn finds_zero_cost_permutation() {
        let cost = vec![vec![3, 2, 0], vec![2, 0, 1], vec![0, 4, 2]];
        let pairing = minimal_assignment(&cost);
        assert_eq!(pairing, vec![Some(2), Some(1), Some(0)]);
        assert_eq!(total(&cost, &pairing), 0);
    }

    #[test]
    fn prefers_lowest_total_over_greedy() {
        // Greedy on row 0 would take column 0 (cost 1) and force row 1 onto
        // column 1 (cost 5).
        let cost = vec![vec![1, 2], vec![1, 5]];
        let pairing = minimal_assignment(&cost);
        assert_eq!(total(&cost, &pairing), 3);
        assert_eq!(pairing, vec![Some(1), Some(0)]);
    }

    #[test]
    fn surplus_rows_stay_unpaired() {
        let cost = vec![vec![0], vec![4], vec![2]];
        let pairing = minimal_assignment(&cost);
        assert_eq!(pairing, vec![Some(0), None, None]);
    }

    #[test]
    fn surplus_columns_are_left_over() {
        let cost = vec![vec![5, 0, 3]];
        assert_eq!(minimal_assignment(&cost), vec![Some(1)]);
    }

    #[test]
    fn empty_matrix() {
        assert!(minimal_assignment(&[]).is_empty());
    }
}
