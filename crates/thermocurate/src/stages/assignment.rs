//! Maximum-weight bipartite assignment (Hungarian algorithm).

/// Pair rows with columns of `weights` so that the summed weight of the pairs
/// is as large as possible.
///
/// Every row is paired with a distinct column when there are at least as many
/// columns as rows, and vice versa. Pairs are returned as `(row, column)`,
/// sorted by row. Runs in O(n²m) time for an n × m matrix with n ≤ m.
pub fn maximum_weight_assignment(weights: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let n_rows = weights.len();
    let n_columns = weights.first().map_or(0, Vec::len);

    if n_rows == 0 || n_columns == 0 {
        return Vec::new();
    }

    if n_rows > n_columns {
        let transposed: Vec<Vec<f64>> = (0..n_columns)
            .map(|j| weights.iter().map(|row| row[j]).collect())
            .collect();

        let mut pairs: Vec<(usize, usize)> = maximum_weight_assignment(&transposed)
            .into_iter()
            .map(|(j, i)| (i, j))
            .collect();
        pairs.sort_unstable();
        return pairs;
    }

    let costs: Vec<Vec<f64>> = weights
        .iter()
        .map(|row| row.iter().map(|w| -w).collect())
        .collect();

    minimum_cost_assignment(&costs, n_rows, n_columns)
}

/// Shortest augmenting path with potentials; requires `n_rows <= n_columns`.
fn minimum_cost_assignment(
    costs: &[Vec<f64>],
    n_rows: usize,
    n_columns: usize,
) -> Vec<(usize, usize)> {
    // Index 0 is a sentinel; rows and columns are 1-based below.
    let mut row_potential = vec![0.0; n_rows + 1];
    let mut column_potential = vec![0.0; n_columns + 1];
    let mut column_owner = vec![0usize; n_columns + 1];
    let mut previous_column = vec![0usize; n_columns + 1];

    for row in 1..=n_rows {
        column_owner[0] = row;

        let mut current_column = 0;
        let mut min_slack = vec![f64::INFINITY; n_columns + 1];
        let mut visited = vec![false; n_columns + 1];

        loop {
            visited[current_column] = true;

            let owner = column_owner[current_column];
            let mut delta = f64::INFINITY;
            let mut next_column = 0;

            for column in 1..=n_columns {
                if visited[column] {
                    continue;
                }

                let slack =
                    costs[owner - 1][column - 1] - row_potential[owner] - column_potential[column];

                if slack < min_slack[column] {
                    min_slack[column] = slack;
                    previous_column[column] = current_column;
                }
                if min_slack[column] < delta {
                    delta = min_slack[column];
                    next_column = column;
                }
            }

            for column in 0..=n_columns {
                if visited[column] {
                    row_potential[column_owner[column]] += delta;
                    column_potential[column] -= delta;
                } else {
                    min_slack[column] -= delta;
                }
            }

            current_column = next_column;
            if column_owner[current_column] == 0 {
                break;
            }
        }

        // Flip the augmenting path.
        while current_column != 0 {
            let previous = previous_column[current_column];
            column_owner[current_column] = column_owner[previous];
            current_column = previous;
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=n_columns)
        .filter(|column| column_owner[*column] != 0)
        .map(|column| (column_owner[column] - 1, column - 1))
        .collect();
    pairs.sort_unstable();
    pairs
}
