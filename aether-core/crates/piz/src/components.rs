//! 4-connected component labeling over uncovered cells (§4.10 step 3).
//!
//! Row-major scan for seeds, iterative FIFO BFS (never DFS — no call-stack
//! depth dependence), neighbor order exactly `{up, down, left, right}` at
//! each dequeue. The neighbor order doesn't change which cells end up in
//! which component (membership is a pure reachability fact) but it is
//! specified so two conforming implementations visit cells in the same
//! sequence, which downstream debugging/tracing can rely on.

use std::collections::VecDeque;

use crate::grid::CoverageGrid;

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub positions: Vec<(usize, usize)>,
}

impl Component {
    pub fn pixel_count(&self) -> usize {
        self.positions.len()
    }

    pub fn bbox(&self) -> (usize, usize, usize, usize) {
        let min_row = self.positions.iter().map(|(r, _)| *r).min().unwrap();
        let max_row = self.positions.iter().map(|(r, _)| *r).max().unwrap();
        let min_col = self.positions.iter().map(|(_, c)| *c).min().unwrap();
        let max_col = self.positions.iter().map(|(_, c)| *c).max().unwrap();
        (min_row, max_row, min_col, max_col)
    }

    pub fn centroid(&self) -> (f64, f64) {
        let n = self.positions.len() as f64;
        let sum_row: usize = self.positions.iter().map(|(r, _)| *r).sum();
        let sum_col: usize = self.positions.iter().map(|(_, c)| *c).sum();
        (sum_row as f64 / n, sum_col as f64 / n)
    }
}

/// Finds every connected component of cells with `v < covered_cell_min`,
/// in row-major discovery order (not yet sorted for the report — see
/// `region::sort_regions`).
pub fn find_components(grid: &CoverageGrid, covered_cell_min: f64) -> Vec<Component> {
    let rows = grid.rows();
    let cols = grid.cols();
    let mut visited = vec![vec![false; cols]; rows];
    let mut components = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            if visited[row][col] || grid.get(row, col) >= covered_cell_min {
                continue;
            }

            let mut positions = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back((row, col));
            visited[row][col] = true;

            while let Some((r, c)) = queue.pop_front() {
                positions.push((r, c));

                let neighbors = [
                    (r.checked_sub(1), Some(c)),       // up
                    (r.checked_add(1).filter(|&v| v < rows), Some(c)), // down
                    (Some(r), c.checked_sub(1)),       // left
                    (Some(r), c.checked_add(1).filter(|&v| v < cols)), // right
                ];

                for (nr, nc) in neighbors {
                    if let (Some(nr), Some(nc)) = (nr, nc) {
                        if !visited[nr][nc] && grid.get(nr, nc) < covered_cell_min {
                            visited[nr][nc] = true;
                            queue.push_back((nr, nc));
                        }
                    }
                }
            }

            components.push(Component { positions });
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&str]) -> CoverageGrid {
        // 'x' = uncovered (0.0), '.' = covered (1.0); every row must be 32 chars.
        let raw: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| row.chars().map(|c| if c == 'x' { 0.0 } else { 1.0 }).collect())
            .collect();
        CoverageGrid::validate(&raw).unwrap()
    }

    fn padded(pattern: &str) -> String {
        format!("{:.<32}", pattern)
    }

    #[test]
    fn test_single_isolated_cell_is_its_own_component() {
        let mut rows: Vec<String> = (0..32).map(|_| padded("")).collect();
        let mut r0: Vec<char> = rows[0].chars().collect();
        r0[5] = 'x';
        rows[0] = r0.into_iter().collect();
        let row_refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let grid = grid_from(&row_refs);

        let components = find_components(&grid, 0.5);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].pixel_count(), 1);
        assert_eq!(components[0].positions[0], (0, 5));
    }

    #[test]
    fn test_adjacent_cells_merge_diagonal_does_not() {
        let mut rows: Vec<String> = (0..32).map(|_| padded("")).collect();
        let mut r0: Vec<char> = rows[0].chars().collect();
        r0[0] = 'x';
        r0[1] = 'x';
        rows[0] = r0.into_iter().collect();
        let mut r1: Vec<char> = rows[1].chars().collect();
        r1[2] = 'x'; // diagonal to (0,1), not 4-connected
        rows[1] = r1.into_iter().collect();
        let row_refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
        let grid = grid_from(&row_refs);

        let mut components = find_components(&grid, 0.5);
        components.sort_by_key(|c| c.pixel_count());
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].pixel_count(), 1);
        assert_eq!(components[1].pixel_count(), 2);
    }

    #[test]
    fn test_fully_uncovered_grid_is_one_component() {
        let raw = vec![vec![0.0; 32]; 32];
        let grid = CoverageGrid::validate(&raw).unwrap();
        let components = find_components(&grid, 0.5);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].pixel_count(), 1024);
    }

    #[test]
    fn test_rectangular_block_has_expected_bbox_and_pixel_count() {
        let mut raw = vec![vec![1.0; 32]; 32];
        for row in raw.iter_mut().take(5).skip(2) {
            for cell in row.iter_mut().take(6).skip(2) {
                *cell = 0.0;
            }
        }
        let grid = CoverageGrid::validate(&raw).unwrap();

        let components = find_components(&grid, 0.5);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].bbox(), (2, 4, 2, 5));
        assert_eq!(components[0].pixel_count(), 3 * 4);
    }
}
