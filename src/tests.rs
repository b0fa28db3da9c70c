#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZero;
    use std::thread;

    use test_log::test;

    use crate::builder::GridBuilder;
    use crate::cell::Cell;
    use crate::compiler::compile;
    use crate::config::Settings;
    use crate::error::{MalformedSolution, PuzzleError, SolveError};
    use crate::grid::Grid;
    use crate::location::Location;
    use crate::oracle::{Assignment, Budget, CancelToken, TheoryOracle, VarisatOracle, Verdict};
    use crate::shape::SquareStep;
    use crate::solution::Solution;
    use crate::solver::{run, Outcome};
    use crate::theory::Theory;

    fn locs(cells: &[(usize, usize)]) -> Vec<Location> {
        cells.iter().copied().map(Location::from).collect()
    }

    fn solved(grid: &Grid, settings: &Settings) -> Solution {
        match grid.solve_with(settings, &VarisatOracle::default(), None).unwrap() {
            Outcome::Solved(solution) => solution,
            other => panic!("expected a solution, got {other:?}"),
        }
    }

    /// Endpoints match, steps are grid-adjacent, no path repeats a cell and no two paths share one.
    fn assert_valid(grid: &Grid, solution: &Solution) {
        assert_eq!(solution.color_count(), grid.color_count());
        let mut used = HashSet::new();
        for (color, path) in solution.iter() {
            let (start, end) = grid.endpoints(color).unwrap();
            assert_eq!(path.first(), Some(&start), "color {color} starts elsewhere");
            assert_eq!(path.last(), Some(&end), "color {color} ends elsewhere");
            for pair in path.windows(2) {
                assert!(SquareStep::direction_to(pair[0], pair[1]).is_some(), "{} and {} are not adjacent", pair[0], pair[1]);
            }
            for cell in path {
                assert!(used.insert(*cell), "{cell} is used twice");
            }
        }
    }

    #[test]
    fn two_cell_grid() {
        let grid: Grid = "AA".parse().unwrap();
        let solution = grid.solve().unwrap().into_solution().unwrap();
        assert_eq!(solution.path(0).unwrap(), locs(&[(0, 0), (0, 1)]));
    }

    #[test]
    fn two_rows_partial_coverage() {
        let grid: Grid = "R.R\nB.B\n...".parse().unwrap();
        let solution = solved(&grid, &Settings::default());
        assert_valid(&grid, &solution);

        // red has no way around blue's endpoints
        assert_eq!(solution.path(0).unwrap(), locs(&[(0, 0), (0, 1), (0, 2)]));
        let blue = solution.path(1).unwrap();
        assert!(blue.contains(&Location(1, 0)) && blue.contains(&Location(1, 2)));
    }

    #[test]
    fn two_rows_full_coverage() {
        // blue would need a Hamiltonian path between two same-parity cells of a 2x3 block
        let grid: Grid = "R.R\nB.B\n...".parse().unwrap();
        let outcome = grid.solve_with(&Settings::full_coverage(), &VarisatOracle::default(), None).unwrap();
        assert_eq!(outcome, Outcome::Unsatisfiable);
    }

    #[test]
    fn crossing_pairs_unsatisfiable() {
        let grid: Grid = "AB\nBA".parse().unwrap();
        assert_eq!(grid.solve().unwrap(), Outcome::Unsatisfiable);
        let outcome = grid.solve_with(&Settings::full_coverage(), &VarisatOracle::default(), None).unwrap();
        assert_eq!(outcome, Outcome::Unsatisfiable);
    }

    #[test]
    fn solve_most_basic() {
        // flow free classic pack level 1
        let grid: Grid = "A.B.D
..C.E
.....
.B.D.
.ACE.
".parse().unwrap();

        let solution = solved(&grid, &Settings::full_coverage());
        assert_valid(&grid, &solution);

        assert_eq!(solution.path(grid.color_of('A').unwrap()).unwrap(), locs(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (4, 1)]));
        assert_eq!(solution.path(grid.color_of('B').unwrap()).unwrap(), locs(&[(0, 2), (0, 1), (1, 1), (2, 1), (3, 1)]));
        assert_eq!(solution.path(grid.color_of('C').unwrap()).unwrap(), locs(&[(1, 2), (2, 2), (3, 2), (4, 2)]));
        assert_eq!(solution.path(grid.color_of('D').unwrap()).unwrap(), locs(&[(0, 4), (0, 3), (1, 3), (2, 3), (3, 3)]));
        assert_eq!(solution.path(grid.color_of('E').unwrap()).unwrap(), locs(&[(1, 4), (2, 4), (3, 4), (4, 4), (4, 3)]));

        let cells = solution.to_cells(&grid);
        assert!(cells.iter().all(|cell| *cell != Cell::Empty));
        assert_eq!(cells[(2, 2)], Cell::Path { color: grid.color_of('C').unwrap() });
        assert_eq!(cells[(4, 1)], Cell::Terminus { color: grid.color_of('A').unwrap() });
    }

    #[test]
    fn builder_puzzle_partial_coverage() {
        let grid = GridBuilder::with_dims((NonZero::new(4).unwrap(), NonZero::new(4).unwrap()))
            .add_termini('A', (Location(0, 0), Location(3, 3)))
            .add_termini('B', (Location(0, 3), Location(1, 1)))
            .build()
            .unwrap();

        let solution = solved(&grid, &Settings::default());
        assert_valid(&grid, &solution);
    }

    #[test]
    fn open_board_with_and_without_exclusivity() {
        let grid: Grid = "A....\n.....\n.....\n.....\n....A".parse().unwrap();
        let solution = solved(&grid, &Settings::default());
        assert_valid(&grid, &solution);

        let with_exclusivity_off = Settings::from_yaml_str("encoding:\n  edge_exclusivity: false\n").unwrap();
        let solution = solved(&grid, &with_exclusivity_off);
        assert_valid(&grid, &solution);
    }

    #[test]
    fn pinned_solution_decodes_identically() {
        let grid: Grid = "A..A\n....\nB..B".parse().unwrap();
        let settings = Settings::default();
        let first = solved(&grid, &settings);
        assert_valid(&grid, &first);

        let mut compilation = compile(&grid, &settings.encoding).unwrap();
        compilation.pin_solution(&grid, &first).unwrap();
        let second = run(&grid, &compilation, &VarisatOracle::default(), &Budget::unlimited()).unwrap();
        assert_eq!(second, Outcome::Solved(first));
    }

    #[test]
    fn pinning_a_cycle_is_unsatisfiable() {
        let grid: Grid = "A.A\n...".parse().unwrap();
        // closes a loop through the start endpoint
        let cycle = Solution { paths: vec![locs(&[(0, 0), (0, 1), (1, 1), (1, 0), (0, 0)])] };
        let mut compilation = compile(&grid, &Settings::default().encoding).unwrap();
        compilation.pin_solution(&grid, &cycle).unwrap();
        let outcome = run(&grid, &compilation, &VarisatOracle::default(), &Budget::unlimited()).unwrap();
        assert_eq!(outcome, Outcome::Unsatisfiable);
    }

    #[test]
    fn timeout_reports_unknown() {
        let grid: Grid = "A.A\n...".parse().unwrap();
        let settings = Settings::from_yaml_str("solver:\n  timeout_ms: 0\n").unwrap();
        let outcome = grid.solve_with(&settings, &VarisatOracle::default(), None).unwrap();
        assert!(matches!(outcome, Outcome::Unknown(_)));
    }

    #[test]
    fn cancellation_reports_unknown() {
        let grid: Grid = "A.A\n...".parse().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = grid.solve_with(&Settings::default(), &VarisatOracle::default(), Some(cancel)).unwrap();
        assert_eq!(outcome, Outcome::Unknown("cancelled".to_owned()));
    }

    /// Claims every variable is true.
    struct AllTrue;

    impl TheoryOracle for AllTrue {
        fn solve(&self, theory: &Theory, _budget: &Budget) -> Verdict {
            Verdict::Satisfiable(Assignment::from_values(vec![true; theory.var_count()]))
        }
    }

    #[test]
    fn unsound_assignment_is_surfaced() {
        let grid: Grid = "A.A\n...".parse().unwrap();
        let err = grid.solve_with(&Settings::default(), &AllTrue, None).unwrap_err();
        assert!(matches!(err, SolveError::Malformed(MalformedSolution::WrongStart { color: 0, edges: 2, .. })));
    }

    #[test]
    fn invalid_puzzles_never_compile() {
        assert_eq!("AB\nB.".parse::<Grid>().unwrap_err(), PuzzleError::WrongEndpointCount { display: 'A', count: 1 });

        let result = GridBuilder::default()
            .add_termini('A', (Location(0, 0), Location(0, 9)))
            .build();
        assert_eq!(result.unwrap_err(), PuzzleError::OutOfBounds { location: Location(0, 9) });
    }

    #[test]
    fn independent_puzzles_in_parallel() {
        let puzzles = ["R.R\nB.B\n...", "A..A\n....\nB..B", "AB\nBA"];
        let outcomes = thread::scope(|scope| {
            let handles = puzzles.iter()
                .map(|puzzle| scope.spawn(move || {
                    let grid: Grid = puzzle.parse().unwrap();
                    let outcome = grid.solve().unwrap();
                    if let Some(solution) = outcome.solution() {
                        assert_valid(&grid, solution);
                    }
                    outcome
                }))
                .collect::<Vec<_>>();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>()
        });

        assert!(outcomes[0].solution().is_some());
        assert!(outcomes[1].solution().is_some());
        assert_eq!(outcomes[2], Outcome::Unsatisfiable);
    }
}
