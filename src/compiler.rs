//! Compiles a [`Grid`] into a CNF [`Theory`].
//!
//! # Encoding
//! For every color C, cell V and adjacent pair (V, W) there is a path atom `P(C, V)` and an
//! undirected connection atom `E(C, V, W)`. Reachability atoms `R(C, V, s)` say that V can be reached
//! from C's start endpoint over at most `s` active edges of C.
//!
//! 1. Both endpoints of C are on C's path.
//! 2. Each cell is on at most one path (on exactly one under [`Coverage::Full`]).
//! 3. `P(C, V)` implies some incident `E(C, V, _)`, and `E(C, V, W)` implies `P(C, V)` and `P(C, W)`.
//! 4. An endpoint of C has exactly one incident edge of C. Any other cell on C's path has exactly two.
//! 5. `R(C, start, 0)` holds and no other cell is reachable in zero steps. `R(C, V, s)` requires
//!    `R(C, V, s - 1)` or some neighbour W with `R(C, W, s - 1)` and `E(C, W, V)`. The far endpoint,
//!    and every cell on C's path, is reachable within `rows * cols - 1` steps.
//! 6. Optionally, no cell has incident edges of two different colors.
//!
//! Rules 1 to 4 alone admit a simple start-to-end path plus any number of disjoint closed loops of the
//! same color. Rule 5 rejects those loops, as nothing on them can be reached from the start.

use itertools::Itertools;
use log::{debug, info};
use varisat::Lit;

use crate::color::ColorId;
use crate::config::{Coverage, EncodingConfig};
use crate::error::InvariantViolation;
use crate::grid::Grid;
use crate::location::Location;
use crate::logic::{at_least_two_if, at_most_one, at_most_two, exactly_one, implies_any_pair};
use crate::solution::Solution;
use crate::theory::Theory;
use crate::variables::VariableSpace;

/// A compiled puzzle: the theory to hand to an oracle, and the atoms needed to read its answer.
#[derive(Clone, Debug)]
pub struct Compilation {
    pub(crate) variables: VariableSpace,
    pub(crate) theory: Theory,
}

impl Compilation {
    pub fn variables(&self) -> &VariableSpace {
        &self.variables
    }

    pub fn theory(&self) -> &Theory {
        &self.theory
    }

    pub fn into_parts(self) -> (VariableSpace, Theory) {
        (self.variables, self.theory)
    }

    /// Fix every connection atom to the value it has in `solution`: edges on a color's path are
    /// asserted, all other edges of that color are denied.
    pub fn pin_solution(&mut self, grid: &Grid, solution: &Solution) -> Result<(), InvariantViolation> {
        for (color, _) in solution.iter() {
            let used = solution.edges(color).collect_vec();
            for (a, b) in grid.edges() {
                let on_path = used.iter().any(|&(x, y)| (x, y) == (a, b) || (y, x) == (a, b));
                let var = self.variables.connection(color, a, b)?;
                self.theory.add_clause(vec![var.lit(on_path)]);
            }
        }
        self.theory.reserve_vars(self.variables.len());
        Ok(())
    }
}

/// Compile `grid` under `config`.
pub fn compile(grid: &Grid, config: &EncodingConfig) -> Result<Compilation, InvariantViolation> {
    ConstraintCompiler::new(grid, config.clone()).compile()
}

/// Emits every clause family for one grid into a fresh [`Theory`].
pub struct ConstraintCompiler<'g> {
    grid: &'g Grid,
    config: EncodingConfig,
    variables: VariableSpace,
    theory: Theory,
}

impl<'g> ConstraintCompiler<'g> {
    pub fn new(grid: &'g Grid, config: EncodingConfig) -> Self {
        Self {
            grid,
            config,
            variables: VariableSpace::new(grid),
            theory: Theory::new(),
        }
    }

    pub fn compile(mut self) -> Result<Compilation, InvariantViolation> {
        self.grid.verify_adjacency()?;

        self.endpoint_fixed()?;
        self.cell_cardinality()?;
        self.adjacency_implication()?;
        self.degree()?;
        self.reachability()?;
        if self.config.edge_exclusivity {
            self.exclusivity()?;
        }

        self.theory.reserve_vars(self.variables.len());
        info!(
            "compiled {}x{} grid with {} colors: {} variables, {} clauses",
            self.grid.dims().0, self.grid.dims().1, self.grid.color_count(), self.variables.len(), self.theory.len(),
        );

        Ok(Compilation {
            variables: self.variables,
            theory: self.theory,
        })
    }

    fn endpoint_fixed(&mut self) -> Result<(), InvariantViolation> {
        let mut added = 0;
        for color in self.grid.colors() {
            let (start, end) = self.termini(color)?;
            for endpoint in [start, end] {
                let var = self.variables.path(color, endpoint)?;
                added += self.theory.extend([vec![var.positive()]]);
            }
        }
        debug!("endpoint fixing: {} clauses", added);
        Ok(())
    }

    fn cell_cardinality(&mut self) -> Result<(), InvariantViolation> {
        let mut added = 0;
        for cell in self.grid.cells().collect_vec() {
            let lits = self.grid.colors()
                .map(|color| self.variables.path(color, cell).map(|var| var.positive()))
                .collect::<Result<Vec<_>, _>>()?;

            added += self.theory.extend(match self.config.coverage {
                Coverage::Partial => at_most_one(&lits),
                Coverage::Full => exactly_one(lits),
            });
        }
        debug!("cell cardinality ({:?}): {} clauses", self.config.coverage, added);
        Ok(())
    }

    fn adjacency_implication(&mut self) -> Result<(), InvariantViolation> {
        let mut added = 0;
        for color in self.grid.colors() {
            for cell in self.grid.cells().collect_vec() {
                // P(C, V) => E(C, V, W_1) + E(C, V, W_2) + ...
                let mut clause = vec![self.variables.path(color, cell)?.negative()];
                clause.extend(self.incident(color, cell)?);
                added += self.theory.extend([clause]);
            }

            for (a, b) in self.grid.edges().collect_vec() {
                // E => P(a) * P(b) = (!E + P(a))(!E + P(b))
                let edge = self.variables.connection(color, a, b)?;
                let path_a = self.variables.path(color, a)?;
                let path_b = self.variables.path(color, b)?;
                added += self.theory.extend([
                    vec![edge.negative(), path_a.positive()],
                    vec![edge.negative(), path_b.positive()],
                ]);
            }
        }
        debug!("adjacency implication: {} clauses", added);
        Ok(())
    }

    fn degree(&mut self) -> Result<(), InvariantViolation> {
        let mut added = 0;
        for color in self.grid.colors() {
            for cell in self.grid.cells().collect_vec() {
                let incident = self.incident(color, cell)?;

                if self.grid.is_endpoint(cell, color) {
                    // the path leaves an endpoint exactly once
                    added += self.theory.extend(exactly_one(incident));
                } else {
                    let on_path = self.variables.path(color, cell)?.positive();
                    added += self.theory.extend(at_least_two_if(on_path, &incident));
                    // no branching
                    added += self.theory.extend(at_most_two(&incident));
                }
            }
        }
        debug!("degree: {} clauses", added);
        Ok(())
    }

    fn reachability(&mut self) -> Result<(), InvariantViolation> {
        let max_step = self.grid.max_step();
        let mut added = 0;

        for color in self.grid.colors() {
            let (start, end) = self.termini(color)?;

            for cell in self.grid.cells().collect_vec() {
                let var = self.variables.reachable(color, cell, 0)?;
                added += self.theory.extend([vec![var.lit(cell == start)]]);
            }

            for step in 1..=max_step {
                for cell in self.grid.cells().collect_vec() {
                    let now = self.variables.reachable(color, cell, step)?;
                    let before = self.variables.reachable(color, cell, step - 1)?;

                    let via = self.grid.adjacent_cells(cell).into_iter()
                        .map(|neighbor| -> Result<[Lit; 2], InvariantViolation> {
                            Ok([
                                self.variables.reachable(color, neighbor, step - 1)?.positive(),
                                self.variables.connection(color, neighbor, cell)?.positive(),
                            ])
                        })
                        .collect::<Result<Vec<_>, _>>()?;

                    added += self.theory.extend(implies_any_pair(vec![now.negative(), before.positive()], &via));
                }
            }

            added += self.theory.extend([vec![self.variables.reachable(color, end, max_step)?.positive()]]);

            for cell in self.grid.cells().collect_vec() {
                // every cell on the path hangs off the start
                let on_path = self.variables.path(color, cell)?;
                let reached = self.variables.reachable(color, cell, max_step)?;
                added += self.theory.extend([vec![on_path.negative(), reached.positive()]]);
            }
        }
        debug!("reachability unrolled to step {}: {} clauses", max_step, added);
        Ok(())
    }

    fn exclusivity(&mut self) -> Result<(), InvariantViolation> {
        let mut added = 0;
        for cell in self.grid.cells().collect_vec() {
            let per_color = self.grid.colors()
                .map(|color| self.incident(color, cell))
                .collect::<Result<Vec<_>, _>>()?;

            for pair in per_color.iter().combinations(2) {
                added += self.theory.extend(pair[0].iter()
                    .cartesian_product(pair[1].iter())
                    .map(|(x, y)| vec![!*x, !*y]));
            }
        }
        debug!("edge exclusivity: {} clauses", added);
        Ok(())
    }

    /// Positive connection literals of `color` on every edge touching `cell`.
    fn incident(&mut self, color: ColorId, cell: Location) -> Result<Vec<Lit>, InvariantViolation> {
        self.grid.adjacent_cells(cell).into_iter()
            .map(|neighbor| self.variables.connection(color, cell, neighbor).map(|var| var.positive()))
            .collect()
    }

    fn termini(&self, color: ColorId) -> Result<(Location, Location), InvariantViolation> {
        self.grid.endpoints(color).ok_or(InvariantViolation::UnknownColor(color))
    }
}
