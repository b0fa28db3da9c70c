use std::num::NonZero;

use crate::color::Endpoint;
use crate::error::PuzzleError;
use crate::grid::Grid;
use crate::location::{Dimension, Location};

/// Incrementally places endpoint pairs and produces a [`Grid`].
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Once a placement is invalid the builder stops accepting changes, and [`build`](Self::build) reports why.
#[derive(Clone, Debug)]
pub struct GridBuilder {
    // rows, columns
    dims: (Dimension, Dimension),
    displays: Vec<char>,
    termini: Vec<(Location, Location)>,
    invalid_reasons: Vec<PuzzleError>,
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::with_dims((NonZero::<usize>::MIN.saturating_add(4), NonZero::<usize>::MIN.saturating_add(4)))
    }
}

impl GridBuilder {
    /// Construct a new builder with the specified dimensions, in `(rows, columns)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            displays: Default::default(),
            termini: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    /// Add a color's two endpoints. The first location becomes the start of its path.
    ///
    /// Enters an invalid state if either location is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn add_termini(&mut self, display: char, locations: (Location, Location)) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        for location in [locations.0, locations.1] {
            if !location.within(self.dims) {
                self.invalid_reasons.push(PuzzleError::OutOfBounds { location });
                return self;
            }
        }

        self.displays.push(display);
        self.termini.push(locations);
        self
    }

    /// Remove the most recently added pair of endpoints.
    ///
    /// If the builder is in an invalid state or no endpoints are present, this function does nothing.
    pub fn pop_termini(&mut self) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        self.displays.pop();
        self.termini.pop();
        self
    }

    /// Returns `None` if the builder is valid, `Some(&Vec<PuzzleError>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<PuzzleError>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Validate the placed endpoints and convert them into a [`Grid`].
    pub fn build(&self) -> Result<Grid, PuzzleError> {
        if let Some(reason) = self.invalid_reasons.first() {
            return Err(reason.clone());
        }

        let endpoints = self.termini.iter()
            .enumerate()
            .flat_map(|(color, (start, end))| [Endpoint::new(color, *start), Endpoint::new(color, *end)])
            .collect();

        Grid::new(self.dims, self.displays.clone(), endpoints)
    }
}
