/// Index of a color on a [`Grid`](crate::Grid), in order of first appearance.
pub type ColorId = usize;

/// One of a color's two flow endpoints.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Endpoint {
    pub color: ColorId,
    pub location: crate::Location,
}

impl Endpoint {
    pub fn new(color: ColorId, location: crate::Location) -> Self {
        Self { color, location }
    }
}
