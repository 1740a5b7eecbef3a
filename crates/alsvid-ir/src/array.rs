//! Physical array geometry.

use crate::error::{IrError, IrResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trap site coordinate on the array grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Site {
    /// Column coordinate.
    pub x: u32,
    /// Row coordinate.
    pub y: u32,
}

impl Site {
    /// Create a site at `(x, y)`.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another site.
    pub fn dist(&self, other: &Site) -> f64 {
        self.dist_sq(other).sqrt()
    }

    /// Squared Euclidean distance to another site.
    pub fn dist_sq(&self, other: &Site) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx * dx + dy * dy
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The physical grid geometry of a field-programmable qubit array.
///
/// Sites form a `width` x `height` grid. Every row and every column is a
/// controllable transport axis: atoms picked up along the same axis move
/// together and must preserve their relative order, which is the constraint
/// the router's compatibility predicate enforces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrayModel {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Maximum Euclidean distance at which two atoms can interact.
    pub interaction_radius: f64,
}

impl ArrayModel {
    /// Create an array model.
    pub fn new(width: u32, height: u32, interaction_radius: f64) -> Self {
        Self {
            width,
            height,
            interaction_radius,
        }
    }

    /// Total number of trap sites.
    pub fn num_sites(&self) -> u32 {
        self.width * self.height
    }

    /// Whether the site lies within the grid.
    pub fn contains(&self, site: Site) -> bool {
        site.x < self.width && site.y < self.height
    }

    /// Error unless the site lies within the grid.
    pub fn check_bounds(&self, site: Site) -> IrResult<()> {
        if self.contains(site) {
            Ok(())
        } else {
            Err(IrError::SiteOutOfBounds {
                x: site.x,
                y: site.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Whether two sites are within interaction range.
    pub fn in_range(&self, a: Site, b: Site) -> bool {
        a.dist(&b) <= self.interaction_radius + 1e-9
    }

    /// The site at a row-major index.
    pub fn site_at(&self, index: u32) -> Site {
        Site::new(index % self.width, index / self.width)
    }

    /// Row-major layout of the first `n` sites, the trivial placement.
    pub fn row_major(&self, n: u32) -> IrResult<Vec<Site>> {
        if n > self.num_sites() {
            return Err(IrError::ArrayTooSmall {
                qubits: n,
                sites: self.num_sites(),
            });
        }
        Ok((0..n).map(|i| self.site_at(i)).collect())
    }
}
