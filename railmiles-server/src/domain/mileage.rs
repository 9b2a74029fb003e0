//! Distances along the rail network.
//!
//! Service detail pages report cumulative distance from the origin as
//! whole miles plus chains. There are exactly 80 chains to the mile.

use crate::domain::Crs;

/// Chains in one mile.
pub const CHAINS_PER_MILE: f32 = 80.0;

/// Convert a chain count to (fractional) miles.
pub fn chains_to_miles(chains: u32) -> f32 {
    chains as f32 / CHAINS_PER_MILE
}

/// A cumulative miles-and-chains position along a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mileage {
    pub miles: u32,
    pub chains: u32,
}

impl Mileage {
    pub fn new(miles: u32, chains: u32) -> Self {
        Self { miles, chains }
    }

    /// The position in fractional miles.
    ///
    /// ```
    /// use railmiles_server::domain::Mileage;
    ///
    /// assert_eq!(Mileage::new(5, 40).as_miles(), 5.5);
    /// ```
    pub fn as_miles(&self) -> f32 {
        self.miles as f32 + chains_to_miles(self.chains)
    }

    /// Absolute distance between two positions on the same service.
    pub fn distance_to(&self, other: &Mileage) -> f32 {
        (self.as_miles() - other.as_miles()).abs()
    }
}

/// A resolved distance together with the intermediate calling points.
///
/// The route never contains the endpoints of the span it describes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceWithRoute {
    pub distance: f32,
    pub route: Vec<Crs>,
}

impl DistanceWithRoute {
    pub fn new(distance: f32, route: Vec<Crs>) -> Self {
        Self { distance, route }
    }

    /// A manually entered distance, for which no route is known.
    pub fn manual(distance: f32) -> Self {
        Self {
            distance,
            route: Vec::new(),
        }
    }

    /// Append the next leg, which departs from `boundary`.
    ///
    /// `boundary` is where the previous leg arrived; it becomes part of the
    /// combined route because it is interior to the whole journey.
    pub fn push_leg(&mut self, boundary: Option<Crs>, leg: DistanceWithRoute) {
        self.distance += leg.distance;
        if let Some(boundary) = boundary {
            self.route.push(boundary);
        }
        self.route.extend(leg.route);
    }
}
