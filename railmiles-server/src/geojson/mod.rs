//! Map rendering.

mod render;
mod smooth;

pub use render::{
    Feature, LineFeature, LineProperties, PointGeometry, RoutedJourney, StationFeature,
    StationProperties, features, render,
};
pub use smooth::{Point, SMOOTHING_ITERATIONS, smooth};
