//! GeoJSON rendering of journeys for the map view.
//!
//! The output is a flat JSON array: one `LineString` per journey, then a
//! `Feature` point per station visited.

use serde::Serialize;

use crate::domain::{Crs, Journey, JourneyId};
use crate::stations::StationTable;

use super::smooth::{Point, SMOOTHING_ITERATIONS, smooth};

/// A journey together with its recorded calling points.
#[derive(Debug, Clone)]
pub struct RoutedJourney {
    pub journey: Journey,
    pub route: Vec<Crs>,
}

impl RoutedJourney {
    /// Every station the line passes through, endpoints included.
    ///
    /// Uses the recorded calling points where there are any, otherwise
    /// the stops the user changed at.
    fn path(&self) -> Vec<Crs> {
        let interior = if self.route.is_empty() {
            &self.journey.via
        } else {
            &self.route
        };
        let mut path = Vec::with_capacity(interior.len() + 2);
        path.push(self.journey.from);
        path.extend_from_slice(interior);
        path.push(self.journey.to);
        path
    }
}

/// One element of the rendered array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Feature {
    Line(LineFeature),
    Station(StationFeature),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub properties: LineProperties,
    pub coordinates: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineProperties {
    pub id: JourneyId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub properties: StationProperties,
    pub geometry: PointGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationProperties {
    /// "CODE Full Name".
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    pub coordinates: Point,
}

const INTERMEDIARY: &str = "intermediary";

/// Build the features for a set of journeys.
///
/// Journeys with an endpoint missing from `stations` are left out;
/// unknown interior stations are skipped.
pub fn features(
    journeys: &[RoutedJourney],
    include_intermediaries: bool,
    stations: &StationTable,
) -> Vec<Feature> {
    let lines = journeys
        .iter()
        .filter_map(|routed| line(routed, stations))
        .map(Feature::Line);

    let points = visited_stations(journeys, include_intermediaries)
        .into_iter()
        .filter_map(|(crs, role)| {
            let detail = stations.detail(&crs)?;
            Some(Feature::Station(StationFeature {
                kind: "Feature",
                properties: StationProperties {
                    name: format!("{crs} {}", detail.name),
                    role,
                },
                geometry: PointGeometry {
                    kind: "Point",
                    coordinates: detail.position(),
                },
            }))
        });

    lines.chain(points).collect()
}

/// Render journeys as a GeoJSON feature array.
pub fn render(
    journeys: &[RoutedJourney],
    include_intermediaries: bool,
    stations: &StationTable,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&features(journeys, include_intermediaries, stations))
}

fn line(routed: &RoutedJourney, stations: &StationTable) -> Option<LineFeature> {
    let path = routed.path();
    let last = path.len() - 1;

    let mut coordinates = Vec::with_capacity(path.len());
    for (i, crs) in path.iter().enumerate() {
        match stations.detail(crs) {
            Some(detail) => coordinates.push(detail.position()),
            None if i == 0 || i == last => return None,
            None => {}
        }
    }

    Some(LineFeature {
        kind: "LineString",
        properties: LineProperties {
            id: routed.journey.id,
        },
        coordinates: smooth(&coordinates, SMOOTHING_ITERATIONS),
    })
}

/// Stations to mark, deduplicated in first-seen order.
fn visited_stations(
    journeys: &[RoutedJourney],
    include_intermediaries: bool,
) -> Vec<(Crs, Option<&'static str>)> {
    let mut seen = Vec::new();
    let mut push = |entry: (Crs, Option<&'static str>)| {
        if !seen.contains(&entry) {
            seen.push(entry);
        }
    };

    for routed in journeys {
        push((routed.journey.to, None));
        push((routed.journey.from, None));
        if include_intermediaries {
            for crs in &routed.journey.via {
                push((*crs, Some(INTERMEDIARY)));
            }
        }
    }

    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::StationDetail;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn stations() -> StationTable {
        [
            ("KGX", "London Kings Cross", 0.0, 51.0),
            ("PBO", "Peterborough", 0.0, 52.0),
            ("DON", "Doncaster", 1.0, 53.0),
            ("YRK", "York", 1.0, 54.0),
        ]
        .into_iter()
        .map(|(code, name, lon, lat)| {
            (
                crs(code),
                StationDetail {
                    name: name.to_string(),
                    lat,
                    lon,
                },
            )
        })
        .collect()
    }

    fn routed(from: &str, via: &[&str], to: &str, route: &[&str]) -> RoutedJourney {
        RoutedJourney {
            journey: Journey {
                id: JourneyId::new(),
                from: crs(from),
                to: crs(to),
                via: via.iter().map(|s| crs(s)).collect(),
                distance: 1.0,
                date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
                return_id: None,
            },
            route: route.iter().map(|s| crs(s)).collect(),
        }
    }

    fn lines(features: &[Feature]) -> Vec<&LineFeature> {
        features
            .iter()
            .filter_map(|f| match f {
                Feature::Line(line) => Some(line),
                Feature::Station(_) => None,
            })
            .collect()
    }

    #[test]
    fn two_point_line_is_not_smoothed() {
        let features = features(&[routed("KGX", &[], "YRK", &[])], false, &stations());
        let lines = lines(&features);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].coordinates, vec![[0.0, 51.0], [1.0, 54.0]]);
    }

    #[test]
    fn route_is_preferred_over_via() {
        let with_route = routed("KGX", &["DON"], "YRK", &["PBO", "DON"]);
        let without_route = routed("KGX", &["DON"], "YRK", &[]);

        assert_eq!(with_route.path(), vec![crs("KGX"), crs("PBO"), crs("DON"), crs("YRK")]);
        assert_eq!(without_route.path(), vec![crs("KGX"), crs("DON"), crs("YRK")]);

        let features = features(&[with_route], false, &stations());
        // Four points smoothed five times.
        assert_eq!(lines(&features)[0].coordinates.len(), 66);
    }

    #[test]
    fn unknown_endpoint_omits_journey() {
        let features = features(
            &[routed("EDB", &[], "YRK", &[]), routed("KGX", &[], "YRK", &[])],
            false,
            &stations(),
        );
        assert_eq!(lines(&features).len(), 1);
    }

    #[test]
    fn unknown_interior_station_is_skipped() {
        let features = features(&[routed("KGX", &[], "YRK", &["SVG", "PBO"])], false, &stations());
        let line = lines(&features)[0];
        // KGX, PBO, YRK survive: three points smoothed five times.
        assert_eq!(line.coordinates.len(), 34);
        assert_eq!(line.coordinates.first(), Some(&[0.0, 51.0]));
        assert_eq!(line.coordinates.last(), Some(&[1.0, 54.0]));
    }

    #[test]
    fn station_points_are_deduplicated_in_order() {
        let journeys = [
            routed("KGX", &["DON"], "YRK", &[]),
            routed("YRK", &["DON"], "KGX", &[]),
            routed("EDB", &[], "PBO", &[]),
        ];
        let names: Vec<_> = features(&journeys, true, &stations())
            .into_iter()
            .filter_map(|f| match f {
                Feature::Station(s) => Some((s.properties.name, s.properties.role)),
                Feature::Line(_) => None,
            })
            .collect();

        assert_eq!(
            names,
            vec![
                ("YRK York".to_string(), None),
                ("KGX London Kings Cross".to_string(), None),
                ("DON Doncaster".to_string(), Some("intermediary")),
                ("PBO Peterborough".to_string(), None),
            ]
        );
    }

    #[test]
    fn intermediaries_only_when_requested() {
        let features = features(&[routed("KGX", &["DON"], "YRK", &[])], false, &stations());
        assert_eq!(features.len(), 3);
    }

    #[test]
    fn renders_expected_json_shape() {
        let journey = routed("KGX", &[], "YRK", &[]);
        let id = journey.journey.id;
        let rendered = render(&[journey], false, &stations()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(
            value,
            json!([
                {
                    "type": "LineString",
                    "properties": {"id": id.to_string()},
                    "coordinates": [[0.0, 51.0], [1.0, 54.0]]
                },
                {
                    "type": "Feature",
                    "properties": {"name": "YRK York"},
                    "geometry": {"type": "Point", "coordinates": [1.0, 54.0]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "KGX London Kings Cross"},
                    "geometry": {"type": "Point", "coordinates": [0.0, 51.0]}
                }
            ])
        );
    }

    #[test]
    fn empty_input_renders_empty_array() {
        assert_eq!(render(&[], true, &stations()).unwrap(), "[]");
    }
}
