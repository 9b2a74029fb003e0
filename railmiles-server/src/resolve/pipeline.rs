//! The distance resolution pipeline.
//!
//! For each leg of a journey: find candidate services, then try them in
//! order, scraping each one's calling-point table until one yields a
//! mileage for both ends of the leg.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{Crs, DistanceWithRoute, ServiceUid};
use crate::progress::ProgressSink;
use crate::rtt::{Timetable, Waypoint};

use super::error::ResolveError;
use super::fallback::{Attempt, FallbackError, first_success};

/// Configuration for distance resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Most candidate services tried per leg.
    pub max_candidates: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_candidates: 10 }
    }
}

/// Resolves journey distances against a timetable.
pub struct Resolver<T> {
    timetable: T,
    config: ResolverConfig,
}

impl<T: Timetable> Resolver<T> {
    pub fn new(timetable: T, config: ResolverConfig) -> Self {
        Self { timetable, config }
    }

    pub fn timetable(&self) -> &T {
        &self.timetable
    }

    /// Resolve the distance travelled through `stations` on `date`.
    ///
    /// `known_services[i]` is the service taken from `stations[i]` to
    /// `stations[i + 1]`, if the user knows it. The returned route holds
    /// every calling point strictly between the first and last station,
    /// including the stations where the user changed.
    pub async fn resolve<S: ProgressSink>(
        &self,
        stations: &[Crs],
        known_services: &[Option<ServiceUid>],
        date: NaiveDate,
        progress: &S,
    ) -> Result<DistanceWithRoute, ResolveError> {
        if stations.len() < 2 {
            return Err(ResolveError::InvalidRequest(format!(
                "a journey needs at least two stations, got {}",
                stations.len()
            )));
        }
        if known_services.len() != stations.len() - 1 {
            return Err(ResolveError::InvalidRequest(format!(
                "expected {} service entries for {} stations, got {}",
                stations.len() - 1,
                stations.len(),
                known_services.len()
            )));
        }

        let mut total = DistanceWithRoute::default();

        for (i, (pair, known)) in stations.windows(2).zip(known_services).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let leg = self
                .resolve_leg(from, to, known.as_ref(), date, progress)
                .await?;

            info!(%from, %to, distance = leg.distance, "resolved leg");
            progress
                .status(format!("Leg {from} → {to}: {:.2} miles", leg.distance))
                .await;

            let boundary = (i > 0).then_some(from);
            total.push_leg(boundary, leg);
        }

        Ok(total)
    }

    async fn resolve_leg<S: ProgressSink>(
        &self,
        from: Crs,
        to: Crs,
        known: Option<&ServiceUid>,
        date: NaiveDate,
        progress: &S,
    ) -> Result<DistanceWithRoute, ResolveError> {
        let candidates = match known {
            Some(uid) => vec![uid.clone()],
            None => self.discover(from, to, date, progress).await?,
        };
        let count = candidates.len();

        let outcome = first_success(candidates.into_iter().enumerate(), |(k, uid)| async move {
            progress
                .status(format!("Trying service {uid} ({} of {count})", k + 1))
                .await;
            self.try_candidate(&uid, from, to, date, progress).await
        })
        .await;

        match outcome {
            Ok(leg) => Ok(leg),
            Err(FallbackError::Empty) => Err(ResolveError::NoRouteFound { from, to }),
            Err(FallbackError::Exhausted(err)) => {
                warn!(%from, %to, error = %err, "no candidate yielded a mileage");
                Err(ResolveError::ManualDistanceRequired { from, to })
            }
            Err(FallbackError::Aborted(err)) => Err(err),
        }
    }

    /// Search for usable services between two stations.
    async fn discover<S: ProgressSink>(
        &self,
        from: Crs,
        to: Crs,
        date: NaiveDate,
        progress: &S,
    ) -> Result<Vec<ServiceUid>, ResolveError> {
        progress
            .status(format!("Searching for services between {from} and {to}"))
            .await;

        let candidates: Vec<ServiceUid> = self
            .timetable
            .search(&from, &to, date)
            .await?
            .into_iter()
            .filter(|service| service.is_usable_on(date))
            .map(|service| service.uid)
            .take(self.config.max_candidates)
            .collect();

        debug!(%from, %to, count = candidates.len(), "discovered candidates");
        progress
            .status(format!("Found {} candidate services", candidates.len()))
            .await;

        Ok(candidates)
    }

    async fn try_candidate<S: ProgressSink>(
        &self,
        uid: &ServiceUid,
        from: Crs,
        to: Crs,
        date: NaiveDate,
        progress: &S,
    ) -> Attempt<DistanceWithRoute, ResolveError> {
        let waypoints = match self.timetable.waypoints(uid, date).await {
            Ok(waypoints) => waypoints,
            Err(err) => {
                warn!(%uid, error = %err, "failed to fetch service page");
                return Attempt::Soft(err.into());
            }
        };

        match leg_between(&waypoints, from, to) {
            Ok(Some(leg)) => Attempt::Success(leg),
            Ok(None) => {
                progress
                    .status(format!(
                        "Service {uid} has no mileage for {from} → {to}, trying next"
                    ))
                    .await;
                Attempt::Soft(ResolveError::ManualDistanceRequired { from, to })
            }
            Err(err) => Attempt::Hard(err),
        }
    }
}

/// Distance and calling points of one leg along a service's waypoints.
///
/// `Ok(None)` when the service doesn't publish mileage at either end.
pub fn leg_between(
    waypoints: &[Waypoint],
    from: Crs,
    to: Crs,
) -> Result<Option<DistanceWithRoute>, ResolveError> {
    let ends: Vec<&Waypoint> = waypoints
        .iter()
        .filter(|w| w.station == from || w.station == to)
        .collect();
    let [start, end] = ends.as_slice() else {
        return Err(ResolveError::UnexpectedWaypointCount {
            from,
            to,
            found: ends.len(),
        });
    };

    let (Some(a), Some(b)) = (start.mileage()?, end.mileage()?) else {
        return Ok(None);
    };
    let distance = a.distance_to(&b);

    Ok(Some(DistanceWithRoute::new(
        distance,
        calling_points(waypoints, from, to)?,
    )))
}

/// The stations strictly between `from` and `to` along `waypoints`.
fn calling_points(waypoints: &[Waypoint], from: Crs, to: Crs) -> Result<Vec<Crs>, ResolveError> {
    let mut between = false;
    let mut route = Vec::new();

    for waypoint in waypoints {
        if waypoint.station == to {
            if !between {
                return Err(ResolveError::MalformedRoute { from, to });
            }
            break;
        }
        if between {
            route.push(waypoint.station);
        }
        if waypoint.station == from {
            between = true;
        }
    }

    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtt::mock::{MockRequest, MockTimetable, candidate, waypoint};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<String>>);

    impl RecordingSink {
        fn messages(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    impl ProgressSink for RecordingSink {
        async fn status(&self, message: String) {
            self.0.lock().push(message);
        }
    }

    fn crs(s: &str) -> Crs {
        Crs::parse(s).unwrap()
    }

    fn uid(s: &str) -> ServiceUid {
        ServiceUid::parse(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn resolver(mock: MockTimetable) -> Resolver<MockTimetable> {
        Resolver::new(mock, ResolverConfig::default())
    }

    /// KGX - SVG - PBO - DON - YRK on the East Coast main line.
    fn ecml() -> Vec<Waypoint> {
        vec![
            waypoint("KGX", Some((0, 0))),
            waypoint("SVG", Some((27, 43))),
            waypoint("PBO", Some((76, 23))),
            waypoint("DON", Some((155, 77))),
            waypoint("YRK", Some((188, 40))),
        ]
    }

    #[test]
    fn leg_distance_and_calling_points() {
        let leg = leg_between(&ecml(), crs("SVG"), crs("DON")).unwrap().unwrap();
        assert_eq!(leg.distance, (155.0 + 77.0 / 80.0) - (27.0 + 43.0 / 80.0));
        assert_eq!(leg.route, vec![crs("PBO")]);
    }

    #[test]
    fn adjacent_stations_have_empty_route() {
        let leg = leg_between(&ecml(), crs("KGX"), crs("SVG")).unwrap().unwrap();
        assert_eq!(leg.route, Vec::<Crs>::new());
    }

    #[test]
    fn missing_mileage_at_either_end_is_none() {
        let waypoints = vec![
            waypoint("KGX", Some((0, 0))),
            waypoint("PBO", None),
            waypoint("YRK", Some((188, 40))),
        ];
        assert!(leg_between(&waypoints, crs("KGX"), crs("PBO")).unwrap().is_none());
        assert!(leg_between(&waypoints, crs("PBO"), crs("YRK")).unwrap().is_none());
        assert!(leg_between(&waypoints, crs("KGX"), crs("YRK")).unwrap().is_some());
    }

    #[test]
    fn station_missing_from_service_is_unexpected_count() {
        let err = leg_between(&ecml(), crs("KGX"), crs("EDB")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnexpectedWaypointCount { found: 1, .. }
        ));
    }

    #[test]
    fn station_listed_twice_is_unexpected_count() {
        let mut waypoints = ecml();
        waypoints.push(waypoint("KGX", Some((200, 0))));
        let err = leg_between(&waypoints, crs("KGX"), crs("YRK")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnexpectedWaypointCount { found: 3, .. }
        ));
    }

    #[test]
    fn destination_before_departure_is_malformed() {
        let err = leg_between(&ecml(), crs("YRK"), crs("KGX")).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedRoute { .. }));
    }

    #[test]
    fn unparseable_mileage_is_an_error() {
        let waypoints = vec![
            Waypoint::new(crs("KGX"), Some("0"), Some("0")),
            Waypoint::new(crs("YRK"), Some("18B"), Some("40")),
        ];
        let err = leg_between(&waypoints, crs("KGX"), crs("YRK")).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedMileage(_)));
    }

    #[tokio::test]
    async fn multi_leg_journey_sums_distances_and_joins_routes() {
        let mock = MockTimetable::new()
            .with_page(
                "P11111",
                vec![
                    waypoint("KGX", Some((0, 0))),
                    waypoint("SVG", Some((27, 43))),
                    waypoint("PBO", Some((76, 23))),
                ],
            )
            .with_page(
                "P22222",
                vec![
                    waypoint("PBO", Some((10, 0))),
                    waypoint("ELY", Some((30, 40))),
                    waypoint("NRW", Some((90, 0))),
                ],
            );
        let sink = RecordingSink::default();

        let result = resolver(mock)
            .resolve(
                &[crs("KGX"), crs("PBO"), crs("NRW")],
                &[Some(uid("P11111")), Some(uid("P22222"))],
                date(),
                &sink,
            )
            .await
            .unwrap();

        assert_eq!(result.distance, (76.0 + 23.0 / 80.0) + 80.0);
        assert_eq!(result.route, vec![crs("SVG"), crs("PBO"), crs("ELY")]);
    }

    #[tokio::test]
    async fn single_candidate_without_mileage_needs_manual_distance() {
        let mock = MockTimetable::new().with_page(
            "P11111",
            vec![waypoint("KGX", None), waypoint("YRK", None)],
        );

        let err = resolver(mock)
            .resolve(
                &[crs("KGX"), crs("YRK")],
                &[Some(uid("P11111"))],
                date(),
                &RecordingSink::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::ManualDistanceRequired { from, to } if from == crs("KGX") && to == crs("YRK")
        ));
        assert!(err.is_user_error());
    }

    #[tokio::test]
    async fn discovery_filters_and_falls_back_in_order() {
        let other_day = date().pred_opt().unwrap();
        let mut cancelled = candidate("C00000", date());
        cancelled.is_cancelled = true;
        let mut freight = candidate("F00000", date());
        freight.is_passenger = false;

        let mock = MockTimetable::new()
            .with_search(
                crs("KGX"),
                crs("YRK"),
                vec![
                    candidate("D00000", other_day),
                    cancelled,
                    freight,
                    candidate("A11111", date()),
                    candidate("B22222", date()),
                    candidate("C33333", date()),
                ],
            )
            .with_page(
                "A11111",
                vec![waypoint("KGX", Some((0, 0))), waypoint("YRK", None)],
            )
            .with_page_timeout("B22222")
            .with_page("C33333", ecml())
            .with_page("Z99999", ecml());
        let resolver = resolver(mock);
        let sink = RecordingSink::default();

        let result = resolver
            .resolve(&[crs("KGX"), crs("YRK")], &[None], date(), &sink)
            .await
            .unwrap();

        assert_eq!(result.distance, 188.5);
        assert_eq!(result.route, vec![crs("SVG"), crs("PBO"), crs("DON")]);
        assert_eq!(
            resolver.timetable().pages_fetched(),
            vec!["A11111", "B22222", "C33333"]
        );
        assert_eq!(
            sink.messages(),
            vec![
                "Searching for services between KGX and YRK",
                "Found 3 candidate services",
                "Trying service A11111 (1 of 3)",
                "Service A11111 has no mileage for KGX → YRK, trying next",
                "Trying service B22222 (2 of 3)",
                "Trying service C33333 (3 of 3)",
                "Leg KGX → YRK: 188.50 miles",
            ]
        );
    }

    #[tokio::test]
    async fn candidates_are_capped() {
        let candidates = (0..15)
            .map(|i| candidate(&format!("P{i:05}"), date()))
            .collect();
        let mock = MockTimetable::new().with_search(crs("KGX"), crs("YRK"), candidates);
        let resolver = Resolver::new(mock, ResolverConfig { max_candidates: 4 });

        let err = resolver
            .resolve(&[crs("KGX"), crs("YRK")], &[None], date(), &RecordingSink::default())
            .await
            .unwrap_err();

        // No pages are registered, so every candidate fails to fetch.
        assert!(matches!(err, ResolveError::ManualDistanceRequired { .. }));
        assert_eq!(resolver.timetable().pages_fetched().len(), 4);
    }

    #[tokio::test]
    async fn exhausted_candidates_need_manual_distance_in_any_order() {
        let no_mileage = vec![waypoint("KGX", None), waypoint("YRK", None)];
        for order in [["A11111", "B22222"], ["B22222", "A11111"]] {
            let mock = MockTimetable::new()
                .with_search(
                    crs("KGX"),
                    crs("YRK"),
                    order.iter().map(|uid| candidate(uid, date())).collect(),
                )
                .with_page("A11111", no_mileage.clone())
                .with_page_timeout("B22222");
            let resolver = resolver(mock);

            let err = resolver
                .resolve(&[crs("KGX"), crs("YRK")], &[None], date(), &RecordingSink::default())
                .await
                .unwrap_err();

            assert!(
                matches!(
                    err,
                    ResolveError::ManualDistanceRequired { from, to }
                        if from == crs("KGX") && to == crs("YRK")
                ),
                "{order:?}: {err:?}"
            );
            assert!(err.is_user_error());
            assert_eq!(resolver.timetable().pages_fetched().len(), 2);
        }
    }

    #[tokio::test]
    async fn hard_failure_stops_trying_candidates() {
        let mock = MockTimetable::new()
            .with_search(
                crs("KGX"),
                crs("YRK"),
                vec![candidate("A11111", date()), candidate("B22222", date())],
            )
            .with_page("A11111", vec![waypoint("KGX", Some((0, 0)))])
            .with_page("B22222", ecml());
        let resolver = resolver(mock);

        let err = resolver
            .resolve(&[crs("KGX"), crs("YRK")], &[None], date(), &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::UnexpectedWaypointCount { .. }));
        assert_eq!(resolver.timetable().pages_fetched(), vec!["A11111"]);
    }

    #[tokio::test]
    async fn no_candidates_is_no_route() {
        let err = resolver(MockTimetable::new())
            .resolve(&[crs("KGX"), crs("YRK")], &[None], date(), &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::NoRouteFound { .. }));
    }

    #[tokio::test]
    async fn known_service_skips_search() {
        let resolver = resolver(MockTimetable::new().with_page("P11111", ecml()));

        resolver
            .resolve(
                &[crs("KGX"), crs("YRK")],
                &[Some(uid("P11111"))],
                date(),
                &RecordingSink::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            resolver.timetable().requests(),
            vec![MockRequest::Page {
                uid: "P11111".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn rejects_malformed_requests() {
        let resolver = resolver(MockTimetable::new());
        let sink = RecordingSink::default();

        let err = resolver
            .resolve(&[crs("KGX")], &[], date(), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidRequest(_)));

        let err = resolver
            .resolve(&[crs("KGX"), crs("YRK")], &[None, None], date(), &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidRequest(_)));
    }
}
