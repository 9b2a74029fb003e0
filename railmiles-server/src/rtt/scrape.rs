//! Extraction of calling-point tables from RTT service pages.
//!
//! The detailed view of a service lists every location it calls at or
//! passes, each with cumulative miles and chains from the origin. There is
//! no API for this, so the table is scraped from the HTML.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::domain::Crs;

use super::types::Waypoint;

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".location.call, .location.pass").expect("valid selector"));
static LOCATION_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".location a").expect("valid selector"));
static MILES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.miles").expect("valid selector"));
static CHAINS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.chains").expect("valid selector"));
static CRS_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[A-Z]{3}").expect("valid regex"));

/// Extract the ordered waypoint table from a service detail page.
///
/// Rows whose location has no recognisable station code (junctions and
/// other timing points) are dropped; the order of the rest is preserved.
pub fn extract_waypoints(html: &str) -> Vec<Waypoint> {
    let document = Html::parse_document(html);

    document
        .select(&ROW)
        .filter_map(|row| {
            let link_text = first_text(row, &LOCATION_LINK)?;
            let station = CRS_CODE
                .find(&link_text)
                .and_then(|m| Crs::parse(m.as_str()).ok())?;
            let miles = first_text(row, &MILES);
            let chains = first_text(row, &CHAINS);
            Some(Waypoint::new(station, miles.as_deref(), chains.as_deref()))
        })
        .collect()
}

/// Concatenated text of the first element matching `selector` under `row`.
fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|el| el.text().collect::<String>())
}
