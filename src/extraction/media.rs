//! Map widget and photo thumbnail extraction

use std::collections::BTreeMap;

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::anchors::require;
use super::navigator::{AttrFilter, Navigate};
use crate::error::{Anchor, StructuralError};

/// Map box contents of a listing.
///
/// `map_attrs` holds every attribute of the map widget element verbatim
/// (`data-latitude`, `data-longitude`, `data-accuracy`, ...). They are not
/// interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Text of `div.mapaddress`, when the map box has one
    pub mapaddress: Option<String>,
    /// Attributes of `div#map`
    pub map_attrs: BTreeMap<String, String>,
}

/// Read the `div.mapbox` under the map/attributes region.
///
/// Returns `None` when the region or the map box is absent. A map box
/// without an address block still yields `Some`, with `mapaddress: None`.
pub fn map_info(map_and_attrs: Option<ElementRef<'_>>) -> Option<MapInfo> {
    let mapbox = map_and_attrs?.find("div", AttrFilter::Class("mapbox"))?;

    let map_attrs = match mapbox.find("div", AttrFilter::Id("map")) {
        Some(widget) => widget
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        None => {
            debug!("map box without map widget");
            BTreeMap::new()
        }
    };

    let mapaddress = mapbox
        .find("div", AttrFilter::Class("mapaddress"))
        .map(|div| div.rendered_text());

    Some(MapInfo {
        mapaddress,
        map_attrs,
    })
}

/// Link targets of every anchor in the `figure div#thumbs` container, in
/// document order. Anchors without an `href` are skipped.
///
/// With `require_container` unset, a missing figure or container yields an
/// empty list instead of an error.
///
/// # Errors
///
/// [`Anchor::Thumbnails`] when the container is missing and required.
pub fn thumb_links(
    user_body: ElementRef<'_>,
    require_container: bool,
) -> Result<Vec<String>, StructuralError> {
    let thumbs = user_body
        .find("figure", AttrFilter::Any)
        .and_then(|figure| figure.find("div", AttrFilter::Id("thumbs")));

    let Some(thumbs) = thumbs else {
        if require_container {
            return require(None, Anchor::Thumbnails);
        }
        debug!("no thumbnail container, treating as no photos");
        return Ok(Vec::new());
    };

    Ok(thumbs
        .find_all("a", AttrFilter::Any)
        .into_iter()
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect())
}
