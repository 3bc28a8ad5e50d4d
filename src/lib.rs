//! Declarative tag filters for OSM elements.
//!
//! A filter is written as `<kinds> with <expression>`, e.g.
//! `ways with surface ~ paved|unpaved and !surface:note`. Parsing yields an
//! immutable [`ElementFilter`] that can be evaluated against any number of
//! elements from any number of threads, and rendered as an Overpass QL
//! prefilter fragment for server-side candidate selection.

pub mod elementfilter;
pub mod mapdata;
pub mod overpass;
pub mod quests;

pub use elementfilter::{ElementFilter, FilterCache, ParseError, parse_filter};
pub use mapdata::{Element, ElementKind};
