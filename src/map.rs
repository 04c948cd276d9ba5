/// Owns the map and routes events to the parts below.
pub mod controller;
/// Contains everything needed to handle coordinates.
pub mod coordinates;
/// Hover, selection and marker placement.
pub mod interaction;
/// Events the controller reacts to.
pub mod map_event;
/// One marker per saved location.
pub mod markers;
/// Country outlines and where to look at them.
pub mod region;
/// What the controller needs from the map library.
pub mod surface;
/// Globe or flat, derived from the zoom.
pub mod view_mode;
