pub mod accounts;
pub mod config;
pub mod map;
pub mod remote;
pub mod store;
pub mod timer;
pub use map::map_event::MapEvent;
