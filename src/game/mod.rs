pub mod constants;
pub mod geometry;
pub mod registry;
pub mod room;
pub mod snake;
pub mod target;
