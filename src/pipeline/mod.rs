pub mod geo;
pub mod parse;
pub mod planner;
pub mod playback;
pub mod progress;
pub mod projection;
pub mod proximity;
pub mod segment;
pub mod timeline;
