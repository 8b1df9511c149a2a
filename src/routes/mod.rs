pub mod health;
pub mod playback;
pub mod route;
pub mod upload;
