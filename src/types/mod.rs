pub mod point;
pub mod route;
pub mod series;
