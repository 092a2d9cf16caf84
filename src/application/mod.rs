pub mod chart_service;
pub mod gestures;

pub use chart_service::*;
pub use gestures::*;
