pub mod counter;
pub mod labels;
pub mod model;
pub mod progress;
pub mod registry;
pub mod scoring;
pub mod time;
pub mod validation;

pub use time::Clock;
