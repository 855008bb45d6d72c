pub mod listing;
pub mod model;
