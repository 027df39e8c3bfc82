pub mod selection;
pub mod stats;
pub mod store;
pub mod view;
