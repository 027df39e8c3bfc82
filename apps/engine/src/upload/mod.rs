pub mod controller;
pub mod job;
