pub mod collections;
pub mod core;
pub mod grades;
pub mod schedule;
