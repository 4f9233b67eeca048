pub mod accounts;
pub mod analytics;
pub mod attendance;
pub mod backup;
pub mod classes;
pub mod core;
pub mod diary;
pub mod school;
pub mod setup;
pub mod students;
