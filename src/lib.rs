// Dashboard schema migration and normalization engine
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
