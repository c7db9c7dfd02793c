//! Unit tests for the database module

mod repository_tests;
