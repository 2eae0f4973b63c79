//! Unit test runner for loader
