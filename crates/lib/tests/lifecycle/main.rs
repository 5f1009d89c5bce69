//! Integration tests for the registry lifecycle.

mod alias_tests;
mod boot_tests;
mod teardown_tests;
