//! Integration tests entry point, following https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

#[macro_use]
mod tracing_utils;
mod common;

mod repo_selection;
