//! Output of `cargo xtask codegen`. Do not edit by hand.

pub(crate) mod migrations_manifest;
