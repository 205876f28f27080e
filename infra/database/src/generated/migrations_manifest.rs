//! Auto-generated by `cargo xtask codegen migrations`.
//! Do not edit by hand.

use crate::migrations::Migration;

#[must_use]
pub(crate) fn builtin_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            "sys.database",
            "Database",
            Some("Database infrastructure layer providing SurrealDB integration"),
            "0000-bootstrap",
            include_str!("../../../../infra/database/migrations/0000-bootstrap.surql"),
            "a763ee3aeec72973f06ade2ab4d68874f9a94fa0fc5f67257c27d0ac1d5cb616",
            true,
        ),
        Migration::new(
            "projects",
            "Projects",
            Some("Project catalog and sync credential slice"),
            "0000-schema",
            include_str!("../../../../crates/features/projects/migrations/0000-schema.surql"),
            "d8d5ee8fa8905d3064bc0872eb380babd51aa843c0bb0df1b2103a5b59636209",
            false,
        ),
        Migration::new(
            "signer",
            "Signer",
            Some("Ed25519 JWT signing service slice"),
            "0000-schema",
            include_str!("../../../../crates/features/signer/migrations/0000-schema.surql"),
            "6e6aa9584ad46d5e18496eb76ce740b46cffe9bc93abf6e373674d9c705301f9",
            false,
        ),
        Migration::new(
            "versions",
            "Versions",
            Some("Database artifact version registry and sync API slice"),
            "0000-schema",
            include_str!("../../../../crates/features/versions/migrations/0000-schema.surql"),
            "144e43a8e8e232c567bba4dd04093e37dab2f807bda8d891754eeb3e8e277f07",
            false,
        ),
    ]
}
