pub mod ids;
#[cfg(feature = "server")]
pub mod session;
