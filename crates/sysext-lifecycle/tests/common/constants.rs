//! Shared test constants

/// Extension identifier used by every test request
pub const TEST_IDENTIFIER: &str = "org.example.driverkit.TestExtension";

/// Identifier that no test service knows about
pub const UNKNOWN_IDENTIFIER: &str = "org.example.driverkit.Unknown";
