/// Separates the service name from the method name in a `ServiceMethod`.
pub const SERVICE_METHOD_SEPARATOR: char = '.';

/// Metadata key a caller sets to bound how long the server may spend on a
/// request, in milliseconds.
pub const TIMEOUT_METADATA_KEY: &str = "timeout-ms";
