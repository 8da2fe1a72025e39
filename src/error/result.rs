//! Result type alias for console operations.

use super::console_error::ConsoleError;

/// Type alias for Results using ConsoleError.
///
/// # Example
///
/// ```ignore
/// use agentview::error::ConsoleResult;
///
/// fn load() -> ConsoleResult<ConsoleConfig> {
///     Ok(ConsoleConfig::from_env()?)
/// }
/// ```
pub type ConsoleResult<T> = Result<T, ConsoleError>;
