//! Error handling for the console.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Domain-specific Errors**: Stream and configuration errors
//! - **Unified Error Type**: `ConsoleError` consolidates them for the binary
//! - **Result Type Alias**: `ConsoleResult<T>`
//!
//! Frame-level problems are not errors at this level. A malformed or unknown
//! frame is recorded in the session's diagnostics and consumption continues;
//! only transport failures and cancellation reach the caller.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection refused, dropped stream, timeout | Yes |
//! | Server | Service answered 5xx | Yes |
//! | Client | Bad request, invalid URL | No |
//! | User | Empty task, cancelled or superseded run | No |
//! | Configuration | Bad environment value or flag | No |

mod category;
mod config;
mod console_error;
mod result;
mod stream;

// Re-export all public types
pub use category::ErrorCategory;
pub use config::ConfigError;
pub use console_error::ConsoleError;
pub use result::ConsoleResult;
pub use stream::StreamError;
