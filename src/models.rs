//! Wire models for the generation service.

use serde::{Deserialize, Serialize};

/// Body of `POST /generate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Free-form task description, or a problem statement with code
    pub task: String,
}

impl GenerateRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into() }
    }
}
