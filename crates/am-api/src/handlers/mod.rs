//! Request handlers, one module per resource

pub mod assets;
pub mod employees;
pub mod users;

use serde::Serialize;
use uuid::Uuid;

/// Body of every successful mutation
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Body of a successful create: the message plus the new row's id
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub msg: String,
    pub id: Uuid,
}

impl CreatedResponse {
    pub fn new(msg: impl Into<String>, id: Uuid) -> Self {
        Self { msg: msg.into(), id }
    }
}
