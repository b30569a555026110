use crate::store::DocumentStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct AppState {
    pub store: DocumentStore,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: DocumentStore) -> SharedState {
        Arc::new(Self { store })
    }
}

#[derive(Debug, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub roll_no: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubjectQuery {
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<usize>,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            saved: None,
            students: None,
        }
    }
}
