//! HTTP DTOs for batch endpoints.
//!
//! The JSON boundary between HTTP and the application layer. Full and
//! preview payloads are distinct types: the preview physically cannot
//! carry classes, messages, or the roster.

use serde::Serialize;

use crate::domain::batch::{BatchContent, BatchMessage, BatchPreview, ClassSession};

/// A class session with its content link (full payload only).
#[derive(Debug, Clone, Serialize)]
pub struct ClassSessionDto {
    pub title: String,
    pub link: String,
    pub scheduled_at: String,
}

impl From<&ClassSession> for ClassSessionDto {
    fn from(class: &ClassSession) -> Self {
        Self {
            title: class.title.clone(),
            link: class.link.clone(),
            scheduled_at: class.scheduled_at.as_datetime().to_rfc3339(),
        }
    }
}

/// A teacher message (full payload only).
#[derive(Debug, Clone, Serialize)]
pub struct BatchMessageDto {
    pub sender: String,
    pub body: String,
    pub sent_at: String,
}

impl From<&BatchMessage> for BatchMessageDto {
    fn from(message: &BatchMessage) -> Self {
        Self {
            sender: message.sender.to_string(),
            body: message.body.clone(),
            sent_at: message.sent_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Full batch payload for entitled viewers.
#[derive(Debug, Clone, Serialize)]
pub struct FullBatchResponse {
    pub access: &'static str,
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub capacity: u32,
    pub price: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub syllabus: Vec<String>,
    pub is_completed: bool,
    pub classes: Vec<ClassSessionDto>,
    pub messages: Vec<BatchMessageDto>,
    pub roster: Vec<String>,
}

impl From<BatchContent> for FullBatchResponse {
    fn from(content: BatchContent) -> Self {
        let batch = content.batch;
        Self {
            access: "full",
            id: batch.id.to_string(),
            code: batch.code.clone(),
            name: batch.name.clone(),
            description: batch.description.clone(),
            capacity: batch.capacity,
            price: batch.price,
            start_date: batch.start_date.as_datetime().to_rfc3339(),
            end_date: batch.end_date.map(|d| d.as_datetime().to_rfc3339()),
            syllabus: batch.syllabus.clone(),
            is_completed: batch.is_completed,
            classes: batch.classes.iter().map(ClassSessionDto::from).collect(),
            messages: batch.messages.iter().map(BatchMessageDto::from).collect(),
            roster: content.roster.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Sanitized batch payload for non-entitled viewers.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewBatchResponse {
    pub access: &'static str,
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub capacity: u32,
    pub price: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub syllabus: Vec<String>,
    pub is_completed: bool,
}

impl From<BatchPreview> for PreviewBatchResponse {
    fn from(preview: BatchPreview) -> Self {
        Self {
            access: "preview",
            id: preview.id.to_string(),
            code: preview.code,
            name: preview.name,
            description: preview.description,
            capacity: preview.capacity,
            price: preview.price,
            start_date: preview.start_date.as_datetime().to_rfc3339(),
            end_date: preview.end_date.map(|d| d.as_datetime().to_rfc3339()),
            syllabus: preview.syllabus,
            is_completed: preview.is_completed,
        }
    }
}
