//! Batch entity.
//!
//! A batch is a paid course run owned by a teacher. Students gain access to
//! its content (class links, messages) through entitlements; everyone else
//! sees a sanitized preview.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: price is i64 paise/cents, never floats
//! - **Roster lives in the store**: membership is a relation keyed by
//!   (batch, student), not a list carried on this entity
//! - **Completion is one-way**: once completed, content visibility is
//!   governed by the paid-ever rule instead of expiry

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BatchId, TeacherId, Timestamp, ValidationError};

/// A scheduled (or past) class within a batch. The link is the paid content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub title: String,
    pub link: String,
    pub scheduled_at: Timestamp,
}

/// A message posted by the batch's teacher, visible to enrolled students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMessage {
    pub sender: TeacherId,
    pub body: String,
    pub sent_at: Timestamp,
}

/// Batch entity.
///
/// # Invariants
///
/// - `code` is unique across batches and non-empty
/// - `capacity >= 1`
/// - `price >= 0`
/// - `completed_at` is set iff `is_completed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique identifier for this batch.
    pub id: BatchId,

    /// Unique human-readable code (e.g. "PHY-2026-A").
    pub code: String,

    /// Display name.
    pub name: String,

    /// Public description shown in previews.
    pub description: String,

    /// Maximum roster size.
    pub capacity: u32,

    /// Price in minor currency units.
    pub price: i64,

    /// Teacher who owns this batch.
    pub teacher: TeacherId,

    /// First day of classes.
    pub start_date: Timestamp,

    /// Last day of classes, if scheduled.
    pub end_date: Option<Timestamp>,

    /// Topic outline shown in previews.
    pub syllabus: Vec<String>,

    /// Class sessions with content links.
    pub classes: Vec<ClassSession>,

    /// Teacher announcements.
    pub messages: Vec<BatchMessage>,

    /// Whether the batch has finished for good.
    pub is_completed: bool,

    /// When the batch was completed.
    pub completed_at: Option<Timestamp>,

    /// When the batch was created.
    pub created_at: Timestamp,

    /// When the batch was last updated.
    pub updated_at: Timestamp,
}

impl Batch {
    /// Create a new batch.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the code is empty, capacity is zero,
    /// or price is negative.
    pub fn new(
        id: BatchId,
        code: impl Into<String>,
        name: impl Into<String>,
        teacher: TeacherId,
        capacity: u32,
        price: i64,
        start_date: Timestamp,
    ) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ValidationError::empty_field("code"));
        }
        if capacity == 0 {
            return Err(ValidationError::out_of_range("capacity", 1, i64::MAX, 0));
        }
        if price < 0 {
            return Err(ValidationError::out_of_range("price", 0, i64::MAX, price));
        }

        let now = Timestamp::now();
        Ok(Self {
            id,
            code,
            name: name.into(),
            description: String::new(),
            capacity,
            price,
            teacher,
            start_date,
            end_date: None,
            syllabus: Vec::new(),
            classes: Vec::new(),
            messages: Vec::new(),
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Mark the batch as completed.
    ///
    /// Idempotent: completing an already-completed batch keeps the original
    /// completion time.
    pub fn complete(&mut self, at: Timestamp) {
        if self.is_completed {
            return;
        }
        self.is_completed = true;
        self.completed_at = Some(at);
        self.updated_at = at;
    }

    /// Returns true if the given teacher owns this batch.
    pub fn is_owned_by(&self, teacher: &TeacherId) -> bool {
        &self.teacher == teacher
    }
}
