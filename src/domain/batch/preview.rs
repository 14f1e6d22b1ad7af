//! Sanitized batch projection for non-entitled viewers.
//!
//! Viewers without an active entitlement may still see a batch's public
//! face. The preview strips the paid content: class links, teacher
//! messages, and the roster.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BatchId, StudentId, Timestamp};

use super::Batch;

/// Full batch payload for entitled viewers: the entity plus its roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchContent {
    pub batch: Batch,
    pub roster: Vec<StudentId>,
}

/// Public projection of a batch. Retains name, description, price, and
/// schedule; omits classes, messages, and roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPreview {
    pub id: BatchId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub capacity: u32,
    pub price: i64,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub syllabus: Vec<String>,
    pub is_completed: bool,
}

impl BatchPreview {
    /// Build the sanitized projection of a batch.
    pub fn of(batch: &Batch) -> Self {
        Self {
            id: batch.id,
            code: batch.code.clone(),
            name: batch.name.clone(),
            description: batch.description.clone(),
            capacity: batch.capacity,
            price: batch.price,
            start_date: batch.start_date,
            end_date: batch.end_date,
            syllabus: batch.syllabus.clone(),
            is_completed: batch.is_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::ClassSession;
    use crate::domain::foundation::TeacherId;

    fn batch_with_content() -> Batch {
        let mut batch = Batch::new(
            BatchId::new(),
            "CHEM-1",
            "Chemistry Crash Course",
            TeacherId::new(),
            30,
            75_000,
            Timestamp::now(),
        )
        .unwrap();
        batch.syllabus = vec!["Stoichiometry".to_string(), "Bonding".to_string()];
        batch.classes.push(ClassSession {
            title: "Intro".to_string(),
            link: "https://meet.example.com/abc".to_string(),
            scheduled_at: Timestamp::now(),
        });
        batch
    }

    #[test]
    fn preview_retains_public_fields() {
        let batch = batch_with_content();
        let preview = BatchPreview::of(&batch);

        assert_eq!(preview.id, batch.id);
        assert_eq!(preview.name, batch.name);
        assert_eq!(preview.price, batch.price);
        assert_eq!(preview.syllabus, batch.syllabus);
    }

    #[test]
    fn preview_serialization_carries_no_class_links() {
        let batch = batch_with_content();
        let preview = BatchPreview::of(&batch);

        let json = serde_json::to_string(&preview).unwrap();
        assert!(!json.contains("meet.example.com"));
        assert!(!json.contains("classes"));
        assert!(!json.contains("messages"));
        assert!(!json.contains("roster"));
    }
}
