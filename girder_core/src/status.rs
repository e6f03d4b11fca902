//! # Status Center
//!
//! Collects non-fatal warnings and the explanations that accompany fatal
//! validation failures, so a UI or report can show them after the fact.
//! Items carry a stable category so a whole category can be withdrawn when
//! the results that produced it are invalidated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable category of a status item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    /// Simplified distribution factor method in use
    LldfWarning,
    /// A prerequisite check failed and a refined analysis is required
    RefinedAnalysis,
    /// The shear critical section could not be located
    CriticalSection,
    /// Anything else raised while computing analysis results
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusItem {
    pub id: Uuid,
    pub category: StatusCategory,
    pub severity: Severity,
    pub message: String,
    pub posted_at: DateTime<Utc>,
}

/// Status collector owned by the analysis context
#[derive(Debug, Default)]
pub struct StatusCenter {
    items: Vec<StatusItem>,
}

impl StatusCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post an item. An identical message in the same category is posted once.
    pub fn post(&mut self, category: StatusCategory, severity: Severity, message: impl Into<String>) -> Uuid {
        let message = message.into();
        if let Some(existing) = self
            .items
            .iter()
            .find(|item| item.category == category && item.message == message)
        {
            return existing.id;
        }

        match severity {
            Severity::Error => log::error!("{}", message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Information => log::info!("{}", message),
        }

        let item = StatusItem {
            id: Uuid::new_v4(),
            category,
            severity,
            message,
            posted_at: Utc::now(),
        };
        let id = item.id;
        self.items.push(item);
        id
    }

    pub fn items(&self) -> &[StatusItem] {
        &self.items
    }

    pub fn items_in(&self, category: StatusCategory) -> impl Iterator<Item = &StatusItem> {
        self.items.iter().filter(move |item| item.category == category)
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before != self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_messages_posted_once() {
        let mut center = StatusCenter::new();
        let a = center.post(StatusCategory::LldfWarning, Severity::Warning, "Lever rule used");
        let b = center.post(StatusCategory::LldfWarning, Severity::Warning, "Lever rule used");
        assert_eq!(a, b);
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_remove_by_id() {
        let mut center = StatusCenter::new();
        let id = center.post(StatusCategory::Unknown, Severity::Error, "boom");
        center.post(StatusCategory::RefinedAnalysis, Severity::Error, "refined");
        assert!(center.remove(id));
        assert_eq!(center.items_in(StatusCategory::RefinedAnalysis).count(), 1);
        assert!(!center.remove(id));
    }
}
