use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::errors::ValidationErrors;

pub const TITLE_MIN_LEN: usize = 3;
pub const DESCRIPTION_MIN_LEN: usize = 5;

/// A persisted to-do item. Written once, never updated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub file: Option<String>,  // stored upload filename
    pub created_at: DateTime<Utc>,
}

/// Raw task input as it arrives from a form.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub file: Option<String>,
}

/// Task input that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTask {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub file: Option<String>,
}

impl NewTask {
    pub fn new(title: &str, description: &str, due_date: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            due_date: Some(due_date.to_string()),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(self) -> Result<ValidTask, ValidationErrors> {
        let mut errors = ValidationErrors::new("Task");

        let title = present(self.title);
        match &title {
            None => errors.push("title", "Title is required"),
            Some(t) if t.chars().count() < TITLE_MIN_LEN => {
                errors.push("title", "Title must be at least 3 characters long")
            }
            Some(_) => {}
        }

        let description = present(self.description);
        match &description {
            None => errors.push("description", "Description is required"),
            Some(d) if d.chars().count() < DESCRIPTION_MIN_LEN => {
                errors.push("description", "Description must be at least 5 characters long")
            }
            Some(_) => {}
        }

        let due_date = match present(self.due_date) {
            None => {
                errors.push("dueDate", "Due date is required");
                None
            }
            Some(raw) => {
                let parsed = parse_due_date(&raw);
                if parsed.is_none() {
                    errors.push("dueDate", "Due date must be a valid date");
                }
                parsed
            }
        };

        match (title, description, due_date) {
            (Some(title), Some(description), Some(due_date)) if errors.is_empty() => Ok(ValidTask {
                title,
                description,
                due_date,
                file: present(self.file),
            }),
            _ => Err(errors),
        }
    }
}

impl ValidTask {
    /// The record to insert; the store assigns the id.
    pub fn into_task(self, created_at: DateTime<Utc>) -> Task {
        Task {
            id: String::new(),
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            file: self.file,
            created_at,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD` (what a date input posts) or a full RFC 3339 timestamp.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
