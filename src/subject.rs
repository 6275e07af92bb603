//! Registry subjects and naming strategies

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoderError, Result};

/// Registry namespace a schema is registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    /// Create a subject, rejecting blank names
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoderError::InvalidSubject(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Subject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Subject {
    type Error = CoderError;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        subject.0
    }
}

/// How a subject name is derived for a data stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectNameStrategy {
    /// `<topic>-key` or `<topic>-value`
    #[default]
    TopicName,
    /// Fully qualified record name, independent of topic
    RecordName,
    /// `<topic>-<record name>`
    TopicRecordName,
}

impl SubjectNameStrategy {
    /// Derive the subject for a topic and record
    ///
    /// `record_name` is only consulted by the record-based strategies.
    pub fn subject_for(self, topic: &str, record_name: &str, is_key: bool) -> Result<Subject> {
        match self {
            SubjectNameStrategy::TopicName => {
                let suffix = if is_key { "key" } else { "value" };
                Subject::new(format!("{}-{}", topic, suffix))
            }
            SubjectNameStrategy::RecordName => Subject::new(record_name),
            SubjectNameStrategy::TopicRecordName => {
                Subject::new(format!("{}-{}", topic, record_name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_subject_rejected() {
        assert!(Subject::new("orders-value").is_ok());
        assert!(matches!(Subject::new(""), Err(CoderError::InvalidSubject(_))));
        assert!(matches!(Subject::new("  "), Err(CoderError::InvalidSubject(_))));
    }

    #[test]
    fn test_strategies() {
        let derive = |strategy: SubjectNameStrategy, is_key: bool| {
            strategy
                .subject_for("orders", "dev.familiar.Order", is_key)
                .unwrap()
                .to_string()
        };

        assert_eq!(derive(SubjectNameStrategy::TopicName, false), "orders-value");
        assert_eq!(derive(SubjectNameStrategy::TopicName, true), "orders-key");
        assert_eq!(derive(SubjectNameStrategy::RecordName, false), "dev.familiar.Order");
        assert_eq!(
            derive(SubjectNameStrategy::TopicRecordName, false),
            "orders-dev.familiar.Order"
        );
    }

    #[test]
    fn test_serde_validates() {
        let subject: Subject = serde_json::from_str(r#""orders-value""#).unwrap();
        assert_eq!(subject.to_string(), "orders-value");
        assert!(serde_json::from_str::<Subject>(r#""""#).is_err());
    }
}
