use std::path::PathBuf;

use thiserror::Error;

/// The plan document could not be read or is not the expected tree.
///
/// A parse failure never yields a partial model.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read plan document {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed plan document at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("plan document has no <project> root element")]
    MissingRoot,

    #[error("<{element}> is missing its {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("task {task_id}: invalid {attribute} value '{value}'")]
    InvalidAttribute {
        task_id: String,
        attribute: &'static str,
        value: String,
    },

    #[error("plan document ended inside <{element}>")]
    UnexpectedEof { element: String },
}

/// An edit payload carried an out-of-range value. Nothing was changed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}{field}: {message}", task_prefix(.task_id))]
pub struct ValidationError {
    pub task_id: Option<String>,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn for_task(task_id: &str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.to_string()),
            field,
            message: message.into(),
        }
    }

    pub fn for_view(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            task_id: None,
            field,
            message: message.into(),
        }
    }
}

fn task_prefix(task_id: &Option<String>) -> String {
    match task_id {
        Some(id) => format!("task {id}: "),
        None => String::new(),
    }
}

/// Internal guard raised when the project range has no positive extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("layout range is degenerate ({total_days} days)")]
pub struct LayoutDegenerate {
    pub total_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_task_and_field() {
        let err = ValidationError::for_task("12", "duration", "must not be negative (got -3)");
        assert_eq!(err.to_string(), "task 12: duration: must not be negative (got -3)");
    }

    #[test]
    fn view_validation_has_no_task_prefix() {
        let err = ValidationError::for_view("zoom", "must be positive");
        assert_eq!(err.to_string(), "zoom: must be positive");
    }

    #[test]
    fn invalid_attribute_mentions_task() {
        let err = ParseError::InvalidAttribute {
            task_id: "4".into(),
            attribute: "duration",
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "task 4: invalid duration value 'abc'");
    }
}
