use serde::Serialize;

/// Role name given to resources whose role reference does not resolve.
pub const DEFAULT_ROLE_NAME: &str = "Intervenant";

/// A person or team that can be allocated to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub role_name: String,
}

impl Resource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role_name: role_name.into(),
        }
    }
}
