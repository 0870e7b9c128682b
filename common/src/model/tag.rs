use serde::{Deserialize, Serialize};

/// Binds a placeholder name to a column of the uploaded data.
///
/// The placeholder appears in a template as `{{name}}` and is replaced, per
/// recipient, with that recipient's value in `column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBinding {
    pub name: String,
    pub column: String,
}

impl TagBinding {
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
        }
    }

    /// The literal text an editor inserts at the cursor for this tag.
    pub fn marker(&self) -> String {
        marker(&self.name)
    }
}

/// Formats `name` as a template placeholder: `{{name}}`.
pub fn marker(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("tag name must not be empty")]
    EmptyName,
    #[error("tag '{0}' must be bound to a column")]
    EmptyColumn(String),
    #[error("tag name '{0}' already exists")]
    DuplicateName(String),
    #[error("tag name '{0}' must not contain '{{' or '}}'")]
    BraceInName(String),
}

/// Ordered set of tag bindings with unique names.
///
/// Insertion order is kept; adding a name that already exists is rejected.
/// Several names may point at the same column. Deserialization goes through
/// the same checks as [`TagSet::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TagBinding>", into = "Vec<TagBinding>")]
pub struct TagSet(Vec<TagBinding>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, binding: TagBinding) -> Result<(), TagError> {
        let name = binding.name.trim();
        if name.is_empty() {
            return Err(TagError::EmptyName);
        }
        if name.contains(['{', '}']) {
            return Err(TagError::BraceInName(name.to_string()));
        }
        if binding.column.trim().is_empty() {
            return Err(TagError::EmptyColumn(name.to_string()));
        }
        if self.get(name).is_some() {
            return Err(TagError::DuplicateName(name.to_string()));
        }
        self.0.push(TagBinding::new(name, binding.column.trim()));
        Ok(())
    }

    /// Removes the binding named `name`; returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|tag| tag.name != name);
        self.0.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&TagBinding> {
        self.0.iter().find(|tag| tag.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagBinding> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<TagBinding>> for TagSet {
    type Error = TagError;

    fn try_from(bindings: Vec<TagBinding>) -> Result<Self, Self::Error> {
        let mut set = TagSet::new();
        for binding in bindings {
            set.add(binding)?;
        }
        Ok(set)
    }
}

impl From<TagSet> for Vec<TagBinding> {
    fn from(set: TagSet) -> Self {
        set.0
    }
}
