//! Sample user directory.

use std::time::Duration;

use async_trait::async_trait;
use tabula::resource::{DataSource, ResourceError};
use tabula::table::{CellValue, TableRow};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub role: String,
    pub is_active: bool,
}

impl TableRow for User {
    fn value(&self, key: &str) -> CellValue {
        match key {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "age" => self.age.into(),
            "role" => self.role.as_str().into(),
            "isActive" => self.is_active.into(),
            _ => CellValue::Empty,
        }
    }

    fn row_id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

fn user(id: u32, name: &str, email: &str, age: u32, role: &str, is_active: bool) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        age,
        role: role.to_string(),
        is_active,
    }
}

pub fn sample() -> Vec<User> {
    vec![
        user(1, "John Doe", "john@example.com", 30, "admin", true),
        user(2, "Jane Smith", "jane@example.com", 25, "user", true),
        user(3, "Bob Johnson", "bob@example.com", 35, "moderator", false),
        user(4, "Alice Brown", "alice@example.com", 28, "user", true),
    ]
}

/// Serves [`sample`] after a simulated network latency.
pub struct SampleDirectory {
    latency: Duration,
}

impl SampleDirectory {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl DataSource<Vec<User>> for SampleDirectory {
    async fn fetch(&self) -> Result<Vec<User>, ResourceError> {
        log::debug!("Fetching users ({:?} latency)", self.latency);
        tokio::time::sleep(self.latency).await;
        Ok(sample())
    }
}
