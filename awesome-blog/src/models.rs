use awesome_orm::Model;
use serde::{Deserialize, Serialize};

/// 15 digit millisecond timestamp, a random uuid and `000`, 50 chars
pub fn next_id() -> String {
    format!(
        "{:015}{}000",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Seconds since the epoch
pub fn now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[orm(table_name = "users")]
pub struct User {
    #[orm(primary_key, ddl = "varchar(50)", default = next_id)]
    pub id: Option<String>,
    #[orm(ddl = "varchar(50)")]
    pub email: String,
    #[orm(ddl = "varchar(50)")]
    pub passwd: String,
    pub admin: bool,
    #[orm(ddl = "varchar(50)")]
    pub name: String,
    #[orm(ddl = "varchar(500)")]
    pub image: String,
    #[orm(default = now)]
    pub created_at: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[orm(table_name = "blogs")]
pub struct Blog {
    #[orm(primary_key, ddl = "varchar(50)", default = next_id)]
    pub id: Option<String>,
    #[orm(ddl = "varchar(50)")]
    pub user_id: String,
    #[orm(ddl = "varchar(50)")]
    pub user_name: String,
    #[orm(ddl = "varchar(500)")]
    pub user_image: String,
    #[orm(ddl = "varchar(50)")]
    pub name: String,
    #[orm(ddl = "varchar(200)")]
    pub summary: String,
    #[orm(text)]
    pub content: String,
    #[orm(default = now)]
    pub created_at: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[orm(table_name = "comments")]
pub struct Comment {
    #[orm(primary_key, ddl = "varchar(50)", default = next_id)]
    pub id: Option<String>,
    #[orm(ddl = "varchar(50)")]
    pub blog_id: String,
    #[orm(ddl = "varchar(50)")]
    pub user_id: String,
    #[orm(ddl = "varchar(50)")]
    pub user_name: String,
    #[orm(ddl = "varchar(500)")]
    pub user_image: String,
    #[orm(text)]
    pub content: String,
    #[orm(default = now)]
    pub created_at: Option<f64>,
}

impl User {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    /// Copy safe to hand out, the password hash is masked
    pub fn masked(&self) -> Self {
        Self {
            passwd: "******".into(),
            ..self.clone()
        }
    }
}

/// Create the tables that do not exist yet
pub async fn create_tables(pool: &awesome_orm::Pool) -> awesome_orm::error::Result<()> {
    User::create_table(pool).await?;
    Blog::create_table(pool).await?;
    Comment::create_table(pool).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_layout() {
        let id = next_id();
        assert_eq!(id.len(), 50);
        assert!(id.ends_with("000"));
        assert!(id[..15].chars().all(|c| c.is_ascii_digit()));
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn schemas() {
        let s = Blog::schema().unwrap();
        assert_eq!(s.table(), "blogs");
        assert_eq!(s.primary_key().name(), "id");
        assert_eq!(
            s.insert_sql(),
            "INSERT INTO `blogs` (`user_id`, `user_name`, `user_image`, `name`, `summary`, `content`, `created_at`, `id`) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        );
        assert_eq!(User::schema().unwrap().fields().len(), 7);
    }
}
