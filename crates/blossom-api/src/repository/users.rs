use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use blossom_db::Database;
use blossom_db::models::UserRow;
use blossom_types::models::User;

use super::{blocking, format_timestamp, now, parse_stored_id, parse_timestamp, trimmed};
use crate::auth::google::GoogleProfile;
use crate::error::AppError;
use crate::validation::ValidationErrors;

#[derive(Clone)]
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let key = id.to_string();
        let row = blocking(&self.db, move |db| db.get_user_by_id(&key)).await?;
        Ok(row.map(user_from_row).transpose()?)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows = blocking(&self.db, |db| db.list_users()).await?;
        let users = rows
            .into_iter()
            .map(user_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Log in a Google account: the existing user with this Google id, or a new
    /// non-admin user built from the profile.
    pub async fn find_or_create_google(&self, profile: GoogleProfile) -> Result<User, AppError> {
        let google_id = profile.sub.clone();
        if let Some(row) = blocking(&self.db, move |db| db.get_user_by_google_id(&google_id)).await? {
            return Ok(user_from_row(row)?);
        }

        let email = trimmed(profile.email).map(|e| e.to_lowercase());
        let Some(email) = email else {
            let mut errors = ValidationErrors::default();
            errors.push("email", "Email is required.");
            return Err(errors.into());
        };

        let timestamp = format_timestamp(now());
        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            google_id: Some(profile.sub),
            email,
            display_name: trimmed(profile.name),
            profile_picture: trimmed(profile.picture),
            is_admin: false,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        };

        let stored = row.clone();
        blocking(&self.db, move |db| db.insert_user(&stored)).await?;
        info!("Created user {} from Google sign-in", row.id);

        Ok(user_from_row(row)?)
    }
}

fn user_from_row(row: UserRow) -> anyhow::Result<User> {
    Ok(User {
        id: parse_stored_id(&row.id)?,
        email: row.email,
        display_name: row.display_name,
        profile_picture: row.profile_picture,
        is_admin: row.is_admin,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(sub: &str, email: Option<&str>) -> GoogleProfile {
        GoogleProfile {
            sub: sub.into(),
            email: email.map(Into::into),
            name: Some("Ada Lovelace".into()),
            picture: Some("https://lh3.googleusercontent.com/a/ada.jpg".into()),
        }
    }

    #[tokio::test]
    async fn google_sign_in_reuses_existing_user() {
        let repo = UserRepository::new(Arc::new(Database::open_in_memory().unwrap()));

        let first = repo
            .find_or_create_google(profile("g-1", Some(" Ada@Example.com ")))
            .await
            .unwrap();
        assert_eq!(first.email, "ada@example.com");
        assert!(!first.is_admin);

        let again = repo
            .find_or_create_google(profile("g-1", Some("ada@example.com")))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert_eq!(repo.find(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn email_is_required_and_unique() {
        let repo = UserRepository::new(Arc::new(Database::open_in_memory().unwrap()));

        let err = repo.find_or_create_google(profile("g-1", None)).await.unwrap_err();
        assert_eq!(err.to_string(), "Email is required.");

        repo.find_or_create_google(profile("g-1", Some("ada@example.com")))
            .await
            .unwrap();
        let err = repo
            .find_or_create_google(profile("g-2", Some("ada@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate { ref field } if field == "email"));
    }
}
