pub mod handlers;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::repository::Repository;

/// Loads the caller's profile, which every AI endpoint needs.
pub async fn require_profile(repo: &dyn Repository, user_id: Uuid) -> Result<Profile, AppError> {
    repo.get_profile(user_id).await?.ok_or_else(|| {
        AppError::Validation("Profile not found. Please create your profile first.".to_string())
    })
}
