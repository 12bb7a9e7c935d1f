//! Applicant-facing profile and resume endpoints.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extraction::{extract_education, extract_experience, extract_skills, extract_text};
use crate::models::user::{EducationEntry, ExperienceEntry, ResumeRow, UserProfileRow, UserRow};
use crate::state::AppState;
use crate::storage::{put_object, resume_key};

/// Upload allow-list; anything else is rejected before touching storage.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserRow,
    pub profile: Option<UserProfileRow>,
}

/// GET /api/users/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_row: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&state.db)
        .await?;

    let profile: Option<UserProfileRow> =
        sqlx::query_as("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user.id)
            .fetch_optional(&state.db)
            .await?;

    Ok(Json(ProfileResponse {
        user: user_row,
        profile,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub phone: Option<String>,
    pub education: Option<Vec<EducationEntry>>,
    pub experience: Option<Vec<ExperienceEntry>>,
}

/// PUT /api/users/profile
///
/// Partial update: absent fields keep their current values. Creates the
/// profile row if the user never had one.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<UserProfileRow>, AppError> {
    sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user.id)
        .execute(&state.db)
        .await?;

    let profile: UserProfileRow = sqlx::query_as(
        r#"
        UPDATE user_profiles SET
            full_name = COALESCE($2, full_name),
            bio = COALESCE($3, bio),
            skills = COALESCE($4, skills),
            location = COALESCE($5, location),
            profile_picture = COALESCE($6, profile_picture),
            linkedin_url = COALESCE($7, linkedin_url),
            github_url = COALESCE($8, github_url),
            phone = COALESCE($9, phone),
            education = COALESCE($10, education),
            experience = COALESCE($11, experience)
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&req.full_name)
    .bind(&req.bio)
    .bind(&req.skills)
    .bind(&req.location)
    .bind(&req.profile_picture)
    .bind(&req.linkedin_url)
    .bind(&req.github_url)
    .bind(&req.phone)
    .bind(req.education.map(sqlx::types::Json))
    .bind(req.experience.map(sqlx::types::Json))
    .fetch_one(&state.db)
    .await?;

    Ok(Json(profile))
}

/// POST /api/users/resume/upload
///
/// Multipart upload. Runs the extraction pipeline over the artifact, stores
/// the bytes in S3, makes the new resume the single primary one, and
/// auto-fills the profile (merge skills; education/experience only when
/// currently empty).
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            let filename = sanitize_filename(field.file_name().unwrap_or("resume"));
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }
    let (filename, bytes) =
        upload.ok_or_else(|| AppError::Validation("No file field in upload".to_string()))?;

    let extension = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if filename.matches('.').count() == 0 || !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "File type not allowed. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if bytes.len() > state.config.max_resume_size_bytes {
        return Err(AppError::Validation(format!(
            "File exceeds the maximum size of {} bytes",
            state.config.max_resume_size_bytes
        )));
    }

    // Best-effort extraction: garbage in, empty lists out, upload proceeds.
    let parsed_text = extract_text(&filename, &bytes);
    let parsed_skills = extract_skills(&parsed_text);
    let education = extract_education(&parsed_text);
    let experience = extract_experience(&parsed_text);

    let resume_id = Uuid::new_v4();
    let key = resume_key(user.id, resume_id, &filename);
    put_object(
        &state.s3,
        &state.config.s3_bucket,
        &key,
        bytes.clone(),
        content_type_for(&extension),
    )
    .await?;

    let mut tx = state.db.begin().await?;

    // Single-primary invariant: clear siblings before flagging the new one.
    sqlx::query("UPDATE resumes SET is_primary = FALSE WHERE user_id = $1")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    let resume: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes
            (id, user_id, filename, s3_key, file_size, parsed_skills, parsed_text, is_primary)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(user.id)
    .bind(&filename)
    .bind(&key)
    .bind(bytes.len() as i64)
    .bind(&parsed_skills)
    .bind(&parsed_text)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    let profile: UserProfileRow =
        sqlx::query_as("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?;

    let merged_skills = merge_skills(&profile.skills, &parsed_skills);
    let education_fill = if profile.education.0.is_empty() && !education.is_empty() {
        Some(sqlx::types::Json(education))
    } else {
        None
    };
    let experience_fill = if profile.experience.0.is_empty() && !experience.is_empty() {
        Some(sqlx::types::Json(experience))
    } else {
        None
    };

    sqlx::query(
        r#"
        UPDATE user_profiles SET
            skills = $2,
            education = COALESCE($3, education),
            experience = COALESCE($4, experience)
        WHERE user_id = $1
        "#,
    )
    .bind(user.id)
    .bind(&merged_skills)
    .bind(education_fill)
    .bind(experience_fill)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/users/resume
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    let resumes: Vec<ResumeRow> = sqlx::query_as(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY uploaded_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(resumes))
}

/// Appends parsed skills the profile does not already have (case-insensitive).
fn merge_skills(existing: &[String], parsed: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = existing.to_vec();
    for skill in parsed {
        if !merged.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            merged.push(skill.clone());
        }
    }
    merged
}

fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or("resume")
        .trim()
        .to_string()
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_skills_is_case_insensitive_append() {
        let existing = vec!["Python".to_string(), "SQL".to_string()];
        let parsed = vec!["python".to_string(), "Docker".to_string()];
        let merged = merge_skills(&existing, &parsed);
        assert_eq!(merged, vec!["Python", "SQL", "Docker"]);
    }

    #[test]
    fn test_merge_skills_from_empty_profile() {
        let merged = merge_skills(&[], &["React".to_string()]);
        assert_eq!(merged, vec!["React"]);
    }

    #[test]
    fn test_sanitize_filename_strips_paths() {
        assert_eq!(sanitize_filename("../../etc/passwd.txt"), "passwd.txt");
        assert_eq!(sanitize_filename(r"C:\docs\cv.pdf"), "cv.pdf");
        assert_eq!(sanitize_filename("resume.pdf"), "resume.pdf");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("txt"), "text/plain");
        assert_eq!(content_type_for("docx"), "application/octet-stream");
    }
}
