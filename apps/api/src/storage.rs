//! Object-store access for uploaded resume artifacts. The relational row
//! keeps the key; bytes live in S3 (MinIO locally).

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use uuid::Uuid;

use crate::errors::AppError;

/// Key layout: resumes/<user_id>/<resume_id>/<filename>.
pub fn resume_key(user_id: Uuid, resume_id: Uuid, filename: &str) -> String {
    format!("resumes/{user_id}/{resume_id}/{filename}")
}

pub async fn put_object(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("Upload of {key} failed: {e}")))?;
    Ok(())
}

pub async fn get_object(s3: &S3Client, bucket: &str, key: &str) -> Result<Vec<u8>, AppError> {
    let response = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("Download of {key} failed: {e}")))?;

    let data = response
        .body
        .collect()
        .await
        .map_err(|e| AppError::Storage(format!("Reading body of {key} failed: {e}")))?;
    Ok(data.into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_key_layout() {
        let user = Uuid::nil();
        let resume = Uuid::nil();
        assert_eq!(
            resume_key(user, resume, "cv.pdf"),
            format!("resumes/{user}/{resume}/cv.pdf")
        );
    }
}
