//! Uploaded resume binaries in S3 / MinIO.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::analysis::DocumentFormat;
use crate::errors::AppError;

/// `resumes/<user_id>/<resume_id>.<ext>`
pub fn object_key(user_id: Uuid, resume_id: Uuid, format: DocumentFormat) -> String {
    format!("resumes/{user_id}/{resume_id}.{}", format.extension())
}

pub fn content_type(format: DocumentFormat) -> &'static str {
    match format {
        DocumentFormat::Pdf => "application/pdf",
        DocumentFormat::Docx => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        DocumentFormat::Doc => "application/msword",
        DocumentFormat::Txt => "text/plain; charset=utf-8",
    }
}

pub async fn upload(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    data: Bytes,
    format: DocumentFormat,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type(content_type(format))
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

    info!("Uploaded resume to s3://{bucket}/{key}");
    Ok(())
}

pub async fn fetch(s3: &S3Client, bucket: &str, key: &str) -> Result<Bytes, AppError> {
    let object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("download of {key} failed: {e}")))?;

    let data = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::S3(format!("reading {key} failed: {e}")))?;
    Ok(data.into_bytes())
}

pub async fn remove(s3: &S3Client, bucket: &str, key: &str) -> Result<(), AppError> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("delete of {key} failed: {e}")))?;

    info!("Deleted s3://{bucket}/{key}");
    Ok(())
}
