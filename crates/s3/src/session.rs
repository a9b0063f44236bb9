//! Session builder
//!
//! Turns resolved [`SessionSettings`] into an `aws_sdk_s3::Client`. Nothing
//! is cached; every call assembles a fresh client.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use sw_core::{Config, Error, Result};

use crate::config::{Auth, SessionSettings};

/// Resolve settings from config and build a client for them
///
/// Credentials are re-checked here, so callers that skipped validation get
/// the same errors the validator would have produced.
pub async fn new_client(
    config: &dyn Config,
    region: &str,
) -> Result<(aws_sdk_s3::Client, SessionSettings)> {
    let settings = SessionSettings::resolve(config, region)?;
    let client = build_client(&settings).await;
    Ok((client, settings))
}

/// Build a client from already resolved settings
///
/// Neither loading the ambient config nor assembling the client can fail in
/// the SDK; credential problems surface on the first request instead.
pub async fn build_client(settings: &SessionSettings) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(settings.region.clone()));

    if let Auth::AccessKey {
        access_key_id,
        secret_key,
    } = &settings.auth
    {
        let credentials = aws_credential_types::Credentials::new(
            access_key_id,
            secret_key,
            None, // session token
            None, // expiry
            "sw-static-credentials",
        );
        loader = loader.credentials_provider(credentials);
    }

    let sdk_config = loader.load().await;
    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    if let Some(endpoint) = &settings.endpoint {
        // S3-compatible stores rarely support virtual-hosted buckets
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }

    tracing::debug!(
        region = %settings.region,
        endpoint = settings.endpoint.as_deref().unwrap_or("default"),
        auth = ?settings.auth,
        "built s3 client"
    );

    aws_sdk_s3::Client::from_conf(builder.build())
}

/// Map an SDK failure onto the shared error taxonomy
///
/// Missing keys and buckets become [`Error::NotFound`] naming `what`;
/// everything else is a [`Error::Network`] carrying the full error chain.
pub(crate) fn classify<E>(err: SdkError<E, HttpResponse>, what: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let missing_code = matches!(err.code(), Some("NoSuchKey" | "NoSuchBucket" | "NotFound"));
    let missing_status = err
        .raw_response()
        .is_some_and(|response| response.status().as_u16() == 404);

    if missing_code || missing_status {
        Error::NotFound(what.to_string())
    } else {
        Error::Network(DisplayErrorContext(&err).to_string())
    }
}
