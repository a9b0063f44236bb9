//! Helpers for unit tests

use aws_sdk_s3::config::{BehaviorVersion, Region};

/// Client that is never used for requests
pub fn offline_client(region: &str) -> aws_sdk_s3::Client {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .build();
    aws_sdk_s3::Client::from_conf(config)
}
