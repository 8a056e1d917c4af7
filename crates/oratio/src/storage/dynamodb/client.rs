//! AWS SDK client setup.

use aws_sdk_dynamodb::Client;

use crate::config::DynamoDbConfig;

/// Creates a DynamoDB client with the given configuration.
///
/// The client is constructed once at startup and passed by reference into
/// the repository. Callers that change the configuration at runtime build
/// a fresh client and swap it in via [`super::DynamoDbRepository::reconnect`].
pub async fn create_client(config: &DynamoDbConfig) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}
