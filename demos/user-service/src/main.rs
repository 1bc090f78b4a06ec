//! Runs a provider and a consumer in one process, wired through the
//! in-memory discovery service: register `UserService`, publish it, then
//! call `Login` and `Register` through the proxy channel.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use meridian_client::CallChannel;
use meridian_core::MemoryDiscovery;
use meridian_provider::{Provider, ProviderConfig, ProviderError};

use user_service::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserService,
};

#[tokio::main]
async fn main() -> Result<(), ProviderError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let discovery = MemoryDiscovery::new();

    let mut provider = Provider::new(ProviderConfig::load()?, Arc::new(discovery.connect()));
    provider.register(Arc::new(UserService));
    let bound = provider.bind().await?;
    info!(address = %bound.address(), "user service published");

    let cancel = CancellationToken::new();
    let server = tokio::spawn(bound.serve(cancel.clone()));

    let channel = CallChannel::new(Arc::new(discovery.connect()));

    match channel
        .call::<LoginRequest, LoginResponse>(
            "UserService",
            "Login",
            &LoginRequest {
                name: "zhang_san".to_owned(),
                pwd: "123456".to_owned(),
            },
        )
        .await
    {
        Ok(response) => info!(
            success = response.success,
            errcode = response.result.errcode,
            "login response"
        ),
        Err(e) => error!(error = %e, "login call failed"),
    }

    match channel
        .call::<RegisterRequest, RegisterResponse>(
            "UserService",
            "Register",
            &RegisterRequest {
                id: 2000,
                name: "mprpc".to_owned(),
                pwd: "666666".to_owned(),
            },
        )
        .await
    {
        Ok(response) => info!(
            success = response.success,
            errcode = response.result.errcode,
            "register response"
        ),
        Err(e) => error!(error = %e, "register call failed"),
    }

    cancel.cancel();
    if let Err(e) = server.await {
        error!(error = %e, "provider task failed");
    }
    Ok(())
}
