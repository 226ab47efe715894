//! Session-cached authentication against the Connect SSO endpoint.

use crate::config::Config;
use crate::http_client::ReqwestGarminClient;
use crate::session::SessionStore;
use crate::{GarminConnect, GarminError};

/// Obtain a working authenticated client.
///
/// The stored session is tried first; the service decides whether it is
/// still valid (a probe against the profile endpoint). Any rejection falls
/// through to a fresh credential login, whose token replaces the stored one.
/// Exactly one of {session-restore, fresh-login} succeeds per call; a failed
/// fresh login aborts the run.
pub async fn authenticate(
    config: &Config,
    store: &SessionStore,
) -> Result<ReqwestGarminClient, GarminError> {
    if let Some(token) = store.load() {
        let client = ReqwestGarminClient::new(&config.base_url, token);
        match client.get_user_profile().await {
            Ok(profile) => {
                tracing::info!(display_name = %profile.display_name, "authenticated with saved session");
                return Ok(client);
            }
            Err(e) => {
                tracing::warn!(error = %e, "saved session rejected, re-authenticating");
            }
        }
    }

    let token =
        ReqwestGarminClient::login(&config.base_url, &config.email, &config.password).await?;
    store.save(&token)?;
    tracing::info!("fresh login successful");
    Ok(ReqwestGarminClient::new(&config.base_url, token))
}
