//! Application state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cm_core::account::AccountStore;
use cm_core::client::{ClientService, FileClientStore};

use crate::auth::TokenService;
use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    data_dir: PathBuf,
    service: ClientService,
    tokens: TokenService,
    callback_secret: Option<String>,
}

impl AppState {
    /// Open the account and client stores under the configured data directory.
    pub async fn new(config: &ServerConfig) -> cm_core::Result<Self> {
        let accounts = AccountStore::new(config.accounts_path()).await?;
        let clients = FileClientStore::new(config.clients_path()).await?;
        let service = ClientService::new(accounts, Arc::new(clients));

        Ok(Self::with_service(
            config.data_dir.clone(),
            service,
            TokenService::new(config.jwt_secret.clone(), config.token_ttl_seconds),
            config.callback_secret.clone(),
        ))
    }

    pub fn with_service(
        data_dir: PathBuf,
        service: ClientService,
        tokens: TokenService,
        callback_secret: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                data_dir,
                service,
                tokens,
                callback_secret,
            }),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    pub fn service(&self) -> &ClientService {
        &self.inner.service
    }

    pub fn accounts(&self) -> &AccountStore {
        self.inner.service.accounts()
    }

    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    pub fn callback_secret(&self) -> Option<&str> {
        self.inner.callback_secret.as_deref()
    }
}
