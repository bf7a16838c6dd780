//! Process-wide authorization service.
//!
//! Holds at most one [`Authorizer`]. The first successful install wins and
//! later installs return the authorizer already in place. With nothing
//! installed every request is permitted, for deployments that do not enable
//! authorization.

use crate::authorizer::Authorizer;
use crate::decision::Decision;
use fedauthz_core::AuthzContext;
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL: Lazy<AuthorizationService> = Lazy::new(AuthorizationService::new);

/// Install-once cell for the active [`Authorizer`]
#[derive(Debug, Default)]
pub struct AuthorizationService {
    authorizer: RwLock<Option<Arc<Authorizer>>>,
}

impl AuthorizationService {
    /// Create an empty, independent service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide service
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Install `authorizer` unless one is already installed, and return the
    /// installed one. Concurrent callers must use the returned reference.
    pub fn initialize(&self, authorizer: Arc<Authorizer>) -> Arc<Authorizer> {
        let mut slot = self
            .authorizer
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(installed) => {
                tracing::debug!(
                    site = %installed.site_org(),
                    "Authorization service already initialized"
                );
                Arc::clone(installed)
            }
            None => {
                tracing::debug!(
                    site = %authorizer.site_org(),
                    "Authorization service initialized"
                );
                *slot = Some(Arc::clone(&authorizer));
                authorizer
            }
        }
    }

    /// Installed authorizer, if any
    #[must_use]
    pub fn authorizer(&self) -> Option<Arc<Authorizer>> {
        self.authorizer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove the installed authorizer, returning it. Intended for test
    /// suites that install a fresh authorizer per test.
    pub fn reset(&self) -> Option<Arc<Authorizer>> {
        self.authorizer
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Authorize a request through the installed authorizer, permitting
    /// everything when none is installed
    #[must_use]
    pub fn authorize<'a>(&self, ctx: impl Into<Option<&'a AuthzContext>>) -> Decision {
        match self.authorizer() {
            Some(authorizer) => authorizer.authorize(ctx),
            None => Decision::permit(),
        }
    }
}
