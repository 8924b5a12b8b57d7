//! Signed-in user holder
//!
//! Sign-in flows live in the platform shell; they report the outcome here.

use crate::traits::IdentityProvider;
use crate::types::UserId;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared current-user slot
#[derive(Debug, Clone)]
pub struct Identity {
    tx: Arc<watch::Sender<Option<UserId>>>,
}

impl Identity {
    /// Nobody signed in
    pub fn anonymous() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Start with `user` signed in
    pub fn signed_in(user: UserId) -> Self {
        let identity = Self::anonymous();
        identity.sign_in(user);
        identity
    }

    pub fn sign_in(&self, user: UserId) {
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }

    /// Watch sign-in/sign-out
    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}

impl IdentityProvider for Identity {
    fn current_user(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }
}
