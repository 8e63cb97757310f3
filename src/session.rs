use std::sync::{Mutex, RwLock};

/// Supplies the bearer credential for every backend call.
///
/// The credential is injected explicitly instead of living in ambient
/// process-wide state; expiry is signalled through `expire`, which clears the
/// credential and fires the registered hook so the caller can force
/// re-authentication.
pub trait SessionProvider: Send + Sync {
    fn credential(&self) -> Option<String>;

    fn store(&self, credential: String);

    fn expire(&self);
}

type ExpiryHook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MemorySession {
    credential: RwLock<Option<String>>,
    on_expired: Mutex<Option<ExpiryHook>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            credential: RwLock::new(Some(credential.into())),
            on_expired: Mutex::new(None),
        }
    }

    /// Registers the hook run when an active session expires.
    pub fn on_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_expired.lock().unwrap() = Some(Box::new(hook));
    }
}

impl SessionProvider for MemorySession {
    fn credential(&self) -> Option<String> {
        self.credential.read().unwrap().clone()
    }

    fn store(&self, credential: String) {
        *self.credential.write().unwrap() = Some(credential);
    }

    fn expire(&self) {
        let had_credential = self.credential.write().unwrap().take().is_some();
        if had_credential {
            if let Some(hook) = self.on_expired.lock().unwrap().as_ref() {
                hook();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn expire_discards_credential_and_fires_hook_once() {
        let session = MemorySession::with_credential("token-1");
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        session.on_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.expire();
        assert_eq!(session.credential(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // already expired, nothing to signal
        session.expire();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn store_replaces_credential() {
        let session = MemorySession::new();
        assert_eq!(session.credential(), None);
        session.store("token-2".to_string());
        assert_eq!(session.credential(), Some("token-2".to_string()));
    }
}
