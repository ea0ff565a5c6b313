use crate::domain_port::*;
use dashmap::DashMap;

/// Two-scope key/value cache standing in for browser local and session storage.
#[derive(Default)]
pub struct MemoryAuthCache {
    local: DashMap<String, String>,
    session: DashMap<String, String>,
}

impl MemoryAuthCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn scope(&self, scope: StorageScope) -> &DashMap<String, String> {
        match scope {
            StorageScope::Local => &self.local,
            StorageScope::Session => &self.session,
        }
    }

    pub fn len(&self, scope: StorageScope) -> usize {
        self.scope(scope).len()
    }

    pub fn is_empty(&self, scope: StorageScope) -> bool {
        self.scope(scope).is_empty()
    }
}

impl AuthCache for MemoryAuthCache {
    fn get(&self, scope: StorageScope, key: &str) -> Option<String> {
        self.scope(scope).get(key).map(|v| v.value().clone())
    }

    fn set(&self, scope: StorageScope, key: &str, value: String) {
        self.scope(scope).insert(key.to_owned(), value);
    }

    fn remove_prefixed(&self, scope: StorageScope, prefixes: &[String]) -> usize {
        let map = self.scope(scope);
        let before = map.len();
        map.retain(|key, _| !prefixes.iter().any(|p| key.starts_with(p.as_str())));
        before - map.len()
    }
}
