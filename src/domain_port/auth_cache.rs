#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Survives restarts of the client.
    Local,
    /// Lives as long as the current client session.
    Session,
}

impl StorageScope {
    pub const ALL: [StorageScope; 2] = [StorageScope::Local, StorageScope::Session];
}

/// Client-held key/value storage where auth state is cached.
pub trait AuthCache: Send + Sync {
    fn get(&self, scope: StorageScope, key: &str) -> Option<String>;
    fn set(&self, scope: StorageScope, key: &str, value: String);
    /// Remove every key starting with one of `prefixes`, returning how many were removed.
    fn remove_prefixed(&self, scope: StorageScope, prefixes: &[String]) -> usize;
}
