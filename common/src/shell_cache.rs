//! オフライン用シェルキャッシュ
//!
//! - install: シェル資産（ルート文書、manifest、アイコン）を現行バケットに格納
//! - activate: 現行以外のバケットを削除
//! - fetch: キャッシュ優先、なければネットワーク。
//!   200 かつ同一オリジン（basic）の応答だけ書き戻す

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// 応答の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// 同一オリジン
    Basic,
    Cors,
    Opaque,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub kind: ResponseKind,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn basic(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            kind: ResponseKind::Basic,
            body: body.into(),
        }
    }

    fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

/// キャッシュバケットの保存先
pub trait CacheStorage {
    /// バケット名の一覧
    fn keys(&self) -> Vec<String>;
    fn delete(&mut self, bucket: &str) -> bool;
    fn put(&mut self, bucket: &str, url: &str, response: CachedResponse);
    /// 全バケットから検索
    fn lookup(&self, url: &str) -> Option<CachedResponse>;
}

pub trait Network {
    /// 応答が得られない（オフライン等）ときは `Error::Fetch`
    fn fetch(&mut self, url: &str) -> Result<CachedResponse>;
}

/// バージョン付きシェルキャッシュ
#[derive(Debug, Clone)]
pub struct ShellCache {
    name: String,
    assets: Vec<String>,
}

impl ShellCache {
    pub const DEFAULT_NAME: &'static str = "part-number-scanner-v1";
    pub const DEFAULT_BASE: &'static str = "/partnumbermanager/";

    pub fn new(name: impl Into<String>, assets: Vec<String>) -> Self {
        Self {
            name: name.into(),
            assets,
        }
    }

    /// 既定のシェル資産
    pub fn default_shell() -> Self {
        let base = Self::DEFAULT_BASE;
        Self::new(
            Self::DEFAULT_NAME,
            vec![
                base.to_string(),
                format!("{}index.html", base),
                format!("{}manifest.json", base),
                format!("{}icon.svg", base),
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// 全資産を取得してから格納する（1件でも失敗したら何も格納しない）
    pub fn install(
        &self,
        storage: &mut dyn CacheStorage,
        network: &mut dyn Network,
    ) -> Result<usize> {
        let mut fetched = Vec::with_capacity(self.assets.len());
        for url in &self.assets {
            let response = network.fetch(url)?;
            if response.status != 200 {
                return Err(Error::Fetch(format!("{}: status {}", url, response.status)));
            }
            fetched.push((url.as_str(), response));
        }
        let count = fetched.len();
        for (url, response) in fetched {
            storage.put(&self.name, url, response);
        }
        Ok(count)
    }

    /// 現行以外のバケットを削除し、削除した名前を返す
    pub fn activate(&self, storage: &mut dyn CacheStorage) -> Vec<String> {
        let stale: Vec<String> = storage
            .keys()
            .into_iter()
            .filter(|k| *k != self.name)
            .collect();
        for key in &stale {
            storage.delete(key);
        }
        stale
    }

    pub fn fetch(
        &self,
        storage: &mut dyn CacheStorage,
        network: &mut dyn Network,
        url: &str,
    ) -> Result<CachedResponse> {
        if let Some(hit) = storage.lookup(url) {
            return Ok(hit);
        }
        let response = network.fetch(url)?;
        if response.is_cacheable() {
            storage.put(&self.name, url, response.clone());
        }
        Ok(response)
    }
}

/// メモリ上のキャッシュ
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStorage {
    buckets: BTreeMap<String, BTreeMap<String, CachedResponse>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket_len(&self, bucket: &str) -> usize {
        self.buckets.get(bucket).map_or(0, BTreeMap::len)
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn keys(&self) -> Vec<String> {
        self.buckets.keys().cloned().collect()
    }

    fn delete(&mut self, bucket: &str) -> bool {
        self.buckets.remove(bucket).is_some()
    }

    fn put(&mut self, bucket: &str, url: &str, response: CachedResponse) {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    fn lookup(&self, url: &str) -> Option<CachedResponse> {
        self.buckets.values().find_map(|b| b.get(url).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeNetwork {
        responses: HashMap<String, CachedResponse>,
        calls: Vec<String>,
    }

    impl FakeNetwork {
        fn with(mut self, url: &str, response: CachedResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }
    }

    impl Network for FakeNetwork {
        fn fetch(&mut self, url: &str) -> Result<CachedResponse> {
            self.calls.push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Fetch(format!("offline: {}", url)))
        }
    }

    fn shell_network() -> FakeNetwork {
        let mut net = FakeNetwork::default();
        for url in ShellCache::default_shell().assets() {
            net = net.with(url, CachedResponse::basic(200, url.as_bytes()));
        }
        net
    }

    #[test]
    fn test_install_caches_shell() {
        let shell = ShellCache::default_shell();
        let mut storage = MemoryCacheStorage::new();
        let mut net = shell_network();
        assert_eq!(shell.install(&mut storage, &mut net).unwrap(), 4);
        assert_eq!(storage.bucket_len(ShellCache::DEFAULT_NAME), 4);
    }

    #[test]
    fn test_install_is_all_or_nothing() {
        let shell = ShellCache::default_shell();
        let mut storage = MemoryCacheStorage::new();
        let mut net = FakeNetwork::default().with(
            "/partnumbermanager/",
            CachedResponse::basic(200, "root"),
        );
        let result = shell.install(&mut storage, &mut net);
        assert!(matches!(result, Err(Error::Fetch(ref m)) if m.starts_with("offline")));
        assert_eq!(storage.bucket_len(ShellCache::DEFAULT_NAME), 0);
    }

    #[test]
    fn test_install_rejects_non_200() {
        let shell = ShellCache::default_shell();
        let mut storage = MemoryCacheStorage::new();
        let mut net = shell_network().with(
            "/partnumbermanager/icon.svg",
            CachedResponse::basic(404, "nf"),
        );
        let message = match shell.install(&mut storage, &mut net) {
            Err(Error::Fetch(message)) => message,
            other => panic!("unexpected: {:?}", other),
        };
        assert_eq!(message, "/partnumbermanager/icon.svg: status 404");
        assert_eq!(storage.bucket_len(ShellCache::DEFAULT_NAME), 0);
    }

    #[test]
    fn test_fetch_offline_miss() {
        let shell = ShellCache::default_shell();
        let mut storage = MemoryCacheStorage::new();
        let mut net = FakeNetwork::default();
        assert!(matches!(
            shell.fetch(&mut storage, &mut net, "/c"),
            Err(Error::Fetch(_))
        ));
    }

    #[test]
    fn test_activate_deletes_old_buckets() {
        let shell = ShellCache::default_shell();
        let mut storage = MemoryCacheStorage::new();
        storage.put("part-number-scanner-v0", "/old", CachedResponse::basic(200, "x"));
        storage.put(ShellCache::DEFAULT_NAME, "/keep", CachedResponse::basic(200, "y"));
        let deleted = shell.activate(&mut storage);
        assert_eq!(deleted, vec!["part-number-scanner-v0".to_string()]);
        assert_eq!(storage.keys(), vec![ShellCache::DEFAULT_NAME.to_string()]);
    }

    #[test]
    fn test_fetch_cache_first() {
        let shell = ShellCache::default_shell();
        let mut storage = MemoryCacheStorage::new();
        storage.put(ShellCache::DEFAULT_NAME, "/a", CachedResponse::basic(200, "cached"));
        let mut net = FakeNetwork::default().with("/a", CachedResponse::basic(200, "fresh"));
        let response = shell.fetch(&mut storage, &mut net, "/a").unwrap();
        assert_eq!(response.body, b"cached");
        assert!(net.calls.is_empty());
    }

    #[test]
    fn test_fetch_writes_back_basic_200() {
        let shell = ShellCache::default_shell();
        let mut storage = MemoryCacheStorage::new();
        let mut net = FakeNetwork::default().with("/b", CachedResponse::basic(200, "b"));
        shell.fetch(&mut storage, &mut net, "/b").unwrap();
        shell.fetch(&mut storage, &mut net, "/b").unwrap();
        assert_eq!(net.calls.len(), 1);
    }

    #[test]
    fn test_fetch_passes_through_uncacheable() {
        let shell = ShellCache::default_shell();
        let mut storage = MemoryCacheStorage::new();
        let opaque = CachedResponse {
            status: 200,
            kind: ResponseKind::Opaque,
            body: Vec::new(),
        };
        let mut net = FakeNetwork::default()
            .with("/cdn", opaque.clone())
            .with("/missing", CachedResponse::basic(404, "nf"));
        assert_eq!(shell.fetch(&mut storage, &mut net, "/cdn").unwrap(), opaque);
        assert_eq!(shell.fetch(&mut storage, &mut net, "/missing").unwrap().status, 404);
        assert!(storage.lookup("/cdn").is_none());
        assert!(storage.lookup("/missing").is_none());
    }
}
