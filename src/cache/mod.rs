//! 对象缓存
//!
//! 以字符串形式缓存序列化后的对象，后端通过插件注册表按名称选择（moka / redis）。
//! 目前用于缓存已解析的调用者身份（`user:<token>`）。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    // 后端不可用或读取失败，调用方应回退到存储
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
}

impl dyn ObjectCache {
    /// 读取并反序列化，格式不符的条目会被移除
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        match self.get_raw(key).await {
            CacheResult::Found(json) => match serde_json::from_str::<T>(&json) {
                Ok(value) => CacheResult::Found(value),
                Err(e) => {
                    tracing::debug!("Dropping undecodable cache entry '{}': {}", key, e);
                    self.remove(key).await;
                    CacheResult::NotFound
                }
            },
            CacheResult::NotFound => CacheResult::NotFound,
            CacheResult::ExistsButNoValue => CacheResult::ExistsButNoValue,
        }
    }

    pub async fn insert<T: Serialize + Sync>(&self, key: String, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(json) => self.insert_raw(key, json, ttl).await,
            Err(e) => tracing::debug!("Failed to serialize cache entry '{}': {}", key, e),
        }
    }
}

/// 声明对象缓存插件
///
/// 在进程启动时把 `$ty::new()` 注册到插件表，`$name` 对应配置项 `cache.type`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| -> $crate::cache::register::BoxedObjectCacheFuture {
                    Box::pin(async {
                        match <$ty>::new() {
                            Ok(cache) => {
                                Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                            }
                            Err(e) => Err($crate::errors::GradebookError::cache_connection(e)),
                        }
                    })
                }),
            );
        }
    };
}
