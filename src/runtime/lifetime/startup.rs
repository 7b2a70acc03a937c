use crate::cache::ObjectCache;
use crate::cache::register::build_object_cache;
use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

const FALLBACK_CACHE: &str = "moka";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let config = AppConfig::get();
    let cache_type = config.cache.cache_type.as_str();

    warn!("Attempting to create {} cache backend", cache_type);

    let err = match build_object_cache(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            return Ok(Arc::from(cache));
        }
        Err(e) => e,
    };

    warn!("Failed to create {} cache: {}", cache_type, err);
    if cache_type == FALLBACK_CACHE {
        return Err(err);
    }

    warn!("Falling back to memory cache");
    let cache = build_object_cache(FALLBACK_CACHE).await.map_err(|fallback_e| {
        GradebookError::cache_connection(format!(
            "No cache backend available (tried: {cache_type}, {FALLBACK_CACHE}): {fallback_e}"
        ))
    })?;
    warn!("Successfully created fallback Moka (in-memory) cache backend");
    Ok(Arc::from(cache))
}

/// 准备服务器启动的上下文
/// 包括存储（含迁移）与缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // redis 的 TLS 连接需要进程级 crypto provider，重复安装时忽略
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    // 创建缓存实例
    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
