use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use lru::LruCache;
use regex::{Captures, Regex};
use tokio::sync::Mutex;

use crate::cache::{LanguageCache, SettingsStore};
use crate::config::FALLBACK_LANGUAGE;

/// `[[namespace:key, arg1, arg2]]`
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([\w\-]+):([\w.\-]+)((?:,[^\[\]]*)?)\]\]").expect("valid token regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-]+$").expect("valid language regex"));

/// 去掉文本中的所有标签
pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// 文本翻译
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, language: &str) -> String;
}

type Pack = Arc<HashMap<String, String>>;

/// 内存中最多保留的语言包数量
pub const MAX_CACHED_PACKS: usize = 64;

/// 基于磁盘语言包的翻译器
///
/// 语言包位于 `{dir}/{language}/{namespace}.json`，内容为 key -> 模板，
/// 模板中的 `%1`、`%2` 依次替换为参数。找不到的 key 原样输出 key。
/// 只缓存成功加载的语言包，数量受 LRU 限制。
pub struct LanguagePackTranslator {
    dir: PathBuf,
    packs: Mutex<LruCache<(String, String), Pack>>,
}

impl LanguagePackTranslator {
    const CAPACITY: NonZeroUsize = match NonZeroUsize::new(MAX_CACHED_PACKS) {
        Some(n) => n,
        None => unreachable!(),
    };

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            packs: Mutex::new(LruCache::new(Self::CAPACITY)),
        }
    }

    async fn pack(&self, language: &str, namespace: &str) -> Option<Pack> {
        let cache_key = (language.to_string(), namespace.to_string());
        if let Some(pack) = self.packs.lock().await.get(&cache_key) {
            return Some(pack.clone());
        }

        let pack = Arc::new(self.read_pack(language, namespace).await?);
        self.packs.lock().await.put(cache_key, pack.clone());
        Some(pack)
    }

    #[cfg(test)]
    async fn cached_packs(&self) -> usize {
        self.packs.lock().await.len()
    }

    async fn read_pack(&self, language: &str, namespace: &str) -> Option<HashMap<String, String>> {
        if !LANGUAGE_RE.is_match(language) {
            tracing::warn!("[push-bridge] Refusing to load language pack for {:?}", language);
            return None;
        }

        let path = self.dir.join(language).join(format!("{}.json", namespace));
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("[push-bridge] Language pack {} unavailable: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(pack) => Some(pack),
            Err(e) => {
                tracing::warn!("[push-bridge] Invalid language pack {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl Translator for LanguagePackTranslator {
    async fn translate(&self, text: &str, language: &str) -> String {
        let namespaces: HashSet<&str> = TOKEN_RE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        if namespaces.is_empty() {
            return text.to_string();
        }

        let mut packs = HashMap::new();
        for namespace in namespaces {
            if let Some(pack) = self.pack(language, namespace).await {
                packs.insert(namespace, pack);
            }
        }

        TOKEN_RE
            .replace_all(text, |caps: &Captures| {
                let key = &caps[2];
                let template = packs
                    .get(&caps[1])
                    .and_then(|pack| pack.get(key))
                    .map(String::as_str)
                    .unwrap_or(key);
                fill_template(template, &caps[3])
            })
            .into_owned()
    }
}

/// 把 `, a, b` 形式的参数填入 `%1`、`%2`
fn fill_template(template: &str, raw_args: &str) -> String {
    let args: Vec<&str> = raw_args
        .split(',')
        .skip(1)
        .map(str::trim)
        .collect();

    // 倒序替换，避免 %1 吃掉 %10
    args.iter()
        .enumerate()
        .rev()
        .fold(template.to_string(), |acc, (i, arg)| {
            acc.replace(&format!("%{}", i + 1), arg)
        })
}

/// 通知本地化：解析用户语言并翻译、清洗文本
pub struct NotificationTranslator {
    cache: Arc<LanguageCache>,
    settings: Arc<dyn SettingsStore>,
    translator: Arc<dyn Translator>,
    default_language: Option<String>,
}

impl NotificationTranslator {
    pub fn new(
        cache: Arc<LanguageCache>,
        settings: Arc<dyn SettingsStore>,
        translator: Arc<dyn Translator>,
        default_language: Option<String>,
    ) -> Self {
        Self {
            cache,
            settings,
            translator,
            default_language,
        }
    }

    /// 用户语言：缓存 -> 用户设置 -> 站点默认 -> en_GB
    pub async fn user_language(&self, user_id: i64) -> String {
        if let Some(language) = self.cache.get(user_id).await {
            return language;
        }

        let from_settings = match self.settings.language(user_id).await {
            Ok(language) => language,
            Err(e) => {
                tracing::warn!("[push-bridge] Failed to read settings for uid {}: {}", user_id, e);
                None
            }
        };

        let language = from_settings
            .or_else(|| self.default_language.clone())
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string());

        self.cache.set(user_id, language.clone()).await;
        language
    }

    /// 翻译后去掉标签
    pub async fn localize(&self, user_id: i64, text: &str) -> String {
        let language = self.user_language(user_id).await;
        let translated = self.translator.translate(text, &language).await;
        strip_tags(&translated)
    }
}
