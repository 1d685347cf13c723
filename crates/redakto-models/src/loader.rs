//! Model loaders

use std::sync::Arc;

use async_trait::async_trait;
use redakto_core::Result;
use tokio::sync::OnceCell;

use crate::tagger::EntityTagger;

/// Produces a ready-to-use tagger for one configured model.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Path, model name or endpoint the tagger is loaded from
    fn name_or_path(&self) -> &str;

    /// Catalog loading strategy this loader serves
    fn strategy(&self) -> &str;

    async fn load(&self) -> Result<Arc<dyn EntityTagger>>;
}

/// Loads the wrapped model once per process.
///
/// Concurrent first callers wait on the same load; a failed load is not
/// cached and is retried by the next caller.
pub struct CachedModelLoader {
    inner: Box<dyn ModelLoader>,
    tagger: OnceCell<Arc<dyn EntityTagger>>,
}

impl CachedModelLoader {
    pub fn new(inner: impl ModelLoader + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            tagger: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.tagger.initialized()
    }
}

#[async_trait]
impl ModelLoader for CachedModelLoader {
    fn name_or_path(&self) -> &str {
        self.inner.name_or_path()
    }

    fn strategy(&self) -> &str {
        self.inner.strategy()
    }

    async fn load(&self) -> Result<Arc<dyn EntityTagger>> {
        let tagger = self
            .tagger
            .get_or_try_init(|| async {
                tracing::info!(
                    "Loading model from {} ({})",
                    self.inner.name_or_path(),
                    self.inner.strategy()
                );
                self.inner.load().await
            })
            .await?;
        Ok(Arc::clone(tagger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redakto_core::{Error, TaggedSpan};
    use redakto_tokens::Sentence;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoopTagger;

    #[async_trait]
    impl EntityTagger for NoopTagger {
        async fn tag(&self, sentences: &[Sentence]) -> Result<Vec<Vec<TaggedSpan>>> {
            Ok(vec![Vec::new(); sentences.len()])
        }

        fn name(&self) -> &str {
            "noop"
        }
    }

    struct CountingLoader {
        loads: Arc<AtomicUsize>,
        fail_first: bool,
    }

    #[async_trait]
    impl ModelLoader for CountingLoader {
        fn name_or_path(&self) -> &str {
            "counting"
        }

        fn strategy(&self) -> &str {
            "builtin"
        }

        async fn load(&self) -> Result<Arc<dyn EntityTagger>> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(Error::ModelLoad {
                    model_name_or_path: "counting".into(),
                    reason: "first load fails".into(),
                });
            }
            Ok(Arc::new(NoopTagger))
        }
    }

    #[tokio::test]
    async fn test_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = Arc::new(CachedModelLoader::new(CountingLoader {
            loads: loads.clone(),
            fail_first: false,
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = loader.clone();
                tokio::spawn(async move { loader.load().await.map(|_| ()) })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(loader.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = CachedModelLoader::new(CountingLoader {
            loads: loads.clone(),
            fail_first: true,
        });

        assert!(loader.load().await.is_err());
        assert!(!loader.is_loaded());
        assert!(loader.load().await.is_ok());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }
}
