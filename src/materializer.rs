//! Chunked persistence of rendered artifacts.
//!
//! Chunks are written one after the other. A failing chunk stops the run but
//! leaves earlier chunks committed; re-running is safe because every chunk
//! is a full replace.

use std::sync::Arc;

use tracing::debug;

use crate::error::{AnnotationError, Result};
use crate::model::RenderedTemplate;
use crate::store::TemplateStore;

pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Split `items` into consecutive groups of `size`; only the last may be shorter.
pub fn chunk<T>(items: &[T], size: usize) -> Result<Vec<&[T]>> {
    if size == 0 {
        return Err(AnnotationError::InvalidInput(
            "chunk size must be greater than zero".into(),
        ));
    }
    Ok(items.chunks(size).collect())
}

pub struct Materializer {
    store: Arc<dyn TemplateStore>,
    chunk_size: usize,
}

impl Materializer {
    pub fn new(store: Arc<dyn TemplateStore>, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AnnotationError::InvalidInput(
                "chunk size must be greater than zero".into(),
            ));
        }
        Ok(Self { store, chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Replace the stored artifact of every rendered template. Returns the
    /// number of chunks written.
    pub async fn persist(&self, rendered: &[RenderedTemplate]) -> Result<usize> {
        let chunks = chunk(rendered, self.chunk_size)?;
        let total = chunks.len();
        for (index, group) in chunks.into_iter().enumerate() {
            self.store.replace_artifacts(group).await?;
            debug!(chunk = index + 1, total, size = group.len(), "artifacts replaced");
        }
        Ok(total)
    }

    /// Retract the stored artifact of every URI. Returns the number of chunks written.
    pub async fn clear(&self, uris: &[String]) -> Result<usize> {
        let chunks = chunk(uris, self.chunk_size)?;
        let total = chunks.len();
        for (index, group) in chunks.into_iter().enumerate() {
            self.store.retract_artifacts(group).await?;
            debug!(chunk = index + 1, total, size = group.len(), "artifacts retracted");
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTemplateStore;
    use proptest::prelude::*;

    fn rendered(n: usize) -> Vec<RenderedTemplate> {
        (0..n)
            .map(|i| RenderedTemplate {
                uri: format!("http://x/t/{i}"),
                rendered: format!("artifact {i}"),
            })
            .collect()
    }

    fn seeded(n: usize) -> Arc<InMemoryTemplateStore> {
        let store = Arc::new(InMemoryTemplateStore::new());
        for i in 0..n {
            store
                .insert_template(&format!("http://x/t/{i}"), "text")
                .unwrap();
        }
        store
    }

    #[test]
    fn chunk_splits_with_short_tail() {
        let items: Vec<u32> = (1..=10).collect();
        let chunks = chunk(&items, 3).unwrap();
        assert_eq!(
            chunks,
            vec![&[1, 2, 3][..], &[4, 5, 6][..], &[7, 8, 9][..], &[10][..]]
        );
    }

    #[test]
    fn chunk_of_nothing_is_empty() {
        let items: Vec<u32> = Vec::new();
        assert!(chunk(&items, 10).unwrap().is_empty());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(chunk(&[1, 2], 0).is_err());
        assert!(Materializer::new(Arc::new(InMemoryTemplateStore::new()), 0).is_err());
    }

    proptest! {
        #[test]
        fn chunk_count_is_ceiling(n in 0usize..200, k in 1usize..25) {
            let items: Vec<usize> = (0..n).collect();
            let chunks = chunk(&items, k).unwrap();
            prop_assert_eq!(chunks.len(), n.div_ceil(k));
            if let Some((last, full)) = chunks.split_last() {
                prop_assert!(full.iter().all(|c| c.len() == k));
                prop_assert!(!last.is_empty() && last.len() <= k);
            }
            let flat: Vec<usize> = chunks.concat();
            prop_assert_eq!(flat, items);
        }
    }

    #[tokio::test]
    async fn persist_writes_one_update_per_chunk() {
        let store = seeded(23);
        let materializer = Materializer::new(store.clone(), DEFAULT_CHUNK_SIZE).unwrap();
        let written = materializer.persist(&rendered(23)).await.unwrap();
        assert_eq!(written, 3);
        assert_eq!(store.write_count(), 3);
        assert_eq!(
            store.artifact("http://x/t/22").unwrap().as_deref(),
            Some("artifact 22")
        );
    }

    #[tokio::test]
    async fn persisting_twice_is_idempotent() {
        let store = seeded(4);
        let materializer = Materializer::new(store.clone(), 3).unwrap();
        materializer.persist(&rendered(4)).await.unwrap();
        materializer.persist(&rendered(4)).await.unwrap();
        for i in 0..4 {
            assert_eq!(
                store.artifact(&format!("http://x/t/{i}")).unwrap(),
                Some(format!("artifact {i}"))
            );
        }
    }

    #[tokio::test]
    async fn failed_chunk_keeps_earlier_ones() {
        let store = seeded(5);
        store.fail_after_writes(1).unwrap();
        let materializer = Materializer::new(store.clone(), 2).unwrap();
        assert!(materializer.persist(&rendered(5)).await.is_err());
        assert!(store.artifact("http://x/t/1").unwrap().is_some());
        assert!(store.artifact("http://x/t/2").unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_retracts_in_chunks() {
        let store = seeded(3);
        let materializer = Materializer::new(store.clone(), 2).unwrap();
        materializer.persist(&rendered(3)).await.unwrap();
        let uris: Vec<String> = (0..3).map(|i| format!("http://x/t/{i}")).collect();
        assert_eq!(materializer.clear(&uris).await.unwrap(), 2);
        assert!(store.artifact("http://x/t/0").unwrap().is_none());
        assert!(store.artifact("http://x/t/2").unwrap().is_none());
    }
}
