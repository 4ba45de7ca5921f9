use std::future::Future;

use crate::error::Result;
use crate::models::PageChunk;

/// Largest page size GitHub accepts for list endpoints.
pub const DEFAULT_PAGE_SIZE: u8 = 100;

const FIRST_PAGE: u32 = 1;

/// Cursor-following fetch loop over a paginated listing.
///
/// Pages are requested strictly one after another. Any page failure aborts the
/// walk and the partial items collected so far are dropped.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    page_size: u8,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pager {
    /// Visits every page and returns all items in listing order.
    pub async fn collect<T, F, Fut>(&self, mut fetch: F) -> Result<Vec<T>>
    where
        F: FnMut(u32, u8) -> Fut,
        Fut: Future<Output = Result<PageChunk<T>>>,
    {
        let mut items = Vec::new();
        let mut cursor = Some(FIRST_PAGE);

        while let Some(page) = cursor {
            let chunk = fetch(page, self.page_size).await?;
            items.extend(chunk.items);
            cursor = chunk.next;
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitFetcherError;
    use std::cell::RefCell;

    fn numbered_pages(total: usize, per_page: usize) -> Vec<Vec<usize>> {
        (0..total)
            .collect::<Vec<_>>()
            .chunks(per_page)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    fn chunk_for(pages: &[Vec<usize>], page: u32) -> PageChunk<usize> {
        let index = (page - 1) as usize;
        let items = pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < pages.len()).then_some(page + 1);
        PageChunk { items, next }
    }

    #[tokio::test]
    async fn collects_every_page_in_order() {
        let pages = numbered_pages(250, 100);
        let requested = RefCell::new(Vec::new());

        let items = Pager::default()
            .collect(|page, per_page| {
                requested.borrow_mut().push((page, per_page));
                let chunk = chunk_for(&pages, page);
                async move { Ok(chunk) }
            })
            .await
            .expect("pagination succeeds");

        assert_eq!(items, (0..250).collect::<Vec<_>>());
        assert_eq!(*requested.borrow(), vec![(1, 100), (2, 100), (3, 100)]);
    }

    #[tokio::test]
    async fn empty_first_page_is_not_an_error() {
        let items: Vec<usize> = Pager::default()
            .collect(|_, _| async { Ok(PageChunk::last(Vec::new())) })
            .await
            .expect("empty listing succeeds");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn page_failure_discards_partial_results() {
        let pages = numbered_pages(300, 100);
        let result = Pager::default()
            .collect(|page, _| {
                let outcome = if page == 2 {
                    Err(GitFetcherError::Internal("boom".into()))
                } else {
                    Ok(chunk_for(&pages, page))
                };
                async move { outcome }
            })
            .await;

        assert!(matches!(result, Err(GitFetcherError::Internal(msg)) if msg == "boom"));
    }
}
