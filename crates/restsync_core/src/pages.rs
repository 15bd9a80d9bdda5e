use thiserror::Error;

/// One page fetch of an aggregation run. Indices start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPage {
    pub index: usize,
    pub url: String,
}

/// Lays out the pages `1..=page_count` of a run.
pub fn plan_pages(page_count: usize, url_for_page: impl Fn(usize) -> String) -> Vec<PendingPage> {
    (1..=page_count)
        .map(|index| PendingPage {
            index,
            url: url_for_page(index),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page {index} is outside 1..={page_count}")]
    OutOfRange { index: usize, page_count: usize },
    #[error("page {index} delivered twice")]
    Duplicate { index: usize },
    #[error("page {index} never arrived")]
    Missing { index: usize },
}

/// Collects page payloads in whatever order they complete and hands them
/// back in page-index order.
#[derive(Debug)]
pub struct PageAssembler<T> {
    slots: Vec<Option<Vec<T>>>,
    filled: usize,
}

impl<T> PageAssembler<T> {
    pub fn new(page_count: usize) -> Self {
        let mut slots = Vec::with_capacity(page_count);
        slots.resize_with(page_count, || None);
        Self { slots, filled: 0 }
    }

    pub fn page_count(&self) -> usize {
        self.slots.len()
    }

    pub fn insert(&mut self, index: usize, items: Vec<T>) -> Result<(), PageError> {
        let page_count = self.slots.len();
        let slot = index
            .checked_sub(1)
            .and_then(|position| self.slots.get_mut(position))
            .ok_or(PageError::OutOfRange { index, page_count })?;
        if slot.is_some() {
            return Err(PageError::Duplicate { index });
        }
        *slot = Some(items);
        self.filled += 1;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.slots.len() - self.filled
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Concatenates every page in ascending index order.
    pub fn finish(self) -> Result<Vec<T>, PageError> {
        let mut out = Vec::new();
        for (position, slot) in self.slots.into_iter().enumerate() {
            let items = slot.ok_or(PageError::Missing {
                index: position + 1,
            })?;
            out.extend(items);
        }
        Ok(out)
    }
}
