use serde::Serialize;

/// Page requested by a listing view (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Normalize requested values: page at least 1, limit within `1..=max_limit`
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// One page of a filtered listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    /// Number of records visible before paging
    pub total: usize,
}

impl<T: Clone> Page<T> {
    /// Cut the requested page out of an already filtered subset
    pub fn slice(visible: &[&T], request: PageRequest) -> Self {
        let items = visible
            .iter()
            .skip(request.offset())
            .take(request.limit as usize)
            .map(|item| (*item).clone())
            .collect();

        Self {
            items,
            page: request.page,
            limit: request.limit,
            total: visible.len(),
        }
    }
}
