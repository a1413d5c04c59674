use crate::models::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PaginationParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1) * self.page_size()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(PaginatedUsers = PaginatedResponse<UserResponse>)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let page_size = params.page_size();
        Self {
            items,
            page: params.page(),
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let params = PaginationParams {
            page: Some(0),
            page_size: Some(1_000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 0);

        let page: PaginatedResponse<u8> = PaginatedResponse::new(vec![], &PaginationParams::default(), 41);
        assert_eq!(page.total_pages, 3);
    }
}
