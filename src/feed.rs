use serde::Serialize;
use sqlx::PgPool;

use crate::db;
use crate::models::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSort {
    Latest,
    Trending,
    Popular,
}

impl FeedSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "latest" => Some(Self::Latest),
            "trending" => Some(Self::Trending),
            "popular" => Some(Self::Popular),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedFilter {
    pub domain: Option<String>,
    pub difficulty: Option<String>,
    pub post_type: Option<String>,
    pub sort: FeedSort,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

/// Offset for 1-indexed pages; pages below 1 are treated as the first page.
pub fn offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1) * limit.max(0)
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Trending reads the persisted score only; recomputation belongs to the
/// batch updater.
pub async fn fetch(pool: &PgPool, filter: &FeedFilter) -> anyhow::Result<FeedPage> {
    let (posts, total) = db::fetch_feed(pool, filter).await?;
    Ok(FeedPage {
        posts,
        pagination: Pagination {
            page: filter.page.max(1),
            limit: filter.limit,
            total,
            total_pages: total_pages(total, filter.limit),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(offset(1, 20), 0);
        assert_eq!(offset(2, 20), 20);
        assert_eq!(offset(5, 10), 40);
    }

    #[test]
    fn page_below_one_is_clamped() {
        assert_eq!(offset(0, 20), 0);
        assert_eq!(offset(-3, 20), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn sort_parsing_accepts_known_keys_only() {
        assert_eq!(FeedSort::parse("trending"), Some(FeedSort::Trending));
        assert_eq!(FeedSort::parse("Latest"), Some(FeedSort::Latest));
        assert_eq!(FeedSort::parse("popular"), Some(FeedSort::Popular));
        assert_eq!(FeedSort::parse("hot"), None);
    }
}
