use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::TrendingCandidate;

/// Shared by the updater's candidate window and the trending feed filter so
/// the two cannot drift apart.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub updated: usize,
    pub failed: usize,
}

/// No floor: stale posts go negative on purpose. A `created_at` in the
/// future clamps to zero decay instead of earning a bonus.
pub fn score(
    likes: i64,
    comments: i64,
    views: i64,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let elapsed_hours = (now - created_at).num_milliseconds() as f64 / 3_600_000.0;
    let decay_hours = elapsed_hours.max(0.0);
    likes as f64 * 4.0 + comments as f64 * 3.0 + views as f64 - decay_hours * 0.5
}

/// An unreadable row is logged and counted, never aborts the pass.
pub fn score_candidates(
    candidates: Vec<anyhow::Result<TrendingCandidate>>,
    now: DateTime<Utc>,
) -> (Vec<(Uuid, f64)>, usize) {
    let mut scored = Vec::new();
    let mut failed = 0usize;

    for candidate in candidates {
        match candidate {
            Ok(candidate) => scored.push((
                candidate.id,
                score(
                    candidate.likes_count,
                    candidate.comments_count,
                    candidate.views_count,
                    candidate.created_at,
                    now,
                ),
            )),
            Err(err) => {
                eprintln!("skipping unreadable post row: {err:#}");
                failed += 1;
            }
        }
    }

    (scored, failed)
}

/// Recomputes `trending_score` for approved posts in the trailing window.
/// The clock is read once so relative ordering stays stable within a pass.
pub async fn update_all(pool: &PgPool, window_days: i64) -> anyhow::Result<UpdateOutcome> {
    let now = Utc::now();
    let candidates = db::fetch_trending_candidates(pool, now, window_days.max(1)).await?;
    let (scored, mut failed) = score_candidates(candidates, now);

    let mut updated = 0usize;
    for (post_id, new_score) in scored {
        match db::persist_trending_score(pool, post_id, new_score).await {
            Ok(()) => updated += 1,
            Err(err) => {
                eprintln!("failed to persist score for post {post_id}: {err:#}");
                failed += 1;
            }
        }
    }

    Ok(UpdateOutcome { updated, failed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Duration;

    fn candidate(likes: i64, comments: i64, views: i64, hours_old: i64) -> TrendingCandidate {
        TrendingCandidate {
            id: Uuid::new_v4(),
            likes_count: likes,
            comments_count: comments,
            views_count: views,
            created_at: Utc::now() - Duration::hours(hours_old),
        }
    }

    #[test]
    fn zero_engagement_fresh_post_scores_zero() {
        let now = Utc::now();
        assert_eq!(score(0, 0, 0, now, now), 0.0);
    }

    #[test]
    fn worked_example_at_48_hours() {
        let created = Utc::now();
        let now = created + Duration::hours(48);
        let result = score(10, 5, 100, created, now);
        assert!((result - 131.0).abs() < 1e-9);
    }

    #[test]
    fn monotonic_in_each_counter() {
        let created = Utc::now();
        let now = created + Duration::hours(6);
        let base = score(3, 2, 50, created, now);
        assert!(score(4, 2, 50, created, now) > base);
        assert!(score(3, 3, 50, created, now) > base);
        assert!(score(3, 2, 51, created, now) > base);
    }

    #[test]
    fn older_posts_score_lower() {
        let created = Utc::now();
        let newer = score(5, 5, 5, created, created + Duration::hours(1));
        let older = score(5, 5, 5, created, created + Duration::hours(72));
        assert!(older < newer);
    }

    #[test]
    fn stale_posts_can_go_negative() {
        let created = Utc::now();
        let now = created + Duration::hours(200);
        assert!(score(1, 0, 2, created, now) < 0.0);
    }

    #[test]
    fn future_created_at_clamps_to_zero_decay() {
        let now = Utc::now();
        let created = now + Duration::hours(12);
        assert_eq!(score(1, 0, 0, created, now), 4.0);
    }

    #[test]
    fn partial_hours_decay_fractionally() {
        let created = Utc::now();
        let now = created + Duration::minutes(30);
        let result = score(0, 0, 1, created, now);
        assert!((result - 0.75).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_scores_nothing_without_error() {
        let (scored, failed) = score_candidates(Vec::new(), Utc::now());
        assert!(scored.is_empty());
        assert_eq!(failed, 0);
    }

    #[test]
    fn one_bad_row_in_five_still_scores_four() {
        let now = Utc::now();
        let candidates = vec![
            Ok(candidate(4, 1, 30, 2)),
            Ok(candidate(0, 0, 5, 12)),
            Err(anyhow!("null likes_count")),
            Ok(candidate(9, 3, 120, 1)),
            Ok(candidate(2, 2, 40, 48)),
        ];

        let (scored, failed) = score_candidates(candidates, now);
        assert_eq!(scored.len(), 4);
        assert_eq!(failed, 1);
    }

    #[test]
    fn scored_rows_keep_their_post_ids() {
        let now = Utc::now();
        let fresh = candidate(1, 0, 0, 0);
        let fresh_id = fresh.id;

        let (scored, failed) = score_candidates(vec![Ok(fresh)], now);
        assert_eq!(failed, 0);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].0, fresh_id);
        assert!((scored[0].1 - 4.0).abs() < 1e-6);
    }
}
