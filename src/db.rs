use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::feed::{self, FeedFilter, FeedSort};
use crate::models::{Post, Project, SkillLevel, TrendingCandidate, UserProfile};
use crate::trending::TRENDING_WINDOW_DAYS;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let profiles = vec![
        (
            Uuid::parse_str("7b1e6a80-4f52-4e2a-9c31-2c6f3b9de441")?,
            "rhea.kapoor@campus.edu",
            vec!["Web Development", "AI/ML"],
            "INTERMEDIATE",
            "Second Year CSE",
        ),
        (
            Uuid::parse_str("1f9c2d34-86ab-4c58-bd1a-5f40a7e9c812")?,
            "dev.nair@campus.edu",
            vec!["Mobile Development"],
            "BEGINNER",
            "Third Year IT",
        ),
        (
            Uuid::parse_str("c4a8e1f6-0d23-49b7-8e65-913b54d2a0f7")?,
            "sana.iqbal@campus.edu",
            vec!["AI/ML", "Data Science"],
            "ADVANCED",
            "Final Year ECE",
        ),
    ];

    for (id, email, domains, skill_level, academic_year) in profiles {
        let domains: Vec<String> = domains.into_iter().map(String::from).collect();
        sqlx::query(
            r#"
            INSERT INTO project_discovery.profiles
            (id, email, preferred_domains, skill_level, academic_year)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
            SET preferred_domains = EXCLUDED.preferred_domains,
                skill_level = EXCLUDED.skill_level,
                academic_year = EXCLUDED.academic_year
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(&domains)
        .bind(skill_level)
        .bind(academic_year)
        .execute(pool)
        .await?;
    }

    let projects = vec![
        (
            "Campus Lost & Found Portal",
            "Web Development",
            "BEGINNER",
            "second year",
            "React",
            vec!["React", "Node.js", "MongoDB"],
        ),
        (
            "Exam Paper Similarity Checker",
            "AI/ML",
            "ADVANCED",
            "final year",
            "Python",
            vec!["Python", "scikit-learn"],
        ),
        (
            "Hostel Mess Feedback App",
            "Mobile Development",
            "BEGINNER",
            "second year",
            "Flutter",
            vec!["Flutter", "Firebase"],
        ),
        (
            "Timetable Conflict Solver",
            "Web Development",
            "INTERMEDIATE",
            "third year",
            "React",
            vec!["React", "Postgres"],
        ),
        (
            "Placement Salary Predictor",
            "AI/ML",
            "INTERMEDIATE",
            "third year",
            "Python",
            vec!["Python", "pandas"],
        ),
        (
            "Drone Delivery Route Planner",
            "Robotics",
            "EXPERT",
            "final year",
            "C++",
            vec!["C++", "ROS"],
        ),
    ];

    for (title, domain, difficulty, recommended_year, technology, stack) in projects {
        let stack: Vec<String> = stack.into_iter().map(String::from).collect();
        sqlx::query(
            r#"
            INSERT INTO project_discovery.projects
            (id, title, domain, difficulty, recommended_year, primary_technology,
             tech_stack, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            ON CONFLICT (title) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(domain)
        .bind(difficulty)
        .bind(recommended_year)
        .bind(technology)
        .bind(&stack)
        .execute(pool)
        .await?;
    }

    let posts = vec![
        (
            Uuid::parse_str("5a4d9e02-7c11-4f3a-b8e6-1d2c3b4a5f60")?,
            "Looking for teammates: AI note summarizer",
            "AI/ML",
            "INTERMEDIATE",
            "collaboration",
            42i64,
            11i64,
            380i64,
            6i64,
        ),
        (
            Uuid::parse_str("8c3b2a19-5e47-4d06-9f12-6a7b8c9d0e1f")?,
            "Idea: QR-based attendance with liveness check",
            "Web Development",
            "ADVANCED",
            "project_idea",
            18i64,
            6i64,
            240i64,
            30i64,
        ),
        (
            Uuid::parse_str("2e6f1c58-9a03-4b7d-8c24-3f5e6d7a8b90")?,
            "Show & tell: hostel laundry slot booker",
            "Mobile Development",
            "BEGINNER",
            "showcase",
            7i64,
            2i64,
            95i64,
            100i64,
        ),
        (
            Uuid::parse_str("9d0e8f17-3b64-4a25-bc81-7e9f0a1b2c3d")?,
            "Anyone built with embedded Rust on campus hardware?",
            "Systems",
            "EXPERT",
            "discussion",
            3i64,
            9i64,
            60i64,
            180i64,
        ),
    ];

    for (id, title, domain, difficulty, post_type, likes, comments, views, hours_old) in posts {
        let created_at = Utc::now() - Duration::hours(hours_old);
        sqlx::query(
            r#"
            INSERT INTO project_discovery.posts
            (id, title, domain, difficulty, post_type, status,
             likes_count, comments_count, views_count, trending_score, created_at)
            VALUES ($1, $2, $3, $4, $5, 'approved', $6, $7, $8, 0, $9)
            ON CONFLICT (id) DO UPDATE
            SET likes_count = EXCLUDED.likes_count,
                comments_count = EXCLUDED.comments_count,
                views_count = EXCLUDED.views_count
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(domain)
        .bind(difficulty)
        .bind(post_type)
        .bind(likes)
        .bind(comments)
        .bind(views)
        .bind(created_at)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn import_projects(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        title: String,
        domain: String,
        difficulty: String,
        recommended_year: String,
        primary_technology: String,
        tech_stack: String,
        published: Option<bool>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let stack: Vec<String> = row
            .tech_stack
            .split(';')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        let result = sqlx::query(
            r#"
            INSERT INTO project_discovery.projects
            (id, title, domain, difficulty, recommended_year, primary_technology,
             tech_stack, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (title) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.title)
        .bind(&row.domain)
        .bind(&row.difficulty)
        .bind(&row.recommended_year)
        .bind(&row.primary_technology)
        .bind(&stack)
        .bind(row.published.unwrap_or(true))
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Decoded row by row so one bad row surfaces as an `Err` entry instead of
/// sinking the whole fetch.
pub async fn fetch_trending_candidates(
    pool: &PgPool,
    now: DateTime<Utc>,
    window_days: i64,
) -> anyhow::Result<Vec<anyhow::Result<TrendingCandidate>>> {
    let cutoff = now - Duration::days(window_days);
    let rows = sqlx::query(
        "SELECT id, likes_count, comments_count, views_count, created_at \
         FROM project_discovery.posts \
         WHERE status = 'approved' AND created_at >= $1",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(decode_candidate).collect())
}

fn decode_candidate(row: &PgRow) -> anyhow::Result<TrendingCandidate> {
    Ok(TrendingCandidate {
        id: row.try_get("id")?,
        likes_count: row.try_get("likes_count")?,
        comments_count: row.try_get("comments_count")?,
        views_count: row.try_get("views_count")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn persist_trending_score(
    pool: &PgPool,
    post_id: Uuid,
    score: f64,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE project_discovery.posts SET trending_score = $2 WHERE id = $1")
        .bind(post_id)
        .bind(score)
        .execute(pool)
        .await?;
    Ok(())
}

/// An unknown email and an unparsable stored skill level both come back as
/// `None`.
pub async fn fetch_profile(pool: &PgPool, email: &str) -> anyhow::Result<Option<UserProfile>> {
    let row = sqlx::query(
        "SELECT id, email, preferred_domains, skill_level, academic_year \
         FROM project_discovery.profiles WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let skill_raw: String = row.get("skill_level");
    let Some(skill_level) = SkillLevel::parse(&skill_raw) else {
        return Ok(None);
    };

    Ok(Some(UserProfile {
        id: row.get("id"),
        email: row.get("email"),
        preferred_domains: row.get("preferred_domains"),
        skill_level,
        academic_year: row.get("academic_year"),
    }))
}

pub async fn fetch_project(pool: &PgPool, project_id: Uuid) -> anyhow::Result<Option<Project>> {
    let row = sqlx::query(
        "SELECT id, title, domain, difficulty, recommended_year, primary_technology, \
         tech_stack, created_at \
         FROM project_discovery.projects WHERE id = $1 AND published",
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(decode_project))
}

pub async fn fetch_candidate_projects(
    pool: &PgPool,
    exclude_id: Uuid,
    pool_size: i64,
) -> anyhow::Result<Vec<Project>> {
    let rows = sqlx::query(
        "SELECT id, title, domain, difficulty, recommended_year, primary_technology, \
         tech_stack, created_at \
         FROM project_discovery.projects \
         WHERE published AND id <> $1 \
         ORDER BY created_at DESC, id \
         LIMIT $2",
    )
    .bind(exclude_id)
    .bind(pool_size)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(decode_project).collect())
}

fn decode_project(row: &PgRow) -> Project {
    Project {
        id: row.get("id"),
        title: row.get("title"),
        domain: row.get("domain"),
        difficulty: row.get("difficulty"),
        recommended_year: row.get("recommended_year"),
        primary_technology: row.get("primary_technology"),
        tech_stack: row.get("tech_stack"),
        created_at: row.get("created_at"),
    }
}

/// One page of approved posts plus the unpaginated total for the same
/// filters.
pub async fn fetch_feed(pool: &PgPool, filter: &FeedFilter) -> anyhow::Result<(Vec<Post>, i64)> {
    let mut conditions = String::from("WHERE status = 'approved'");
    let mut binds: Vec<&str> = Vec::new();

    for (column, value) in [
        ("domain", &filter.domain),
        ("difficulty", &filter.difficulty),
        ("post_type", &filter.post_type),
    ] {
        if let Some(value) = value {
            binds.push(value);
            conditions.push_str(&format!(" AND {column} = ${}", binds.len()));
        }
    }

    let order = match filter.sort {
        FeedSort::Latest => "created_at DESC, id",
        FeedSort::Trending => {
            conditions.push_str(&format!(
                " AND created_at >= now() - interval '{TRENDING_WINDOW_DAYS} days'"
            ));
            "trending_score DESC, created_at DESC"
        }
        FeedSort::Popular => "likes_count DESC, created_at DESC",
    };

    let count_sql = format!(
        "SELECT COUNT(*) AS total FROM project_discovery.posts {conditions}"
    );
    let mut count_query = sqlx::query(&count_sql);
    for value in &binds {
        count_query = count_query.bind(*value);
    }
    let total: i64 = count_query.fetch_one(pool).await?.get("total");

    let page_sql = format!(
        "SELECT id, title, domain, difficulty, post_type, likes_count, comments_count, \
         views_count, trending_score, created_at \
         FROM project_discovery.posts {conditions} \
         ORDER BY {order} LIMIT {} OFFSET {}",
        filter.limit.max(0),
        feed::offset(filter.page, filter.limit),
    );
    let mut page_query = sqlx::query(&page_sql);
    for value in &binds {
        page_query = page_query.bind(*value);
    }
    let rows = page_query.fetch_all(pool).await?;

    let posts = rows
        .iter()
        .map(|row| Post {
            id: row.get("id"),
            title: row.get("title"),
            domain: row.get("domain"),
            difficulty: row.get("difficulty"),
            post_type: row.get("post_type"),
            likes_count: row.get("likes_count"),
            comments_count: row.get("comments_count"),
            views_count: row.get("views_count"),
            trending_score: row.get("trending_score"),
            created_at: row.get("created_at"),
        })
        .collect();

    Ok((posts, total))
}
