use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Stored values are loosely controlled text; an unparsable value means
/// "no information", not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BEGINNER" => Some(Self::Beginner),
            "INTERMEDIATE" => Some(Self::Intermediate),
            "ADVANCED" => Some(Self::Advanced),
            "EXPERT" => Some(Self::Expert),
            _ => None,
        }
    }

    pub fn ordinal(self) -> i32 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
            Self::Expert => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BEGINNER" => Some(Self::Beginner),
            "INTERMEDIATE" => Some(Self::Intermediate),
            "ADVANCED" => Some(Self::Advanced),
            "EXPERT" => Some(Self::Expert),
            _ => None,
        }
    }

    pub fn ordinal(self) -> i32 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
            Self::Expert => 3,
        }
    }
}

/// `trending_score` is a derived cache of `trending::score` over the
/// counters and age; the batch updater is the only writer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub domain: String,
    pub difficulty: String,
    pub post_type: String,
    pub likes_count: i64,
    pub comments_count: i64,
    pub views_count: i64,
    pub trending_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub preferred_domains: Vec<String>,
    pub skill_level: SkillLevel,
    pub academic_year: String,
}

/// `difficulty` stays as stored text; scoring code parses it per use.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub domain: String,
    pub difficulty: String,
    pub recommended_year: String,
    pub primary_technology: String,
    pub tech_stack: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub match_percentage: u32,
    pub difficulty_compatible: bool,
    pub match_reasons: Vec<String>,
}

impl MatchResult {
    pub fn zero() -> Self {
        Self {
            match_percentage: 0,
            difficulty_compatible: false,
            match_reasons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredProject {
    pub project: Project,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct TrendingCandidate {
    pub id: Uuid,
    pub likes_count: i64,
    pub comments_count: i64,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
}
