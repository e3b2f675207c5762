use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::matching;
use crate::models::{Difficulty, Project, ScoredProject, UserProfile};

pub const CANDIDATE_POOL: i64 = 50;

/// Same domain as reference +3, else preferred domain +2 (never both);
/// same technology +2; same difficulty +1, else skill-compatible +0.5.
/// A malformed stored difficulty zero-defaults that component only.
fn candidate_score(profile: &UserProfile, reference: &Project, candidate: &Project) -> f64 {
    let mut score = 0.0;

    if candidate.domain.eq_ignore_ascii_case(&reference.domain) {
        score += 3.0;
    } else if profile
        .preferred_domains
        .iter()
        .any(|domain| domain.eq_ignore_ascii_case(&candidate.domain))
    {
        score += 2.0;
    }

    if !candidate.primary_technology.is_empty()
        && candidate
            .primary_technology
            .eq_ignore_ascii_case(&reference.primary_technology)
    {
        score += 2.0;
    }

    let candidate_difficulty = Difficulty::parse(&candidate.difficulty);
    let reference_difficulty = Difficulty::parse(&reference.difficulty);
    match (candidate_difficulty, reference_difficulty) {
        (Some(candidate_level), Some(reference_level)) if candidate_level == reference_level => {
            score += 1.0
        }
        (Some(candidate_level), _)
            if matching::compatible(profile.skill_level, candidate_level) =>
        {
            score += 0.5
        }
        _ => {}
    }

    score
}

/// Ties break by creation date descending, then id, so ordering does not
/// depend on how the datastore returned the pool.
pub fn rank_candidates(
    profile: &UserProfile,
    reference: &Project,
    candidates: &[Project],
    limit: usize,
) -> Vec<ScoredProject> {
    let mut scored: Vec<ScoredProject> = candidates
        .iter()
        .filter(|candidate| candidate.id != reference.id)
        .map(|candidate| ScoredProject {
            score: candidate_score(profile, reference, candidate),
            project: candidate.clone(),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.project.created_at.cmp(&a.project.created_at))
            .then_with(|| a.project.id.cmp(&b.project.id))
    });
    scored.truncate(limit);
    scored
}

/// A missing profile or reference project soft-fails to an empty list.
pub async fn recommend(
    pool: &PgPool,
    email: &str,
    reference_id: Uuid,
    limit: usize,
) -> anyhow::Result<Vec<ScoredProject>> {
    let Some(profile) = db::fetch_profile(pool, email).await? else {
        return Ok(Vec::new());
    };
    let Some(reference) = db::fetch_project(pool, reference_id).await? else {
        return Ok(Vec::new());
    };

    let candidates = db::fetch_candidate_projects(pool, reference.id, CANDIDATE_POOL).await?;
    Ok(rank_candidates(&profile, &reference, &candidates, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkillLevel;
    use chrono::{Duration, Utc};

    fn profile(skill: SkillLevel, domains: &[&str]) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "dev.nair@example.edu".to_string(),
            preferred_domains: domains.iter().map(|d| d.to_string()).collect(),
            skill_level: skill,
            academic_year: "third year".to_string(),
        }
    }

    fn project(domain: &str, difficulty: &str, technology: &str, days_old: i64) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: format!("{domain} starter"),
            domain: domain.to_string(),
            difficulty: difficulty.to_string(),
            recommended_year: "third year".to_string(),
            primary_technology: technology.to_string(),
            tech_stack: vec![technology.to_string()],
            created_at: Utc::now() - Duration::days(days_old),
        }
    }

    #[test]
    fn reference_domain_outranks_preferred_domain() {
        let profile = profile(SkillLevel::Intermediate, &["Mobile"]);
        let reference = project("Web", "INTERMEDIATE", "Rust", 10);
        let same_domain = project("Web", "BEGINNER", "Go", 5);
        let preferred_domain = project("Mobile", "BEGINNER", "Go", 5);

        let ranked = rank_candidates(
            &profile,
            &reference,
            &[preferred_domain.clone(), same_domain.clone()],
            10,
        );
        assert_eq!(ranked[0].project.id, same_domain.id);
        // Same domain +3, compatible difficulty +0.5.
        assert!((ranked[0].score - 3.5).abs() < 1e-9);
        // Preferred domain +2, compatible difficulty +0.5, never both branches.
        assert!((ranked[1].score - 2.5).abs() < 1e-9);
    }

    #[test]
    fn reference_project_is_excluded() {
        let profile = profile(SkillLevel::Beginner, &[]);
        let reference = project("Web", "BEGINNER", "Rust", 1);
        let ranked = rank_candidates(&profile, &reference, &[reference.clone()], 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn same_difficulty_beats_compatible_difficulty() {
        let profile = profile(SkillLevel::Expert, &[]);
        let reference = project("Systems", "INTERMEDIATE", "Rust", 20);
        let same_difficulty = project("Other", "INTERMEDIATE", "Python", 5);
        let compatible_only = project("Other", "EXPERT", "Python", 5);

        let ranked = rank_candidates(
            &profile,
            &reference,
            &[compatible_only.clone(), same_difficulty.clone()],
            10,
        );
        assert_eq!(ranked[0].project.id, same_difficulty.id);
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
        assert!((ranked[1].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn malformed_difficulty_keeps_other_components() {
        let profile = profile(SkillLevel::Intermediate, &[]);
        let reference = project("Web", "INTERMEDIATE", "Rust", 10);
        let corrupt = project("Web", "??", "Rust", 5);

        let ranked = rank_candidates(&profile, &reference, &[corrupt], 10);
        // Domain +3 and technology +2 still count; difficulty contributes 0.
        assert!((ranked[0].score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn ties_break_by_newest_creation_date() {
        let profile = profile(SkillLevel::Intermediate, &[]);
        let reference = project("Web", "INTERMEDIATE", "Rust", 30);
        let older = project("Data", "ADVANCED", "Python", 9);
        let newer = project("Games", "ADVANCED", "Python", 2);

        let ranked = rank_candidates(&profile, &reference, &[older.clone(), newer.clone()], 10);
        assert_eq!(ranked[0].project.id, newer.id);
        assert_eq!(ranked[1].project.id, older.id);
    }

    #[test]
    fn ranking_is_deterministic() {
        let profile = profile(SkillLevel::Intermediate, &["AI"]);
        let reference = project("Web", "INTERMEDIATE", "Rust", 15);
        let candidates = vec![
            project("AI", "BEGINNER", "Python", 3),
            project("Web", "ADVANCED", "Rust", 7),
            project("Games", "EXPERT", "C++", 1),
        ];

        let first = rank_candidates(&profile, &reference, &candidates, 10);
        let second = rank_candidates(&profile, &reference, &candidates, 10);
        let ids = |ranked: &[ScoredProject]| {
            ranked
                .iter()
                .map(|entry| entry.project.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn limit_truncates_the_ranking() {
        let profile = profile(SkillLevel::Intermediate, &[]);
        let reference = project("Web", "INTERMEDIATE", "Rust", 15);
        let candidates: Vec<Project> = (0..5)
            .map(|i| project("Web", "INTERMEDIATE", "Rust", i))
            .collect();
        let ranked = rank_candidates(&profile, &reference, &candidates, 2);
        assert_eq!(ranked.len(), 2);
    }
}
