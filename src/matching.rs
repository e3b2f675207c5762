use crate::models::{Difficulty, MatchResult, Project, SkillLevel, UserProfile};

pub fn compatible(skill: SkillLevel, difficulty: Difficulty) -> bool {
    use Difficulty as D;
    use SkillLevel as S;
    matches!(
        (skill, difficulty),
        (S::Beginner, D::Beginner | D::Intermediate)
            | (S::Intermediate, D::Beginner | D::Intermediate | D::Advanced)
            | (S::Advanced, D::Intermediate | D::Advanced | D::Expert)
            | (S::Expert, D::Advanced | D::Expert)
    )
}

/// Single normalization point for the free-text academic-year match.
pub fn year_keyword(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    ["second", "third", "final"]
        .iter()
        .find(|keyword| lowered.contains(*keyword))
        .copied()
}

/// Domain +40, difficulty +40 (ordinal-distance partial credit outside the
/// table), academic year +20.
pub fn match_profile(profile: &UserProfile, project: &Project) -> MatchResult {
    let mut points: u32 = 0;
    let mut reasons = Vec::new();

    if profile
        .preferred_domains
        .iter()
        .any(|domain| domain.eq_ignore_ascii_case(&project.domain))
    {
        points += 40;
        reasons.push(format!("Matches your interest in {}", project.domain));
    }

    let mut difficulty_compatible = false;
    if let Some(difficulty) = Difficulty::parse(&project.difficulty) {
        if compatible(profile.skill_level, difficulty) {
            difficulty_compatible = true;
            points += 40;
            reasons.push("Difficulty matches your skill level".to_string());
        } else {
            let distance = (profile.skill_level.ordinal() - difficulty.ordinal()).abs();
            let (partial, reason) = match distance {
                1 => (20, "Difficulty is one step from your skill level"),
                2 => (10, "Difficulty is a stretch beyond your skill level"),
                _ => (0, ""),
            };
            if partial > 0 {
                points += partial;
                reasons.push(reason.to_string());
            }
        }
    }

    if let (Some(user_year), Some(project_year)) = (
        year_keyword(&profile.academic_year),
        year_keyword(&project.recommended_year),
    ) {
        if user_year == project_year {
            points += 20;
            reasons.push("Recommended for your academic year".to_string());
        }
    }

    MatchResult {
        match_percentage: points.min(100),
        difficulty_compatible,
        match_reasons: reasons,
    }
}

pub fn match_label(percentage: u32) -> &'static str {
    match percentage {
        80.. => "Perfect Fit",
        60..=79 => "Good Fit",
        40..=59 => "Moderate Fit",
        _ => "Challenging",
    }
}
