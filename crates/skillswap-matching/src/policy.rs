//! Ranking policy
//!
//! Candidates are ordered by, in priority:
//! 1. match tier (mutual, partial, fallback)
//! 2. overlap score within the tier
//! 3. availability compatibility
//! 4. position in the supplied pool

use skillswap_types::{
    compare_availability, normalize_skills, AvailabilityOverlap, CandidateProfile, MatchTier,
    UserSkillProfile,
};
use std::cmp::Reverse;
use std::collections::HashSet;

/// How one candidate relates to the requester
#[derive(Debug, Clone, PartialEq)]
pub struct MatchAssessment {
    pub tier: MatchTier,
    /// Skills the candidate offers that the requester wants
    pub teaches: Vec<String>,
    /// Skills the candidate wants that the requester offers
    pub learns: Vec<String>,
    pub availability: AvailabilityOverlap,
}

impl MatchAssessment {
    /// Mutual matches score by skill pairs, partial ones by overlapping skills
    pub fn score(&self) -> usize {
        match self.tier {
            MatchTier::Mutual => self.teaches.len() * self.learns.len(),
            MatchTier::Partial => self.teaches.len() + self.learns.len(),
            MatchTier::Fallback => 0,
        }
    }

    /// Human-readable justification naming the overlap
    pub fn reason(&self) -> String {
        let mut reason = match self.tier {
            MatchTier::Mutual => format!(
                "Mutual match: offers {} which you want to learn, and wants to learn {} which you offer.",
                join_skills(&self.teaches),
                join_skills(&self.learns)
            ),
            MatchTier::Partial if !self.teaches.is_empty() => format!(
                "Partial match: offers {} which you want to learn.",
                join_skills(&self.teaches)
            ),
            MatchTier::Partial => format!(
                "Partial match: wants to learn {} which you offer.",
                join_skills(&self.learns)
            ),
            MatchTier::Fallback => "Fallback suggestion: no direct skill overlap with your profile; \
                 included as a weaker match to fill your recommendations."
                .to_string(),
        };

        match &self.availability {
            AvailabilityOverlap::Shared(days) => {
                reason.push_str(&format!(" Availability overlaps on {}.", days.join(", ")));
            }
            AvailabilityOverlap::Flexible => reason.push_str(" Availability is flexible."),
            AvailabilityOverlap::None => {}
        }
        reason
    }
}

/// A pool entry with its assessment and original position
#[derive(Debug, Clone)]
pub struct RankedCandidate<'a> {
    pub position: usize,
    pub candidate: &'a CandidateProfile,
    pub assessment: MatchAssessment,
}

pub fn assess(requester: &UserSkillProfile, candidate: &CandidateProfile) -> MatchAssessment {
    let teaches = intersect(&candidate.skills_offered, &requester.skills_wanted);
    let learns = intersect(&candidate.skills_wanted, &requester.skills_offered);

    let tier = match (teaches.is_empty(), learns.is_empty()) {
        (false, false) => MatchTier::Mutual,
        (true, true) => MatchTier::Fallback,
        _ => MatchTier::Partial,
    };

    MatchAssessment {
        tier,
        teaches,
        learns,
        availability: compare_availability(
            requester.availability.as_deref(),
            candidate.availability.as_deref(),
        ),
    }
}

/// Rank a pool best-first. Ties keep pool order.
pub fn rank<'a>(
    requester: &UserSkillProfile,
    pool: &'a [CandidateProfile],
) -> Vec<RankedCandidate<'a>> {
    let mut ranked: Vec<RankedCandidate<'a>> = pool
        .iter()
        .enumerate()
        .map(|(position, candidate)| RankedCandidate {
            position,
            candidate,
            assessment: assess(requester, candidate),
        })
        .collect();

    ranked.sort_by_key(|r| {
        (
            r.assessment.tier,
            Reverse(r.assessment.score()),
            Reverse(r.assessment.availability.is_compatible()),
            r.position,
        )
    });
    ranked
}

/// Normalize and filter a raw pool before ranking
///
/// Drops the requester and repeated candidate ids (first wins); skill lists
/// are trimmed and de-duplicated. Candidates without any skills stay in the
/// pool as fallback fill.
pub fn prepare_pool(
    requester: &UserSkillProfile,
    pool: &[CandidateProfile],
) -> Vec<CandidateProfile> {
    let mut seen = HashSet::new();
    pool.iter()
        .filter(|c| requester.user_id.as_ref() != Some(&c.candidate_id))
        .filter(|c| seen.insert(c.candidate_id.clone()))
        .map(|c| CandidateProfile {
            candidate_id: c.candidate_id.clone(),
            skills_offered: normalize_skills(c.skills_offered.iter().cloned()),
            skills_wanted: normalize_skills(c.skills_wanted.iter().cloned()),
            availability: c
                .availability
                .as_ref()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        })
        .collect()
}

fn intersect(left: &[String], right: &[String]) -> Vec<String> {
    let right: HashSet<String> = right.iter().map(|s| s.trim().to_lowercase()).collect();
    left.iter()
        .filter(|s| right.contains(&s.trim().to_lowercase()))
        .cloned()
        .collect()
}

fn join_skills(skills: &[String]) -> String {
    match skills {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requester() -> UserSkillProfile {
        UserSkillProfile {
            user_id: Some("a".into()),
            skills_offered: vec!["Guitar".into(), "React".into()],
            skills_wanted: vec!["Python".into(), "SQL".into()],
            availability: Some("Weekends".into()),
        }
    }

    fn ids(ranked: &[RankedCandidate<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.candidate.candidate_id.to_string()).collect()
    }

    #[test]
    fn test_mutual_ranks_ahead_of_partial_and_fallback() {
        let pool = vec![
            CandidateProfile::new("fallback", ["Cooking"], ["Marketing"]),
            CandidateProfile::new("partial", ["Python"], ["Yoga"]),
            CandidateProfile::new("mutual", ["python"], ["guitar"]),
        ];
        let ranked = rank(&requester(), &pool);
        assert_eq!(ids(&ranked), vec!["mutual", "partial", "fallback"]);
        assert_eq!(ranked[0].assessment.tier, MatchTier::Mutual);
        assert_eq!(ranked[2].assessment.tier, MatchTier::Fallback);
    }

    #[test]
    fn test_more_pairs_rank_higher() {
        let pool = vec![
            CandidateProfile::new("one-pair", ["Python"], ["Guitar"]),
            CandidateProfile::new("four-pairs", ["Python", "SQL"], ["Guitar", "React"]),
        ];
        let ranked = rank(&requester(), &pool);
        assert_eq!(ids(&ranked), vec!["four-pairs", "one-pair"]);
        assert_eq!(ranked[0].assessment.score(), 4);
    }

    #[test]
    fn test_availability_breaks_ties_within_tier() {
        let pool = vec![
            CandidateProfile::new("weekday", ["Python"], ["Guitar"]).with_availability("Tuesdays"),
            CandidateProfile::new("weekend", ["Python"], ["Guitar"]).with_availability("Sundays"),
        ];
        let ranked = rank(&requester(), &pool);
        assert_eq!(ids(&ranked), vec!["weekend", "weekday"]);
    }

    #[test]
    fn test_equal_candidates_keep_pool_order() {
        let pool = vec![
            CandidateProfile::new("first", ["Python"], ["Guitar"]),
            CandidateProfile::new("second", ["Python"], ["Guitar"]),
        ];
        assert_eq!(ids(&rank(&requester(), &pool)), vec!["first", "second"]);
    }

    #[test]
    fn test_availability_lifts_fallback_candidates() {
        let pool = vec![
            CandidateProfile::new("quiet", ["Cooking"], ["Yoga"]),
            CandidateProfile::new("saturday", ["Baking"], ["Yoga"]).with_availability("Saturdays"),
        ];
        assert_eq!(ids(&rank(&requester(), &pool)), vec!["saturday", "quiet"]);
    }

    #[test]
    fn test_reasons_name_the_overlap() {
        let candidate = CandidateProfile::new("b", ["Python", "SQL"], ["Guitar"])
            .with_availability("Saturday mornings");
        let reason = assess(&requester(), &candidate).reason();
        assert_eq!(
            reason,
            "Mutual match: offers Python and SQL which you want to learn, and wants to learn \
             Guitar which you offer. Availability overlaps on saturday."
        );

        let fallback = assess(&requester(), &CandidateProfile::new("c", ["Cooking"], ["Yoga"]));
        assert!(fallback.reason().starts_with("Fallback suggestion"));

        let learner = assess(&requester(), &CandidateProfile::new("d", ["Yoga"], ["React"]));
        assert_eq!(
            learner.reason(),
            "Partial match: wants to learn React which you offer."
        );
    }

    #[test]
    fn test_prepare_pool_filters() {
        let pool = vec![
            CandidateProfile::new("a", ["Python"], ["Guitar"]),
            CandidateProfile::new("b", [" Python ", "python"], ["Guitar"]),
            CandidateProfile::new("b", ["SQL"], ["React"]),
            CandidateProfile::new("empty", ["  "], Vec::<String>::new()),
        ];
        let prepared = prepare_pool(&requester(), &pool);
        let ids: Vec<_> = prepared.iter().map(|c| c.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "empty"]);
        assert_eq!(prepared[0].skills_offered, vec!["Python"]);
        assert!(prepared[1].skills_offered.is_empty());
    }

    #[test]
    fn test_candidate_without_skills_is_fallback() {
        let pool = vec![
            CandidateProfile::new("new", Vec::<String>::new(), Vec::<String>::new()),
            CandidateProfile::new("mutual", ["Python"], ["Guitar"]),
        ];
        let prepared = prepare_pool(&requester(), &pool);
        let ranked = rank(&requester(), &prepared);
        assert_eq!(ids(&ranked), vec!["mutual", "new"]);
        assert_eq!(ranked[1].assessment.tier, MatchTier::Fallback);
    }
}
