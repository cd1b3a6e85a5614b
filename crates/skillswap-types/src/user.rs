use crate::availability::{describe_availability, AvailabilitySelection};
use crate::recommendation::{CandidateProfile, UserSkillProfile};
use crate::swap::ParticipantSnapshot;
use crate::{Id, Result, SkillSwapError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = Id<User>;

/// A member of the exchange and the skills they trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub bio: String,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    /// Free-text availability descriptor, possibly derived from a structured selection
    pub availability: String,
    /// Running average of received ratings, 0 while `reviews == 0`
    pub rating: f64,
    pub reviews: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user: no skills, no rating
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            avatar_url: String::new(),
            bio: String::new(),
            skills_offered: Vec::new(),
            skills_wanted: Vec::new(),
            availability: String::new(),
            rating: 0.0,
            reviews: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_skills(
        mut self,
        offered: impl IntoIterator<Item = impl Into<String>>,
        wanted: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.skills_offered = normalize_skills(offered);
        self.skills_wanted = normalize_skills(wanted);
        self
    }

    pub fn with_availability(mut self, availability: impl Into<String>) -> Self {
        self.availability = availability.into();
        self
    }

    /// A profile is complete once it both offers and wants something
    pub fn is_complete(&self) -> bool {
        !self.skills_offered.is_empty() && !self.skills_wanted.is_empty()
    }

    /// Look up an offered skill case-insensitively, returning the stored spelling
    pub fn offered_skill(&self, skill: &str) -> Option<&str> {
        find_skill(&self.skills_offered, skill)
    }

    pub fn wanted_skill(&self, skill: &str) -> Option<&str> {
        find_skill(&self.skills_wanted, skill)
    }

    pub fn snapshot(&self) -> ParticipantSnapshot {
        ParticipantSnapshot {
            user_id: self.id.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    pub fn skill_profile(&self) -> UserSkillProfile {
        UserSkillProfile {
            user_id: Some(self.id.clone()),
            skills_offered: self.skills_offered.clone(),
            skills_wanted: self.skills_wanted.clone(),
            availability: non_empty(&self.availability),
        }
    }

    pub fn as_candidate(&self) -> CandidateProfile {
        CandidateProfile {
            candidate_id: self.id.clone(),
            skills_offered: self.skills_offered.clone(),
            skills_wanted: self.skills_wanted.clone(),
            availability: non_empty(&self.availability),
        }
    }

    /// Apply an owner's profile edit. Rating and review count are not editable here.
    pub fn apply_update(&mut self, update: ProfileUpdate) -> Result<()> {
        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(SkillSwapError::Validation("name cannot be empty".into()));
            }
            self.name = name.to_string();
        }
        if let Some(bio) = update.bio {
            self.bio = bio.trim().to_string();
        }
        if let Some(avatar_url) = update.avatar_url {
            self.avatar_url = avatar_url;
        }
        if let Some(offered) = update.skills_offered {
            self.skills_offered = normalize_skills(offered);
        }
        if let Some(wanted) = update.skills_wanted {
            self.skills_wanted = normalize_skills(wanted);
        }
        if let Some(availability) = update.availability {
            self.availability = availability.trim().to_string();
        }
        Ok(())
    }
}

/// Owner-initiated profile edit; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    pub availability: Option<String>,
}

impl ProfileUpdate {
    /// Derive the availability descriptor from day and time-slot selections
    pub fn with_selection(mut self, selection: &AvailabilitySelection) -> Self {
        self.availability = Some(describe_availability(selection));
        self
    }
}

/// Trim skill names, drop blanks and case-insensitive duplicates (first spelling wins)
pub fn normalize_skills(skills: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.into().trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

/// Fold one more rating into a running mean
pub fn running_average(old_rating: f64, old_reviews: u32, value: u8) -> f64 {
    let total = old_rating * f64::from(old_reviews) + f64::from(value);
    total / f64::from(old_reviews + 1)
}

fn find_skill<'a>(skills: &'a [String], skill: &str) -> Option<&'a str> {
    let needle = skill.trim().to_lowercase();
    skills
        .iter()
        .find(|s| s.to_lowercase() == needle)
        .map(String::as_str)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_average() {
        let rating = running_average(4.0, 2, 5);
        assert!((rating - 13.0 / 3.0).abs() < 1e-9);
        assert_eq!(running_average(0.0, 0, 3), 3.0);
    }

    #[test]
    fn test_normalize_skills() {
        let skills = normalize_skills(vec![" Rust ", "", "rust", "Go", "  "]);
        assert_eq!(skills, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_new_user_is_incomplete() {
        let user = User::new("u1", "Alice", "alice@example.com");
        assert!(!user.is_complete());
        assert_eq!(user.reviews, 0);
        assert_eq!(user.rating, 0.0);

        let user = user.with_skills(["React"], ["Python"]);
        assert!(user.is_complete());
    }

    #[test]
    fn test_offered_skill_lookup_is_case_insensitive() {
        let user = User::new("u1", "Alice", "a@x").with_skills(["UI/UX Design"], ["Guitar"]);
        assert_eq!(user.offered_skill("ui/ux design"), Some("UI/UX Design"));
        assert_eq!(user.offered_skill("Guitar"), None);
        assert_eq!(user.wanted_skill(" guitar "), Some("Guitar"));
    }

    #[test]
    fn test_apply_update_rejects_blank_name() {
        let mut user = User::new("u1", "Alice", "a@x");
        let err = user
            .apply_update(ProfileUpdate {
                name: Some("   ".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, SkillSwapError::Validation(_)));
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn test_apply_update_normalizes_skills() {
        let mut user = User::new("u1", "Alice", "a@x");
        user.apply_update(ProfileUpdate {
            skills_offered: Some(vec!["Cooking".into(), "cooking".into()]),
            skills_wanted: Some(vec![" SQL ".into()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(user.skills_offered, vec!["Cooking"]);
        assert_eq!(user.skills_wanted, vec!["SQL"]);
    }
}
