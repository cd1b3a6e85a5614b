use crate::oracle::{OracleError, OracleRequest, OracleResponse};

/// System prompt for the recommendation model
pub(crate) const SYSTEM_PROMPT: &str =
    "You are an AI assistant designed to recommend skill swaps between users. \
     You only answer with valid JSON.";

/// Render the user prompt for a recommendation request
pub fn recommendation_prompt(request: &OracleRequest) -> String {
    let profiles: String = request
        .other_user_profiles
        .iter()
        .map(|c| {
            format!(
                "- userId: {} | offers: {} | wants: {} | availability: {}",
                c.user_id,
                list_or_none(&c.skills_offered),
                list_or_none(&c.skills_wanted),
                c.availability.as_deref().unwrap_or("not specified")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Given a user's profile including their skills and what they want to learn, and a list of other user profiles, recommend potential skill swap partners.

User Skills: {skills}
User Wants: {wants}
User Availability: {availability}
Other User Profiles:
{profiles}

Consider the following when making recommendations:
1. A good skill swap partner has skills the user wants to learn AND wants to learn skills the user has. Rank these highest; the more overlapping skills, the better.
2. Among equally good matches, prefer partners whose availability overlaps the user's.
3. Partners matching only one direction come next.
4. If fewer good matches exist than requested, fill the remaining slots with the closest remaining profiles and say that they are weaker fallback matches.
5. Only recommend users from the list above, each at most once, using their exact userId.

Provide exactly {count} recommendations, each with a short reason naming the overlapping skills or availability.

Respond only with JSON of the form:
{{"recommendations": [{{"userId": "...", "reason": "..."}}]}}"#,
        skills = list_or_none(&request.user_skills),
        wants = list_or_none(&request.user_wants),
        availability = request
            .user_availability
            .as_deref()
            .unwrap_or("not specified"),
        profiles = profiles,
        count = request.number_of_recommendations,
    )
}

/// Parse a model answer into the output schema
///
/// Tolerates markdown code fences and prose around the JSON object.
pub fn parse_response(raw: &str) -> Result<OracleResponse, OracleError> {
    let trimmed = raw.trim();
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => {
            return Err(OracleError::Malformed(format!(
                "no JSON object in response: {}",
                truncate(trimmed, 120)
            )))
        }
    };

    serde_json::from_str(json).map_err(|e| OracleError::Malformed(e.to_string()))
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleCandidate;

    fn request() -> OracleRequest {
        OracleRequest {
            user_skills: vec!["Guitar".into()],
            user_wants: vec!["Python".into()],
            user_availability: Some("Weekends".into()),
            other_user_profiles: vec![OracleCandidate {
                user_id: "b".into(),
                skills_offered: vec!["Python".into()],
                skills_wanted: vec!["Guitar".into()],
                availability: None,
            }],
            number_of_recommendations: 2,
        }
    }

    #[test]
    fn test_prompt_lists_profile_and_count() {
        let prompt = recommendation_prompt(&request());
        assert!(prompt.contains("User Skills: Guitar"));
        assert!(prompt.contains("User Availability: Weekends"));
        assert!(prompt.contains("- userId: b | offers: Python | wants: Guitar"));
        assert!(prompt.contains("Provide exactly 2 recommendations"));
        assert!(prompt.contains(r#"{"recommendations": [{"userId": "...", "reason": "..."}]}"#));
    }

    #[test]
    fn test_parse_fenced_response() {
        let raw = "```json\n{\"recommendations\": [{\"userId\": \"b\", \"reason\": \"Teaches Python\"}]}\n```";
        let parsed = parse_response(raw).unwrap();
        assert_eq!(parsed.recommendations.len(), 1);
        assert_eq!(parsed.recommendations[0].user_id, "b");
        assert_eq!(parsed.recommendations[0].reason, "Teaches Python");
    }

    #[test]
    fn test_parse_missing_reason_defaults_empty() {
        let parsed = parse_response(r#"{"recommendations": [{"userId": "c"}]}"#).unwrap();
        assert_eq!(parsed.recommendations[0].reason, "");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_response("I cannot help with that."),
            Err(OracleError::Malformed(_))
        ));
        assert!(matches!(
            parse_response(r#"{"recs": 3}"#),
            Err(OracleError::Malformed(_))
        ));
    }
}
