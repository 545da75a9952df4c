//! Skill tier detection from the user's job request.

use serde::Serialize;

const BEGINNER_KEYWORDS: &[&str] = &["intern", "beginner", "student", "newbie", "entry"];
const SENIOR_KEYWORDS: &[&str] = &["senior", "lead", "staff", "principal", "architect"];

/// Role tier the manager plans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTier {
    Beginner,
    Junior,
    Senior,
}

impl SkillTier {
    /// Detect the tier by whole-word keyword presence. Beginner keywords win
    /// over senior ones.
    pub fn detect(request: &str) -> Self {
        let lowered = request.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        if has_keyword(&words, BEGINNER_KEYWORDS) {
            SkillTier::Beginner
        } else if has_keyword(&words, SENIOR_KEYWORDS) {
            SkillTier::Senior
        } else {
            SkillTier::Junior
        }
    }

    /// Number of tickets the manager is asked to produce.
    pub fn ticket_count(self) -> usize {
        match self {
            SkillTier::Beginner => 2,
            SkillTier::Junior => 3,
            SkillTier::Senior => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillTier::Beginner => "beginner",
            SkillTier::Junior => "junior",
            SkillTier::Senior => "senior",
        }
    }
}

/// A word matches a keyword exactly or as its plural.
fn has_keyword(words: &[&str], keywords: &[&str]) -> bool {
    words.iter().any(|word| {
        let singular = word.strip_suffix('s').unwrap_or(*word);
        keywords.contains(word) || keywords.contains(&singular)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_request_is_beginner() {
        assert_eq!(
            SkillTier::detect("Backend Intern for a Fintech App"),
            SkillTier::Beginner
        );
    }

    #[test]
    fn senior_keywords_are_case_insensitive() {
        assert_eq!(SkillTier::detect("STAFF platform engineer"), SkillTier::Senior);
        assert_eq!(SkillTier::detect("Tech Lead, payments"), SkillTier::Senior);
    }

    #[test]
    fn beginner_wins_over_senior() {
        assert_eq!(SkillTier::detect("intern on the senior team"), SkillTier::Beginner);
    }

    #[test]
    fn unmatched_request_is_junior() {
        let tier = SkillTier::detect("I want a random coding task.");
        assert_eq!(tier, SkillTier::Junior);
        assert_eq!(tier.ticket_count(), 3);
    }

    #[test]
    fn keywords_inside_longer_words_do_not_count() {
        assert_eq!(
            SkillTier::detect("Senior engineer at an international bank"),
            SkillTier::Senior
        );
        assert_eq!(
            SkillTier::detect("Internal tools principal architect"),
            SkillTier::Senior
        );
        assert_eq!(
            SkillTier::detect("Backend dev on the Sentry integration"),
            SkillTier::Junior
        );
        assert_eq!(SkillTier::detect("Fix misleading error pages"), SkillTier::Junior);
    }

    #[test]
    fn hyphenated_and_plural_keywords_match() {
        assert_eq!(SkillTier::detect("entry-level QA role"), SkillTier::Beginner);
        assert_eq!(SkillTier::detect("Summer program for students"), SkillTier::Beginner);
    }
}
