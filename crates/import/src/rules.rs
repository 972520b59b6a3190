use centime_core::{CategorizationRule, CategoryId, MatchField};

/// First-match keyword categorizer. Rules fire in ascending creation
/// order (oldest first), so an early broad rule beats a later specific
/// one; callers decide which transactions are eligible (the engine itself
/// never looks at the current category).
pub struct RuleEngine {
    rules: Vec<CategorizationRule>,
}

impl RuleEngine {
    /// Retains active rules with a usable keyword and fixes the evaluation
    /// order. An empty keyword would match every string, so such rules are
    /// dropped here even if they slipped past creation-time validation.
    pub fn new(mut rules: Vec<CategorizationRule>) -> Self {
        rules.retain(|r| r.is_active && !r.keyword.trim().is_empty());
        rules.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Case-insensitive substring test of each rule's keyword against the
    /// transaction field the rule names. Returns the first hit's category.
    pub fn categorize(&self, description: &str, merchant: Option<&str>) -> Option<CategoryId> {
        self.rules
            .iter()
            .find(|rule| rule_matches(rule, description, merchant))
            .map(|rule| rule.category_id)
    }
}

fn rule_matches(rule: &CategorizationRule, description: &str, merchant: Option<&str>) -> bool {
    let text = match rule.match_field {
        MatchField::Description => description,
        MatchField::Merchant => match merchant {
            Some(m) => m,
            None => return false,
        },
    };
    let keyword = rule.keyword.trim().to_lowercase();
    !keyword.is_empty() && text.to_lowercase().contains(&keyword)
}
