/// A keyword family that, found in rejection comments, suggests an exclusion.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackPattern {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Lowercase; matched as substrings of the lowercased comment.
    pub keywords: &'static [&'static str],
}

impl FeedbackPattern {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }

    pub fn find(key: &str) -> Option<&'static FeedbackPattern> {
        PATTERNS.iter().find(|p| p.key == key)
    }
}

pub const PATTERNS: [FeedbackPattern; 8] = [
    FeedbackPattern {
        key: "911",
        name: "911/Emergency Services Exclusion",
        description: "Exclude circuits handling emergency services",
        keywords: &["911", "emergency", "e911"],
    },
    FeedbackPattern {
        key: "critical",
        name: "Critical Infrastructure Exclusion",
        description: "Exclude circuits marked as critical infrastructure",
        keywords: &["critical", "mission critical", "essential", "vital", "crucial"],
    },
    FeedbackPattern {
        key: "backup",
        name: "Backup Circuit Exclusion",
        description: "Exclude backup and redundancy circuits",
        keywords: &["backup", "redundancy", "failover", "secondary"],
    },
    FeedbackPattern {
        key: "customer",
        name: "Active Customer Circuit Exclusion",
        description: "Exclude circuits with active customer contracts",
        keywords: &["customer", "client", "contract", "sla"],
    },
    FeedbackPattern {
        key: "high priority",
        name: "High Priority Circuit Exclusion",
        description: "Exclude high priority circuits",
        keywords: &["high priority", "priority", "important", "vip"],
    },
    FeedbackPattern {
        key: "recent",
        name: "Recently Installed Exclusion",
        description: "Exclude circuits installed within last 6 months",
        keywords: &[
            "new",
            "recent",
            "recently installed",
            "just added",
            "just installed",
        ],
    },
    FeedbackPattern {
        key: "government",
        name: "Government Services Exclusion",
        description: "Exclude government and military circuits",
        keywords: &["government", "federal", "state", "military", "defense"],
    },
    FeedbackPattern {
        key: "hospital",
        name: "Healthcare Services Exclusion",
        description: "Exclude circuits serving healthcare facilities",
        keywords: &["hospital", "healthcare", "medical", "health"],
    },
];
