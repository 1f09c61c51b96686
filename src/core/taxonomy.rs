use super::models::SectionKind;

/// Heading keyword alternatives per section kind, in taxonomy order.
pub const SECTION_HEADINGS: [(SectionKind, &[&str]); 10] = [
    (SectionKind::Contact, &["contact", "personal", "header"]),
    (
        SectionKind::Summary,
        &["summary", "objective", "profile", "about"],
    ),
    (
        SectionKind::Experience,
        &["experience", "work", "employment", "professional"],
    ),
    (
        SectionKind::Education,
        &["education", "academic", "qualifications"],
    ),
    (SectionKind::Skills, &["skills", "technical", "competencies"]),
    (
        SectionKind::Projects,
        &["projects", "portfolio", "work samples"],
    ),
    (
        SectionKind::Certifications,
        &["certifications", "certificates", "credentials"],
    ),
    (
        SectionKind::Achievements,
        &["achievements", "awards", "honors"],
    ),
    (
        SectionKind::Publications,
        &["publications", "papers", "research"],
    ),
    (
        SectionKind::Volunteer,
        &["volunteer", "community", "service"],
    ),
];

// Grouping is presentational; extraction only ever sees the flattened term list.
pub const SKILL_CATEGORIES: [(&str, &[&str]); 7] = [
    (
        "programming",
        &[
            "python", "java", "javascript", "c++", "c#", "go", "rust", "php", "ruby", "swift",
            "kotlin",
        ],
    ),
    (
        "web",
        &[
            "html", "css", "react", "angular", "vue", "node.js", "django", "flask", "express",
        ],
    ),
    (
        "database",
        &[
            "sql",
            "mysql",
            "postgresql",
            "mongodb",
            "redis",
            "oracle",
            "sqlite",
        ],
    ),
    (
        "cloud",
        &[
            "aws",
            "azure",
            "gcp",
            "docker",
            "kubernetes",
            "terraform",
            "jenkins",
        ],
    ),
    (
        "data",
        &[
            "pandas",
            "numpy",
            "scikit-learn",
            "tensorflow",
            "pytorch",
            "r",
            "matplotlib",
        ],
    ),
    (
        "tools",
        &[
            "git",
            "jira",
            "confluence",
            "slack",
            "figma",
            "photoshop",
            "excel",
        ],
    ),
    (
        "languages",
        &[
            "english", "spanish", "french", "german", "chinese", "japanese", "korean",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_section_kind_has_headings_in_taxonomy_order() {
        let kinds: Vec<SectionKind> = SECTION_HEADINGS.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, SectionKind::ALL.to_vec());
        assert!(SECTION_HEADINGS
            .iter()
            .all(|(_, keywords)| !keywords.is_empty()));
    }

    #[test]
    fn vocabulary_terms_are_unique_within_each_category() {
        for (category, terms) in SKILL_CATEGORIES {
            let mut seen = std::collections::HashSet::new();
            for term in terms {
                assert!(seen.insert(*term), "{term} repeated in {category}");
            }
        }
    }
}
