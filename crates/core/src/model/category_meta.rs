use crate::model::ids::CategoryId;

const FALLBACK_ICON: &str = "📚";

/// Display metadata for a category, looked up by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMeta {
    label: String,
    icon: &'static str,
    description: &'static str,
}

impl CategoryMeta {
    /// Resolve label, icon and description for a category.
    ///
    /// Unknown identifiers fall back to the identifier itself as label, a generic
    /// book icon and an empty description.
    #[must_use]
    pub fn for_category(id: &CategoryId) -> Self {
        match known(id.as_str()) {
            Some((label, icon, description)) => Self {
                label: label.to_owned(),
                icon,
                description,
            },
            None => Self {
                label: id.as_str().to_owned(),
                icon: FALLBACK_ICON,
                description: "",
            },
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.icon
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }
}

fn known(id: &str) -> Option<(&'static str, &'static str, &'static str)> {
    let entry = match id {
        "MS_SQL" => (
            "MS SQL Server",
            "🗄️",
            "Master MS SQL Server architecture, performance tuning, and enterprise operations",
        ),
        "ORACLE" => (
            "Oracle",
            "🔴",
            "Learn Oracle database fundamentals, architecture, and advanced administration",
        ),
        "SSIS" => (
            "SSIS",
            "📦",
            "Explore SQL Server Integration Services for ETL and data pipeline development",
        ),
        "SSRS" => (
            "SSRS",
            "📊",
            "Discover SQL Server Reporting Services for building and managing reports",
        ),
        "AWS_CLOUD" => (
            "AWS Cloud",
            "☁️",
            "Master AWS cloud infrastructure, databases, and enterprise patterns",
        ),
        "AI" => (
            "AI Fundamentals",
            "🤖",
            "Learn AI fundamentals, LLM usage, and prompting techniques for productivity",
        ),
        "AI_in_DBA" => (
            "AI in DBA",
            "🧠",
            "Discover how to leverage AI tools for DBA tasks and operations",
        ),
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_category_has_curated_metadata() {
        let meta = CategoryMeta::for_category(&CategoryId::new("AWS_CLOUD").unwrap());
        assert_eq!(meta.label(), "AWS Cloud");
        assert_eq!(meta.icon(), "☁️");
        assert!(meta.description().contains("AWS"));
    }

    #[test]
    fn unknown_category_falls_back_to_identifier() {
        let meta = CategoryMeta::for_category(&CategoryId::new("RUST").unwrap());
        assert_eq!(meta.label(), "RUST");
        assert_eq!(meta.icon(), "📚");
        assert_eq!(meta.description(), "");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let meta = CategoryMeta::for_category(&CategoryId::new("ms_sql").unwrap());
        assert_eq!(meta.label(), "ms_sql");
    }
}
