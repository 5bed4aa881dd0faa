use sqlx::{QueryBuilder, Sqlite};

/// Filter predicate shared by listing and random selection.
///
/// Tag matching is substring containment on the raw comma-joined column, not
/// set membership: `java` matches a row tagged `javascript`. Existing clients
/// rely on this, so it is kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionFilter {
    /// ASCII-lowercased, trimmed candidate tags. Every one must match.
    /// Folding must agree with SQLite's `lower()`, which leaves non-ASCII alone.
    tag_terms: Vec<String>,
    difficulty: Option<String>,
}

impl QuestionFilter {
    /// Empty strings mean "no filter" for either field. Empty candidates left
    /// over from stray commas are dropped.
    pub fn new(tags: Option<&str>, difficulty: Option<&str>) -> Self {
        let tag_terms = tags
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let difficulty = difficulty.filter(|d| !d.is_empty()).map(String::from);

        Self {
            tag_terms,
            difficulty,
        }
    }

    /// Appends the WHERE clause for this filter, if any.
    ///
    /// Case folding uses SQLite's `lower()`, which only folds ASCII.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut separator = " WHERE ";
        for term in &self.tag_terms {
            qb.push(separator)
                .push("instr(lower(tags), ")
                .push_bind(term.clone())
                .push(") > 0");
            separator = " AND ";
        }
        if let Some(difficulty) = &self.difficulty {
            qb.push(separator)
                .push("difficulty = ")
                .push_bind(difficulty.clone());
        }
    }
}
