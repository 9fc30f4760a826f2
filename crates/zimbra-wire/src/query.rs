//! Search query construction.
//!
//! Structured search terms are rendered to the server's single-string query
//! language, e.g. `in:"/Inbox/Sub" "hello ""world"""`.
//!
//! Values are always double-quoted with embedded quotes doubled. Nothing else
//! is escaped, so wildcards and colons inside values reach the server as-is.

use std::fmt;

/// One search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// Field-less term, matched against message content.
    Bare(String),
    /// `name:"value"` term.
    Field {
        /// Field name (e.g. `in`, `from`, `subject`).
        name: String,
        /// Field value.
        value: String,
    },
}

impl SearchTerm {
    /// Creates a bare term.
    #[must_use]
    pub fn bare(value: impl Into<String>) -> Self {
        Self::Bare(value.into())
    }

    /// Creates a field term.
    #[must_use]
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare(value) => write!(f, "{}", quote(value)),
            Self::Field { name, value } => write!(f, "{name}:{}", quote(value)),
        }
    }
}

/// Ordered list of search terms.
///
/// Term order is rendering order. Repeated field names are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSpec {
    terms: Vec<SearchTerm>,
}

impl SearchSpec {
    /// Creates an empty search.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bare term.
    #[must_use]
    pub fn term(mut self, value: impl Into<String>) -> Self {
        self.terms.push(SearchTerm::bare(value));
        self
    }

    /// Appends a field term.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.push(SearchTerm::field(name, value));
        self
    }

    /// Appends a term.
    pub fn push(&mut self, term: SearchTerm) {
        self.terms.push(term);
    }

    /// Returns the terms in order.
    #[must_use]
    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }

    /// Returns the number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true if there are no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<SearchTerm> for SearchSpec {
    fn from_iter<I: IntoIterator<Item = SearchTerm>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<SearchTerm>> for SearchSpec {
    fn from(terms: Vec<SearchTerm>) -> Self {
        Self { terms }
    }
}

/// Double-quotes a value, doubling embedded quotes.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Renders a search to the server query string.
#[must_use]
pub fn build_query(spec: &SearchSpec) -> String {
    spec.terms
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortBy {
    /// Server order. Paging cursors are unavailable.
    None,
    /// Oldest first.
    DateAsc,
    /// Newest first.
    #[default]
    DateDesc,
    /// Subject, ascending.
    SubjectAsc,
    /// Subject, descending.
    SubjectDesc,
    /// Sender name, ascending.
    NameAsc,
    /// Sender name, descending.
    NameDesc,
    /// Recipient, ascending.
    RecipientAsc,
    /// Recipient, descending.
    RecipientDesc,
    /// Attachment presence, ascending.
    AttachmentAsc,
    /// Attachment presence, descending.
    AttachmentDesc,
    /// Flagged state, ascending.
    FlagAsc,
    /// Flagged state, descending.
    FlagDesc,
    /// Priority, ascending.
    PriorityAsc,
    /// Priority, descending.
    PriorityDesc,
    /// Item id, ascending.
    IdAsc,
    /// Item id, descending.
    IdDesc,
    /// Read state, ascending.
    ReadAsc,
    /// Read state, descending.
    ReadDesc,
}

impl SortBy {
    /// Returns the wire value for `sortBy`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::DateAsc => "dateAsc",
            Self::DateDesc => "dateDesc",
            Self::SubjectAsc => "subjAsc",
            Self::SubjectDesc => "subjDesc",
            Self::NameAsc => "nameAsc",
            Self::NameDesc => "nameDesc",
            Self::RecipientAsc => "rcptAsc",
            Self::RecipientDesc => "rcptDesc",
            Self::AttachmentAsc => "attachAsc",
            Self::AttachmentDesc => "attachDesc",
            Self::FlagAsc => "flagAsc",
            Self::FlagDesc => "flagDesc",
            Self::PriorityAsc => "priorityAsc",
            Self::PriorityDesc => "priorityDesc",
            Self::IdAsc => "idAsc",
            Self::IdDesc => "idDesc",
            Self::ReadAsc => "readAsc",
            Self::ReadDesc => "readDesc",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
