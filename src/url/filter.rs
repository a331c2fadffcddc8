/// Outcome of checking a candidate against the generic rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,

    /// Candidate contains the given blacklisted substring
    Blacklisted(String),

    /// Candidate contains no whitelisted substring
    NotWhitelisted,
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Substring blacklist/whitelist filter used in generic mode
///
/// The blacklist wins: a candidate containing any blacklisted substring is
/// rejected even if it also matches the whitelist.
#[derive(Debug, Clone)]
pub struct GenericFilter {
    blacklist: Vec<String>,
    whitelist: Vec<String>,
}

impl GenericFilter {
    pub fn new(blacklist: Vec<String>, whitelist: Vec<String>) -> Self {
        Self {
            blacklist,
            whitelist,
        }
    }

    /// Checks a candidate URL
    ///
    /// # Examples
    ///
    /// ```
    /// use breadth_crawler::url::{GenericFilter, Verdict};
    ///
    /// let filter = GenericFilter::new(vec![".pdf".into()], vec![".com".into()]);
    /// assert_eq!(filter.evaluate("http://x.com/page"), Verdict::Accept);
    /// assert_eq!(filter.evaluate("http://x.org/page"), Verdict::NotWhitelisted);
    /// assert!(!filter.evaluate("http://x.com/file.pdf").is_accept());
    /// ```
    pub fn evaluate(&self, candidate: &str) -> Verdict {
        if let Some(hit) = self.blacklist.iter().find(|b| candidate.contains(b.as_str())) {
            return Verdict::Blacklisted(hit.clone());
        }

        if !self.whitelist.iter().any(|w| candidate.contains(w.as_str())) {
            return Verdict::NotWhitelisted;
        }

        Verdict::Accept
    }
}
