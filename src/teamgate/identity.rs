//! Identity input handling: whitespace sanitization and the corporate domain
//! check applied before any network call.

use regex::Regex;

/// Strips every whitespace character. Covers the keystroke rule (spaces are
/// never accepted), the paste rule (all whitespace removed) and the trim.
#[must_use]
pub fn sanitize_input(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

#[derive(Clone, Debug)]
pub struct IdentityPolicy {
    pattern: Regex,
    domains: Vec<String>,
}

impl IdentityPolicy {
    pub fn new(domains: &[String]) -> Result<Self, regex::Error> {
        let alternatives = domains
            .iter()
            .map(|domain| regex::escape(domain))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"^[a-zA-Z0-9._%+-]+@({alternatives})$"))?;
        Ok(Self {
            pattern,
            domains: domains.to_vec(),
        })
    }

    #[must_use]
    pub fn is_allowed(&self, email: &str) -> bool {
        !self.domains.is_empty() && self.pattern.is_match(email)
    }

    /// "@a or @b" list used in the inline domain error.
    #[must_use]
    pub fn describe(&self) -> String {
        self.domains
            .iter()
            .map(|domain| format!("@{domain}"))
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> IdentityPolicy {
        IdentityPolicy::new(&["socialbeat.in".to_string(), "influencer.in".to_string()]).unwrap()
    }

    #[test]
    fn sanitize_removes_all_whitespace() {
        assert_eq!(sanitize_input("  a@socialbeat.in \n"), "a@socialbeat.in");
        assert_eq!(sanitize_input("a b@social\tbeat.in"), "ab@socialbeat.in");
        assert_eq!(sanitize_input("   "), "");
    }

    #[test]
    fn accepts_only_configured_domains() {
        let policy = policy();
        assert!(policy.is_allowed("a@socialbeat.in"));
        assert!(policy.is_allowed("first.last+hr@influencer.in"));
        assert!(!policy.is_allowed("a@gmail.com"));
        assert!(!policy.is_allowed("a@socialbeat.in.evil.com"));
        assert!(!policy.is_allowed("a@sub.socialbeat.in"));
        assert!(!policy.is_allowed("a@socialbeatxin"));
        assert!(!policy.is_allowed("@socialbeat.in"));
        assert!(!policy.is_allowed("a b@socialbeat.in"));
        assert!(!policy.is_allowed(""));
    }

    #[test]
    fn empty_domain_list_rejects_everything() {
        let policy = IdentityPolicy::new(&[]).unwrap();
        assert!(!policy.is_allowed("a@socialbeat.in"));
    }

    #[test]
    fn describe_lists_domains() {
        assert_eq!(policy().describe(), "@socialbeat.in or @influencer.in");
    }
}
