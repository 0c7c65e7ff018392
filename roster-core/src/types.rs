//! Identity records for the contributor roster.
//!
//! A [`Developer`] is keyed by its login when one is known, otherwise by its
//! display name. Evidence sets (`emails`, `aliases`, `commits`) only grow;
//! scalar fields are first-write-wins. The only way a record disappears is by
//! being absorbed into another one through [`Developer::merge_from`].

use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Company
// ---------------------------------------------------------------------------

/// Affiliation of a developer. An unknown affiliation is `Option::None`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Company {
    /// Confirmed staff of the organization.
    Internal,
    /// Former staff (`ex-<company>`).
    Former,
    /// Probably staff: inferred from an internal email address only.
    Unconfirmed,
    /// Any other company.
    External(String),
}

impl Company {
    /// Classify a raw company string against the organization's company name.
    ///
    /// Blank input is an unknown company.
    pub fn classify(raw: &str, company: &str) -> Option<Company> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let classified = if raw.eq_ignore_ascii_case(company) {
            Company::Internal
        } else if raw.eq_ignore_ascii_case(&former_label(company)) {
            Company::Former
        } else if raw.eq_ignore_ascii_case(&unconfirmed_label(company)) {
            Company::Unconfirmed
        } else {
            Company::External(raw.to_owned())
        };
        Some(classified)
    }

    /// Render the persisted form, given the organization's company name.
    pub fn render(&self, company: &str) -> String {
        match self {
            Company::Internal => company.to_owned(),
            Company::Former => former_label(company),
            Company::Unconfirmed => unconfirmed_label(company),
            Company::External(name) => name.clone(),
        }
    }

    /// Confirmed staff need no contribution agreement.
    pub fn is_internal(&self) -> bool {
        matches!(self, Company::Internal)
    }

    /// Current and former staff have their commit evidence left out of the roster file.
    pub fn omits_evidence(&self) -> bool {
        matches!(self, Company::Internal | Company::Former)
    }
}

fn former_label(company: &str) -> String {
    format!("ex-{company}")
}

fn unconfirmed_label(company: &str) -> String {
    format!("{company} (ex?)")
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Enrichment diff extracted from a remote user record or a core-team member.
///
/// Folded into a [`Developer`] by [`Developer::fill_from`]; never retained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<Company>,
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Developer
// ---------------------------------------------------------------------------

/// Canonical identity record.
///
/// Field order is significant: the derived ordering compares
/// `(login, display_name, signed, emails, url, company, aliases, commits)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Developer {
    login: Option<String>,
    display_name: Option<String>,
    signed: bool,
    emails: BTreeSet<String>,
    url: Option<String>,
    company: Option<Company>,
    aliases: BTreeSet<String>,
    commits: BTreeSet<String>,
}

impl Developer {
    /// A developer with a known account.
    pub fn with_login(login: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
            ..Self::default()
        }
    }

    /// A developer only known by a display name.
    pub fn anonymous(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn emails(&self) -> &BTreeSet<String> {
        &self.emails
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn company(&self) -> Option<&Company> {
        self.company.as_ref()
    }

    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    pub fn commits(&self) -> &BTreeSet<String> {
        &self.commits
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn is_anonymous(&self) -> bool {
        self.login.is_none()
    }

    /// Index key: the login, or the display name for anonymous records.
    pub fn key(&self) -> Option<&str> {
        self.login().or_else(|| self.display_name())
    }

    /// All the fields a profile lookup could still provide are present.
    pub fn is_complete(&self) -> bool {
        self.login.is_some()
            && self.display_name.is_some()
            && !self.emails.is_empty()
            && self.company.is_some()
    }

    /// Same login, a shared email, or one's display name is the other's login.
    pub fn denotes_same_person(&self, other: &Developer) -> bool {
        if self.login.is_some() && self.login == other.login {
            return true;
        }
        if !self.emails.is_disjoint(&other.emails) {
            return true;
        }
        let named_after = |a: &Developer, b: &Developer| {
            matches!((a.display_name(), b.login()), (Some(name), Some(login)) if name == login)
        };
        named_after(self, other) || named_after(other, self)
    }

    pub fn set_display_name_if_unset(&mut self, name: &str) {
        if is_blank(self.display_name.as_deref()) && !name.trim().is_empty() {
            self.display_name = Some(name.to_owned());
        }
    }

    /// Blank addresses are ignored.
    pub fn add_email(&mut self, email: &str) -> bool {
        let email = email.trim();
        if email.is_empty() {
            return false;
        }
        self.emails.insert(email.to_owned())
    }

    pub fn set_url_if_unset(&mut self, url: &str) {
        if is_blank(self.url.as_deref()) && !url.trim().is_empty() {
            self.url = Some(url.to_owned());
        }
    }

    pub fn set_company_if_unset(&mut self, company: Company) {
        if self.company.is_none() {
            self.company = Some(company);
        }
    }

    /// Overrides any existing company. Reserved for authoritative sources.
    pub fn force_company(&mut self, company: Company) {
        self.company = Some(company);
    }

    /// Blank aliases are ignored.
    pub fn add_alias(&mut self, alias: &str) {
        let alias = alias.trim();
        if !alias.is_empty() {
            self.aliases.insert(alias.to_owned());
        }
    }

    /// `name` is this record's own login or display name.
    pub fn answers_to(&self, name: &str) -> bool {
        self.login() == Some(name) || self.display_name() == Some(name)
    }

    /// Record a commit URL or repository URL as activity evidence.
    pub fn add_evidence(&mut self, url: &str) {
        if !url.is_empty() {
            self.commits.insert(url.to_owned());
        }
    }

    pub fn mark_signed(&mut self, signed: bool) {
        self.signed |= signed;
    }

    /// Copy every profile field that is unset here. Never overwrites.
    pub fn fill_from(&mut self, profile: &Profile) {
        if let Some(name) = profile.name.as_deref() {
            self.set_display_name_if_unset(name);
        }
        if let Some(email) = profile.email.as_deref() {
            self.add_email(email);
        }
        if let Some(company) = profile.company.clone() {
            self.set_company_if_unset(company);
        }
        if let Some(url) = profile.url.as_deref() {
            self.set_url_if_unset(url);
        }
    }

    /// Absorb another record's fields.
    ///
    /// Commit evidence only flows into an anonymous absorber: activity of
    /// developers with a login is attributed through contributor lists instead.
    pub fn merge_from(&mut self, other: &Developer) -> &mut Self {
        if let Some(name) = other.display_name.as_deref() {
            self.set_display_name_if_unset(name);
        }
        self.emails.extend(other.emails.iter().cloned());
        if let Some(company) = other.company.clone() {
            self.set_company_if_unset(company);
        }
        if let Some(url) = other.url.as_deref() {
            self.set_url_if_unset(url);
        }
        self.aliases.extend(other.aliases.iter().cloned());
        if self.is_anonymous() {
            self.commits.extend(other.commits.iter().cloned());
        }
        self.signed |= other.signed;
        self
    }
}

impl fmt::Display for Developer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.login(), self.display_name()) {
            (Some(login), Some(name)) => write!(f, "{login} ({name})"),
            (Some(login), None) => write!(f, "{login}"),
            (None, Some(name)) => write!(f, "{name} (anonymous)"),
            (None, None) => write!(f, "<unnamed>"),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
