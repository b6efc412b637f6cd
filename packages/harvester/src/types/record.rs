//! Extracted business records and the social-network slots they carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the "not found" sentinel is written to output rows.
pub const NOT_FOUND: &str = "-";

/// Output header row, in column order.
pub const HEADERS: [&str; 13] = [
    "Business name",
    "Category",
    "Address",
    "Phone",
    "Website",
    "Email",
    "Facebook",
    "Instagram",
    "LinkedIn",
    "YouTube",
    "TikTok",
    "X",
    "Pinterest",
];

/// A looked-up field: either a value or an explicit miss.
///
/// `Found("")` is never produced; empty text collapses to `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum Field {
    Found(String),
    #[default]
    NotFound,
}

impl Field {
    /// Build from raw element text, trimming and treating blank as a miss.
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            Some(t) if !t.is_empty() => Field::Found(t.to_string()),
            _ => Field::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Field::Found(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Field::Found(v) => Some(v),
            Field::NotFound => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Found(v) => f.write_str(v),
            Field::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

/// Social networks with a dedicated output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialKind {
    Facebook,
    Instagram,
    Linkedin,
    Youtube,
    Tiktok,
    X,
    Pinterest,
}

impl SocialKind {
    /// All kinds, in output column order.
    pub const ALL: [SocialKind; 7] = [
        SocialKind::Facebook,
        SocialKind::Instagram,
        SocialKind::Linkedin,
        SocialKind::Youtube,
        SocialKind::Tiktok,
        SocialKind::X,
        SocialKind::Pinterest,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Known host/path substrings, most specific first.
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            SocialKind::Facebook => &["facebook.com"],
            SocialKind::Instagram => &["instagram.com"],
            SocialKind::Linkedin => &["linkedin.com/company", "linkedin.com/in", "linkedin.com"],
            SocialKind::Youtube => &["youtube.com", "youtu.be"],
            SocialKind::Tiktok => &["tiktok.com"],
            SocialKind::X => &["x.com", "twitter.com"],
            SocialKind::Pinterest => &["pinterest.com"],
        }
    }

    /// Whether a link target belongs to this platform.
    pub fn matches(self, href: &str) -> bool {
        self.patterns().iter().any(|p| href.contains(p))
    }
}

/// One slot per [`SocialKind`], all `NotFound` by default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    slots: [Field; 7],
}

impl SocialLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: SocialKind) -> &Field {
        &self.slots[kind.index()]
    }

    /// Fill a slot only if it is still empty. Returns whether it was filled.
    pub fn fill(&mut self, kind: SocialKind, href: impl Into<String>) -> bool {
        let slot = &mut self.slots[kind.index()];
        if slot.is_found() {
            return false;
        }
        *slot = Field::Found(href.into());
        true
    }

    pub fn found_count(&self) -> usize {
        self.slots.iter().filter(|f| f.is_found()).count()
    }

    pub fn any_found(&self) -> bool {
        self.found_count() > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (SocialKind, &Field)> {
        SocialKind::ALL.into_iter().zip(self.slots.iter())
    }
}

/// Contact data mined from a business website, shared via the contact cache.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Field,
    pub social: SocialLinks,
}

impl ContactInfo {
    /// Nothing looked up or nothing found.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Fixed-schema output of one successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub name: Field,
    pub category: Field,
    pub address: Field,
    pub phone: Field,
    pub website: Field,
    pub contact: ContactInfo,
}

impl ExtractedRecord {
    pub fn email(&self) -> &Field {
        &self.contact.email
    }

    pub fn social(&self, kind: SocialKind) -> &Field {
        self.contact.social.get(kind)
    }

    /// Render as a sheet row in [`HEADERS`] order.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(HEADERS.len());
        row.push(self.name.to_string());
        row.push(self.category.to_string());
        row.push(self.address.to_string());
        row.push(self.phone.to_string());
        row.push(self.website.to_string());
        row.push(self.contact.email.to_string());
        row.extend(self.contact.social.iter().map(|(_, f)| f.to_string()));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_not_found() {
        assert_eq!(Field::from_text(Some("   ")), Field::NotFound);
        assert_eq!(Field::from_text(None), Field::NotFound);
        assert_eq!(
            Field::from_text(Some("  Pizzeria Da Mario ")),
            Field::Found("Pizzeria Da Mario".into())
        );
    }

    #[test]
    fn first_social_match_wins() {
        let mut links = SocialLinks::new();
        assert!(links.fill(SocialKind::Facebook, "https://facebook.com/first"));
        assert!(!links.fill(SocialKind::Facebook, "https://facebook.com/second"));
        assert_eq!(
            links.get(SocialKind::Facebook).as_deref(),
            Some("https://facebook.com/first")
        );
        assert_eq!(links.found_count(), 1);
    }

    #[test]
    fn linkedin_matches_company_and_generic_paths() {
        assert!(SocialKind::Linkedin.matches("https://www.linkedin.com/company/acme"));
        assert!(SocialKind::Linkedin.matches("https://linkedin.com/feed"));
        assert!(SocialKind::X.matches("https://twitter.com/acme"));
        assert!(!SocialKind::Pinterest.matches("https://example.com"));
    }

    #[test]
    fn row_follows_header_order() {
        let mut social = SocialLinks::new();
        social.fill(SocialKind::Instagram, "https://instagram.com/y");

        let record = ExtractedRecord {
            name: Field::Found("Acme".into()),
            category: Field::NotFound,
            address: Field::Found("Via Roma 1".into()),
            phone: Field::NotFound,
            website: Field::Found("https://acme.example/".into()),
            contact: ContactInfo {
                email: Field::Found("info@acme.example".into()),
                social,
            },
        };

        let row = record.to_row();
        assert_eq!(row.len(), HEADERS.len());
        assert_eq!(row[0], "Acme");
        assert_eq!(row[1], NOT_FOUND);
        assert_eq!(row[5], "info@acme.example");
        assert_eq!(row[6], NOT_FOUND);
        assert_eq!(row[7], "https://instagram.com/y");
        assert_eq!(row[12], NOT_FOUND);
    }
}
