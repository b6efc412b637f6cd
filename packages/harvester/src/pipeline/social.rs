//! Social profile matching over a page's anchors.

use crate::traits::browser::Element;
use crate::types::record::{SocialKind, SocialLinks};

/// Match every anchor target against the platform table.
///
/// Anchors are visited in document order. Each platform keeps its first
/// match. Platforms are independent, so one anchor may fill several slots
/// only if it matches several platforms.
pub fn match_socials(anchors: &[Element]) -> SocialLinks {
    let mut links = SocialLinks::new();

    for href in anchors.iter().filter_map(Element::href) {
        if href.is_empty() {
            continue;
        }
        for kind in SocialKind::ALL {
            if !links.get(kind).is_found() && kind.matches(href) {
                links.fill(kind, href);
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::Field;

    fn anchor(href: &str) -> Element {
        Element::new("").with_attribute("href", href)
    }

    #[test]
    fn test_first_anchor_per_platform_wins() {
        let anchors = vec![
            anchor("https://facebook.com/first"),
            anchor("/about"),
            anchor("https://instagram.com/y"),
            anchor("https://facebook.com/second"),
        ];

        let links = match_socials(&anchors);
        assert_eq!(
            links.get(SocialKind::Facebook).as_deref(),
            Some("https://facebook.com/first")
        );
        assert_eq!(
            links.get(SocialKind::Instagram).as_deref(),
            Some("https://instagram.com/y")
        );
        assert_eq!(links.get(SocialKind::Tiktok), &Field::NotFound);
        assert_eq!(links.found_count(), 2);
    }

    #[test]
    fn test_anchors_without_href_are_ignored() {
        let anchors = vec![Element::new("Facebook"), anchor("")];
        assert!(!match_socials(&anchors).any_found());
    }

    #[test]
    fn test_twitter_fills_x_slot() {
        let links = match_socials(&[anchor("https://twitter.com/acme")]);
        assert!(links.get(SocialKind::X).is_found());
    }
}
