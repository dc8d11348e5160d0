//! Classification of fetched list bodies.
//!
//! Hosts and proxies regularly answer 200 with an HTML error page, a login wall or
//! an anti-bot interstitial. A list body is only accepted when it does not look
//! like HTML at all.

use crate::list::parser::COMMENT_MARKERS;

/// Phrases that identify an anti-bot interstitial. Matched case-insensitively.
pub const CHALLENGE_KEYWORDS: &[&str] = &[
    "just a moment",
    "checking your browser",
    "checking if the site connection is secure",
    "verify you are human",
    "attention required",
    "enable javascript and cookies to continue",
    "cf-browser-verification",
    "cf-challenge",
    "challenge-platform",
    "ddos-guard",
];

/// Markers that make a body an HTML document. Matched case-insensitively.
pub const HTML_MARKERS: &[&str] = &["<!doctype html", "<html", "<script"];

/// What a fetched body turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyVerdict {
    PlainText,
    ChallengePage,
    HtmlPage,
}

struct Rule {
    verdict: BodyVerdict,
    matches: fn(&str) -> bool,
}

/// Evaluated in order, first match wins. `PlainText` when none match.
const RULES: &[Rule] = &[
    Rule {
        verdict: BodyVerdict::ChallengePage,
        matches: is_challenge_page,
    },
    Rule {
        verdict: BodyVerdict::HtmlPage,
        matches: looks_like_html,
    },
];

/// Classify a fetched body.
#[must_use]
pub fn inspect_body(body: &str) -> BodyVerdict {
    let lower = body.to_ascii_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map_or(BodyVerdict::PlainText, |rule| rule.verdict)
}

/// Markup on comment lines is ignored, so list comments may mention tags.
fn looks_like_html(lower: &str) -> bool {
    let (mut head, mut body) = (false, false);
    let markup_lines = lower
        .lines()
        .map(str::trim_start)
        .filter(|line| !COMMENT_MARKERS.iter().any(|m| line.starts_with(m)));
    for line in markup_lines {
        if HTML_MARKERS.iter().any(|m| line.contains(m)) {
            return true;
        }
        head |= line.contains("<head");
        body |= line.contains("<body");
    }
    head && body
}

fn is_challenge_page(lower: &str) -> bool {
    looks_like_html(lower) && CHALLENGE_KEYWORDS.iter().any(|k| lower.contains(k))
}
