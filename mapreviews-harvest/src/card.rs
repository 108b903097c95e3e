//! Business card header: name, average rating, and counts.
use crate::model::CardMetadata;
use crate::selectors::CardSelectors;
use anyhow::{Context, Result, anyhow};
use mapreviews_drivers::{Page, PageElement};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{info, warn};

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]*)\)").expect("static regex"));

/// Read each card field independently; a missing one never blocks the rest.
pub async fn extract_card<P: Page>(
    page: &P,
    selectors: &CardSelectors,
    wait: Duration,
) -> CardMetadata {
    let name = read_field(page, selectors.name, wait, "name", |t| {
        Some(t.trim().to_string()).filter(|n| !n.is_empty())
    })
    .await;
    let rating = read_field(page, selectors.rating, wait, "rating", parse_rating).await;
    let reviews_count =
        read_field(page, selectors.reviews_count, wait, "reviews_count", digits_only).await;
    let ratings_count =
        read_field(page, selectors.summary, wait, "ratings_count", parenthesized_count).await;

    CardMetadata {
        name,
        rating,
        reviews_count,
        ratings_count,
    }
}

async fn read_field<P, T, F>(
    page: &P,
    selector: &str,
    wait: Duration,
    field: &'static str,
    parse: F,
) -> Option<T>
where
    P: Page,
    T: std::fmt::Debug,
    F: Fn(&str) -> Option<T>,
{
    let outcome: Result<T> = async {
        let element = page
            .find(selector, wait)
            .await?
            .ok_or_else(|| anyhow!("no element matches {selector}"))?;
        let text = element.inner_text().await?;
        parse(&text).with_context(|| format!("unreadable value {text:?}"))
    }
    .await;

    match outcome {
        Ok(value) => {
            info!(target: "harvest.card", field, value = ?value, "card field read");
            Some(value)
        }
        Err(e) => {
            warn!(target: "harvest.card", field, error = %e, "card field unavailable");
            None
        }
    }
}

/// "4,7" or "4.7" as a float.
pub fn parse_rating(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse().ok()
}

/// All ASCII digits in `text` read as one number ("1 234 reviews" is 1234).
pub fn digits_only(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Digits inside the first parenthesized group ("4,7(1 234)" is 1234).
pub fn parenthesized_count(text: &str) -> Option<u64> {
    PARENTHESIZED
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|inner| digits_only(inner.as_str()))
}
