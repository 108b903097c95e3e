//! Field extraction for a single rendered review.
use crate::model::Review;
use crate::selectors::ReviewSelectors;
use anyhow::Result;
use mapreviews_drivers::PageElement;
use tracing::debug;

/// Read every field of one review node.
///
/// A missing sub-element only blanks its own field. `Err` means the driver
/// failed on this node (for example it went stale mid-read) and the caller
/// should skip it.
pub async fn extract_review<E: PageElement>(node: &E, selectors: &ReviewSelectors) -> Result<Review> {
    let raw_date = child_text(node, selectors.date).await?;
    let author = child_text(node, selectors.author).await?;
    let rating = rating_of(node, selectors).await?;
    let text = child_text(node, selectors.text).await?;
    let response_text = child_text(node, selectors.response).await?;

    Ok(Review {
        author,
        raw_date,
        rating,
        text,
        response_text,
    })
}

async fn child_text<E: PageElement>(node: &E, selector: &str) -> Result<Option<String>> {
    let Some(child) = node.find(selector).await? else {
        debug!(target: "harvest.extract", %selector, "field element missing");
        return Ok(None);
    };
    let text = child.inner_text().await?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

async fn rating_of<E: PageElement>(node: &E, selectors: &ReviewSelectors) -> Result<u8> {
    let Some(stars) = node.find(selectors.rating).await? else {
        debug!(target: "harvest.extract", selector = selectors.rating, "rating element missing");
        return Ok(0);
    };
    let label = stars.attribute(selectors.rating_attribute).await?;
    Ok(label.as_deref().map(rating_from_label).unwrap_or(0))
}

/// Star count from a label such as "4 stars" or "5 звёзд"; 0 if unreadable.
pub fn rating_from_label(label: &str) -> u8 {
    label
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<u8>().ok())
        .filter(|stars| *stars <= 5)
        .unwrap_or(0)
}
