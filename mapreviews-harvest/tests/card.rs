mod common;

use std::time::Duration;

use common::{FakePage, PageState, init_test_tracing};
use mapreviews_harvest::card::extract_card;
use mapreviews_harvest::selectors::CardSelectors;

fn page_with(fields: &[(&'static str, &str)]) -> FakePage {
    let mut state = PageState::listing(Vec::new());
    for (selector, text) in fields {
        state.card.insert(*selector, text.to_string());
    }
    FakePage::new(state)
}

#[tokio::test]
async fn missing_name_leaves_other_fields_intact() {
    init_test_tracing();
    let s = CardSelectors::default();
    let page = page_with(&[
        (s.rating, "4,2"),
        (s.reviews_count, "87 reviews"),
        (s.summary, "4,2(87)"),
    ]);

    let card = extract_card(&page, &s, Duration::ZERO).await;

    assert_eq!(card.name, None);
    assert_eq!(card.rating, Some(4.2));
    assert_eq!(card.reviews_count, Some(87));
    assert_eq!(card.ratings_count, Some(87));

    let value = serde_json::to_value(&card).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 3);
    assert!(value.get("name").is_none());
    assert_eq!(value["rating"], 4.2);
    assert_eq!(value["reviews_count"], 87);
    assert_eq!(value["ratings_count"], 87);
}

#[tokio::test]
async fn unreadable_rating_does_not_block_the_counts() {
    let s = CardSelectors::default();
    let page = page_with(&[
        (s.name, "Кофейня на углу"),
        (s.rating, "n/a"),
        (s.reviews_count, "1 024 отзыва"),
        (s.summary, "n/a (1 024)"),
    ]);

    let card = extract_card(&page, &s, Duration::ZERO).await;

    assert_eq!(card.name.as_deref(), Some("Кофейня на углу"));
    assert_eq!(card.rating, None);
    assert_eq!(card.reviews_count, Some(1024));
    assert_eq!(card.ratings_count, Some(1024));

    let value = serde_json::to_value(&card).unwrap();
    assert!(value.get("rating").is_none());
    assert_eq!(value["name"], "Кофейня на углу");
}

#[tokio::test]
async fn summary_without_parentheses_only_drops_ratings_count() {
    let s = CardSelectors::default();
    let page = page_with(&[
        (s.name, "Blue Door Bakery"),
        (s.rating, "4.9"),
        (s.reviews_count, "12"),
        (s.summary, "4.9 stars"),
    ]);

    let card = extract_card(&page, &s, Duration::ZERO).await;

    assert_eq!(card.name.as_deref(), Some("Blue Door Bakery"));
    assert_eq!(card.rating, Some(4.9));
    assert_eq!(card.reviews_count, Some(12));
    assert_eq!(card.ratings_count, None);
}
