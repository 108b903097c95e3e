//! CSS selectors for the map listing markup.

/// Where a search starts when a business has no direct URL.
pub const MAPS_HOME: &str = "https://www.google.com/maps";
pub const SEARCH_BOX: &str = "#searchboxinput";

/// Selectors used by the harvest loop and the review extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSelectors {
    /// Scrollable panel holding the review list.
    pub container: &'static str,
    /// One rendered review, relative to the container.
    pub node: &'static str,
    pub author: &'static str,
    pub rating: &'static str,
    /// Attribute on `rating` whose first token is the star count.
    pub rating_attribute: &'static str,
    pub text: &'static str,
    pub response: &'static str,
    pub date: &'static str,
}

impl Default for ReviewSelectors {
    fn default() -> Self {
        Self {
            container: ".m6QErb.DxyBCb.kA9KIf.dS8AEf",
            node: ".jftiEf.fontBodyMedium",
            author: ".d4r55",
            rating: ".kvMYJc",
            rating_attribute: "aria-label",
            text: ".MyEned .wiI7pd",
            response: ".CDe7pd .wiI7pd",
            date: ".rsqaWe",
        }
    }
}

/// Selectors for the business card header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSelectors {
    pub name: &'static str,
    pub rating: &'static str,
    pub reviews_count: &'static str,
    /// Block whose text carries the parenthesized ratings count.
    pub summary: &'static str,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            name: "h1.DUwDvf",
            rating: "div.F7nice > span:nth-child(1)",
            reviews_count: "div.F7nice > span:nth-child(2)",
            summary: "div.F7nice",
        }
    }
}
