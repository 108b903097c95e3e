//! WebDriver-backed implementation of the page traits.
pub mod behavioral;
pub mod driver;
pub mod page;
