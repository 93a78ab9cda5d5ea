//! Fixture values the built-in scenarios depend on
//!
//! Defaults are the literal values of the public Sauce Demo site. Override
//! them to point the suite at a staged or mocked replica.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Customer details typed into the checkout form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

impl Default for CheckoutInfo {
    fn default() -> Self {
        Self {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            postal_code: "12345".to_string(),
        }
    }
}

/// Catalog item used by the cart, details and checkout scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFixture {
    /// Slug used in `data-test` attributes (`add-to-cart-<slug>`)
    pub slug: String,
    pub name: String,
    /// Displayed price, including the currency sign
    pub price: String,
}

impl Default for ProductFixture {
    fn default() -> Self {
        Self {
            slug: "sauce-labs-backpack".to_string(),
            name: "Sauce Labs Backpack".to_string(),
            price: "$29.99".to_string(),
        }
    }
}

impl ProductFixture {
    pub fn add_to_cart_selector(&self) -> String {
        format!(r#"button[data-test="add-to-cart-{}"]"#, self.slug)
    }

    pub fn remove_selector(&self) -> String {
        format!(r#"button[data-test="remove-{}"]"#, self.slug)
    }

    pub fn name_link_selector(&self) -> String {
        format!(r#".inventory_item_name:has-text("{}")"#, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub base_url: String,
    pub valid_user: Credentials,
    pub invalid_user: Credentials,
    pub checkout: CheckoutInfo,
    pub product: ProductFixture,

    /// Value of the low-to-high option of the sort dropdown
    pub sort_low_to_high: String,

    /// Price expected first once the catalog is sorted low to high
    pub lowest_price: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            valid_user: Credentials::new("standard_user", "secret_sauce"),
            invalid_user: Credentials::new("invalid_user", "invalid_password"),
            checkout: CheckoutInfo::default(),
            product: ProductFixture::default(),
            sort_low_to_high: "lohi".to_string(),
            lowest_price: "$7.99".to_string(),
        }
    }
}

impl FixtureConfig {
    /// Fixture with every default except the base URL
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
