//! In-memory stand-in for the Sauce Demo shop
//!
//! Resolves the handful of selectors the suite uses against a tiny page
//! model, so cases can run without a browser or network.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use saucedemo_e2e::{DriverError, DriverFactory, DriverResult, ElementHandle, PageDriver};

pub const SIM_BASE_URL: &str = "https://www.saucedemo.com/";

const LOGIN_ERROR: &str =
    "Epic sadface: Username and password do not match any user in this service";

#[derive(Debug, Clone)]
pub struct Product {
    pub slug: String,
    pub name: String,
    pub cents: u32,
}

impl Product {
    fn new(slug: &str, name: &str, cents: u32) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            cents,
        }
    }

    fn price(&self) -> String {
        format!("${}.{:02}", self.cents / 100, self.cents % 100)
    }
}

pub fn default_catalog() -> Vec<Product> {
    vec![
        Product::new("sauce-labs-backpack", "Sauce Labs Backpack", 2999),
        Product::new("sauce-labs-bike-light", "Sauce Labs Bike Light", 999),
        Product::new("sauce-labs-bolt-t-shirt", "Sauce Labs Bolt T-Shirt", 1599),
        Product::new("sauce-labs-fleece-jacket", "Sauce Labs Fleece Jacket", 4999),
        Product::new("sauce-labs-onesie", "Sauce Labs Onesie", 799),
        Product::new(
            "test.allthethings()-t-shirt-(red)",
            "Test.allTheThings() T-Shirt (Red)",
            1599,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Page {
    Blank,
    Login,
    Inventory,
    Details(String),
    Cart,
    CheckoutInfo,
    CheckoutOverview,
    Complete,
}

/// Shared knobs and counters for every page the factory creates
#[derive(Clone)]
pub struct SimSite {
    pub base_url: String,
    pub catalog: Vec<Product>,
    pub accounts: Vec<(String, String)>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub created: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl Default for SimSite {
    fn default() -> Self {
        Self {
            base_url: SIM_BASE_URL.to_string(),
            catalog: default_catalog(),
            accounts: vec![("standard_user".to_string(), "secret_sauce".to_string())],
            calls: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SimSite {
    pub fn at(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Change the price of one catalog item
    pub fn reprice(mut self, slug: &str, cents: u32) -> Self {
        for product in &mut self.catalog {
            if product.slug == slug {
                product.cents = cents;
            }
        }
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn factory(&self) -> Arc<SimFactory> {
        Arc::new(SimFactory { site: self.clone() })
    }
}

pub struct SimFactory {
    site: SimSite,
}

#[async_trait]
impl DriverFactory for SimFactory {
    async fn create(&self) -> DriverResult<Box<dyn PageDriver>> {
        self.site.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimPage::new(self.site.clone())))
    }
}

/// One browsing context on the simulated shop
pub struct SimPage {
    site: SimSite,
    page: Page,
    inputs: HashMap<String, String>,
    login_error: bool,
    cart: BTreeSet<String>,
    sort: String,
    menu_open: bool,
    closed: bool,
}

impl SimPage {
    fn new(site: SimSite) -> Self {
        Self {
            site,
            page: Page::Blank,
            inputs: HashMap::new(),
            login_error: false,
            cart: BTreeSet::new(),
            sort: "az".to_string(),
            menu_open: false,
            closed: false,
        }
    }

    fn record(&self, call: String) {
        self.site.calls.lock().push(call);
    }

    fn check_open(&self) -> DriverResult<()> {
        if self.closed {
            Err(DriverError::Closed)
        } else {
            Ok(())
        }
    }

    fn not_found(selector: &str) -> DriverError {
        DriverError::NotFound {
            selector: selector.to_string(),
        }
    }

    fn product(&self, slug: &str) -> Option<&Product> {
        self.site.catalog.iter().find(|p| p.slug == slug)
    }

    fn sorted_catalog(&self) -> Vec<&Product> {
        let mut items: Vec<&Product> = self.site.catalog.iter().collect();
        match self.sort.as_str() {
            "za" => items.sort_by(|a, b| b.name.cmp(&a.name)),
            "lohi" => items.sort_by(|a, b| a.cents.cmp(&b.cents).then(a.name.cmp(&b.name))),
            "hilo" => items.sort_by(|a, b| b.cents.cmp(&a.cents).then(a.name.cmp(&b.name))),
            _ => items.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        items
    }

    fn cart_items(&self) -> Vec<&Product> {
        self.site
            .catalog
            .iter()
            .filter(|p| self.cart.contains(&p.slug))
            .collect()
    }

    fn logged_in(&self) -> bool {
        !matches!(self.page, Page::Blank | Page::Login)
    }

    fn input_fields(&self) -> &'static [&'static str] {
        match self.page {
            Page::Login => &["#user-name", "#password"],
            Page::CheckoutInfo => &[
                r#"[data-test="firstName"]"#,
                r#"[data-test="lastName"]"#,
                r#"[data-test="postalCode"]"#,
            ],
            _ => &[],
        }
    }

    /// Cart toggle buttons visible on the current page, as (selector, label)
    fn cart_buttons(&self) -> Vec<(String, &'static str)> {
        let slugs: Vec<String> = match &self.page {
            Page::Inventory => self.site.catalog.iter().map(|p| p.slug.clone()).collect(),
            Page::Details(slug) => vec![slug.clone()],
            Page::Cart => self.cart.iter().cloned().collect(),
            _ => Vec::new(),
        };
        slugs
            .into_iter()
            .map(|slug| {
                if self.cart.contains(&slug) {
                    (format!(r#"button[data-test="remove-{}"]"#, slug), "Remove")
                } else {
                    (format!(r#"button[data-test="add-to-cart-{}"]"#, slug), "Add to cart")
                }
            })
            .filter(|(_, label)| self.page != Page::Cart || *label == "Remove")
            .collect()
    }

    /// Texts of every element matching `selector` on the current page
    fn resolve(&self, selector: &str) -> Vec<String> {
        if let Some(field) = self.input_fields().iter().find(|f| **f == selector) {
            return vec![self.inputs.get(*field).cloned().unwrap_or_default()];
        }

        if let Some((_, label)) = self.cart_buttons().into_iter().find(|(s, _)| s == selector) {
            return vec![label.to_string()];
        }

        if self.logged_in() {
            match selector {
                ".shopping_cart_link" => return vec![String::new()],
                ".shopping_cart_badge" if !self.cart.is_empty() => {
                    return vec![self.cart.len().to_string()]
                }
                "#react-burger-menu-btn" => return vec!["Open Menu".to_string()],
                "#logout_sidebar_link" if self.menu_open => return vec!["Logout".to_string()],
                _ => {}
            }
        }

        match (&self.page, selector) {
            (Page::Login, "#login-button") => vec!["Login".to_string()],
            (Page::Login, r#"[data-test="error"]"#) if self.login_error => {
                vec![LOGIN_ERROR.to_string()]
            }
            (Page::Inventory, ".title") => vec!["Products".to_string()],
            (Page::Inventory, ".inventory_item") | (Page::Inventory, ".inventory_item_name") => {
                self.sorted_catalog().iter().map(|p| p.name.clone()).collect()
            }
            (Page::Inventory, ".inventory_item_price") => {
                self.sorted_catalog().iter().map(|p| p.price()).collect()
            }
            (Page::Inventory, ".product_sort_container") => vec![self.sort.clone()],
            (Page::Inventory, _) if has_text(selector).is_some() => {
                let needle = has_text(selector).unwrap_or_default();
                self.sorted_catalog()
                    .iter()
                    .filter(|p| p.name.contains(needle))
                    .map(|p| p.name.clone())
                    .collect()
            }
            (Page::Details(slug), ".inventory_details_name") => {
                self.product(slug).map(|p| vec![p.name.clone()]).unwrap_or_default()
            }
            (Page::Details(slug), ".inventory_details_price") => {
                self.product(slug).map(|p| vec![p.price()]).unwrap_or_default()
            }
            (Page::Cart, ".title") => vec!["Your Cart".to_string()],
            (Page::Cart, ".inventory_item_name")
            | (Page::CheckoutOverview, ".inventory_item_name") => {
                self.cart_items().iter().map(|p| p.name.clone()).collect()
            }
            (Page::Cart, r#"[data-test="checkout"]"#) => vec!["Checkout".to_string()],
            (Page::CheckoutInfo, r#"[data-test="continue"]"#) => vec!["Continue".to_string()],
            (Page::CheckoutOverview, r#"[data-test="finish"]"#) => vec!["Finish".to_string()],
            (Page::Complete, ".complete-header") => vec!["Thank you for your order!".to_string()],
            _ => Vec::new(),
        }
    }

    fn submit_login(&mut self) {
        let username = self.inputs.get("#user-name").cloned().unwrap_or_default();
        let password = self.inputs.get("#password").cloned().unwrap_or_default();
        let accepted = self
            .site
            .accounts
            .iter()
            .any(|(u, p)| *u == username && *p == password);
        if accepted {
            self.page = Page::Inventory;
            self.login_error = false;
            self.inputs.clear();
        } else {
            self.login_error = true;
        }
    }

    fn checkout_info_complete(&self) -> bool {
        self.input_fields()
            .iter()
            .all(|f| self.inputs.get(*f).map(|v| !v.is_empty()).unwrap_or(false))
    }
}

/// Text inside `:has-text("...")`
fn has_text(selector: &str) -> Option<&str> {
    let rest = selector.split_once(":has-text(\"")?.1;
    rest.strip_suffix("\")")
}

#[async_trait]
impl PageDriver for SimPage {
    async fn goto(&mut self, url: &str) -> DriverResult<()> {
        self.check_open()?;
        self.record(format!("goto {}", url));
        if url != self.site.base_url {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.page = Page::Login;
        self.inputs.clear();
        self.login_error = false;
        self.menu_open = false;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> DriverResult<()> {
        self.check_open()?;
        self.record(format!("fill {}", selector));
        if !self.input_fields().contains(&selector) {
            return Err(Self::not_found(selector));
        }
        self.inputs.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> DriverResult<()> {
        self.check_open()?;
        self.record(format!("click {}", selector));
        if self.resolve(selector).is_empty() {
            return Err(Self::not_found(selector));
        }

        if let Some(slug) = selector
            .strip_prefix(r#"button[data-test="add-to-cart-"#)
            .and_then(|s| s.strip_suffix(r#""]"#))
        {
            self.cart.insert(slug.to_string());
            return Ok(());
        }
        if let Some(slug) = selector
            .strip_prefix(r#"button[data-test="remove-"#)
            .and_then(|s| s.strip_suffix(r#""]"#))
        {
            self.cart.remove(slug);
            return Ok(());
        }
        if let Some(needle) = has_text(selector) {
            let slug = self
                .sorted_catalog()
                .iter()
                .find(|p| p.name.contains(needle))
                .map(|p| p.slug.clone());
            if let Some(slug) = slug {
                self.page = Page::Details(slug);
            }
            return Ok(());
        }

        match selector {
            "#login-button" => self.submit_login(),
            ".shopping_cart_link" => self.page = Page::Cart,
            r#"[data-test="checkout"]"# => {
                self.page = Page::CheckoutInfo;
                self.inputs.clear();
            }
            r#"[data-test="continue"]"# => {
                if self.checkout_info_complete() {
                    self.page = Page::CheckoutOverview;
                }
            }
            r#"[data-test="finish"]"# => {
                self.page = Page::Complete;
                self.cart.clear();
            }
            "#react-burger-menu-btn" => self.menu_open = true,
            "#logout_sidebar_link" => {
                self.page = Page::Login;
                self.menu_open = false;
                self.inputs.clear();
            }
            _ => {}
        }
        Ok(())
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> DriverResult<()> {
        self.check_open()?;
        self.record(format!("select {}", selector));
        if self.resolve(selector).is_empty() || selector != ".product_sort_container" {
            return Err(Self::not_found(selector));
        }
        if !["az", "za", "lohi", "hilo"].contains(&value) {
            return Err(DriverError::NotInteractable {
                selector: selector.to_string(),
                reason: format!("no option with value '{}'", value),
            });
        }
        self.sort = value.to_string();
        Ok(())
    }

    async fn text_content(&mut self, selector: &str) -> DriverResult<Option<String>> {
        self.check_open()?;
        self.record(format!("text {}", selector));
        Ok(self.resolve(selector).into_iter().next())
    }

    async fn query_all(&mut self, selector: &str) -> DriverResult<Vec<ElementHandle>> {
        self.check_open()?;
        self.record(format!("query {}", selector));
        Ok(self
            .resolve(selector)
            .into_iter()
            .enumerate()
            .map(|(i, text)| ElementHandle::new(i, "div").with_text(text))
            .collect())
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.check_open()?;
        self.closed = true;
        self.site.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
