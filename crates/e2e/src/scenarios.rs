//! Built-in Sauce Demo scenarios

use crate::fixture::FixtureConfig;
use crate::spec::{CaseStep, Step, TestCase};

/// Page conditions shared by the built-in scenarios
pub mod conditions {
    pub const ON_LOGIN_PAGE: &str = "on-login-page";
    pub const AUTHENTICATED: &str = "authenticated";
    pub const CART_HAS_ITEM: &str = "cart-has-item";
    pub const ON_CART_PAGE: &str = "on-cart-page";
    pub const ON_CHECKOUT_INFO: &str = "on-checkout-info";
    pub const CHECKOUT_INFO_ENTERED: &str = "checkout-info-entered";
    pub const ON_CHECKOUT_OVERVIEW: &str = "on-checkout-overview";
    pub const ORDER_PLACED: &str = "order-placed";
    pub const CATALOG_SORTED: &str = "catalog-sorted";
    pub const ON_PRODUCT_DETAILS: &str = "on-product-details";
    pub const MENU_OPEN: &str = "menu-open";
    pub const LOGGED_OUT: &str = "logged-out";
}

use conditions::*;

pub mod selectors {
    pub const USERNAME: &str = "#user-name";
    pub const PASSWORD: &str = "#password";
    pub const LOGIN_BUTTON: &str = "#login-button";
    pub const TITLE: &str = ".title";
    pub const LOGIN_ERROR: &str = r#"[data-test="error"]"#;
    pub const INVENTORY_ITEM: &str = ".inventory_item";
    pub const INVENTORY_ITEM_NAME: &str = ".inventory_item_name";
    pub const INVENTORY_ITEM_PRICE: &str = ".inventory_item_price";
    pub const CART_BADGE: &str = ".shopping_cart_badge";
    pub const CART_LINK: &str = ".shopping_cart_link";
    pub const SORT_DROPDOWN: &str = ".product_sort_container";
    pub const DETAILS_NAME: &str = ".inventory_details_name";
    pub const DETAILS_PRICE: &str = ".inventory_details_price";
    pub const CHECKOUT: &str = r#"[data-test="checkout"]"#;
    pub const FIRST_NAME: &str = r#"[data-test="firstName"]"#;
    pub const LAST_NAME: &str = r#"[data-test="lastName"]"#;
    pub const POSTAL_CODE: &str = r#"[data-test="postalCode"]"#;
    pub const CONTINUE: &str = r#"[data-test="continue"]"#;
    pub const FINISH: &str = r#"[data-test="finish"]"#;
    pub const COMPLETE_HEADER: &str = ".complete-header";
    pub const MENU_BUTTON: &str = "#react-burger-menu-btn";
    pub const LOGOUT_LINK: &str = "#logout_sidebar_link";
}

use selectors::*;

/// Open the site and log in with `credentials`.
///
/// The final click only provides [`AUTHENTICATED`] when the credentials are
/// expected to be accepted.
fn login(fixture: &FixtureConfig, username: &str, password: &str, accepted: bool) -> Vec<CaseStep> {
    let submit = CaseStep::from(Step::click(LOGIN_BUTTON)).requires(ON_LOGIN_PAGE);
    let submit = if accepted { submit.provides(AUTHENTICATED) } else { submit };
    vec![
        Step::navigate(&fixture.base_url).provides(ON_LOGIN_PAGE),
        Step::fill(USERNAME, username).requires(ON_LOGIN_PAGE),
        Step::fill(PASSWORD, password).requires(ON_LOGIN_PAGE),
        submit,
    ]
}

fn login_standard(fixture: &FixtureConfig) -> Vec<CaseStep> {
    login(
        fixture,
        &fixture.valid_user.username,
        &fixture.valid_user.password,
        true,
    )
}

fn add_featured_product(fixture: &FixtureConfig) -> CaseStep {
    Step::click(fixture.product.add_to_cart_selector())
        .requires(AUTHENTICATED)
        .provides(CART_HAS_ITEM)
}

pub fn valid_login(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify login functionality with valid credentials")
        .describe("Standard user lands on the product catalog")
        .tag("auth")
        .tag("smoke")
        .steps(login_standard(fixture))
        .step(Step::assert_equals(TITLE, "Products").requires(AUTHENTICATED))
}

pub fn invalid_login(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify login fails with invalid credentials")
        .describe("Unknown credentials show an inline error")
        .tag("auth")
        .steps(login(
            fixture,
            &fixture.invalid_user.username,
            &fixture.invalid_user.password,
            false,
        ))
        .step(
            Step::assert_contains(LOGIN_ERROR, "Username and password do not match")
                .requires(ON_LOGIN_PAGE),
        )
}

pub fn product_list(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify product list is displayed after login")
        .tag("catalog")
        .steps(login_standard(fixture))
        .step(Step::assert_count_greater_than(INVENTORY_ITEM, 0).requires(AUTHENTICATED))
}

pub fn add_to_cart(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify adding a product to the cart")
        .tag("cart")
        .steps(login_standard(fixture))
        .step(add_featured_product(fixture))
        .step(Step::assert_equals(CART_BADGE, "1").requires(CART_HAS_ITEM))
}

pub fn remove_from_cart(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify removing a product from the cart")
        .tag("cart")
        .steps(login_standard(fixture))
        .step(add_featured_product(fixture))
        .step(Step::click(fixture.product.remove_selector()).requires(CART_HAS_ITEM))
        .step(Step::assert_exists(CART_BADGE, false).requires(AUTHENTICATED))
}

pub fn cart_page(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify cart page displays added products")
        .tag("cart")
        .steps(login_standard(fixture))
        .step(add_featured_product(fixture))
        .step(
            Step::click(CART_LINK)
                .requires(CART_HAS_ITEM)
                .provides(ON_CART_PAGE),
        )
        .step(
            Step::assert_equals(INVENTORY_ITEM_NAME, &fixture.product.name)
                .requires(ON_CART_PAGE),
        )
}

pub fn sort_by_price_low_to_high(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify sorting products by price (low to high)")
        .tag("catalog")
        .steps(login_standard(fixture))
        .step(
            Step::select_option(SORT_DROPDOWN, &fixture.sort_low_to_high)
                .requires(AUTHENTICATED)
                .provides(CATALOG_SORTED),
        )
        .step(
            Step::assert_equals(INVENTORY_ITEM_PRICE, &fixture.lowest_price)
                .requires(CATALOG_SORTED)
                .assumes(format!(
                    "cheapest catalog item costs {}",
                    fixture.lowest_price
                )),
        )
}

pub fn product_details(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify product details page displays correct information")
        .tag("catalog")
        .steps(login_standard(fixture))
        .step(
            Step::click(fixture.product.name_link_selector())
                .requires(AUTHENTICATED)
                .provides(ON_PRODUCT_DETAILS),
        )
        .step(
            Step::assert_equals(DETAILS_NAME, &fixture.product.name)
                .requires(ON_PRODUCT_DETAILS),
        )
        .step(
            Step::assert_equals(DETAILS_PRICE, &fixture.product.price)
                .requires(ON_PRODUCT_DETAILS)
                .assumes(format!(
                    "{} costs {}",
                    fixture.product.name, fixture.product.price
                )),
        )
}

pub fn checkout(fixture: &FixtureConfig) -> TestCase {
    let customer = &fixture.checkout;
    TestCase::new("Verify checkout process completes successfully")
        .tag("checkout")
        .tag("smoke")
        .steps(login_standard(fixture))
        .step(add_featured_product(fixture))
        .step(
            Step::click(CART_LINK)
                .requires(CART_HAS_ITEM)
                .provides(ON_CART_PAGE),
        )
        .step(
            Step::click(CHECKOUT)
                .requires(ON_CART_PAGE)
                .provides(ON_CHECKOUT_INFO),
        )
        .step(Step::fill(FIRST_NAME, &customer.first_name).requires(ON_CHECKOUT_INFO))
        .step(Step::fill(LAST_NAME, &customer.last_name).requires(ON_CHECKOUT_INFO))
        .step(
            Step::fill(POSTAL_CODE, &customer.postal_code)
                .requires(ON_CHECKOUT_INFO)
                .provides(CHECKOUT_INFO_ENTERED),
        )
        .step(
            Step::click(CONTINUE)
                .requires(CHECKOUT_INFO_ENTERED)
                .provides(ON_CHECKOUT_OVERVIEW),
        )
        .step(
            Step::click(FINISH)
                .requires(ON_CHECKOUT_OVERVIEW)
                .provides(ORDER_PLACED),
        )
        .step(
            Step::assert_equals(COMPLETE_HEADER, "Thank you for your order!")
                .requires(ORDER_PLACED),
        )
}

pub fn logout(fixture: &FixtureConfig) -> TestCase {
    TestCase::new("Verify logout functionality")
        .tag("auth")
        .steps(login_standard(fixture))
        .step(
            Step::click(MENU_BUTTON)
                .requires(AUTHENTICATED)
                .provides(MENU_OPEN),
        )
        .step(
            Step::click(LOGOUT_LINK)
                .requires(MENU_OPEN)
                .provides(LOGGED_OUT),
        )
        .step(Step::assert_exists(LOGIN_BUTTON, true).requires(LOGGED_OUT))
}

/// The full suite, in the order the cases are reported
pub fn sauce_demo_suite(fixture: &FixtureConfig) -> Vec<TestCase> {
    vec![
        valid_login(fixture),
        invalid_login(fixture),
        product_list(fixture),
        add_to_cart(fixture),
        remove_from_cart(fixture),
        cart_page(fixture),
        sort_by_price_low_to_high(fixture),
        product_details(fixture),
        checkout(fixture),
        logout(fixture),
    ]
}
