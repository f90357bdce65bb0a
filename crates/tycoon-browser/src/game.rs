//! Network pages of the airline game: login, hubs, lines and route prices

use tracing::{debug, info, warn};
use tycoon_core::extract::{
    decode_integer, parse_fare_class, parse_hub_label, parse_route_title,
};
use tycoon_core::retry::retry_transient;
use tycoon_core::{
    Credentials, Result, Route, RouteStat, RouteStats, TycoonConfig, TycoonError,
};

use crate::driver::{class_step, Locator, OptionMatch, PageDriver};
use crate::flow::{absolute_url, require_list};

pub(crate) const HUB_BOXES: &str = r#"//*[@id="displayRegular"]/div[@class="hubListBox"]/div"#;
pub(crate) const CATEGORY_IMAGE: &str = r#"//*[@id="box2"]/li[1]/b/img[3]"#;
pub(crate) const DISTANCE: &str = r#"//*[@id="box2"]/li[2]"#;
pub(crate) const PRICE_BOXES: &str = r#"//*[@id="marketing_linePricing"]/div[@class="box2"]/div"#;
const OPEN_LINE_SUBMIT: &str = r#"//*[@id="linePurchaseForm"]/input"#;

pub(crate) fn network_url(config: &TycoonConfig) -> String {
    format!("{}/network/", config.game.base_url.trim_end_matches('/'))
}

pub(crate) fn line_titles() -> Locator {
    Locator::xpath(format!(
        r#"//*[@id="lineList"]/div[contains(@class, 'lineListBox')]//{}"#,
        class_step("title")
    ))
}

pub(crate) fn hub_details_link(index: usize) -> Locator {
    Locator::xpath_item(HUB_BOXES, index, "//a[normalize-space(.)='Hub details']")
}

/// Field of the `index`th pricing box, e.g. `price_box_field(1, "demand", "")`
pub(crate) fn price_box_field(index: usize, class: &str, suffix: &str) -> Locator {
    Locator::xpath_item(PRICE_BOXES, index, &format!("//{}{}", class_step(class), suffix))
}

pub(crate) fn route_picker() -> Locator {
    Locator::class("linePicker")
}

/// Log into the game with the given credentials
pub async fn login(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    credentials: &Credentials,
) -> Result<()> {
    info!("Logging in as {}", credentials.email);
    driver.navigate(&network_url(config)).await?;
    driver
        .type_into(&Locator::id("username"), &credentials.email)
        .await?;
    driver
        .type_into(&Locator::id("password"), &credentials.password)
        .await?;
    driver.click(&Locator::id("loginSubmit")).await
}

/// Numeric id the game uses for a hub
pub async fn find_hub_id(driver: &dyn PageDriver, config: &TycoonConfig, hub: &str) -> Result<u32> {
    driver.navigate(&network_url(config)).await?;

    let policy = config.retry.lookup_policy();
    let hub_boxes = Locator::xpath(HUB_BOXES);
    let labels = retry_transient("hub list", &policy, || require_list(driver, &hub_boxes)).await?;

    let index = labels
        .iter()
        .position(|label| parse_hub_label(label).as_deref() == Some(hub))
        .ok_or_else(|| TycoonError::NotFound(format!("hub {} is not in the network", hub)))?;

    let href = driver.attribute(&hub_details_link(index + 1), "href").await?;
    let id = hub_id_from_href(&href)?;
    debug!("Hub {} has id {}", hub, id);
    Ok(id)
}

fn hub_id_from_href(href: &str) -> Result<u32> {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| TycoonError::Parse(href.to_string()))
}

/// Destinations of every line departing `hub`, in page order without repeats
pub async fn list_destinations(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    hub: &str,
    hub_id: u32,
) -> Result<Vec<String>> {
    driver
        .navigate(&format!(
            "{}/network/showhub/{}/linelist",
            config.game.base_url.trim_end_matches('/'),
            hub_id
        ))
        .await?;

    let titles = driver.find_all_text(&line_titles()).await?;
    let mut destinations: Vec<String> = Vec::new();
    for (origin, destination) in titles.iter().filter_map(|t| parse_route_title(t)) {
        if origin == hub && !destinations.contains(&destination) {
            destinations.push(destination);
        }
    }
    Ok(destinations)
}

/// Open a route's detail page through the network route picker
pub async fn select_route(driver: &dyn PageDriver, config: &TycoonConfig, route: &Route) -> Result<()> {
    driver.navigate(&network_url(config)).await?;
    let picker = route_picker();
    let label = OptionMatch::Exact(route.to_string());
    retry_transient("route picker", &config.retry.lookup_policy(), || {
        driver.select_option(&picker, &label)
    })
    .await
}

/// Category, distance and per-class market figures of a route
pub async fn extract_route_stats(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    route: &Route,
) -> Result<RouteStats> {
    info!("Extracting stats for {}", route);
    select_route(driver, config, route).await?;
    let policy = config.retry.lookup_policy();

    let category_image = Locator::xpath(CATEGORY_IMAGE);
    let category_alt = retry_transient("route category", &policy, || {
        driver.attribute(&category_image, "alt")
    })
    .await?;
    let distance = Locator::xpath(DISTANCE);
    let distance_text =
        retry_transient("route distance", &policy, || driver.find_text(&distance)).await?;
    let mut stats = RouteStats::new(to_u32(&category_alt)?, to_u32(&distance_text)?);

    let prices_href = driver
        .attribute(&Locator::link_text("Route prices"), "href")
        .await?;
    driver
        .navigate(&absolute_url(&config.game.base_url, &prices_href))
        .await?;

    let price_boxes = Locator::xpath(PRICE_BOXES);
    let boxes = retry_transient("price boxes", &policy, || require_list(driver, &price_boxes)).await?;

    for index in 1..=boxes.len() {
        let title = driver.find_text(&price_box_field(index, "title", "")).await?;
        let Some(class) = parse_fare_class(&title) else {
            warn!("Skipping unknown fare class {:?} on {}", title, route);
            continue;
        };
        let stat = RouteStat {
            price: decode_integer(&driver.find_text(&price_box_field(index, "price", "//b")).await?)?,
            demand: decode_integer(&driver.find_text(&price_box_field(index, "demand", "")).await?)?,
            remaining_demand: decode_integer(
                &driver.find_text(&price_box_field(index, "paxLeft", "")).await?,
            )?,
        };
        stats = stats.with_class(class, stat);
    }

    Ok(stats)
}

fn to_u32(token: &str) -> Result<u32> {
    u32::try_from(decode_integer(token)?).map_err(|_| TycoonError::Parse(token.to_string()))
}

/// Buy a new line from the hub to the route's destination
pub async fn open_route(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    hub_id: u32,
    route: &Route,
) -> Result<()> {
    info!("Opening line {}", route);
    driver
        .navigate(&format!(
            "{}/network/newlinefinalize/{}/{}",
            config.game.base_url.trim_end_matches('/'),
            hub_id,
            route.destination.to_lowercase()
        ))
        .await?;
    let submit = Locator::xpath(OPEN_LINE_SUBMIT);
    retry_transient("line purchase", &config.retry.lookup_policy(), || {
        driver.submit(&submit)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverAction, MockPageDriver};
    use crate::flow::testing::fast_config;
    use tycoon_core::FareClass;

    fn pricing_page(driver: MockPageDriver) -> MockPageDriver {
        let boxes = [
            ("Economy class", "$ 412", "1,806 pax", "940 pax"),
            ("Business class", "$ 1,180", "262", "75"),
            ("Lounge", "$ 1", "1", "1"),
            ("Cargo class", "$ 7", "220 t", "0 t"),
        ];
        let mut driver = driver.with_list(
            Locator::xpath(PRICE_BOXES),
            boxes.iter().map(|b| b.0),
        );
        for (i, (title, price, demand, left)) in boxes.iter().enumerate() {
            let index = i + 1;
            driver = driver
                .with_text(price_box_field(index, "title", ""), *title)
                .with_text(price_box_field(index, "price", "//b"), *price)
                .with_text(price_box_field(index, "demand", ""), *demand)
                .with_text(price_box_field(index, "paxLeft", ""), *left);
        }
        driver
    }

    #[tokio::test]
    async fn test_login_types_credentials() {
        let config = fast_config();
        let driver = MockPageDriver::new().permissive();
        let credentials = Credentials {
            email: "pilot@example.test".to_string(),
            password: "hunter2".to_string(),
        };

        login(&driver, &config, &credentials).await.unwrap();

        assert_eq!(driver.navigations(), vec!["https://game.test/network/"]);
        assert_eq!(
            driver.typed_into(&Locator::id("username")),
            vec!["pilot@example.test"]
        );
        assert_eq!(driver.clicks_on(&Locator::id("loginSubmit")), 1);
    }

    #[tokio::test]
    async fn test_find_hub_id() {
        let config = fast_config();
        let driver = MockPageDriver::new()
            .with_list(
                Locator::xpath(HUB_BOXES),
                ["Hub DPS - Denpasar", "Hub CGK - Jakarta"],
            )
            .with_attribute(hub_details_link(2), "href", "https://game.test/network/showhub/4021")
            .with_flaky(Locator::xpath(HUB_BOXES), 2);

        assert_eq!(find_hub_id(&driver, &config, "CGK").await.unwrap(), 4021);
        assert!(find_hub_id(&driver, &config, "SIN")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_hub_id_from_href() {
        assert_eq!(hub_id_from_href("/network/showhub/17/").unwrap(), 17);
        assert!(hub_id_from_href("/network/showhub/main").is_err());
    }

    #[tokio::test]
    async fn test_list_destinations() {
        let config = fast_config();
        let driver = MockPageDriver::new().with_list(
            line_titles(),
            ["CGK / SIN", "DPS / PER", "CGK / KUL", "CGK / SIN", "Unnamed line"],
        );

        let destinations = list_destinations(&driver, &config, "CGK", 4021).await.unwrap();
        assert_eq!(destinations, vec!["SIN", "KUL"]);
        assert_eq!(
            driver.navigations(),
            vec!["https://game.test/network/showhub/4021/linelist"]
        );
    }

    #[tokio::test]
    async fn test_extract_route_stats() {
        let config = fast_config();
        let route = Route::new("CGK", "SIN");
        let driver = pricing_page(
            MockPageDriver::new()
                .with_options(route_picker(), ["CGK - KUL", "CGK - SIN"])
                .with_attribute(Locator::xpath(CATEGORY_IMAGE), "alt", "Category 4")
                .with_text(Locator::xpath(DISTANCE), "Distance : 1 381 km")
                .with_attribute(
                    Locator::link_text("Route prices"),
                    "href",
                    "/marketing/pricing/88120",
                ),
        );

        let stats = extract_route_stats(&driver, &config, &route).await.unwrap();

        assert_eq!(stats.category, 4);
        assert_eq!(stats.distance, 1_381);
        assert_eq!(
            stats.get(FareClass::Economy),
            Some(&RouteStat {
                price: 412,
                demand: 1_806,
                remaining_demand: 940
            })
        );
        assert_eq!(stats.get(FareClass::Business).unwrap().price, 1_180);
        assert_eq!(stats.get(FareClass::Cargo).unwrap().demand, 220);
        assert!(stats.get(FareClass::First).is_none());

        assert!(driver
            .actions()
            .contains(&DriverAction::Select(route_picker(), "CGK - SIN".to_string())));
        assert_eq!(
            driver.navigations().last().unwrap(),
            "https://game.test/marketing/pricing/88120"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let config = fast_config();
        let driver = MockPageDriver::new().with_options(route_picker(), ["CGK - KUL"]);

        let err = extract_route_stats(&driver, &config, &Route::new("CGK", "SIN"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_open_route() {
        let config = fast_config();
        let driver = MockPageDriver::new().permissive();

        open_route(&driver, &config, 4021, &Route::new("CGK", "SIN"))
            .await
            .unwrap();

        assert_eq!(
            driver.actions(),
            vec![
                DriverAction::Navigate(
                    "https://game.test/network/newlinefinalize/4021/sin".to_string()
                ),
                DriverAction::Submit(Locator::xpath(OPEN_LINE_SUBMIT)),
            ]
        );
    }
}
