//! Aircraft purchases

use tracing::{debug, info};
use tycoon_core::{Aircraft, Result, TycoonConfig, TycoonError};

use crate::driver::{class_step, Locator, OptionMatch, PageDriver};

const AIRCRAFT_LIST: &str = r#"//div[@class="aircraftList"]/div"#;
const BUY_SUBMIT: &str = r#"//*[@id="aircraft_buyNew_step3"]/div/div[2]/div[10]/div[2]/input"#;

pub(crate) fn offer_title(index: usize) -> Locator {
    Locator::xpath_item(AIRCRAFT_LIST, index, &format!("//{}", class_step("title")))
}

pub(crate) fn offer_quantity_toggle(index: usize) -> Locator {
    Locator::xpath_item(AIRCRAFT_LIST, index, "/form/div[1]/div[3]/div/span[1]/img")
}

pub(crate) fn offer_quantity(index: usize) -> Locator {
    Locator::xpath_item(AIRCRAFT_LIST, index, "/form/div[1]/div[3]/div/span[2]/input[1]")
}

/// Buy `number` new aircraft of a model, based at `hub`
pub async fn buy_aircraft(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    hub: &str,
    aircraft: &Aircraft,
    number: u32,
) -> Result<()> {
    driver
        .navigate(&format!(
            "{}/aircraft/buy/new/{}",
            config.game.base_url.trim_end_matches('/'),
            aircraft.maker.to_lowercase()
        ))
        .await?;

    let wanted = format!(
        "{} / {}",
        aircraft.model.to_lowercase(),
        aircraft.maker.to_lowercase()
    );
    let offers = driver.find_all_text(&Locator::xpath(AIRCRAFT_LIST)).await?.len();
    debug!("{} aircraft on offer", offers);

    for index in 1..=offers {
        let title = driver.find_text(&offer_title(index)).await?;
        if !title.to_lowercase().contains(&wanted) {
            continue;
        }

        driver.click(&offer_quantity_toggle(index)).await?;
        let quantity = offer_quantity(index);
        driver.clear(&quantity).await?;
        driver.type_into(&quantity, &number.to_string()).await?;
        driver
            .select_option(&Locator::id("aircraft_hub"), &OptionMatch::Contains(hub.to_string()))
            .await?;
        driver.click(&Locator::xpath(BUY_SUBMIT)).await?;

        info!("Bought {} {} for hub {}", number, aircraft, hub);
        return Ok(());
    }

    Err(TycoonError::NotFound(format!("{} is not on sale", aircraft)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverAction, MockPageDriver};
    use crate::flow::testing::fast_config;

    fn shop() -> MockPageDriver {
        MockPageDriver::new()
            .permissive()
            .with_list(Locator::xpath(AIRCRAFT_LIST), ["", "", ""])
            .with_text(offer_title(1), "737-800 / Boeing")
            .with_text(offer_title(2), "747-400 / Boeing")
            .with_text(offer_title(3), "777-200 / Boeing")
            .with_options(Locator::id("aircraft_hub"), ["Jakarta (CGK)", "Singapore (SIN)"])
    }

    #[tokio::test]
    async fn test_buy_aircraft() {
        let config = fast_config();
        let driver = shop();

        buy_aircraft(&driver, &config, "cgk", &Aircraft::new("Boeing", "747-400"), 30)
            .await
            .unwrap();

        assert_eq!(
            driver.navigations(),
            vec!["https://game.test/aircraft/buy/new/boeing"]
        );
        assert_eq!(driver.clicks_on(&offer_quantity_toggle(2)), 1);
        assert_eq!(driver.clicks_on(&offer_quantity_toggle(1)), 0);
        assert_eq!(driver.typed_into(&offer_quantity(2)), vec!["30"]);
        assert!(driver.actions().contains(&DriverAction::Select(
            Locator::id("aircraft_hub"),
            "Jakarta (CGK)".to_string()
        )));
        assert_eq!(driver.clicks_on(&Locator::xpath(BUY_SUBMIT)), 1);
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let config = fast_config();
        let driver = shop();

        let err = buy_aircraft(&driver, &config, "CGK", &Aircraft::new("Boeing", "787-9"), 5)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(driver.clicks_on(&Locator::xpath(BUY_SUBMIT)), 0);
    }
}
