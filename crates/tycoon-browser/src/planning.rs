//! Flight planning and seat reconfiguration of the aircraft flying a route

use tracing::{debug, info};
use tycoon_core::extract::decode_integer;
use tycoon_core::retry::retry_transient;
use tycoon_core::{Aircraft, Result, Route, TycoonConfig, TycoonError, WaveStat};

use crate::driver::{xpath_literal, Locator, PageDriver};
use crate::flow::{absolute_url, require_attributes, settle};
use crate::game::select_route;

const ASSIGNED_FLIGHTS: &str = r#"//div[@id="showLine"]/div[3]/ul[1]/li[2]/strong"#;
const FIRST_AIRCRAFT_USAGE: &str = "//*[@class='aircraftsBox']/div[1]/div[2]/span[1]/b";
const FIRST_SLOT: &str = r#"//table[@class="planningArea"]/tbody/tr[2]/td[3]"#;
const SLOT_CONFIRM: &str = r#"//div[@id="planning"]/table[1]/tbody/tr[2]/td[1]/img"#;
const AIRCRAFT_DETAILS: &str =
    r#"//div[@class="aircraftListView"]/div//a[normalize-space(.)='Aircraft details']"#;
const CONFIRM_RECONFIGURATION: &str = r#"//input[@value="Confirm the reconfiguration"]"#;

const SEAT_INPUTS: [&str; 4] = [
    "ecoManualInput",
    "busManualInput",
    "firstManualInput",
    "cargoManualInput",
];

pub(crate) fn hub_tab(hub_id: u32) -> Locator {
    Locator::xpath(format!("//span[@data-hubid='{}']", hub_id))
}

pub(crate) fn route_entry(route: &Route) -> Locator {
    Locator::xpath(format!(
        "//span[contains(text(), {})]",
        xpath_literal(&route.slash_label())
    ))
}

fn planning_url(config: &TycoonConfig) -> String {
    format!("{}/network/planning", config.game.base_url.trim_end_matches('/'))
}

/// Number of flights already scheduled on a route
pub async fn assigned_flight_count(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    route: &Route,
) -> Result<u32> {
    let counter = &Locator::xpath(ASSIGNED_FLIGHTS);
    let text = retry_transient(
        "assigned flights",
        &config.retry.lookup_policy(),
        move || async move {
            select_route(driver, config, route).await?;
            driver.find_text(counter).await
        },
    )
    .await?;
    u32::try_from(decode_integer(&text)?).map_err(|_| TycoonError::Parse(text))
}

/// Flights still needed for a wave once `assigned` are already flying
pub fn flights_to_schedule(wave: &WaveStat, assigned: u32) -> u32 {
    wave.no.saturating_sub(assigned)
}

/// Schedule `count` flights of `aircraft` on a route, one free aircraft each
pub async fn schedule_flights(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    hub_id: u32,
    route: &Route,
    aircraft: &Aircraft,
    count: u32,
) -> Result<()> {
    info!("Scheduling {} flight(s) on {}", count, route);
    for i in 1..=count {
        debug!("Scheduling flight {}/{}", i, count);
        schedule_flight(driver, config, hub_id, route, aircraft).await?;
    }
    Ok(())
}

/// Put the least used aircraft of the hub on the route
///
/// Fails with [`TycoonError::Planning`] when the hub has no aircraft of the
/// model, or when even the least used one already flies.
pub async fn schedule_flight(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    hub_id: u32,
    route: &Route,
    aircraft: &Aircraft,
) -> Result<()> {
    let pause = config.delays.settle();
    driver.navigate(&planning_url(config)).await?;

    settle(pause).await;
    driver.click(&hub_tab(hub_id)).await?;
    settle(pause).await;
    let filter = Locator::id("aircraftNameFilter");
    driver.clear(&filter).await?;
    driver.type_into(&filter, &aircraft.searchable_model()).await?;
    settle(pause).await;
    driver
        .click(&Locator::css(
            "input[type='radio'][value='utilizationPercentageAsc']",
        ))
        .await?;

    settle(pause).await;
    require_free_aircraft(driver, &route.hub, aircraft).await?;

    let entry = route_entry(route);
    retry_transient("planning route", &config.retry.planning_policy(), || {
        driver.click(&entry)
    })
    .await?;

    driver.click(&Locator::xpath(FIRST_SLOT)).await?;
    driver.click(&Locator::xpath(SLOT_CONFIRM)).await?;
    driver.click(&Locator::id("planningSubmit")).await
}

async fn require_free_aircraft(driver: &dyn PageDriver, hub: &str, aircraft: &Aircraft) -> Result<()> {
    let usage = match driver.find_text(&Locator::xpath(FIRST_AIRCRAFT_USAGE)).await {
        Ok(usage) => usage,
        Err(e) if e.is_transient() => {
            return Err(TycoonError::Planning(format!(
                "No aircraft in hub {} of type {}",
                hub, aircraft
            )))
        }
        Err(e) => return Err(e),
    };
    if usage.trim() != "0%" {
        return Err(TycoonError::Planning(format!(
            "No free aircraft in hub {} of type {} (least used at {})",
            hub,
            aircraft,
            usage.trim()
        )));
    }
    Ok(())
}

/// Apply a wave's seat layout to every aircraft on a route
///
/// Aircraft are renamed `HUB-DST-i`. Returns how many were reconfigured.
pub async fn reconfigure_seats(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    route: &Route,
    wave: &WaveStat,
) -> Result<usize> {
    let details = &Locator::xpath(AIRCRAFT_DETAILS);
    let links = retry_transient(
        "aircraft on route",
        &config.retry.lookup_policy(),
        move || async move {
            select_route(driver, config, route).await?;
            require_attributes(driver, details, "href").await
        },
    )
    .await?;
    info!("Reconfiguring {} aircraft on {}", links.len(), route);

    let pause = config.delays.settle();
    let seats = [wave.economy, wave.business, wave.first, wave.cargo];
    for (i, link) in links.iter().enumerate() {
        debug!("Reconfiguring aircraft {}", i + 1);
        let url = format!(
            "{}/reconfigure",
            absolute_url(&config.game.base_url, link).trim_end_matches('/')
        );
        driver.navigate(&url).await?;

        let mut fields: Vec<(Locator, String)> = SEAT_INPUTS
            .iter()
            .zip(seats)
            .map(|(id, value)| (Locator::id(*id), value.to_string()))
            .collect();
        fields.push((
            Locator::id("aircraft_name"),
            format!("{}-{}-{}", route.hub, route.destination, i),
        ));

        // Zeroed first so no intermediate layout exceeds the cabin capacity
        for (field, _) in &fields {
            driver.clear(field).await?;
            driver.type_into(field, "0").await?;
        }
        settle(pause).await;
        for (field, value) in &fields {
            driver.clear(field).await?;
            driver.type_into(field, value).await?;
            settle(pause).await;
        }

        driver
            .submit(&Locator::xpath(CONFIRM_RECONFIGURATION))
            .await?;
    }

    Ok(links.len())
}
