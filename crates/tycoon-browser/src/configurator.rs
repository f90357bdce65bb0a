//! Seat configurator: proposes seat layouts ("waves") for a circuit of routes

use tracing::{debug, info, warn};
use tycoon_core::extract::parse_wave;
use tycoon_core::retry::{retry_transient, RetryPolicy};
use tycoon_core::{Aircraft, FareClass, Result, Route, RouteStats, TycoonConfig, TycoonError, WaveStat};

use crate::driver::{Locator, OptionMatch, PageDriver, WaitCondition};
use crate::flow::{page_timeout, settle};

/// One route of the circuit together with its cached market figures
#[derive(Debug, Clone)]
pub struct CircuitLeg {
    pub route: Route,
    pub stats: RouteStats,
}

fn form_suffix(class: FareClass) -> &'static str {
    match class {
        FareClass::Economy => "eco",
        FareClass::Business => "bus",
        FareClass::First => "first",
        FareClass::Cargo => "cargo",
    }
}

pub(crate) fn wave_selector(no: u32) -> Locator {
    Locator::name(format!("nwy_seatconfigurator_wave_{}_selector", no - 1))
}

pub(crate) fn wave_row(no: u32, row: u32) -> Locator {
    Locator::xpath(format!(
        r#"//*[@id="nwy_seatconfigurator_wave_{}_stats"]/table[1]/tbody/tr[{}]/td"#,
        no, row
    ))
}

/// Run the configurator for `aircraft` over the circuit and scan the proposals
pub async fn find_seat_configs(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    aircraft: &Aircraft,
    circuit: &[CircuitLeg],
) -> Result<Vec<WaveStat>> {
    if circuit.is_empty() {
        return Err(TycoonError::NotFound("circuit has no routes".to_string()));
    }
    info!(
        "Configuring {} over {} route(s)",
        aircraft,
        circuit.len()
    );

    let maker = Locator::id("cf_aircraftmake");
    driver.navigate(&config.configurator.url).await?;
    driver
        .wait_until(&WaitCondition::Present(maker.clone()), &page_timeout(config))
        .await?;
    driver
        .select_option(&maker, &OptionMatch::Contains(aircraft.maker.clone()))
        .await?;
    driver
        .select_option(
            &Locator::id("cf_aircraftmodel"),
            &OptionMatch::Contains(aircraft.model.clone()),
        )
        .await?;

    switch_to_quick_entry(driver).await?;

    let policy = config.retry.lookup_policy();
    for leg in circuit {
        add_leg(driver, &policy, leg).await?;
    }

    settle(config.delays.calculate()).await;
    let calculate = Locator::id("calculate_button");
    retry_transient("calculate", &policy, || driver.click(&calculate)).await?;

    scan_waves(driver, config).await
}

/// Quick entry takes airport codes instead of the map picker
async fn switch_to_quick_entry(driver: &dyn PageDriver) -> Result<()> {
    let link = Locator::link_text("Quick Entry");
    for _ in 0..2 {
        match driver.click(&link).await {
            Ok(()) => {}
            // Already in quick entry mode
            Err(e) if e.is_transient() => {
                debug!("Quick entry link not present: {}", e);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

async fn add_leg(driver: &dyn PageDriver, policy: &RetryPolicy, leg: &CircuitLeg) -> Result<()> {
    debug!("Adding {} to circuit", leg.route);
    driver
        .type_into(&Locator::id("cf_hub_src"), &leg.route.hub)
        .await?;
    driver
        .type_into(&Locator::id("cf_hub_dst"), &leg.route.destination)
        .await?;

    for class in FareClass::ALL {
        let (price, demand) = match leg.stats.get(class) {
            Some(stat) => (stat.price, stat.demand),
            None => {
                warn!("{} has no {} figures, entering 0", leg.route, class);
                (0, 0)
            }
        };
        let suffix = form_suffix(class);
        driver
            .type_into(&Locator::id(format!("auditprice_{}", suffix)), &price.to_string())
            .await?;
        driver
            .type_into(&Locator::id(format!("demand_{}", suffix)), &demand.to_string())
            .await?;
    }

    let add = Locator::id("add2circuit_button");
    retry_transient("add to circuit", policy, || driver.click(&add)).await
}

/// Read every proposed wave, stopping at the first wave without a selector
pub async fn scan_waves(driver: &dyn PageDriver, config: &TycoonConfig) -> Result<Vec<WaveStat>> {
    let policy = config.retry.lookup_policy();
    let mut waves = Vec::new();

    for no in 1..=config.configurator.max_waves {
        if no != 1 && !select_wave(driver, no).await? {
            break;
        }
        waves.push(extract_wave(driver, &policy, no).await?);
    }

    info!("Scanned {} wave(s)", waves.len());
    Ok(waves)
}

async fn select_wave(driver: &dyn PageDriver, no: u32) -> Result<bool> {
    match driver
        .select_option(&wave_selector(no), &OptionMatch::Exact(no.to_string()))
        .await
    {
        Ok(()) => Ok(true),
        Err(e) if e.is_transient() || e.is_not_found() => {
            info!("No config for wave {}", no);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

async fn extract_wave(driver: &dyn PageDriver, policy: &RetryPolicy, no: u32) -> Result<WaveStat> {
    let seats = &wave_row(no, 3);
    let totals = &wave_row(no, 4);
    retry_transient(&format!("wave {}", no), policy, move || async move {
        let seat_row = driver.find_all_text(seats).await?;
        let total_row = driver.find_all_text(totals).await?;
        if seat_row.is_empty() || total_row.is_empty() {
            return Err(TycoonError::TransientLookup(format!("wave {} stats", no)));
        }
        parse_wave(no, &seat_row, &total_row)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverAction, MockPageDriver};
    use crate::flow::testing::fast_config;
    use tycoon_core::RouteStat;

    fn with_wave(driver: MockPageDriver, no: u32, roi: &str, total: &str) -> MockPageDriver {
        let driver = driver
            .with_list(
                wave_row(no, 3),
                ["Config", "380", "24", "6", "9", "$1.3M", roi],
            )
            .with_list(wave_row(no, 4), ["Total", "", "", "", "", total, "8 days"]);
        if no > 1 {
            driver.with_options(wave_selector(no), (1..=no).map(|n| n.to_string()))
        } else {
            driver
        }
    }

    fn leg(destination: &str) -> CircuitLeg {
        CircuitLeg {
            route: Route::new("CGK", destination),
            stats: RouteStats::new(3, 1_000).with_class(
                FareClass::Economy,
                RouteStat {
                    price: 412,
                    demand: 1_806,
                    remaining_demand: 940,
                },
            ),
        }
    }

    #[tokio::test]
    async fn test_scan_stops_at_missing_wave() {
        let config = fast_config();
        let driver = with_wave(MockPageDriver::new(), 1, "2.0", "$10.0M");
        let driver = with_wave(driver, 2, "3.5", "$9.0M");

        let waves = scan_waves(&driver, &config).await.unwrap();

        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0].no, 1);
        assert_eq!(waves[1].no, 2);
        assert_eq!(waves[1].roi, 3.5);
        assert_eq!(waves[0].total_turnover, 10_000_000.0);
    }

    #[tokio::test]
    async fn test_scan_respects_max_waves() {
        let mut config = fast_config();
        config.configurator.max_waves = 2;
        let mut driver = MockPageDriver::new();
        for no in 1..=4 {
            driver = with_wave(driver, no, "1.0", "$1M");
        }

        let waves = scan_waves(&driver, &config).await.unwrap();
        assert_eq!(waves.len(), 2);
    }

    #[tokio::test]
    async fn test_wave_rows_retry_until_rendered() {
        let config = fast_config();
        let driver = with_wave(MockPageDriver::new(), 1, "2.0", "$10.0M")
            .with_flaky(wave_row(1, 3), 2);

        let waves = scan_waves(&driver, &config).await.unwrap();
        assert_eq!(waves.len(), 1);
    }

    #[tokio::test]
    async fn test_find_seat_configs_fills_circuit() {
        let config = fast_config();
        let driver = with_wave(
            MockPageDriver::new()
                .permissive()
                .with_options(Locator::id("cf_aircraftmake"), ["Airbus", "Boeing"])
                .with_options(Locator::id("cf_aircraftmodel"), ["737-800", "747-400"]),
            1,
            "2.4",
            "$11.6M",
        );
        let aircraft = Aircraft::new("boeing", "747-400");

        let waves = find_seat_configs(&driver, &config, &aircraft, &[leg("SIN"), leg("KUL")])
            .await
            .unwrap();

        assert_eq!(waves.len(), 1);
        assert_eq!(
            driver.typed_into(&Locator::id("cf_hub_dst")),
            vec!["SIN", "KUL"]
        );
        assert_eq!(
            driver.typed_into(&Locator::id("auditprice_eco")),
            vec!["412", "412"]
        );
        assert_eq!(driver.typed_into(&Locator::id("demand_first")), vec!["0", "0"]);
        assert_eq!(driver.clicks_on(&Locator::id("add2circuit_button")), 2);
        assert_eq!(driver.clicks_on(&Locator::id("calculate_button")), 1);
        assert!(driver.actions().contains(&DriverAction::Select(
            Locator::id("cf_aircraftmake"),
            "Boeing".to_string()
        )));
    }

    #[tokio::test]
    async fn test_empty_circuit() {
        let config = fast_config();
        let driver = MockPageDriver::new().permissive();
        let aircraft = Aircraft::new("Boeing", "747-400");

        let err = find_seat_configs(&driver, &config, &aircraft, &[])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(driver.actions().is_empty());
    }
}
