//! Seat configurator run against a static page, fed from and saved to the cache

use tempfile::tempdir;
use tycoon_browser::configurator::find_seat_configs;
use tycoon_browser::{CircuitLeg, Locator, MockPageDriver};
use tycoon_core::rank::{best_by_roi, nth_best};
use tycoon_core::{Aircraft, FareClass, Metric, Route, RouteStat, RouteStats, TycoonConfig};
use tycoon_store::{RouteStore, SeatConfigStore};

fn config() -> TycoonConfig {
    let mut config = TycoonConfig::default();
    config.configurator.url = "https://seats.test/index.html".to_string();
    config.retry.lookup_delay_ms = 0;
    config.delays.calculate_ms = 0;
    config
}

fn wave_cells(no: u32, row: u32) -> Locator {
    Locator::xpath(format!(
        r#"//*[@id="nwy_seatconfigurator_wave_{}_stats"]/table[1]/tbody/tr[{}]/td"#,
        no, row
    ))
}

fn configurator_page() -> MockPageDriver {
    let waves = [
        (1, "2.10", "$9.8M"),
        (2, "3.40", "$9.1M"),
        (3, "1.90", "$12.2M"),
    ];
    let mut driver = MockPageDriver::new()
        .permissive()
        .with_options(Locator::id("cf_aircraftmake"), ["Airbus", "Boeing"])
        .with_options(Locator::id("cf_aircraftmodel"), ["747-400", "777-300ER"]);
    for (no, roi, total) in waves {
        driver = driver
            .with_list(
                wave_cells(no, 3),
                ["Config", "416", "0", "0", "12", "$1,225,000", roi],
            )
            .with_list(wave_cells(no, 4), ["Total", "", "", "", "", total, "8"]);
        if no > 1 {
            driver = driver.with_options(
                Locator::name(format!("nwy_seatconfigurator_wave_{}_selector", no - 1)),
                (1..=no).map(|n| n.to_string()),
            );
        }
    }
    driver
}

#[tokio::test]
async fn test_configure_cached_route() {
    let dir = tempdir().unwrap();
    let routes = RouteStore::new(dir.path());
    let seats = SeatConfigStore::new(dir.path());
    let aircraft = Aircraft::new("Boeing", "747-400");

    let stats = RouteStats::new(4, 1_281).with_class(
        FareClass::Economy,
        RouteStat {
            price: 388,
            demand: 2_410,
            remaining_demand: 2_410,
        },
    );
    routes.save("CGK", "SIN", &stats).unwrap();

    let leg = CircuitLeg {
        route: Route::new("CGK", "SIN"),
        stats: routes.load("CGK", "SIN").unwrap(),
    };
    let driver = configurator_page();
    let waves = find_seat_configs(&driver, &config(), &aircraft, &[leg])
        .await
        .unwrap();

    assert_eq!(waves.len(), 3);
    assert_eq!(
        driver.navigations(),
        vec!["https://seats.test/index.html"]
    );
    assert_eq!(driver.typed_into(&Locator::id("auditprice_eco")), vec!["388"]);
    assert_eq!(driver.typed_into(&Locator::id("demand_cargo")), vec!["0"]);

    seats.save("CGK", "SIN", &aircraft, &waves).unwrap();
    let cached = seats.load("CGK", "SIN", &aircraft).unwrap();
    assert_eq!(cached, waves);

    assert_eq!(best_by_roi(&cached).unwrap().no, 2);
    assert_eq!(nth_best(&cached, Metric::TotalTurnover, 1).unwrap().no, 3);
    assert_eq!(nth_best(&cached, Metric::TotalTurnover, 2).unwrap().no, 1);
    assert_eq!(cached[0].turnover_per_wave, 1_225_000.0);
}
