//! Core type definitions for Tycoon automation

use serde::{Deserialize, Serialize};

/// Fare class of a route's market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FareClass {
    Economy,
    Business,
    First,
    Cargo,
}

impl FareClass {
    /// All classes in the order the game lists them
    pub const ALL: [FareClass; 4] = [Self::Economy, Self::Business, Self::First, Self::Cargo];
}

impl std::fmt::Display for FareClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Economy => write!(f, "economy"),
            Self::Business => write!(f, "business"),
            Self::First => write!(f, "first"),
            Self::Cargo => write!(f, "cargo"),
        }
    }
}

impl std::str::FromStr for FareClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "economy" | "eco" => Ok(Self::Economy),
            "business" | "bus" => Ok(Self::Business),
            "first" => Ok(Self::First),
            "cargo" => Ok(Self::Cargo),
            _ => Err(format!("Invalid fare class: {}", s)),
        }
    }
}

/// Market figures of one fare class on a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStat {
    /// Ticket price in game currency
    pub price: u64,
    /// Daily passenger (or cargo) demand
    pub demand: u64,
    /// Demand not yet served by any airline
    pub remaining_demand: u64,
}

/// Market figures of a whole route, one slot per fare class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStats {
    #[serde(default)]
    pub economy: Option<RouteStat>,
    #[serde(default)]
    pub business: Option<RouteStat>,
    #[serde(default)]
    pub first: Option<RouteStat>,
    #[serde(default)]
    pub cargo: Option<RouteStat>,
    /// Route difficulty tier
    #[serde(default)]
    pub category: u32,
    /// Distance in kilometers
    #[serde(default)]
    pub distance: u32,
}

impl RouteStats {
    pub fn new(category: u32, distance: u32) -> Self {
        Self {
            category,
            distance,
            ..Default::default()
        }
    }

    /// Builder-style setter used while a route is being extracted
    pub fn with_class(mut self, class: FareClass, stat: RouteStat) -> Self {
        *self.slot_mut(class) = Some(stat);
        self
    }

    pub fn get(&self, class: FareClass) -> Option<&RouteStat> {
        match class {
            FareClass::Economy => self.economy.as_ref(),
            FareClass::Business => self.business.as_ref(),
            FareClass::First => self.first.as_ref(),
            FareClass::Cargo => self.cargo.as_ref(),
        }
    }

    fn slot_mut(&mut self, class: FareClass) -> &mut Option<RouteStat> {
        match class {
            FareClass::Economy => &mut self.economy,
            FareClass::Business => &mut self.business,
            FareClass::First => &mut self.first,
            FareClass::Cargo => &mut self.cargo,
        }
    }
}

/// One seat configuration proposed by the configurator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveStat {
    /// Wave number, assigned in scan order starting at 1
    pub no: u32,
    pub economy: u32,
    pub business: u32,
    pub first: u32,
    pub cargo: u32,
    pub turnover_per_wave: f64,
    pub roi: f64,
    pub total_turnover: f64,
    pub turnover_days: u32,
}

/// Ranking key for seat configurations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Roi,
    #[default]
    TotalTurnover,
    TurnoverPerWave,
    TurnoverDays,
}

impl Metric {
    /// Read this metric out of a wave
    pub fn value(&self, wave: &WaveStat) -> f64 {
        match self {
            Self::Roi => wave.roi,
            Self::TotalTurnover => wave.total_turnover,
            Self::TurnoverPerWave => wave.turnover_per_wave,
            Self::TurnoverDays => f64::from(wave.turnover_days),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Roi => write!(f, "roi"),
            Self::TotalTurnover => write!(f, "total_turnover"),
            Self::TurnoverPerWave => write!(f, "turnover_per_wave"),
            Self::TurnoverDays => write!(f, "turnover_days"),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "roi" => Ok(Self::Roi),
            "total_turnover" | "turnover" => Ok(Self::TotalTurnover),
            "turnover_per_wave" => Ok(Self::TurnoverPerWave),
            "turnover_days" | "days" => Ok(Self::TurnoverDays),
            _ => Err(format!("Invalid metric: {}", s)),
        }
    }
}

/// A line from a hub to a destination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub hub: String,
    pub destination: String,
}

impl Route {
    pub fn new(hub: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            hub: hub.into(),
            destination: destination.into(),
        }
    }

    /// Label used by the planning board, e.g. `CGK / SIN`
    pub fn slash_label(&self) -> String {
        format!("{} / {}", self.hub, self.destination)
    }
}

/// Formats as the game's route picker label, e.g. `CGK - SIN`
impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.hub, self.destination)
    }
}

/// Aircraft type as named by the game
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aircraft {
    pub maker: String,
    pub model: String,
}

impl Aircraft {
    pub fn new(maker: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            maker: maker.into(),
            model: model.into(),
        }
    }

    /// Model name accepted by the planning search box
    ///
    /// Ilyushin models are listed as `Ił-96-300` but only match without the prefix.
    pub fn searchable_model(&self) -> String {
        self.model.replace("Ił-", "")
    }
}

impl std::fmt::Display for Aircraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.maker, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(price: u64) -> RouteStat {
        RouteStat {
            price,
            demand: 300,
            remaining_demand: 120,
        }
    }

    #[test]
    fn test_fare_class_parse() {
        assert_eq!("Economy".parse::<FareClass>().unwrap(), FareClass::Economy);
        assert_eq!(" first ".parse::<FareClass>().unwrap(), FareClass::First);
        assert!("premium".parse::<FareClass>().is_err());
    }

    #[test]
    fn test_route_stats_slots() {
        let stats = RouteStats::new(3, 1_284)
            .with_class(FareClass::Economy, stat(410))
            .with_class(FareClass::Cargo, stat(9));

        assert_eq!(stats.get(FareClass::Economy).unwrap().price, 410);
        assert_eq!(stats.get(FareClass::Cargo).unwrap().price, 9);
        assert!(stats.get(FareClass::Business).is_none());
        assert_eq!(stats.category, 3);
        assert_eq!(stats.distance, 1_284);
    }

    #[test]
    fn test_route_stats_json_shape() {
        let stats = RouteStats::new(2, 800).with_class(FareClass::First, stat(2_000));
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["first"]["remaining_demand"], 120);
        assert!(json["economy"].is_null());
        assert_eq!(json["distance"], 800);
    }

    #[test]
    fn test_metric_parse_and_value() {
        let wave = WaveStat {
            no: 1,
            economy: 400,
            business: 40,
            first: 10,
            cargo: 5,
            turnover_per_wave: 1_200_000.0,
            roi: 2.5,
            total_turnover: 9_600_000.0,
            turnover_days: 8,
        };

        assert_eq!("roi".parse::<Metric>().unwrap(), Metric::Roi);
        assert_eq!("total-turnover".parse::<Metric>().unwrap(), Metric::TotalTurnover);
        assert_eq!(Metric::Roi.value(&wave), 2.5);
        assert_eq!(Metric::TurnoverDays.value(&wave), 8.0);
        assert_eq!(Metric::default(), Metric::TotalTurnover);
    }

    #[test]
    fn test_route_labels() {
        let route = Route::new("CGK", "SIN");
        assert_eq!(route.to_string(), "CGK - SIN");
        assert_eq!(route.slash_label(), "CGK / SIN");
    }

    #[test]
    fn test_searchable_model() {
        assert_eq!(Aircraft::new("Ilyushin", "Ił-96-300").searchable_model(), "96-300");
        assert_eq!(Aircraft::new("Boeing", "747-400").searchable_model(), "747-400");
    }
}
