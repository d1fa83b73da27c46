//! In-memory station table.
//!
//! The id index sits behind one `RwLock` that is only write-locked to add a
//! station. Each station has its own lock, so a push to one station never
//! waits on a refresh of another, and [`StationRegistry::list`] copies each
//! station whole under its lock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::conditions::{AirQualityFields, Coordinate, WeatherFields};
use crate::station::Station;

type Slot = Arc<RwLock<Station>>;

/// What a push did to the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    /// The id was already known; this is its state after the push.
    Updated(Station),
    /// The id was new; a station was created with this state.
    Created(Station),
}

impl PushOutcome {
    pub fn station(&self) -> &Station {
        match self {
            PushOutcome::Updated(s) | PushOutcome::Created(s) => s,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, PushOutcome::Created(_))
    }
}

#[derive(Default)]
struct Index {
    order: Vec<Slot>,
    by_id: HashMap<String, usize>,
}

impl Index {
    fn get(&self, id: &str) -> Option<Slot> {
        self.by_id.get(id).map(|&i| Arc::clone(&self.order[i]))
    }

    fn push(&mut self, station: Station) {
        self.by_id.insert(station.id.clone(), self.order.len());
        self.order.push(Arc::new(RwLock::new(station)));
    }
}

/// Station registry shared by every request handler.
#[derive(Default)]
pub struct StationRegistry {
    index: RwLock<Index>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from initial station states. A repeated id replaces
    /// the earlier entry in place.
    pub fn from_stations(stations: impl IntoIterator<Item = Station>) -> Self {
        let mut index = Index::default();
        for station in stations {
            match index.by_id.get(&station.id) {
                Some(&i) => index.order[i] = Arc::new(RwLock::new(station)),
                None => index.push(station),
            }
        }
        Self {
            index: RwLock::new(index),
        }
    }

    async fn slot(&self, id: &str) -> Option<Slot> {
        self.index.read().await.get(id)
    }

    /// Apply a pushed sensor reading, creating the station if the id is new.
    pub async fn upsert_push(&self, id: &str, temperature: f64, city: &str) -> PushOutcome {
        if let Some(slot) = self.slot(id).await {
            return PushOutcome::Updated(Self::push_into(&slot, temperature, city).await);
        }

        let mut index = self.index.write().await;
        // Another push may have created it between the two locks.
        let existing = index.get(id);
        if let Some(slot) = existing {
            drop(index);
            return PushOutcome::Updated(Self::push_into(&slot, temperature, city).await);
        }

        let mut station = Station::from_unseen_push(id);
        station.apply_push(temperature, city, Utc::now());
        index.push(station.clone());
        tracing::info!(station = %id, "Created station from first push");
        PushOutcome::Created(station)
    }

    async fn push_into(slot: &Slot, temperature: f64, city: &str) -> Station {
        let mut station = slot.write().await;
        station.apply_push(temperature, city, Utc::now());
        station.clone()
    }

    /// Merge fetched conditions into a station.
    ///
    /// Returns `false` without touching anything when the id is unknown or the
    /// station has no coordinates.
    pub async fn apply_refresh(
        &self,
        id: &str,
        weather: &WeatherFields,
        air: &AirQualityFields,
    ) -> bool {
        let Some(slot) = self.slot(id).await else {
            return false;
        };
        let mut station = slot.write().await;
        if station.coordinate().is_none() {
            return false;
        }
        station.apply_conditions(weather, air, Utc::now());
        true
    }

    /// Point-in-time copy of every station, in insertion order.
    pub async fn list(&self) -> Vec<Station> {
        let slots: Vec<Slot> = self.index.read().await.order.clone();
        let mut stations = Vec::with_capacity(slots.len());
        for slot in slots {
            stations.push(slot.read().await.clone());
        }
        stations
    }

    pub async fn get(&self, id: &str) -> Option<Station> {
        let slot = self.slot(id).await?;
        let station = slot.read().await.clone();
        Some(station)
    }

    /// Ids and coordinates of every station that can be refreshed.
    pub async fn refresh_targets(&self) -> Vec<(String, Coordinate)> {
        let mut targets = Vec::new();
        for station in self.list().await {
            if let Some(coordinate) = station.coordinate() {
                targets.push((station.id, coordinate));
            }
        }
        targets
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FireRisk;
    use crate::station::StationKind;

    fn configured(id: &str, kind: StationKind) -> Station {
        Station::new(id, id, "Toronto", Some(Coordinate { lat: 43.65, lng: -79.38 }), kind)
    }

    fn hot_weather() -> WeatherFields {
        WeatherFields {
            temperature: Some(38.0),
            humidity: Some(22.0),
            wind_speed: Some(31.0),
            uv_index: Some(8.0),
        }
    }

    #[tokio::test]
    async fn test_push_creates_unseen_station() {
        let registry = StationRegistry::new();
        let outcome = registry.upsert_push("sensor07", 21.5, "Milton").await;

        assert!(outcome.is_created());
        let station = outcome.station();
        assert_eq!(station.temperature, Some(21.5));
        assert_eq!(station.city, "Milton");
        assert!(station.coordinate().is_none());
        assert!(station.humidity.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_push_updates_known_station_without_touching_environment() {
        let registry = StationRegistry::from_stations(vec![configured("sensor01", StationKind::Physical)]);
        registry
            .apply_refresh("sensor01", &hot_weather(), &AirQualityFields::default())
            .await;

        let outcome = registry.upsert_push("sensor01", 24.0, "Oakville").await;
        assert!(matches!(outcome, PushOutcome::Updated(_)));

        let station = registry.get("sensor01").await.unwrap();
        assert_eq!(station.temperature, Some(24.0));
        assert_eq!(station.city, "Oakville");
        assert_eq!(station.humidity, Some(22.0));
        assert_eq!(station.lat, Some(43.65));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_repeated_push_is_idempotent() {
        let registry = StationRegistry::new();
        let first = registry.upsert_push("sensor01", 19.0, "Oakville").await;
        let second = registry.upsert_push("sensor01", 19.0, "Oakville").await;

        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(registry.len().await, 1);

        let a = first.station();
        let b = second.station();
        assert_eq!(a.temperature, b.temperature);
        assert_eq!(a.city, b.city);
        assert_eq!(a.humidity, b.humidity);
        assert_eq!(a.fire_risk, b.fire_risk);
        assert!(b.last_update >= a.last_update);
    }

    #[tokio::test]
    async fn test_refresh_skips_station_without_coordinates() {
        let registry = StationRegistry::new();
        registry.upsert_push("sensor09", 20.0, "Unknown").await;

        let applied = registry
            .apply_refresh("sensor09", &hot_weather(), &AirQualityFields::default())
            .await;
        assert!(!applied);
        assert!(registry.get("sensor09").await.unwrap().humidity.is_none());
        assert!(registry.refresh_targets().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_unknown_id_is_noop() {
        let registry = StationRegistry::new();
        assert!(
            !registry
                .apply_refresh("ghost", &hot_weather(), &AirQualityFields::default())
                .await
        );
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_physical_pushed_temperature_survives_refresh() {
        let registry = StationRegistry::from_stations(vec![configured("sensor01", StationKind::Physical)]);
        registry.upsert_push("sensor01", 18.0, "Oakville").await;
        registry
            .apply_refresh("sensor01", &hot_weather(), &AirQualityFields::default())
            .await;

        let station = registry.get("sensor01").await.unwrap();
        assert_eq!(station.temperature, Some(18.0));
        // 0 + 3 + 3 = 6
        assert_eq!(station.fire_risk, FireRisk::High);
    }

    #[tokio::test]
    async fn test_virtual_temperature_overwritten_by_refresh() {
        let registry = StationRegistry::from_stations(vec![configured("toronto", StationKind::Virtual)]);
        registry.upsert_push("toronto", 18.0, "Toronto").await;
        registry
            .apply_refresh("toronto", &hot_weather(), &AirQualityFields::default())
            .await;

        let station = registry.get("toronto").await.unwrap();
        assert_eq!(station.temperature, Some(38.0));
        assert_eq!(station.fire_risk, FireRisk::Extreme);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let registry = StationRegistry::from_stations(vec![
            configured("b", StationKind::Virtual),
            configured("a", StationKind::Virtual),
        ]);
        registry.upsert_push("c", 10.0, "X").await;
        registry.upsert_push("a", 11.0, "Y").await;

        let ids: Vec<String> = registry.list().await.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_from_stations_replaces_duplicate_ids() {
        let mut replacement = configured("a", StationKind::Physical);
        replacement.name = "Replacement".to_string();
        let registry =
            StationRegistry::from_stations(vec![configured("a", StationKind::Virtual), replacement]);

        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get("a").await.unwrap().name, "Replacement");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_pushes_create_once() {
        let registry = Arc::new(StationRegistry::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.upsert_push("sensor01", i as f64, "Oakville").await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_created() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_list_never_sees_torn_station() {
        let registry = Arc::new(StationRegistry::new());
        registry.upsert_push("sensor01", 0.0, "city-0").await;

        let writer = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for i in 1..500 {
                    registry
                        .upsert_push("sensor01", i as f64, &format!("city-{}", i))
                        .await;
                }
            })
        };

        for _ in 0..500 {
            for station in registry.list().await {
                let temperature = station.temperature.unwrap() as i64;
                assert_eq!(station.city, format!("city-{}", temperature));
            }
        }
        writer.await.unwrap();
    }
}
