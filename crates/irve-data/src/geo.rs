//! Map marker groups: one series for all charge points, one per region.
//!
//! "Cluster" means grouped for display, not spatial density clustering.

use std::collections::HashMap;

use irve_core::formatting::{charge_point_label, region_label};
use irve_core::models::{ChargePointRecord, Coordinates, Geolocated};
use serde::Serialize;

/// Default map centre (metropolitan France) and zoom level.
pub const DEFAULT_MAP_CENTER: Coordinates = Coordinates {
    latitude: 46.603354,
    longitude: 1.888334,
};
pub const DEFAULT_MAP_ZOOM: u8 = 6;

// ── Markers and clusters ──────────────────────────────────────────────────────

/// One point on the map with its popup text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub point_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

impl Marker {
    pub fn new(point_id: &str, at: Coordinates, label: String) -> Self {
        Self {
            point_id: point_id.to_string(),
            latitude: at.latitude,
            longitude: at.longitude,
            label,
        }
    }
}

/// An ordered group of markers shown as one cluster layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterSeries {
    pub markers: Vec<Marker>,
    /// Records dropped for missing or non-finite coordinates.
    pub skipped: usize,
}

impl ClusterSeries {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Vehicle-count markers for one region, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCluster {
    pub region: String,
    pub markers: Vec<Marker>,
}

/// Region name → cluster, created on first encounter.
///
/// Iteration follows first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegionClusters {
    clusters: Vec<RegionCluster>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RegionClusters {
    /// The cluster for `region`, inserting an empty one on first access.
    pub fn entry(&mut self, region: &str) -> &mut RegionCluster {
        let idx = match self.index.get(region) {
            Some(&idx) => idx,
            None => {
                let idx = self.clusters.len();
                self.index.insert(region.to_string(), idx);
                self.clusters.push(RegionCluster {
                    region: region.to_string(),
                    markers: Vec::new(),
                });
                idx
            }
        };
        &mut self.clusters[idx]
    }

    pub fn get(&self, region: &str) -> Option<&RegionCluster> {
        self.index.get(region).map(|&idx| &self.clusters[idx])
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().map(|c| c.region.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegionCluster> {
        self.clusters.iter()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Centre and zoom the map opens at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_MAP_CENTER,
            zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

/// Output of [`GeoClusterBuilder::build_clusters`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoClusters {
    pub view: MapView,
    pub point_clusters: ClusterSeries,
    pub region_clusters: RegionClusters,
    /// Geo-valid records with no region name (point cluster only).
    pub unassigned_region: usize,
}

// ── GeoClusterBuilder ─────────────────────────────────────────────────────────

/// Stateless helper grouping charge points into map clusters.
pub struct GeoClusterBuilder;

impl GeoClusterBuilder {
    /// Group `records` into the charge-point series and per-region clusters.
    ///
    /// A record enters either only when both coordinates are present and
    /// finite. Input order is preserved within every cluster.
    pub fn build_clusters(records: &[ChargePointRecord]) -> GeoClusters {
        let mut out = GeoClusters::default();

        for record in records {
            let Some(at) = record.coordinates() else {
                out.point_clusters.skipped += 1;
                continue;
            };

            out.point_clusters.markers.push(Marker::new(
                &record.point_id,
                at,
                charge_point_label(&record.point_id, at, record.department.as_deref()),
            ));

            match record.region.as_deref() {
                Some(region) => {
                    let label = region_label(&record.point_id, at, region, record.vehicle_count);
                    out.region_clusters
                        .entry(region)
                        .markers
                        .push(Marker::new(&record.point_id, at, label));
                }
                None => out.unassigned_region += 1,
            }
        }

        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
