//! Density binning of located records.
//!
//! Coordinates are quantized to four decimal places (roughly 11 m at the
//! equator); distinct raw coordinates sharing a rounded key merge into one
//! bin. Bins keep the raw coordinate of the first record that opened them.

use crate::record::{Dataset, FootfallRecord};
use serde::Serialize;
use std::collections::HashMap;

pub const COORDINATE_DECIMALS: i32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationBin {
    pub lat: f64,
    pub lng: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub lat: f64,
    pub lng: f64,
    pub count: u64,
    /// `count / max_intensity`, in `(0, 1]`.
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub available: bool,
    pub cells: Vec<HeatmapCell>,
    pub max_intensity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<MapCenter>,
}

fn quantize(value: f64) -> i64 {
    (value * 10f64.powi(COORDINATE_DECIMALS)).round() as i64
}

/// One bin per distinct rounded coordinate, in first-seen order. Records
/// missing either coordinate are skipped.
pub fn bin(records: &[FootfallRecord]) -> Vec<LocationBin> {
    let mut index_by_key: HashMap<(i64, i64), usize> = HashMap::new();
    let mut bins: Vec<LocationBin> = Vec::new();

    for record in records {
        let Some((lat, lng)) = record.coordinates() else {
            continue;
        };
        let index = *index_by_key
            .entry((quantize(lat), quantize(lng)))
            .or_insert_with(|| {
                bins.push(LocationBin { lat, lng, count: 0 });
                bins.len() - 1
            });
        bins[index].count += record.footfall;
    }
    bins
}

/// Largest bin count, never below 1.
pub fn max_intensity(bins: &[LocationBin]) -> u64 {
    bins.iter().map(|bin| bin.count).max().unwrap_or(0).max(1)
}

pub fn intensity(bin: &LocationBin, max_intensity: u64) -> f64 {
    bin.count as f64 / max_intensity.max(1) as f64
}

/// Bins ranked by count, highest first. Equal counts keep emission order.
pub fn top_bins(bins: &[LocationBin], limit: usize) -> Vec<LocationBin> {
    let mut ranked = bins.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

/// Mean coordinate of the located records.
pub fn map_center(records: &[FootfallRecord]) -> Option<MapCenter> {
    let mut located = 0usize;
    let (mut lat_sum, mut lng_sum) = (0.0, 0.0);
    for (lat, lng) in records.iter().filter_map(FootfallRecord::coordinates) {
        located += 1;
        lat_sum += lat;
        lng_sum += lng;
    }
    if located == 0 {
        return None;
    }
    Some(MapCenter {
        lat: lat_sum / located as f64,
        lng: lng_sum / located as f64,
    })
}

/// Binning gated on the dataset's location flag.
pub fn heatmap(dataset: &Dataset) -> Heatmap {
    if !dataset.has_location_data {
        return Heatmap {
            available: false,
            cells: Vec::new(),
            max_intensity: 1,
            center: None,
        };
    }

    let bins = bin(dataset.records());
    let max = max_intensity(&bins);
    let cells = bins
        .iter()
        .map(|bin| HeatmapCell {
            lat: bin.lat,
            lng: bin.lng,
            count: bin.count,
            intensity: intensity(bin, max),
        })
        .collect();

    Heatmap {
        available: true,
        cells,
        max_intensity: max,
        center: map_center(dataset.records()),
    }
}
