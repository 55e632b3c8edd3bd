//! Geo module - world-boundaries topology decoding.
//!
//! The world-atlas file is quantized TopoJSON: a shared pool of delta-encoded
//! arcs plus per-country geometries referencing them by index (negative index
//! means the arc is walked backwards). This decoder applies the quantization
//! transform, stitches rings back together and flattens every country to its
//! exterior rings in lon/lat.

use crate::data::CountryKey;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Topology parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Topology has no '{0}' object")]
    MissingObject(String),
    #[error("Arc index {0} out of bounds")]
    BadArcIndex(i64),
}

#[derive(Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: HashMap<String, Geometry>,
}

#[derive(Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<Properties>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Option<Properties>,
    },
}

#[derive(Deserialize)]
struct Properties {
    #[serde(default)]
    name: Option<String>,
}

/// One country shape: display name, canonical key and the exterior ring of
/// each of its polygons, in lon/lat.
#[derive(Debug, Clone)]
pub struct CountryFeature {
    pub name: String,
    pub key: CountryKey,
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl CountryFeature {
    /// Planar centroid of the largest ring, used for bubble placement.
    pub fn centroid(&self) -> [f64; 2] {
        self.rings
            .iter()
            .map(|ring| ring_centroid_area(ring))
            .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(c, _)| c)
            .unwrap_or([0.0, 0.0])
    }
}

/// All decoded country shapes.
#[derive(Debug, Default)]
pub struct WorldAtlas {
    pub countries: Vec<CountryFeature>,
}

impl WorldAtlas {
    /// Decode the `countries` object of a TopoJSON topology.
    pub fn from_topojson(text: &str) -> Result<Self, GeoError> {
        let topology: Topology = serde_json::from_str(text)?;
        let arcs = decode_arcs(&topology);

        let countries = topology
            .objects
            .get("countries")
            .ok_or_else(|| GeoError::MissingObject("countries".to_string()))?;

        let mut features = Vec::new();
        collect_features(countries, &arcs, &mut features)?;
        Ok(Self { countries: features })
    }
}

/// Undo delta encoding and the quantization transform for every arc.
fn decode_arcs(topology: &Topology) -> Vec<Vec<[f64; 2]>> {
    topology
        .arcs
        .iter()
        .map(|arc| {
            let mut x = 0.0;
            let mut y = 0.0;
            arc.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| match &topology.transform {
                    Some(t) => {
                        // Quantized: positions are cumulative integer deltas.
                        x += p[0];
                        y += p[1];
                        [x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1]]
                    }
                    None => [p[0], p[1]],
                })
                .collect()
        })
        .collect()
}

fn collect_features(
    geometry: &Geometry,
    arcs: &[Vec<[f64; 2]>],
    out: &mut Vec<CountryFeature>,
) -> Result<(), GeoError> {
    match geometry {
        Geometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_features(g, arcs, out)?;
            }
        }
        Geometry::Polygon { arcs: rings, properties } => {
            if let Some(feature) = build_feature(properties, &[rings.clone()], arcs)? {
                out.push(feature);
            }
        }
        Geometry::MultiPolygon { arcs: polygons, properties } => {
            if let Some(feature) = build_feature(properties, polygons, arcs)? {
                out.push(feature);
            }
        }
    }
    Ok(())
}

fn build_feature(
    properties: &Option<Properties>,
    polygons: &[Vec<Vec<i64>>],
    arcs: &[Vec<[f64; 2]>],
) -> Result<Option<CountryFeature>, GeoError> {
    // Nameless shapes cannot be joined to any dataset; skip them.
    let Some(name) = properties.as_ref().and_then(|p| p.name.clone()) else {
        return Ok(None);
    };

    let mut rings = Vec::new();
    for polygon in polygons {
        // Ring 0 is the exterior; holes are not rendered.
        if let Some(exterior) = polygon.first() {
            rings.push(stitch_ring(exterior, arcs)?);
        }
    }

    let key = CountryKey::from_raw(&name);
    Ok(Some(CountryFeature { name, key, rings }))
}

/// Concatenate a ring's arcs, reversing negative references and dropping the
/// duplicated junction point between consecutive arcs.
fn stitch_ring(indices: &[i64], arcs: &[Vec<[f64; 2]>]) -> Result<Vec<[f64; 2]>, GeoError> {
    let mut ring: Vec<[f64; 2]> = Vec::new();
    for &raw in indices {
        let (idx, reversed) = if raw >= 0 {
            (raw as usize, false)
        } else {
            ((-1 - raw) as usize, true)
        };
        let arc = arcs.get(idx).ok_or(GeoError::BadArcIndex(raw))?;

        let mut points: Vec<[f64; 2]> = arc.clone();
        if reversed {
            points.reverse();
        }
        let skip = usize::from(!ring.is_empty());
        ring.extend(points.into_iter().skip(skip));
    }
    Ok(ring)
}

/// Shoelace centroid and signed area of one ring.
fn ring_centroid_area(ring: &[[f64; 2]]) -> ([f64; 2], f64) {
    if ring.len() < 3 {
        let n = ring.len().max(1) as f64;
        let mean = ring.iter().fold([0.0, 0.0], |a, p| [a[0] + p[0], a[1] + p[1]]);
        return ([mean[0] / n, mean[1] / n], 0.0);
    }

    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..ring.len() {
        let p = ring[i];
        let q = ring[(i + 1) % ring.len()];
        let cross = p[0] * q[1] - q[0] * p[1];
        area += cross;
        cx += (p[0] + q[0]) * cross;
        cy += (p[1] + q[1]) * cross;
    }
    area /= 2.0;
    if area == 0.0 {
        let n = ring.len() as f64;
        let mean = ring.iter().fold([0.0, 0.0], |a, p| [a[0] + p[0], a[1] + p[1]]);
        return ([mean[0] / n, mean[1] / n], 0.0);
    }
    ([cx / (6.0 * area), cy / (6.0 * area)], area)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A unit square split into two arcs, quantized with scale 1/translate 0.
    // Arc 0: (0,0)->(1,0)->(1,1); arc 1: (1,1)->(0,1)->(0,0).
    const SQUARE: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [1, 1], "translate": [0, 0]},
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]], "properties": {"name": "Squareland"}}
                ]
            }
        },
        "arcs": [
            [[0, 0], [1, 0], [0, 1]],
            [[1, 1], [-1, 0], [0, -1]]
        ]
    }"#;

    #[test]
    fn decodes_quantized_polygon() {
        let atlas = WorldAtlas::from_topojson(SQUARE).unwrap();
        assert_eq!(atlas.countries.len(), 1);

        let country = &atlas.countries[0];
        assert_eq!(country.name, "Squareland");
        assert_eq!(country.key, CountryKey::from_raw("squareland"));
        assert_eq!(
            country.rings[0],
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
        );
    }

    #[test]
    fn centroid_of_unit_square_is_its_middle() {
        let atlas = WorldAtlas::from_topojson(SQUARE).unwrap();
        let c = atlas.countries[0].centroid();
        assert!((c[0] - 0.5).abs() < 1e-12);
        assert!((c[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn negative_arc_index_walks_backwards() {
        // Same square, second half expressed as arc 1 reversed.
        let topo = r#"{
            "type": "Topology",
            "transform": {"scale": [1, 1], "translate": [0, 0]},
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": "Polygon", "arcs": [[0, -2]], "properties": {"name": "Reversia"}}
                    ]
                }
            },
            "arcs": [
                [[0, 0], [1, 0], [0, 1]],
                [[0, 0], [0, 1], [1, 0]]
            ]
        }"#;
        let atlas = WorldAtlas::from_topojson(topo).unwrap();
        assert_eq!(
            atlas.countries[0].rings[0],
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
        );
    }

    #[test]
    fn missing_countries_object_is_an_error() {
        let topo = r#"{"type": "Topology", "objects": {}, "arcs": []}"#;
        let err = WorldAtlas::from_topojson(topo).unwrap_err();
        assert!(matches!(err, GeoError::MissingObject(_)));
    }

    #[test]
    fn nameless_geometries_are_skipped() {
        let topo = r#"{
            "type": "Topology",
            "objects": {
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [{"type": "Polygon", "arcs": [[0]]}]
                }
            },
            "arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
        }"#;
        let atlas = WorldAtlas::from_topojson(topo).unwrap();
        assert!(atlas.countries.is_empty());
    }
}
