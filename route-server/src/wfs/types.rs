//! WFS GeoJSON response DTOs.
//!
//! These types map directly to the GeoJSON that GeoServer returns for
//! `GetFeature` with `outputFormat=application/json`. Only the members the
//! client reads are declared; everything else (`crs`, `totalFeatures`,
//! `bbox`, ...) is ignored.

use serde::Deserialize;

/// A GeoJSON feature collection.
///
/// An empty `features` array is how the route layer reports "no route".
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(default = "Vec::new")]
    pub features: Vec<Feature<P>>,
}

/// A single GeoJSON feature.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature<P> {
    /// GeoServer feature id, `<layer>.<n>`.
    pub id: Option<String>,

    pub geometry: Option<GeometryDto>,

    pub properties: P,
}

/// GeoJSON geometry. Positions may carry a third (elevation) ordinate,
/// which is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryDto {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

/// Properties of a feature in the `nodes` layer.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeProperties {
    pub name: String,

    /// Importance class (10 = capital, 9 = province centre, ...).
    #[serde(default)]
    pub rank: Option<i32>,
}

/// Properties of a feature in the `route` layer: one path edge.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeProperties {
    /// Name of the node the edge leaves.
    pub source: String,

    /// Name of the node the edge enters.
    pub target: String,

    /// Mode tag, e.g. `rail` or `electric-tram`.
    pub mode: String,

    /// Travel time in hours.
    pub cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_node_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "totalFeatures": 1,
            "features": [{
                "type": "Feature",
                "id": "nodes.12",
                "geometry": {"type": "Point", "coordinates": [3228247.5, 5012341.25]},
                "geometry_name": "geom",
                "properties": {"name": "Edirne", "rank": 9}
            }],
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}}
        }"#;

        let collection: FeatureCollection<NodeProperties> = serde_json::from_str(json).unwrap();
        assert_eq!(collection.features.len(), 1);

        let feature = &collection.features[0];
        assert_eq!(feature.id.as_deref(), Some("nodes.12"));
        assert_eq!(feature.properties.name, "Edirne");
        assert_eq!(feature.properties.rank, Some(9));
        assert!(matches!(
            feature.geometry,
            Some(GeometryDto::Point { ref coordinates }) if coordinates.len() == 2
        ));
    }

    #[test]
    fn parse_route_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "route.fid-1",
                "geometry": {"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1, 0]]]},
                "properties": {"source": "Edirne", "target": "Lüleburgaz", "mode": "rail", "cost": 2.5}
            }]
        }"#;

        let collection: FeatureCollection<EdgeProperties> = serde_json::from_str(json).unwrap();
        let feature = &collection.features[0];
        assert_eq!(feature.properties.target, "Lüleburgaz");
        assert_eq!(feature.properties.mode, "rail");
        assert_eq!(feature.properties.cost, 2.5);
    }

    #[test]
    fn empty_collection() {
        let json = r#"{"type": "FeatureCollection", "features": []}"#;
        let collection: FeatureCollection<EdgeProperties> = serde_json::from_str(json).unwrap();
        assert!(collection.features.is_empty());

        let json = r#"{"type": "FeatureCollection"}"#;
        let collection: FeatureCollection<EdgeProperties> = serde_json::from_str(json).unwrap();
        assert!(collection.features.is_empty());
    }

    #[test]
    fn unsupported_geometry() {
        let json = r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 1], [0, 0]]]}"#;
        let geometry: GeometryDto = serde_json::from_str(json).unwrap();
        assert!(matches!(geometry, GeometryDto::Unsupported));
    }
}
