//! POI layout for a single-segment girder: segment ends, bearings, faces of
//! support, tenth points and a dense band of points past each face of
//! support where the shear critical section is searched.

use crate::keys::{poi_attr, PoiId, PointOfInterest, SegmentKey};

/// Spacing of the dense points past each face of support (ft)
pub const DENSE_SPACING_FT: f64 = 0.5;

/// Length of the dense band, in girder heights
pub const DENSE_BAND_HEIGHTS: f64 = 3.0;

/// Locations closer than this are merged
const MERGE_TOLERANCE_FT: f64 = 1.0e-6;

/// Ends of a segment measured from its start face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentFraming {
    pub segment_length_ft: f64,
    /// Start face to CL bearing
    pub start_bearing_ft: f64,
    /// End face to CL bearing
    pub end_bearing_ft: f64,
    /// CL bearing to face of support at the start
    pub start_support_ft: f64,
    /// CL bearing to face of support at the end
    pub end_support_ft: f64,
    pub girder_height_ft: f64,
}

impl SegmentFraming {
    pub fn span_length_ft(&self) -> f64 {
        self.segment_length_ft - self.start_bearing_ft - self.end_bearing_ft
    }

    pub fn start_face_ft(&self) -> f64 {
        self.start_bearing_ft + self.start_support_ft
    }

    pub fn end_face_ft(&self) -> f64 {
        self.segment_length_ft - self.end_bearing_ft - self.end_support_ft
    }
}

/// Stable identifier: segment position in the bridge plus the index along it
pub fn poi_id(segment: SegmentKey, index: usize) -> PoiId {
    PoiId(((segment.group as u64 * 1_000 + segment.girder as u64) * 100 + segment.segment as u64) * 10_000 + index as u64)
}

fn insert(points: &mut Vec<(f64, u32)>, x: f64, attributes: u32) {
    match points.iter_mut().find(|(px, _)| (*px - x).abs() < MERGE_TOLERANCE_FT) {
        Some((_, existing)) => *existing |= attributes,
        None => points.push((x, attributes)),
    }
}

/// POIs along a segment, sorted by distance from the start face
pub fn layout(segment: SegmentKey, framing: &SegmentFraming) -> Vec<PointOfInterest> {
    let mut points: Vec<(f64, u32)> = Vec::new();
    let length = framing.segment_length_ft;
    let span = framing.span_length_ft();

    insert(&mut points, 0.0, poi_attr::SEGMENT_END);
    insert(&mut points, length, poi_attr::SEGMENT_END);
    insert(&mut points, framing.start_bearing_ft, poi_attr::BEARING);
    insert(&mut points, length - framing.end_bearing_ft, poi_attr::BEARING);
    insert(&mut points, framing.start_face_ft(), poi_attr::FACE_OF_SUPPORT);
    insert(&mut points, framing.end_face_ft(), poi_attr::FACE_OF_SUPPORT);

    for tenth in 0..=10 {
        let mut attributes = poi_attr::TENTH_POINT;
        if tenth == 5 {
            attributes |= poi_attr::MIDSPAN;
        }
        insert(&mut points, framing.start_bearing_ft + span * tenth as f64 / 10.0, attributes);
    }

    let band = DENSE_BAND_HEIGHTS * framing.girder_height_ft;
    let steps = (band / DENSE_SPACING_FT).ceil() as usize;
    for step in 1..=steps {
        let offset = step as f64 * DENSE_SPACING_FT;
        let from_start = framing.start_face_ft() + offset;
        let from_end = framing.end_face_ft() - offset;
        if from_start < framing.end_face_ft() {
            insert(&mut points, from_start, 0);
        }
        if from_end > framing.start_face_ft() {
            insert(&mut points, from_end, 0);
        }
    }

    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
        .into_iter()
        .enumerate()
        .map(|(index, (x, attributes))| PointOfInterest::new(poi_id(segment, index), segment, x, attributes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framing() -> SegmentFraming {
        SegmentFraming {
            segment_length_ft: 101.5,
            start_bearing_ft: 0.75,
            end_bearing_ft: 0.75,
            start_support_ft: 0.5,
            end_support_ft: 0.5,
            girder_height_ft: 4.5,
        }
    }

    #[test]
    fn test_layout_is_sorted_with_unique_ids() {
        let pois = layout(SegmentKey::new(0, 1, 0), &framing());
        assert!(pois.windows(2).all(|w| w[0].distance_from_start_ft < w[1].distance_from_start_ft));
        let mut ids: Vec<_> = pois.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), pois.len());
    }

    #[test]
    fn test_bearing_and_tenth_point_merge() {
        let pois = layout(SegmentKey::new(0, 1, 0), &framing());
        let bearing = pois.iter().find(|p| (p.distance_from_start_ft - 0.75).abs() < 1e-9).unwrap();
        assert!(bearing.has_attribute(poi_attr::BEARING));
        assert!(bearing.has_attribute(poi_attr::TENTH_POINT));
        let faces = pois.iter().filter(|p| p.has_attribute(poi_attr::FACE_OF_SUPPORT)).count();
        assert_eq!(faces, 2);
        let mid = pois.iter().find(|p| p.has_attribute(poi_attr::MIDSPAN)).unwrap();
        assert!((mid.distance_from_start_ft - 50.75).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_framing_gives_mirrored_points() {
        let f = framing();
        let pois = layout(SegmentKey::new(0, 0, 0), &f);
        for poi in &pois {
            let mirrored = f.segment_length_ft - poi.distance_from_start_ft;
            assert!(pois.iter().any(|p| (p.distance_from_start_ft - mirrored).abs() < 1e-6));
        }
    }

    #[test]
    fn test_ids_differ_between_girders() {
        assert_ne!(poi_id(SegmentKey::new(0, 1, 0), 3), poi_id(SegmentKey::new(0, 2, 0), 3));
        assert_ne!(poi_id(SegmentKey::new(1, 1, 0), 3), poi_id(SegmentKey::new(0, 1, 0), 3));
    }
}
