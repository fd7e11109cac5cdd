use crate::scan::{
    BARRIER_RADIUS, SCAN_CURVATURE, SCAN_FAR_Y_FACTOR, SCAN_HALF_SPAN_FACTOR, SCAN_MIN_HALF_SPAN,
    SCAN_START_Y_FACTOR, SCAN_STEP_X,
};
use lanesight_inference::segment::Mask2D;

/// A contiguous x-range classified drivable in a single scan. Regions are
/// disjoint and ordered by `start_x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneRegion {
    pub start_x: u32,
    pub end_x: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneScanResult {
    pub total_lanes: u32,
    pub ego_lane: u32,
    pub path: Vec<(u32, u32)>,
}

/// Walks one parabolic look-ahead path through the drivable and lane-line
/// masks, splits it into drivable regions separated by marking barriers,
/// and picks the region holding `ego_x` as the ego lane.
///
/// `ego_x` defaults to the mask-space center column; there is no vehicle
/// position detection feeding it, so the scan is always anchored straight
/// ahead. The scan itself is total: every coordinate is clamped and an
/// empty mask degrades to zero lanes with ego lane 1.
pub fn scan_lanes(
    drivable: &Mask2D,
    lane_line: &Mask2D,
    ego_x: Option<u32>,
    with_path: bool,
) -> LaneScanResult {
    let width = drivable.width();
    let height = drivable.height();
    if width == 0 || height == 0 {
        return LaneScanResult {
            total_lanes: 0,
            ego_lane: 1,
            path: Vec::new(),
        };
    }

    let ego_x = ego_x
        .map(|x| x as usize)
        .unwrap_or(width / 2)
        .min(width - 1);

    let trace = trace_path(drivable, lane_line, ego_x, with_path);

    let total_lanes = trace
        .counted_entries
        .max(if trace.regions.is_empty() { 0 } else { 1 });
    let ego_lane = ego_region(&trace.regions, ego_x as u32);

    LaneScanResult {
        total_lanes,
        ego_lane,
        path: trace.path,
    }
}

pub(crate) struct ScanTrace {
    pub(crate) regions: Vec<LaneRegion>,
    pub(crate) counted_entries: u32,
    pub(crate) path: Vec<(u32, u32)>,
}

pub(crate) fn trace_path(
    drivable: &Mask2D,
    lane_line: &Mask2D,
    ego_x: usize,
    with_path: bool,
) -> ScanTrace {
    let width = drivable.width();
    let height = drivable.height();

    let y_start = SCAN_START_Y_FACTOR * height as f32;
    let y_far = SCAN_FAR_Y_FACTOR * height as f32;
    let half_span = (SCAN_HALF_SPAN_FACTOR * width as f32).max(SCAN_MIN_HALF_SPAN);
    let k_base = if y_start > y_far {
        (y_start - y_far) / (half_span * half_span)
    } else {
        0.0
    };
    let coefficient = -SCAN_CURVATURE * k_base;

    let mut path = Vec::new();
    let mut regions: Vec<LaneRegion> = Vec::new();
    let mut open: Option<LaneRegion> = None;
    let mut counted_entries = 0u32;
    let mut prev_barrier = false;

    for x in (0..width).step_by(SCAN_STEP_X) {
        let dx = x as f32 - ego_x as f32;
        let y = (coefficient * dx * dx + y_start).clamp(0.0, (height - 1) as f32) as usize;
        if with_path {
            path.push((x as u32, y as u32));
        }

        if near_lane_line(lane_line, x, y) {
            // a barrier closes whatever region was building
            if let Some(region) = open.take() {
                regions.push(region);
            }
            prev_barrier = true;
            continue;
        }

        if drivable.get(x, y) {
            match open.as_mut() {
                Some(region) => region.end_x = x as u32,
                None => {
                    // count the entry only at scan start or straight off a
                    // barrier; re-entry across a plain gap is not a crossing
                    if prev_barrier || regions.is_empty() {
                        counted_entries += 1;
                    }
                    open = Some(LaneRegion {
                        start_x: x as u32,
                        end_x: x as u32,
                    });
                }
            }
        }
        prev_barrier = false;
    }

    if let Some(region) = open.take() {
        regions.push(region);
    }

    ScanTrace {
        regions,
        counted_entries,
        path,
    }
}

/// 1-based index of the region containing `ego_x`, falling back to the
/// horizontally nearest region (first wins ties), then to 1.
fn ego_region(regions: &[LaneRegion], ego_x: u32) -> u32 {
    let mut best: Option<(usize, u32)> = None;
    for (index, region) in regions.iter().enumerate() {
        let distance = if ego_x < region.start_x {
            region.start_x - ego_x
        } else if ego_x > region.end_x {
            ego_x - region.end_x
        } else {
            0
        };
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
        if distance == 0 {
            break;
        }
    }
    best.map_or(1, |(index, _)| index as u32 + 1)
}

/// Any lane-line pixel inside the clamped square neighborhood makes the
/// sample a barrier.
fn near_lane_line(mask: &Mask2D, x: usize, y: usize) -> bool {
    let x_min = x.saturating_sub(BARRIER_RADIUS);
    let y_min = y.saturating_sub(BARRIER_RADIUS);
    let x_max = (x + BARRIER_RADIUS).min(mask.width().saturating_sub(1));
    let y_max = (y + BARRIER_RADIUS).min(mask.height().saturating_sub(1));
    for ny in y_min..=y_max {
        for nx in x_min..=x_max {
            if mask.get(nx, ny) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 200;
    const H: usize = 100;

    fn empty() -> Mask2D {
        Mask2D::filled(W, H, false)
    }

    fn full() -> Mask2D {
        Mask2D::filled(W, H, true)
    }

    fn columns(ranges: &[(usize, usize)]) -> Mask2D {
        Mask2D::from_fn(W, H, |x, _| ranges.iter().any(|&(a, b)| x >= a && x <= b))
    }

    #[test]
    fn all_zero_drivable_yields_no_lanes() {
        let result = scan_lanes(&empty(), &empty(), None, false);
        assert_eq!(result.total_lanes, 0);
        assert_eq!(result.ego_lane, 1);
        assert!(result.path.is_empty());

        // a lane-line mask alone changes nothing
        let result = scan_lanes(&empty(), &full(), None, false);
        assert_eq!(result.total_lanes, 0);
        assert_eq!(result.ego_lane, 1);
    }

    #[test]
    fn full_drivable_is_one_lane_spanning_the_width() {
        let result = scan_lanes(&full(), &empty(), None, false);
        assert_eq!(result.total_lanes, 1);
        assert_eq!(result.ego_lane, 1);

        let trace = trace_path(&full(), &empty(), W / 2, false);
        assert_eq!(trace.regions.len(), 1);
        assert_eq!(trace.regions[0].start_x, 0);
        assert_eq!(trace.regions[0].end_x, 198);
    }

    #[test]
    fn three_bands_split_by_two_barriers() {
        // barrier stripes wider than the detection neighborhood
        let lane_line = columns(&[(64, 68), (130, 134)]);
        let result = scan_lanes(&full(), &lane_line, None, false);
        assert_eq!(result.total_lanes, 3);
        assert_eq!(result.ego_lane, 2, "center column sits in the middle band");
    }

    #[test]
    fn a_plain_gap_is_not_a_crossing() {
        // two drivable stretches with nothing but background between them
        let drivable = columns(&[(0, 80), (120, 199)]);
        let result = scan_lanes(&drivable, &empty(), None, false);
        assert_eq!(result.total_lanes, 1);
        assert_eq!(result.ego_lane, 1);
    }

    #[test]
    fn ego_falls_back_to_the_nearest_region() {
        let drivable = columns(&[(0, 39)]);
        let result = scan_lanes(&drivable, &empty(), None, false);
        assert_eq!(result.total_lanes, 1);
        assert_eq!(result.ego_lane, 1);
    }

    #[test]
    fn equidistant_regions_resolve_in_scan_order() {
        let lane_line = columns(&[(98, 102)]);
        let result = scan_lanes(&full(), &lane_line, Some(100), false);
        assert_eq!(result.total_lanes, 2);
        assert_eq!(result.ego_lane, 1);
    }

    #[test]
    fn repeated_scans_are_identical() {
        let lane_line = columns(&[(64, 68), (130, 134)]);
        let first = scan_lanes(&full(), &lane_line, None, true);
        let second = scan_lanes(&full(), &lane_line, None, true);
        assert_eq!(first, second);
    }

    #[test]
    fn path_is_materialized_on_request_only() {
        let without = scan_lanes(&full(), &empty(), None, false);
        assert!(without.path.is_empty());

        let with = scan_lanes(&full(), &empty(), None, true);
        assert_eq!(with.path.len(), W / SCAN_STEP_X);
        assert!(with
            .path
            .iter()
            .all(|&(x, y)| (x as usize) < W && (y as usize) < H));
        // straight ahead of the anchor the path sits on the start row
        assert_eq!(with.path[W / (2 * SCAN_STEP_X)], (100, 82));
    }

    #[test]
    fn explicit_anchor_moves_the_ego_lane() {
        let lane_line = columns(&[(64, 68), (130, 134)]);
        let left = scan_lanes(&full(), &lane_line, Some(20), false);
        assert_eq!(left.ego_lane, 1);
        let right = scan_lanes(&full(), &lane_line, Some(190), false);
        assert_eq!(right.ego_lane, 3);
    }

    #[test]
    fn degenerate_mask_dimensions_stay_total() {
        let zero = Mask2D::filled(0, 0, false);
        let result = scan_lanes(&zero, &zero, None, true);
        assert_eq!(result.total_lanes, 0);
        assert_eq!(result.ego_lane, 1);
    }
}
