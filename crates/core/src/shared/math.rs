//! Vector and box math shared by the recognition and anomaly backends.

/// IoU between two bounding boxes represented as `[x1, y1, x2, y2]`.
pub fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Euclidean (L2) distance between two equal-length vectors.
///
/// Accumulates in f64 so long embeddings don't lose precision.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have equal length");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Greedy NMS over `[x1, y1, x2, y2]` boxes.
///
/// `boxes` must already be sorted by descending score. Returns the indices
/// of the kept boxes in that same order. `same_group` decides whether two
/// boxes compete; class-aware callers compare class ids.
pub fn nms_indices<F>(boxes: &[[f64; 4]], iou_thresh: f64, same_group: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> bool,
{
    let mut keep = Vec::new();
    let mut suppressed = vec![false; boxes.len()];

    for i in 0..boxes.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        for j in (i + 1)..boxes.len() {
            if suppressed[j] || !same_group(i, j) {
                continue;
            }
            if bbox_iou(&boxes[i], &boxes[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}
