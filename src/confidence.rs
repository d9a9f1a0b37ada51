//! Raw similarity score to 0-100 confidence conversion.
//!
//! Uses fixed absolute bands rather than min-max rescaling of the batch, so a
//! set of uniformly poor matches stays poor instead of its best member being
//! stretched up to the top of the scale.

/// Upper bound of the confidence scale.
pub const MAX_CONFIDENCE: f32 = 100.0;

/// Map a raw similarity score to a confidence in `[0, 100]`.
///
/// | raw score      | confidence |
/// |----------------|------------|
/// | `< 0`          | 0          |
/// | `[0, 0.2)`     | 0 - 10     |
/// | `[0.2, 0.4)`   | 10 - 40    |
/// | `[0.4, 0.6)`   | 40 - 70    |
/// | `[0.6, 0.8)`   | 70 - 90    |
/// | `>= 0.8`       | 90 - 100, capped above 1.0 |
///
/// Every band meets its neighbours at the boundary, so the function is
/// continuous and monotonically non-decreasing. NaN maps to 0.
pub fn normalize_score(raw: f32) -> f32 {
    if raw.is_nan() || raw < 0.0 {
        return 0.0;
    }

    let confidence = if raw >= 0.8 {
        90.0 + ((raw - 0.8) / 0.2) * 10.0
    } else if raw >= 0.6 {
        70.0 + ((raw - 0.6) / 0.2) * 20.0
    } else if raw >= 0.4 {
        40.0 + ((raw - 0.4) / 0.2) * 30.0
    } else if raw >= 0.2 {
        10.0 + ((raw - 0.2) / 0.2) * 30.0
    } else {
        (raw / 0.2) * 10.0
    };

    confidence.clamp(0.0, MAX_CONFIDENCE)
}
