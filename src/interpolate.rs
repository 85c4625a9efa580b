/// Returns `y` on the line through `(x0, y0)` and `(x1, y1)` at `x`.
///
/// `x` may lie outside `[x0, x1]`, in which case the line is extended.
/// The fractional part is rounded half away from zero. `x0` and `x1`
/// must differ.
pub fn interpolate(x0: i32, x1: i32, y0: i32, y1: i32, x: i32) -> i32 {
    let mut numerator = i64::from(x - x0) * i64::from(y1 - y0);
    let mut denominator = i64::from(x1 - x0);

    if denominator < 0 {
        numerator = -numerator;
        denominator = -denominator;
    }

    let offset = if numerator >= 0 {
        (numerator + denominator / 2) / denominator
    } else {
        (numerator - denominator / 2) / denominator
    };

    (i64::from(y0) + offset).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
