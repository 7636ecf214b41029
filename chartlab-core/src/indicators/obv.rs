//! On-Balance Volume (OBV).
//!
//! OBV[0] = 0; OBV[t] = OBV[t-1] + volume[t] if close rose, - volume[t] if it
//! fell, unchanged on a tie. A void close or volume leaves the total unchanged.

use super::ComputeStatus;
use crate::domain::SourceSeries;

pub const MIN_POINTS: usize = 2;

pub fn compute<S: SourceSeries + ?Sized>(src: &S, obv: &mut [f64]) -> ComputeStatus {
    let n = src.len();
    if let Some(status) = ComputeStatus::check_len(MIN_POINTS, n) {
        return status;
    }
    let obv = &mut obv[..n];

    let mut total = 0.0;
    obv[0] = total;
    for i in 1..n {
        let prev = src.close(i - 1);
        let close = src.close(i);
        let volume = src.volume(i);
        if volume.is_finite() {
            if close > prev {
                total += volume;
            } else if close < prev {
                total -= volume;
            }
        }
        obv[i] = total;
    }
    ComputeStatus::Ready
}
