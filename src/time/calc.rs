use crate::error::{InvalidInputError, EXCHANGE_LEN};

/// One round-trip timestamp exchange.
///
/// Layout is `[marker, t1, t2, t3, t4]`: t1 requester send, t2 responder
/// receive, t3 responder send, t4 requester receive. The marker is carried
/// through untouched. Offsets come out as responder clock minus requester
/// clock, in whatever unit the timestamps use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampExchange([f64; EXCHANGE_LEN]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetEstimate {
    pub rtt: f64,
    pub offset: f64,
}

impl TimestampExchange {
    pub fn marker(&self) -> f64 {
        self.0[0]
    }

    pub fn t1(&self) -> f64 {
        self.0[1]
    }

    pub fn t2(&self) -> f64 {
        self.0[2]
    }

    pub fn t3(&self) -> f64 {
        self.0[3]
    }

    pub fn t4(&self) -> f64 {
        self.0[4]
    }

    /// Round trip with the responder's hold time removed.
    pub fn round_trip(&self) -> f64 {
        (self.t4() - self.t1()) - (self.t3() - self.t2())
    }

    pub fn offset(&self) -> f64 {
        (self.t2() - self.t1()) - self.round_trip() / 2.0
    }

    pub fn estimate(&self) -> OffsetEstimate {
        OffsetEstimate {
            rtt: self.round_trip(),
            offset: self.offset(),
        }
    }
}

impl TryFrom<&[f64]> for TimestampExchange {
    type Error = InvalidInputError;

    fn try_from(timestamps: &[f64]) -> Result<Self, Self::Error> {
        <[f64; EXCHANGE_LEN]>::try_from(timestamps)
            .map(TimestampExchange)
            .map_err(|_| InvalidInputError {
                len: timestamps.len(),
            })
    }
}

impl TryFrom<Vec<f64>> for TimestampExchange {
    type Error = InvalidInputError;

    fn try_from(timestamps: Vec<f64>) -> Result<Self, Self::Error> {
        TimestampExchange::try_from(timestamps.as_slice())
    }
}

impl From<[f64; EXCHANGE_LEN]> for TimestampExchange {
    fn from(timestamps: [f64; EXCHANGE_LEN]) -> Self {
        TimestampExchange(timestamps)
    }
}

/// Clock offset for a five-timestamp exchange.
pub fn compute_offset(timestamps: &[f64]) -> Result<f64, InvalidInputError> {
    TimestampExchange::try_from(timestamps).map(|ex| ex.offset())
}

pub fn estimate(timestamps: &[f64]) -> Result<OffsetEstimate, InvalidInputError> {
    TimestampExchange::try_from(timestamps).map(|ex| ex.estimate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_for_small_exchange() {
        let est = estimate(&[0.0, 10.0, 12.0, 14.0, 20.0]).unwrap();
        assert_eq!(est.rtt, 8.0);
        assert_eq!(est.offset, -2.0);
        assert_eq!(compute_offset(&[0.0, 10.0, 12.0, 14.0, 20.0]), Ok(-2.0));
    }

    #[test]
    fn offset_keeps_fractional_half_rtt() {
        let est = estimate(&[0.0, 100.0, 105.0, 110.0, 200.0]).unwrap();
        assert_eq!(est.rtt, 95.0);
        assert_eq!(est.offset, -42.5);
    }

    #[test]
    fn short_exchange_is_rejected() {
        assert_eq!(
            compute_offset(&[0.0, 10.0, 12.0, 14.0]),
            Err(InvalidInputError { len: 4 })
        );
    }

    #[test]
    fn long_exchange_is_rejected() {
        let err = compute_offset(&[0.0, 10.0, 12.0, 14.0, 20.0, 30.0]).unwrap_err();
        assert_eq!(err.len, 6);
        assert_eq!(
            err.to_string(),
            "invalid timestamp exchange: expected 5 timestamps, got 6"
        );
        assert!(compute_offset(&[]).is_err());
    }

    #[test]
    fn zero_asymmetry_reduces_to_forward_leg() {
        // t4 - t1 == t3 - t2, so the corrected round trip is zero
        let ts = [7.0, 1_000.0, 1_250.0, 1_300.0, 1_050.0];
        assert_eq!(compute_offset(&ts).unwrap(), ts[2] - ts[1]);
    }

    #[test]
    fn marker_does_not_affect_result() {
        let a = compute_offset(&[0.0, 3.0, 9.0, 11.0, 21.0]).unwrap();
        let b = compute_offset(&[42.0, 3.0, 9.0, 11.0, 21.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn matches_closed_form_across_inputs() {
        let cases: [[f64; 5]; 4] = [
            [1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 5_000.0, 4_000.0, 4_010.0, 5_030.0],
            [0.0, -20.0, 40.0, 41.0, -2.0],
            [9.0, 1.5, 2.25, 3.0, 6.75],
        ];
        for t in cases {
            let expected = (t[2] - t[1]) - ((t[4] - t[1]) - (t[3] - t[2])) / 2.0;
            assert_eq!(compute_offset(&t).unwrap(), expected);
        }
    }

    #[test]
    fn vec_conversion_checks_length() {
        let ex = TimestampExchange::try_from(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(ex.marker(), 0.0);
        assert_eq!(ex.t4(), 4.0);
        assert!(TimestampExchange::try_from(vec![1.0; 3]).is_err());
    }
}
