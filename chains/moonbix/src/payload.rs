use crate::trace::Trace;
use core_logic::{EncodingError, EncryptedPayload, SecurityUtils};
use rand::{CryptoRng, RngCore};

/// Serializes a trace and encrypts it under the session's game tag.
///
/// Every call draws a fresh IV, so two encodings of the same trace differ.
pub fn encode<R: RngCore + CryptoRng>(
    trace: &Trace,
    game_tag: &str,
    rng: &mut R,
) -> Result<EncryptedPayload, EncodingError> {
    SecurityUtils::encrypt_payload(&trace.serialize(), game_tag.as_bytes(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::ActivityEvent;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TAG: &str = "a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6";

    fn sample_trace() -> Trace {
        Trace {
            started_at_ms: 1_000,
            events: vec![
                ActivityEvent {
                    time_ms: 3_000,
                    pos_x: 100.0,
                    pos_y: 220.5,
                    angle: 0.125,
                },
                ActivityEvent {
                    time_ms: 5_400,
                    pos_x: 75.25,
                    pos_y: 201.0,
                    angle: -0.5,
                },
            ],
        }
    }

    #[test]
    fn test_encode_round_trips() {
        let mut rng = StdRng::seed_from_u64(5);
        let trace = sample_trace();
        let wire = encode(&trace, TAG, &mut rng).unwrap().into_wire();

        let plain = SecurityUtils::decrypt_payload(&wire, TAG.as_bytes()).unwrap();
        assert_eq!(plain, trace.serialize());
    }

    #[test]
    fn test_encode_is_not_memoized() {
        let mut rng = StdRng::seed_from_u64(5);
        let trace = sample_trace();
        let a = encode(&trace, TAG, &mut rng).unwrap();
        let b = encode(&trace, TAG, &mut rng).unwrap();
        assert_ne!(a.into_wire(), b.into_wire());
    }

    #[test]
    fn test_short_game_tag_fails_loudly() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = encode(&sample_trace(), "G1", &mut rng).unwrap_err();
        assert_eq!(
            err,
            EncodingError::InvalidKeyLength {
                expected: 32,
                actual: 2
            }
        );
    }
}
