//! Clock sequence initialization and advance (RFC4122 Section 4.1.5).

use crate::{random, store::PersistedState, Error, Node, RandomSource, Timestamp};

/// Mask of the 14 clock sequence bits encoded into a UUID.
pub const SEQUENCE_MASK: u16 = 0x3fff;

/// Timestamp, clock sequence and node of the last generated UUID.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct State {
    /// Timestamp of the last UUID.
    pub timestamp: Timestamp,

    /// Clock sequence, kept within 14 bits.
    pub sequence: u16,

    /// Node used for the lifetime of the generator.
    pub node: Node,
}

impl State {
    /// Moves the state to `now`, incrementing the clock sequence if `now` does not exceed the
    /// previous timestamp.
    pub fn advance(&mut self, now: Timestamp) {
        if now <= self.timestamp {
            self.sequence = self.sequence.wrapping_add(1) & SEQUENCE_MASK;
        }
        self.timestamp = now;
    }
}

impl From<State> for PersistedState {
    fn from(src: State) -> Self {
        Self {
            timestamp: src.timestamp.ticks(),
            sequence: src.sequence,
            node: *src.node.as_bytes(),
        }
    }
}

/// Computes the initial state from the previously saved state, the current timestamp and the node
/// found on the host.
///
/// A missing node is replaced by a random one. The clock sequence is randomized when no state was
/// saved or the node changed, incremented when the clock went backward since the save, and kept
/// otherwise.
pub(crate) fn initialize(
    persisted: Option<&PersistedState>,
    now: Timestamp,
    resolved: Option<Node>,
    source: &mut dyn RandomSource,
    policy: &mut dyn FnMut(&rand::Error) -> bool,
) -> Result<State, Error> {
    let node = match resolved {
        Some(node) => node,
        None => {
            log::info!("rfc4122: no hardware address found; generating random node");
            let mut bytes = [0u8; 6];
            random::fill_with_policy(source, policy, &mut bytes)?;
            Node::random_from(bytes)
        }
    };

    let sequence = match persisted {
        Some(saved) if saved.node() == node => {
            if now < saved.timestamp() {
                log::debug!(
                    "rfc4122: clock is behind saved timestamp {}; incrementing sequence",
                    saved.timestamp
                );
                saved.sequence.wrapping_add(1)
            } else {
                saved.sequence
            }
        }
        _ => {
            let mut bytes = [0u8; 2];
            random::fill_with_policy(source, policy, &mut bytes)?;
            let sequence = u16::from_be_bytes(bytes);
            log::info!("rfc4122: initialised random sequence [{}]", sequence);
            sequence
        }
    };

    Ok(State {
        timestamp: now,
        sequence: sequence & SEQUENCE_MASK,
        node,
    })
}

#[cfg(test)]
mod tests {
    use super::{initialize, State, SEQUENCE_MASK};
    use crate::{
        random::{tests::FlakySource, Adapter},
        store::PersistedState,
        Error, Node, RandomSource, Timestamp,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const NODE: Node = Node::from_bytes([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]);
    const SAVED: PersistedState = PersistedState {
        timestamp: 0x01ec_8c2f_4a3b_1c00,
        sequence: 0x0123,
        node: [0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6],
    };

    fn seeded(seed: u64) -> Adapter<ChaCha20Rng> {
        Adapter(ChaCha20Rng::seed_from_u64(seed))
    }

    fn refuse(_: &rand::Error) -> bool {
        false
    }

    /// Keeps saved sequence when clock moved forward
    #[test]
    fn keeps_saved_sequence_when_clock_moved_forward() {
        let now = Timestamp::from_ticks(SAVED.timestamp + 1);
        let s = initialize(Some(&SAVED), now, Some(NODE), &mut seeded(0), &mut refuse).unwrap();
        assert_eq!(
            s,
            State {
                timestamp: now,
                sequence: 0x0123,
                node: NODE
            }
        );

        // an unchanged clock is not a regression either
        let now = SAVED.timestamp();
        let s = initialize(Some(&SAVED), now, Some(NODE), &mut seeded(0), &mut refuse).unwrap();
        assert_eq!(s.sequence, 0x0123);
    }

    /// Increments saved sequence when clock moved backward
    #[test]
    fn increments_saved_sequence_when_clock_moved_backward() {
        let now = Timestamp::from_ticks(SAVED.timestamp - 1);
        let s = initialize(Some(&SAVED), now, Some(NODE), &mut seeded(0), &mut refuse).unwrap();
        assert_eq!(s.sequence, 0x0124);
        assert_eq!(s.timestamp, now);

        let wrapping = PersistedState {
            sequence: SEQUENCE_MASK,
            ..SAVED
        };
        let s = initialize(Some(&wrapping), now, Some(NODE), &mut seeded(0), &mut refuse).unwrap();
        assert_eq!(s.sequence, 0);
    }

    /// Randomizes sequence when node changed
    #[test]
    fn randomizes_sequence_when_node_changed() {
        let other = Node::from_bytes([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe7]);
        let now = SAVED.timestamp();
        let mut seen = std::collections::HashSet::new();
        for seed in 0..16 {
            let s = initialize(Some(&SAVED), now, Some(other), &mut seeded(seed), &mut refuse)
                .unwrap();
            let mut expected = [0u8; 2];
            seeded(seed).fill(&mut expected).unwrap();
            assert_eq!(s.sequence, u16::from_be_bytes(expected) & SEQUENCE_MASK);
            assert_eq!(s.node, other);
            seen.insert(s.sequence);
        }
        assert!(seen.len() > 1);
    }

    /// Randomizes sequence without saved state
    #[test]
    fn randomizes_sequence_without_saved_state() {
        let now = Timestamp::from_ticks(42);
        let s = initialize(None, now, Some(NODE), &mut FlakySource::new(0), &mut refuse).unwrap();
        assert_eq!(s.sequence, 0xabab & SEQUENCE_MASK);
        assert_eq!(s.node, NODE);
    }

    /// Is deterministic given identical inputs
    #[test]
    fn is_deterministic_given_identical_inputs() {
        let now = Timestamp::from_ticks(SAVED.timestamp + 100);
        let a = initialize(Some(&SAVED), now, Some(NODE), &mut seeded(1), &mut refuse).unwrap();
        let b = initialize(Some(&SAVED), now, Some(NODE), &mut seeded(2), &mut refuse).unwrap();
        assert_eq!(a, b);
    }

    /// Falls back to marked random node
    #[test]
    fn falls_back_to_marked_random_node() {
        let now = Timestamp::from_ticks(42);
        let s = initialize(None, now, None, &mut FlakySource::new(0), &mut refuse).unwrap();
        assert_eq!(s.node.as_bytes(), &[0xab, 0xab, 0xab, 0xab, 0xab, 0xab]);
        assert!(s.node.is_random());

        let s = initialize(None, now, None, &mut seeded(7), &mut refuse).unwrap();
        assert!(s.node.is_random());
    }

    /// Fails when random source is exhausted
    #[test]
    fn fails_when_random_source_is_exhausted() {
        let now = Timestamp::from_ticks(42);
        let result = initialize(None, now, None, &mut FlakySource::new(1), &mut refuse);
        assert!(matches!(result, Err(Error::RandomSource(_))));

        // the node is found, but the sequence needs randomness
        let result = initialize(None, now, Some(NODE), &mut FlakySource::new(1), &mut refuse);
        assert!(matches!(result, Err(Error::RandomSource(_))));

        // one retry recovers
        let result = initialize(None, now, Some(NODE), &mut FlakySource::new(1), &mut |_| true);
        assert!(result.is_ok());
    }

    /// Advances sequence on equal or regressed timestamp
    #[test]
    fn advances_sequence_on_equal_or_regressed_timestamp() {
        let mut s = State {
            timestamp: Timestamp::from_ticks(1_000),
            sequence: SEQUENCE_MASK - 1,
            node: NODE,
        };
        s.advance(Timestamp::from_ticks(1_001));
        assert_eq!(s.sequence, SEQUENCE_MASK - 1);
        s.advance(Timestamp::from_ticks(1_001));
        assert_eq!(s.sequence, SEQUENCE_MASK);
        s.advance(Timestamp::from_ticks(900));
        assert_eq!(s.sequence, 0);
        assert_eq!(s.timestamp, Timestamp::from_ticks(900));
    }
}
