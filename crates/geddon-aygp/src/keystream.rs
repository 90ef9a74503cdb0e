//! AYGP payload keystream.
//!
//! Payloads are XORed with the bytes of a 32-bit counter, least significant
//! byte first. After the most significant byte is emitted the counter is
//! incremented, so the stream for seed `s` is `le(s), le(s + 1), ...`.

/// Base value every entry key is derived from.
pub const KEY_BASE: u32 = 0x0102_0304;

/// Emit one keystream byte.
///
/// Returns the byte together with the next `(state, phase)`. Only the low two
/// bits of `phase` are significant.
#[inline]
pub const fn next(state: u32, phase: u8) -> (u8, u32, u8) {
    let phase = phase & 3;
    let byte = (state >> (phase * 8)) as u8;
    if phase == 3 {
        (byte, state.wrapping_add(1), 0)
    } else {
        (byte, state, phase + 1)
    }
}

/// Rolling counter keystream, seeded per archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keystream {
    state: u32,
    phase: u8,
}

impl Keystream {
    /// Start a keystream at `state`, phase 0.
    pub const fn new(state: u32) -> Self {
        Self { state, phase: 0 }
    }

    /// Keystream for an entry holding `size` plaintext bytes.
    pub const fn for_entry(size: u32) -> Self {
        Self::new(KEY_BASE.wrapping_add(size))
    }

    /// Current counter value.
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Index of the byte of `state` emitted next.
    pub const fn phase(&self) -> u8 {
        self.phase
    }

    /// Emit the next keystream byte.
    #[inline]
    pub fn next_byte(&mut self) -> u8 {
        let (byte, state, phase) = next(self.state, self.phase);
        self.state = state;
        self.phase = phase;
        byte
    }

    /// XOR `data` in place with the keystream. Applying it twice with the
    /// same seed restores the input.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data {
            *byte ^= self.next_byte();
        }
    }
}

impl Iterator for Keystream {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<u8> {
        Some(self.next_byte())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_bytes() {
        let bytes: Vec<u8> = Keystream::new(0x0102_0304).take(8).collect();
        assert_eq!(bytes, [0x04, 0x03, 0x02, 0x01, 0x05, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_entry_seed() {
        assert_eq!(Keystream::for_entry(2).state(), 0x0102_0306);
        assert_eq!(Keystream::for_entry(u32::MAX).state(), 0x0102_0303);
    }

    #[test]
    fn test_state_wraps() {
        let mut stream = Keystream::new(u32::MAX);
        for _ in 0..4 {
            stream.next_byte();
        }
        assert_eq!(stream.state(), 0);
        assert_eq!(stream.phase(), 0);
    }

    #[test]
    fn test_phase_is_masked() {
        assert_eq!(next(0xAABBCCDD, 7), (0xAA, 0xAABBCCDE, 0));
    }

    proptest! {
        #[test]
        fn prop_cycle_emits_le_bytes(state0 in any::<u32>()) {
            let mut state = state0;
            let mut phase = 0;
            let mut emitted = [0u8; 4];
            for slot in &mut emitted {
                let (byte, s, p) = next(state, phase);
                *slot = byte;
                state = s;
                phase = p;
            }
            prop_assert_eq!(emitted, state0.to_le_bytes());
            prop_assert_eq!(state, state0.wrapping_add(1));
            prop_assert_eq!(phase, 0);
        }

        #[test]
        fn prop_apply_is_self_inverse(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            size in any::<u32>(),
        ) {
            let mut buffer = data.clone();
            Keystream::for_entry(size).apply(&mut buffer);
            Keystream::for_entry(size).apply(&mut buffer);
            prop_assert_eq!(buffer, data);
        }
    }
}
