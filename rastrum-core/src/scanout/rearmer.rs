//! Rearmer: resets the streamer after each pass

/// New cursor and count written into the streamer by a rearm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reload {
    /// First word of the next pass
    pub cursor: usize,
    /// Words in the next pass
    pub count: usize,
}

/// Single-shot unit fired once per streamer exhaustion
///
/// The reload it produces is fixed at construction: every pass restarts
/// at word 0 and covers the whole store.
#[derive(Debug, Clone)]
pub struct Rearmer {
    reload: Reload,
    rearms: u32,
}

impl Rearmer {
    /// Create a rearmer for a store of `words_per_pass` words
    pub const fn new(words_per_pass: usize) -> Self {
        Self {
            reload: Reload {
                cursor: 0,
                count: words_per_pass,
            },
            rearms: 0,
        }
    }

    /// Handle one exhaustion event
    pub fn on_exhausted(&mut self) -> Reload {
        self.rearms = self.rearms.wrapping_add(1);
        self.reload
    }

    /// The fixed restart values
    pub fn reload(&self) -> Reload {
        self.reload
    }

    /// Number of rearms performed
    pub fn rearm_count(&self) -> u32 {
        self.rearms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_is_always_word_zero() {
        let mut rearmer = Rearmer::new(44_800);
        for _ in 0..3 {
            assert_eq!(
                rearmer.on_exhausted(),
                Reload {
                    cursor: 0,
                    count: 44_800
                }
            );
        }
        assert_eq!(rearmer.rearm_count(), 3);
    }
}
