//! Display timing channel abstractions
//!
//! A timing channel is a free-running counter that, once started, pulls
//! one unit of work per tick at its own fixed rate. Three of them drive a
//! VGA signal: horizontal sync, vertical sync, and the color (pixel)
//! output. Each is loaded with a single period constant before start and
//! is never reconfigured afterwards.

/// Which of the three timing channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelRole {
    /// Line timing; wraps once per scanline
    Horizontal,
    /// Frame timing; wraps once per frame
    Vertical,
    /// Pixel output; consumes streamed color data once per pixel clock
    Color,
}

impl ChannelRole {
    /// All roles, in configuration order
    pub const ALL: [ChannelRole; 3] = [
        ChannelRole::Horizontal,
        ChannelRole::Vertical,
        ChannelRole::Color,
    ];

    /// Stable index of this role (0-2)
    pub fn index(self) -> usize {
        match self {
            ChannelRole::Horizontal => 0,
            ChannelRole::Vertical => 1,
            ChannelRole::Color => 2,
        }
    }

    /// Bit for this role in a channel set mask
    pub fn mask(self) -> u8 {
        1 << self.index()
    }
}

/// Mask with every role set
pub const ALL_CHANNELS: u8 = 0b111;

/// Errors from timing channel operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// Channel was already started; period constants are load-once
    AlreadyRunning,
    /// A channel was never given its period constant
    NotConfigured(ChannelRole),
    /// The channel's counter cannot hold this period
    PeriodOutOfRange(ChannelRole),
    /// The channel's input queue did not accept the period constant
    QueueFull(ChannelRole),
}

/// A single fixed-rate timing channel
///
/// Implementations should handle loading the period constant into the
/// hardware counter. Loading happens once, before the channel runs.
pub trait TimingChannel {
    /// Which role this channel plays
    fn role(&self) -> ChannelRole;

    /// Load the period constant ("ticks until the counter wraps")
    ///
    /// Must be called before the channel is started.
    fn configure(&mut self, period: u32) -> Result<(), TimingError>;

    /// Check if a period constant has been loaded
    fn is_configured(&self) -> bool;
}

/// The set of three timing channels driving one display
///
/// The only way to start channels is [`TimingGroup::start_all`], which
/// must release all three on the same clock edge. Starting them one by
/// one lets horizontal and vertical phase drift apart.
pub trait TimingGroup {
    /// Load the period constant for one channel
    fn configure(&mut self, role: ChannelRole, period: u32) -> Result<(), TimingError>;

    /// Check if the given channel has its period constant
    fn is_configured(&self, role: ChannelRole) -> bool;

    /// Start every channel in a single atomic action
    ///
    /// Fails with [`TimingError::NotConfigured`] if any channel is missing
    /// its period, and with [`TimingError::AlreadyRunning`] on a second call.
    fn start_all(&mut self) -> Result<(), TimingError>;

    /// Check if the channels have been started
    fn is_running(&self) -> bool;

    /// Return the first role without a period constant, if any
    fn first_unconfigured(&self) -> Option<ChannelRole> {
        ChannelRole::ALL
            .into_iter()
            .find(|role| !self.is_configured(*role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Group {
        configured: u8,
        running: bool,
    }

    impl TimingGroup for Group {
        fn configure(&mut self, role: ChannelRole, _period: u32) -> Result<(), TimingError> {
            self.configured |= role.mask();
            Ok(())
        }

        fn is_configured(&self, role: ChannelRole) -> bool {
            self.configured & role.mask() != 0
        }

        fn start_all(&mut self) -> Result<(), TimingError> {
            if let Some(role) = self.first_unconfigured() {
                return Err(TimingError::NotConfigured(role));
            }
            self.running = true;
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    #[test]
    fn test_role_masks() {
        let all = ChannelRole::ALL.iter().fold(0, |acc, r| acc | r.mask());
        assert_eq!(all, ALL_CHANNELS);
        assert_eq!(ChannelRole::Color.index(), 2);
    }

    #[test]
    fn test_first_unconfigured() {
        let mut group = Group {
            configured: 0,
            running: false,
        };
        assert_eq!(group.first_unconfigured(), Some(ChannelRole::Horizontal));

        group.configure(ChannelRole::Horizontal, 655).unwrap();
        group.configure(ChannelRole::Color, 639).unwrap();
        assert_eq!(group.first_unconfigured(), Some(ChannelRole::Vertical));
        assert_eq!(
            group.start_all(),
            Err(TimingError::NotConfigured(ChannelRole::Vertical))
        );

        group.configure(ChannelRole::Vertical, 479).unwrap();
        assert_eq!(group.first_unconfigured(), None);
        assert!(group.start_all().is_ok());
        assert!(group.is_running());
    }
}
