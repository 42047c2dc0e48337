//! Chained DMA ring
//!
//! Two DMA channels replay the framebuffer into the rgb state machine's
//! TX FIFO with no CPU involvement:
//!
//! - **streamer**: framebuffer → `PIO0.TXF[2]`, one store word per
//!   transfer, read address incrementing, paced by the rgb TX DREQ.
//!   Chains to the rearmer when its transfer count runs out.
//! - **rearmer**: one 32-bit transfer from [`RESTART_ADDRESS`] into the
//!   streamer's read address register. Chains back to the streamer, whose
//!   transfer count reloads from the value last written.
//!
//! Both channels are programmed through their non-triggering control
//! aliases, so configuring never starts anything; [`DmaRing::start`]
//! triggers the streamer once and the pair keeps itself going from there.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_rp::dma::Channel;
use embassy_rp::pac;
use embassy_rp::pac::dma::vals::{DataSize, TreqSel};
use embassy_rp::Peri;

use rastrum_core::framebuffer::{PixelStore, StorageWord};
use rastrum_hal::{TransferError, TransferRing};

use crate::pio::RGB_SM;

/// Address of word 0 of the framebuffer, read by the rearmer on every pass
///
/// Must live at a fixed address for as long as the ring runs.
pub static RESTART_ADDRESS: AtomicU32 = AtomicU32::new(0);

/// DREQ number of a PIO0 state machine's TX FIFO
pub const fn pio0_tx_dreq(sm: usize) -> u8 {
    sm as u8
}

/// DMA element size for a storage word width
pub const fn data_size_bits(word_bits: u32) -> Option<u8> {
    match word_bits {
        8 => Some(0),
        16 => Some(1),
        32 => Some(2),
        _ => None,
    }
}

/// Streamer/rearmer DMA channel pair
pub struct DmaRing<'d, S: Channel, R: Channel, W: StorageWord> {
    streamer: Peri<'d, S>,
    rearmer: Peri<'d, R>,
    store: PixelStore<'static, W>,
    streamer_configured: bool,
    rearmer_configured: bool,
    started: bool,
}

impl<'d, S: Channel, R: Channel, W: StorageWord> DmaRing<'d, S, R, W> {
    /// Reserve two DMA channels for replaying `store`
    pub fn new(streamer: Peri<'d, S>, rearmer: Peri<'d, R>, store: PixelStore<'static, W>) -> Self {
        Self {
            streamer,
            rearmer,
            store,
            streamer_configured: false,
            rearmer_configured: false,
            started: false,
        }
    }

    fn streamer_regs(&self) -> pac::dma::Channel {
        pac::DMA.ch(self.streamer.number() as usize)
    }

    fn rearmer_regs(&self) -> pac::dma::Channel {
        pac::DMA.ch(self.rearmer.number() as usize)
    }

    /// Transfers remaining in the streamer's current pass
    pub fn remaining(&self) -> u32 {
        self.streamer_regs().trans_count().read()
    }

    /// Check if the streamer is mid-transfer (false while rearming)
    pub fn streamer_busy(&self) -> bool {
        self.streamer_regs().ctrl_trig().read().busy()
    }
}

impl<'d, S: Channel, R: Channel, W: StorageWord> TransferRing for DmaRing<'d, S, R, W> {
    fn words_per_pass(&self) -> usize {
        self.store.len()
    }

    fn configure_streamer(&mut self) -> Result<(), TransferError> {
        if self.started {
            return Err(TransferError::AlreadyStarted);
        }
        if self.store.is_empty() {
            return Err(TransferError::EmptySource);
        }
        let size = data_size_bits(W::BITS).ok_or(TransferError::EmptySource)?;

        let source = self.store.cells().as_ptr() as u32;
        RESTART_ADDRESS.store(source, Ordering::Relaxed);

        let target = pac::PIO0.txf(RGB_SM).as_ptr() as u32;
        let chain = self.rearmer.number();
        let regs = self.streamer_regs();

        regs.read_addr().write_value(source);
        regs.write_addr().write_value(target);
        regs.trans_count().write_value(self.store.len() as u32);
        regs.al1_ctrl().write(|w| {
            w.set_treq_sel(TreqSel::from(pio0_tx_dreq(RGB_SM)));
            w.set_data_size(DataSize::from_bits(size));
            w.set_incr_read(true);
            w.set_incr_write(false);
            w.set_chain_to(chain);
            w.set_en(true);
        });

        self.streamer_configured = true;
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "dma: streamer ch{} {} words of {} bits, chain to ch{}",
            self.streamer.number(),
            self.store.len(),
            W::BITS,
            chain
        );
        Ok(())
    }

    fn configure_rearmer(&mut self) -> Result<(), TransferError> {
        if self.started {
            return Err(TransferError::AlreadyStarted);
        }
        if !self.streamer_configured {
            return Err(TransferError::StreamerNotConfigured);
        }

        let source = RESTART_ADDRESS.as_ptr() as u32;
        let target = self.streamer_regs().read_addr().as_ptr() as u32;
        let chain = self.streamer.number();
        let regs = self.rearmer_regs();

        regs.read_addr().write_value(source);
        regs.write_addr().write_value(target);
        regs.trans_count().write_value(1);
        regs.al1_ctrl().write(|w| {
            w.set_treq_sel(TreqSel::PERMANENT);
            w.set_data_size(DataSize::SIZE_WORD);
            w.set_incr_read(false);
            w.set_incr_write(false);
            w.set_chain_to(chain);
            w.set_en(true);
        });

        self.rearmer_configured = true;
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "dma: rearmer ch{} restarts ch{}",
            self.rearmer.number(),
            chain
        );
        Ok(())
    }

    fn start(&mut self) -> Result<(), TransferError> {
        if self.started {
            return Err(TransferError::AlreadyStarted);
        }
        if !self.streamer_configured {
            return Err(TransferError::StreamerNotConfigured);
        }
        if !self.rearmer_configured {
            return Err(TransferError::RearmerNotConfigured);
        }

        let mask = 1u16 << self.streamer.number();
        pac::DMA
            .multi_chan_trigger()
            .write(|w| w.set_multi_chan_trigger(mask));

        self.started = true;
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_dreq() {
        assert_eq!(pio0_tx_dreq(RGB_SM), 2);
    }

    #[test]
    fn test_data_sizes() {
        assert_eq!(data_size_bits(8), Some(0));
        assert_eq!(data_size_bits(32), Some(2));
        assert_eq!(data_size_bits(6), None);
    }
}
