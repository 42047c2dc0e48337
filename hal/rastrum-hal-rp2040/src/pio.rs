//! PIO programs for the three VGA timing channels
//!
//! All three run in PIO0 so they can signal each other through the PIO
//! IRQ flags, and together they must fit the 32-word instruction memory.
//!
//! - **hsync** (SM0): counts out the visible part of a line plus front
//!   porch, drives the sync pulse and back porch, then raises IRQ 0.
//! - **vsync** (SM1): counts lines on IRQ 0. For each visible line it
//!   raises IRQ 1; then it runs the vertical blanking interval.
//! - **rgb** (SM2): waits on IRQ 1, then shifts out one line of pixels
//!   from the TX FIFO, fed by the streamer DMA channel.
//!
//! Each program begins with a blocking `pull` that picks up its period
//! constant before the wrap target, so the constants are pushed once
//! before the state machines are started and never again.
//!
//! Both sync programs produce active-low pulses; positive polarity is
//! obtained by inverting the pin output.

use fixed::types::U24F8;
use pio::Program;

use rastrum_core::config::{PackingPolicy, Resolution};

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// rgb state machine cycles per pixel (`out [3]` + `jmp`)
pub const CYCLES_PER_PIXEL: u32 = 5;

/// PIO instruction memory size
pub const INSTRUCTION_MEMORY: usize = 32;

/// State machine index of each timing channel
pub const HSYNC_SM: usize = 0;
pub const VSYNC_SM: usize = 1;
pub const RGB_SM: usize = 2;

/// Horizontal sync program
pub fn hsync_program() -> Program<32> {
    pio::pio_asm!(
        "pull block",
        ".wrap_target",
        "mov x, osr",
        "active:",
        "    jmp x-- active",       // visible line + front porch
        "    set pins, 0 [31]",     // sync pulse, 96 clocks
        "    set pins, 0 [31]",
        "    set pins, 0 [31]",
        "    set pins, 1 [31]",     // back porch
        "    irq 0 [14]",
        ".wrap",
    )
    .program
}

/// Vertical sync program for one resolution preset
///
/// The blanking line counts are baked into the program; only the active
/// line count comes from the period constant.
pub fn vsync_program(resolution: Resolution) -> Program<32> {
    match resolution {
        // front porch 37, sync 2, back porch 60
        Resolution::Vga640x350 => {
            pio::pio_asm!(
                ".side_set 1 opt",
                "pull block",
                ".wrap_target",
                "mov x, osr",
                "active:",
                "    wait 1 irq 0",
                "    irq 1",
                "    jmp x-- active",
                "    set y, 17",
                "front_porch:",
                "    wait 1 irq 0",
                "    wait 1 irq 0",
                "    jmp y-- front_porch",
                "    wait 1 irq 0",
                "    wait 1 irq 0 side 0",
                "    wait 1 irq 0",
                "    set y, 29 side 1",
                "back_porch:",
                "    wait 1 irq 0",
                "    wait 1 irq 0",
                "    jmp y-- back_porch",
                ".wrap",
            )
            .program
        }
        // front porch 10, sync 2, back porch 33
        Resolution::Vga640x480 => {
            pio::pio_asm!(
                ".side_set 1 opt",
                "pull block",
                ".wrap_target",
                "mov x, osr",
                "active:",
                "    wait 1 irq 0",
                "    irq 1",
                "    jmp x-- active",
                "    set y, 9",
                "front_porch:",
                "    wait 1 irq 0",
                "    jmp y-- front_porch",
                "    wait 1 irq 0 side 0",
                "    wait 1 irq 0",
                "    set y, 31 side 1",
                "back_porch:",
                "    wait 1 irq 0",
                "    jmp y-- back_porch",
                "    wait 1 irq 0",
                ".wrap",
            )
            .program
        }
    }
}

/// Color output program for one packing policy
///
/// Pixel data arrives through autopull: one byte per FIFO entry for wide
/// packing (narrow DMA writes are replicated across the word), five
/// pixels MSB-first per entry for dense packing.
pub fn rgb_program(packing: PackingPolicy) -> Program<32> {
    match packing {
        PackingPolicy::Wide => {
            pio::pio_asm!(
                "pull block",
                "out y, 32",
                ".wrap_target",
                "wait 1 irq 1 [31]",
                "mov x, y [31]",
                "color_out:",
                "    out pins, 8 [3]",
                "    jmp x-- color_out",
                "mov pins, null",
                ".wrap",
            )
            .program
        }
        PackingPolicy::Dense => {
            pio::pio_asm!(
                "pull block",
                "out y, 32",
                ".wrap_target",
                "wait 1 irq 1 [31]",
                "mov x, y [31]",
                "color_out:",
                "    out pins, 6 [3]",
                "    jmp x-- color_out",
                "mov pins, null",
                ".wrap",
            )
            .program
        }
    }
}

/// Autopull threshold of the rgb program's output shift register
pub const fn rgb_pull_threshold(packing: PackingPolicy) -> u8 {
    match packing {
        PackingPolicy::Wide => 8,
        PackingPolicy::Dense => 30,
    }
}

/// Clock divider that runs a state machine at the pixel clock
///
/// Used for hsync and vsync: one PIO cycle per pixel.
pub fn sync_clock_divider(sys_clk_hz: u32, pixel_clock_hz: u32) -> U24F8 {
    divider(sys_clk_hz, pixel_clock_hz)
}

/// Clock divider for the rgb program ([`CYCLES_PER_PIXEL`] cycles per pixel)
pub fn color_clock_divider(sys_clk_hz: u32, pixel_clock_hz: u32) -> U24F8 {
    divider(sys_clk_hz, pixel_clock_hz.saturating_mul(CYCLES_PER_PIXEL))
}

/// 16.8 fixed-point `sys / target`, clamped to the valid divider range
fn divider(sys_clk_hz: u32, target_hz: u32) -> U24F8 {
    if target_hz == 0 {
        return U24F8::from_bits(0xFFFF_FF00);
    }
    let divider_x256 = (sys_clk_hz as u64 * 256) / target_hz as u64;
    let divider_x256 = divider_x256.clamp(256, 0xFFFF_FF00);
    U24F8::from_bits(divider_x256 as u32)
}
