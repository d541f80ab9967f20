//! Framelink - USB image streaming firmware
//!
//! Main firmware binary for RP2040 display boards. A host streams
//! length-prefixed QOI frames over a USB vendor endpoint; the device
//! reassembles, decodes and presents them while forwarding touch points
//! back to the host.
//!
//! # Executors
//!
//! | Executor             | Priority | Tasks                              |
//! |----------------------|----------|------------------------------------|
//! | `SWI_IRQ_1` (core 0) | P1       | presenter                          |
//! | `SWI_IRQ_0` (core 0) | P2       | reassembler                        |
//! | thread (core 0)      | lowest   | USB device, USB pump, touch report |
//! | thread (core 1)      | -        | touch sampler                      |
//!
//! The USB device holds non-`Send` handler references, so it and its
//! endpoint tasks stay on the thread executor of the core that built it.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_futures::block_on;
use embassy_rp::bind_interrupts;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{I2C0, USB};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(pub struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
    I2C0_IRQ => embassy_rp::i2c::InterruptHandler<I2C0>;
});

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MED: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

static mut CORE1_STACK: Stack<4096> = Stack::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_MED.on_interrupt()
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Framelink firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // Bring-up runs before any executor exists; failures are fatal
    let board = match block_on(board::bring_up(p, &config)) {
        Ok(board) => board,
        Err(e) => {
            error!("Startup failed: {:?}", e);
            panic!("startup failed");
        }
    };

    // Touch sampling on core 1
    let sampler = board.sampler;
    spawn_core1(
        board.core1,
        // SAFETY: the stack is handed to core 1 exactly once
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| spawner.spawn(unwrap!(tasks::touch_task(sampler))));
        },
    );

    // Presenter preempts everything else on core 0
    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner.spawn(unwrap!(tasks::presenter_task(board.presenter)));

    interrupt::SWI_IRQ_0.set_priority(Priority::P2);
    let spawner = EXECUTOR_MED.start(interrupt::SWI_IRQ_0);
    spawner.spawn(unwrap!(tasks::reassembler_task(board.reassembler)));

    info!("Interrupt executors started");

    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        spawner.spawn(unwrap!(tasks::usb_device_task(board.usb)));
        spawner.spawn(unwrap!(tasks::usb_pump_task(board.usb_out)));
        spawner.spawn(unwrap!(tasks::touch_report_task(board.usb_in)));
    })
}
