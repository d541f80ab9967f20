//! Reference board bring-up
//!
//! RP2040 with a 1.14" 240x135 ST7789 panel and an FT6x06 touch
//! controller:
//!
//! | GPIO | Function            |
//! |------|---------------------|
//! | 4    | I2C0 SDA (touch)    |
//! | 5    | I2C0 SCL (touch)    |
//! | 6    | Touch INT           |
//! | 8    | Panel D/C           |
//! | 9    | Panel CS            |
//! | 10   | SPI1 SCK            |
//! | 11   | SPI1 MOSI           |
//! | 12   | Panel RESET         |
//! | 13   | Panel backlight     |

use defmt::*;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{CORE1, I2C0, SPI1};
use embassy_rp::spi::{self, Spi};
use embassy_rp::usb::Driver;
use embassy_rp::{Peri, Peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Delay, Timer};
use embassy_usb::{Builder, UsbDevice};
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::{ConstStaticCell, StaticCell};

use framelink_core::buffer::DoubleBuffer;
use framelink_core::config::PipelineConfig;
use framelink_core::pipeline::{FramePresenter, FrameReassembler};
use framelink_core::touch::TouchSampler;
use framelink_core::traits::{DisplayError, FrameDisplay, Rgb565, TouchError};
use framelink_drivers::decoder::QoiDecoder;
use framelink_drivers::display::{St7789, St7789Config};
use framelink_drivers::touch::{Ft6x06, Ft6x06Config};
use framelink_hal_rp2040::usb::{device_config, vendor_interface, RpUsbDriver};
use framelink_hal_rp2040::{EmbassyTimer, MountHandler, PipeChannel};

use crate::channels::{
    FRAME_QUEUE, RECEIVE_CAPACITY, RECEIVE_POOL, USB_MOUNT, USB_PIPE_SIZE, USB_RX_PIPE,
};
use crate::Irqs;

/// Panel width in pixels
pub const PANEL_WIDTH: u16 = 240;
/// Panel height in pixels
pub const PANEL_HEIGHT: u16 = 135;
/// One RGB565 framebuffer
pub const FRAMEBUFFER_LEN: usize = PANEL_WIDTH as usize * PANEL_HEIGHT as usize * 2;

/// SPI clock for the panel
const PANEL_SPI_HZ: u32 = 62_500_000;
/// I2C clock for the touch controller
const TOUCH_I2C_HZ: u32 = 400_000;

pub type PanelSpi = ExclusiveDevice<Spi<'static, SPI1, spi::Async>, Output<'static>, Delay>;
pub type Panel = St7789<PanelSpi, Output<'static>, Delay>;
pub type Touch = Ft6x06<I2c<'static, I2C0, i2c::Async>, Input<'static>>;
pub type UsbChannel = PipeChannel<'static, CriticalSectionRawMutex, USB_PIPE_SIZE>;
pub type UsbOut = <RpUsbDriver as embassy_usb::driver::Driver<'static>>::EndpointOut;
pub type UsbIn = <RpUsbDriver as embassy_usb::driver::Driver<'static>>::EndpointIn;

pub type Presenter = FramePresenter<
    'static,
    CriticalSectionRawMutex,
    QoiDecoder,
    Panel,
    EmbassyTimer,
    RECEIVE_CAPACITY,
>;
pub type Reassembler =
    FrameReassembler<'static, CriticalSectionRawMutex, UsbChannel, Delay, RECEIVE_CAPACITY>;
pub type Sampler = TouchSampler<Touch, Delay>;

static FRAMEBUFFERS: ConstStaticCell<[[u8; FRAMEBUFFER_LEN]; 2]> =
    ConstStaticCell::new([[0; FRAMEBUFFER_LEN]; 2]);
static BACKLIGHT: StaticCell<Output<'static>> = StaticCell::new();
static PANEL_RESET: StaticCell<Output<'static>> = StaticCell::new();

// USB descriptor and control buffers (must live forever)
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static MOUNT_HANDLER: StaticCell<MountHandler> = StaticCell::new();

/// Fatal bring-up failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum StartupError {
    /// Panel did not accept its init sequence or the startup clear
    Panel(DisplayError),
    /// Touch controller missing or not responding
    Touch(TouchError),
    /// Framebuffers do not match the panel
    Framebuffer(DisplayError),
}

/// Everything the tasks need, built once at startup
pub struct Board {
    pub presenter: Presenter,
    pub reassembler: Reassembler,
    pub sampler: Sampler,
    pub usb: UsbDevice<'static, RpUsbDriver>,
    pub usb_out: UsbOut,
    pub usb_in: UsbIn,
    pub core1: Peri<'static, CORE1>,
}

/// Bring up the panel, touch controller and USB device
///
/// The panel is cleared to red before anything else is started, so a
/// board that never receives a frame is still visibly alive.
pub async fn bring_up(p: Peripherals, config: &PipelineConfig) -> Result<Board, StartupError> {
    // Panel
    let mut spi_config = spi::Config::default();
    spi_config.frequency = PANEL_SPI_HZ;
    let spi_bus = Spi::new_txonly(p.SPI1, p.PIN_10, p.PIN_11, p.DMA_CH0, spi_config);
    let cs = Output::new(p.PIN_9, Level::High);
    let spi = match ExclusiveDevice::new(spi_bus, cs, Delay) {
        Ok(spi) => spi,
        Err(never) => match never {},
    };
    let dc = Output::new(p.PIN_8, Level::Low);

    let mut reset = Output::new(p.PIN_12, Level::High);
    reset.set_low();
    Timer::after_millis(10).await;
    reset.set_high();
    Timer::after_millis(120).await;
    PANEL_RESET.init(reset);

    let panel_config = St7789Config {
        width: PANEL_WIDTH,
        height: PANEL_HEIGHT,
        ..St7789Config::default()
    };
    let mut panel = St7789::new(spi, dc, Delay, panel_config);
    panel.init().await.map_err(StartupError::Panel)?;
    panel.clear(Rgb565::RED).await.map_err(StartupError::Panel)?;
    BACKLIGHT.init(Output::new(p.PIN_13, Level::High));
    info!("Panel initialized ({}x{})", PANEL_WIDTH, PANEL_HEIGHT);

    let [first, second] = FRAMEBUFFERS.take();
    let presenter = FramePresenter::new(
        &RECEIVE_POOL,
        &FRAME_QUEUE,
        QoiDecoder::new(PANEL_WIDTH, PANEL_HEIGHT),
        panel,
        EmbassyTimer,
        DoubleBuffer::new(first, second),
        config.presenter,
    )
    .map_err(StartupError::Framebuffer)?;

    // Touch
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = TOUCH_I2C_HZ;
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);
    let int = Input::new(p.PIN_6, Pull::Up);
    let mut touch = Ft6x06::new(i2c, int, Ft6x06Config::default());
    touch.init().await.map_err(StartupError::Touch)?;
    let sampler = TouchSampler::new(touch, Delay, config.touch);
    info!("Touch controller initialized");

    // USB
    let driver = Driver::new(p.USB, Irqs);
    let mut builder = Builder::new(
        driver,
        device_config(),
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [],
        CONTROL_BUF.init([0; 64]),
    );
    builder.handler(MOUNT_HANDLER.init(MountHandler::new(&USB_MOUNT)));
    let (usb_out, usb_in) = vendor_interface(&mut builder);
    let usb = builder.build();
    info!("USB vendor interface ready");

    let reassembler = FrameReassembler::new(
        PipeChannel::new(&USB_RX_PIPE, &USB_MOUNT),
        Delay,
        &RECEIVE_POOL,
        &FRAME_QUEUE,
        config.reassembler,
    );

    Ok(Board {
        presenter,
        reassembler,
        sampler,
        usb,
        usb_out,
        usb_in,
        core1: p.CORE1,
    })
}
