//! ST7789 TFT panel driver (4-wire SPI)
//!
//! Drives ST7789 panels in 16-bit RGB565 mode. The controller has its own
//! frame memory (GRAM): `flush` streams the whole framebuffer into it, so
//! once the call returns the source buffer may be reused.
//!
//! # Bus Protocol
//!
//! - D/C low: command byte
//! - D/C high: parameter or pixel data
//! - Pixel data is big-endian RGB565

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;
use framelink_core::traits::{DisplayError, FrameDisplay, Rgb565};

/// ST7789 command set (subset used here)
pub mod cmd {
    /// Software reset
    pub const SWRESET: u8 = 0x01;
    /// Sleep out
    pub const SLPOUT: u8 = 0x11;
    /// Normal display mode on
    pub const NORON: u8 = 0x13;
    /// Display inversion on
    pub const INVON: u8 = 0x21;
    /// Display on
    pub const DISPON: u8 = 0x29;
    /// Column address set
    pub const CASET: u8 = 0x2A;
    /// Row address set
    pub const RASET: u8 = 0x2B;
    /// Memory write
    pub const RAMWR: u8 = 0x2C;
    /// Memory data access control
    pub const MADCTL: u8 = 0x36;
    /// Interface pixel format
    pub const COLMOD: u8 = 0x3A;
}

/// COLMOD value for 16 bits per pixel
const COLMOD_RGB565: u8 = 0x55;

/// Widest panel supported by [`St7789::clear`]
const MAX_WIDTH: usize = 320;

/// Panel geometry and orientation
#[derive(Debug, Clone)]
pub struct St7789Config {
    /// Visible width in pixels
    pub width: u16,
    /// Visible height in pixels
    pub height: u16,
    /// Column offset of the visible area in GRAM
    pub x_offset: u16,
    /// Row offset of the visible area in GRAM
    pub y_offset: u16,
    /// MADCTL value (rotation and color order)
    pub madctl: u8,
    /// Most IPS panels need inversion on for correct colors
    pub invert: bool,
}

impl Default for St7789Config {
    /// 1.14" 240x135 IPS module in landscape
    fn default() -> Self {
        Self {
            width: 240,
            height: 135,
            x_offset: 40,
            y_offset: 53,
            madctl: 0x70,
            invert: true,
        }
    }
}

/// ST7789 driver
pub struct St7789<SPI, DC, D> {
    spi: SPI,
    dc: DC,
    delay: D,
    config: St7789Config,
}

impl<SPI, DC, D> St7789<SPI, DC, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, delay: D, config: St7789Config) -> Self {
        Self {
            spi,
            dc,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &St7789Config {
        &self.config
    }

    /// Reset and configure the controller, then turn the panel on
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::SWRESET, &[]).await?;
        self.delay.delay_ms(150).await;
        self.command(cmd::SLPOUT, &[]).await?;
        self.delay.delay_ms(120).await;
        self.command(cmd::COLMOD, &[COLMOD_RGB565]).await?;
        self.command(cmd::MADCTL, &[self.config.madctl]).await?;
        if self.config.invert {
            self.command(cmd::INVON, &[]).await?;
        }
        self.command(cmd::NORON, &[]).await?;
        self.command(cmd::DISPON, &[]).await?;
        self.delay.delay_ms(10).await;
        Ok(())
    }

    async fn command(&mut self, command: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Pin)?;
        self.spi
            .write(&[command])
            .await
            .map_err(|_| DisplayError::Bus)?;
        if !params.is_empty() {
            self.data(params).await?;
        }
        Ok(())
    }

    async fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::Pin)?;
        self.spi.write(bytes).await.map_err(|_| DisplayError::Bus)
    }

    /// Select the full visible area and start a memory write
    async fn begin_frame(&mut self) -> Result<(), DisplayError> {
        let x0 = self.config.x_offset;
        let y0 = self.config.y_offset;
        let x1 = x0 + self.config.width - 1;
        let y1 = y0 + self.config.height - 1;

        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        self.command(cmd::CASET, &[x0h, x0l, x1h, x1l]).await?;

        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.command(cmd::RASET, &[y0h, y0l, y1h, y1l]).await?;

        self.command(cmd::RAMWR, &[]).await
    }
}

impl<SPI, DC, D> FrameDisplay for St7789<SPI, DC, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    D: DelayNs,
{
    fn framebuffer_len(&self) -> usize {
        self.config.width as usize * self.config.height as usize * 2
    }

    async fn clear(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        let width = (self.config.width as usize).min(MAX_WIDTH);
        let mut line = [0u8; MAX_WIDTH * 2];
        for px in line.chunks_exact_mut(2) {
            px.copy_from_slice(&color.to_be_bytes());
        }

        self.begin_frame().await?;
        for _ in 0..self.config.height {
            self.data(&line[..width * 2]).await?;
        }
        Ok(())
    }

    async fn flush(&mut self, framebuffer: &[u8]) -> Result<(), DisplayError> {
        let expected = self.framebuffer_len();
        if framebuffer.len() != expected {
            return Err(DisplayError::SizeMismatch {
                expected,
                actual: framebuffer.len(),
            });
        }
        self.begin_frame().await?;
        self.data(framebuffer).await
    }

    async fn wait_flip_complete(&mut self) {
        // Pixels are already in GRAM when flush returns
    }
}
