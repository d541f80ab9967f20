//! FT6x06 capacitive touch controller (I2C)
//!
//! Covers the FT6206/FT6236/FT6336 family. The controller pulls INT low
//! when a new touch report is ready; the report is read from the register
//! block starting at TD_STATUS.

use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::I2c;
use framelink_core::traits::{TouchController, TouchError, TouchPoint};

/// 7-bit I2C address
pub const FT6X06_ADDR: u8 = 0x38;

/// Register addresses
pub mod reg {
    /// Number of touch points (low nibble)
    pub const TD_STATUS: u8 = 0x02;
    /// Interrupt mode: 0 = level while touched, 1 = pulse per report
    pub const G_MODE: u8 = 0xA4;
    /// Vendor ID
    pub const FOCALTECH_ID: u8 = 0xA8;
}

/// Focaltech vendor ID
const VENDOR_ID: u8 = 0x11;

/// Event flag value for a finger being lifted
const EVENT_LIFT_UP: u8 = 0x01;

/// Mapping from controller coordinates to panel pixels
#[derive(Debug, Clone)]
pub struct Ft6x06Config {
    /// Exchange X and Y before mirroring
    pub swap_xy: bool,
    pub mirror_x: bool,
    pub mirror_y: bool,
    /// Panel width after swapping
    pub width: u16,
    /// Panel height after swapping
    pub height: u16,
}

impl Default for Ft6x06Config {
    /// Portrait controller under a 240x135 landscape panel
    fn default() -> Self {
        Self {
            swap_xy: true,
            mirror_x: false,
            mirror_y: true,
            width: 240,
            height: 135,
        }
    }
}

impl Ft6x06Config {
    fn map(&self, x: u16, y: u16) -> TouchPoint {
        let (mut x, mut y) = if self.swap_xy { (y, x) } else { (x, y) };
        let max_x = self.width.saturating_sub(1);
        let max_y = self.height.saturating_sub(1);
        x = x.min(max_x);
        y = y.min(max_y);
        if self.mirror_x {
            x = max_x - x;
        }
        if self.mirror_y {
            y = max_y - y;
        }
        TouchPoint::new(x, y)
    }
}

/// FT6x06 driver
pub struct Ft6x06<I2C, INT> {
    i2c: I2C,
    int: INT,
    config: Ft6x06Config,
}

impl<I2C, INT> Ft6x06<I2C, INT>
where
    I2C: I2c,
    INT: Wait,
{
    pub fn new(i2c: I2C, int: INT, config: Ft6x06Config) -> Self {
        Self { i2c, int, config }
    }

    /// Check the vendor ID and switch INT to one pulse per report
    pub async fn init(&mut self) -> Result<(), TouchError> {
        let mut id = [0u8; 1];
        self.i2c
            .write_read(FT6X06_ADDR, &[reg::FOCALTECH_ID], &mut id)
            .await
            .map_err(|_| TouchError::Bus)?;
        if id[0] != VENDOR_ID {
            return Err(TouchError::Bus);
        }
        self.i2c
            .write(FT6X06_ADDR, &[reg::G_MODE, 0x01])
            .await
            .map_err(|_| TouchError::Bus)
    }
}

impl<I2C, INT> TouchController for Ft6x06<I2C, INT>
where
    I2C: I2c,
    INT: Wait,
{
    async fn wait_interrupt(&mut self) -> Result<(), TouchError> {
        self.int
            .wait_for_falling_edge()
            .await
            .map_err(|_| TouchError::Interrupt)
    }

    async fn read_point(&mut self) -> Result<Option<TouchPoint>, TouchError> {
        // TD_STATUS, P1_XH, P1_XL, P1_YH, P1_YL
        let mut buf = [0u8; 5];
        self.i2c
            .write_read(FT6X06_ADDR, &[reg::TD_STATUS], &mut buf)
            .await
            .map_err(|_| TouchError::Bus)?;

        let touches = buf[0] & 0x0F;
        // 0x0F is reported until the first scan after reset
        if touches == 0 || touches > 2 {
            return Ok(None);
        }
        if buf[1] >> 6 == EVENT_LIFT_UP {
            return Ok(None);
        }

        let x = (u16::from(buf[1] & 0x0F) << 8) | u16::from(buf[2]);
        let y = (u16::from(buf[3] & 0x0F) << 8) | u16::from(buf[4]);
        Ok(Some(self.config.map(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Debug)]
    struct BusError;

    impl embedded_hal::i2c::Error for BusError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Register file behind a register-pointer write
    struct MockI2c {
        regs: [u8; 256],
        pointer: usize,
        writes: Vec<Vec<u8>>,
        fail: bool,
    }

    impl MockI2c {
        fn new() -> Self {
            let mut regs = [0u8; 256];
            regs[reg::FOCALTECH_ID as usize] = VENDOR_ID;
            Self {
                regs,
                pointer: 0,
                writes: Vec::new(),
                fail: false,
            }
        }

        fn touch(&mut self, count: u8, event: u8, x: u16, y: u16) {
            self.regs[2] = count;
            self.regs[3] = (event << 6) | (x >> 8) as u8;
            self.regs[4] = x as u8;
            self.regs[5] = (y >> 8) as u8;
            self.regs[6] = y as u8;
        }
    }

    impl ErrorType for MockI2c {
        type Error = BusError;
    }

    impl I2c for MockI2c {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), BusError> {
            if self.fail || address != FT6X06_ADDR {
                return Err(BusError);
            }
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        self.pointer = bytes[0] as usize;
                        self.writes.push(bytes.to_vec());
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.regs[self.pointer];
                            self.pointer += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct ReadyPin;

    impl embedded_hal::digital::ErrorType for ReadyPin {
        type Error = Infallible;
    }

    impl Wait for ReadyPin {
        async fn wait_for_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        async fn wait_for_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    fn unmapped() -> Ft6x06Config {
        Ft6x06Config {
            swap_xy: false,
            mirror_x: false,
            mirror_y: false,
            width: 4096,
            height: 4096,
        }
    }

    #[test]
    fn test_init_checks_vendor_and_sets_mode() {
        let mut touch = Ft6x06::new(MockI2c::new(), ReadyPin, unmapped());
        block_on(touch.init()).unwrap();
        assert_eq!(touch.i2c.writes.last(), Some(&vec![reg::G_MODE, 0x01]));

        let mut i2c = MockI2c::new();
        i2c.regs[reg::FOCALTECH_ID as usize] = 0x00;
        let mut touch = Ft6x06::new(i2c, ReadyPin, unmapped());
        assert_eq!(block_on(touch.init()), Err(TouchError::Bus));
    }

    #[test]
    fn test_read_point_decodes_12_bit_coordinates() {
        let mut i2c = MockI2c::new();
        i2c.touch(1, 0x02, 0x123, 0x0AB);
        let mut touch = Ft6x06::new(i2c, ReadyPin, unmapped());

        block_on(touch.wait_interrupt()).unwrap();
        assert_eq!(
            block_on(touch.read_point()),
            Ok(Some(TouchPoint::new(0x123, 0x0AB)))
        );
    }

    #[test]
    fn test_no_touch_or_lift_reads_none() {
        let mut i2c = MockI2c::new();
        i2c.touch(0, 0, 10, 10);
        let mut touch = Ft6x06::new(i2c, ReadyPin, unmapped());
        assert_eq!(block_on(touch.read_point()), Ok(None));

        touch.i2c.touch(0x0F, 0, 10, 10);
        assert_eq!(block_on(touch.read_point()), Ok(None));

        touch.i2c.touch(1, EVENT_LIFT_UP, 10, 10);
        assert_eq!(block_on(touch.read_point()), Ok(None));
    }

    #[test]
    fn test_landscape_mapping() {
        // Controller is 135 wide and 240 tall in portrait
        let mut i2c = MockI2c::new();
        i2c.touch(1, 0, 0, 239);
        let mut touch = Ft6x06::new(i2c, ReadyPin, Ft6x06Config::default());
        assert_eq!(block_on(touch.read_point()), Ok(Some(TouchPoint::new(239, 134))));

        touch.i2c.touch(1, 0, 134, 0);
        assert_eq!(block_on(touch.read_point()), Ok(Some(TouchPoint::new(0, 0))));
    }

    #[test]
    fn test_bus_failure() {
        let mut i2c = MockI2c::new();
        i2c.fail = true;
        let mut touch = Ft6x06::new(i2c, ReadyPin, unmapped());
        assert_eq!(block_on(touch.read_point()), Err(TouchError::Bus));
    }
}
