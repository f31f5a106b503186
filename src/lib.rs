#![no_std]
#![doc = include_str!("../README.md")]

use embedded_hal::i2c::I2c;
use fugit::MicrosDurationU32;
use num_enum::IntoPrimitive;

pub mod lux;
mod registers;

use crate::registers::Register;

/// I2C address the device answers on when its ADDR SEL pin floats.
pub const DEFAULT_ADDRESS: u8 = 0x39;

const POWER_ON: u8 = 0x03;
const POWER_OFF: u8 = 0x00;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    I2cError(E),
    NotInitialized,
    ArgumentError,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::I2cError(error)
    }
}

/// Analog amplification applied to both photodiode channels.
///
/// Discriminants are the bits the setting occupies in the timing register.
/// Low gain trades sensitivity for headroom in bright light; the lux
/// conversion compensates by scaling low-gain counts up 16×.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum Gain {
    /// 1×
    Low = 0x00,
    /// 16×
    High = 0x10,
}

impl Gain {
    pub(crate) fn scale(self) -> f64 {
        match self {
            Self::Low => 16.0,
            Self::High => 1.0,
        }
    }
}

/// Conversion time for one measurement of both channels.
///
/// Discriminants are the bits the setting occupies in the timing register.
/// Longer integration accumulates more counts per lux but saturates
/// earlier in bright light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum IntegrationTime {
    /// 13.7 ms
    Ms13_7 = 0x00,
    /// 101 ms
    Ms101 = 0x01,
    /// 402 ms
    Ms402 = 0x02,
    /// Integration started and stopped by the host.
    Manual = 0x03,
}

impl IntegrationTime {
    /// Nominal conversion time, `None` when the host controls it.
    #[must_use]
    pub fn duration(self) -> Option<MicrosDurationU32> {
        match self {
            Self::Ms13_7 => Some(MicrosDurationU32::micros(13_700)),
            Self::Ms101 => Some(MicrosDurationU32::micros(101_000)),
            Self::Ms402 => Some(MicrosDurationU32::micros(402_000)),
            Self::Manual => None,
        }
    }

    /// Raw count above which a channel is considered saturated.
    pub(crate) fn clip_threshold(self) -> Option<u16> {
        match self {
            Self::Ms13_7 => Some(4900),
            Self::Ms101 => Some(37000),
            Self::Ms402 => Some(65000),
            Self::Manual => None,
        }
    }

    pub(crate) fn scale(self) -> Option<f64> {
        match self {
            Self::Ms13_7 => Some(1.0 / 0.034),
            Self::Ms101 => Some(1.0 / 0.252),
            Self::Ms402 => Some(1.0),
            Self::Manual => None,
        }
    }
}

/// Part and revision numbers reported by the ID register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Id {
    pub part_number: u8,
    pub revision_number: u8,
}

enum State<I2C> {
    Uninitialized,
    Ready { i2c: I2C, address: u8 },
    Freed,
}

/// TSL2561 driver over any [`embedded_hal::i2c::I2c`] bus.
///
/// The driver holds no bus until [`Tsl2561::init`] attaches one and none
/// again after [`Tsl2561::free`] gives it back; every register operation
/// in between requires the attached bus and fails with
/// [`Error::NotInitialized`] otherwise, without touching the wire.
pub struct Tsl2561<I2C> {
    state: State<I2C>,
}

impl<I2C: I2c> Default for Tsl2561<I2C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I2C: I2c> Tsl2561<I2C> {
    /// Creates a driver with no bus attached.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Uninitialized,
        }
    }

    /// Attaches an opened bus, addressing the device at
    /// [`DEFAULT_ADDRESS`].
    ///
    /// # Errors
    ///
    /// [`Error::ArgumentError`]: address is outside of the allowed range
    /// `0x08..=0x77`.
    pub fn init(&mut self, i2c: I2C) -> Result<&mut Self, Error<I2C::Error>> {
        self.init_with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Attaches an opened bus with an explicit device address.  Any bus
    /// still held from an earlier `init` is dropped.
    ///
    /// # Errors
    ///
    /// [`Error::ArgumentError`]: address is outside of the allowed range
    /// `0x08..=0x77`.
    pub fn init_with_address(
        &mut self,
        i2c: I2C,
        address: u8,
    ) -> Result<&mut Self, Error<I2C::Error>> {
        if !(0x08..=0x77).contains(&address) {
            return Err(Error::ArgumentError);
        }
        self.state = State::Ready { i2c, address };
        Ok(self)
    }

    /// Detaches and returns the bus.  Every operation afterwards fails
    /// with [`Error::NotInitialized`] until the driver is initialized
    /// again.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`]: no bus is attached.
    pub fn free(&mut self) -> Result<I2C, Error<I2C::Error>> {
        match core::mem::replace(&mut self.state, State::Freed) {
            State::Ready { i2c, .. } => Ok(i2c),
            State::Uninitialized => {
                self.state = State::Uninitialized;
                Err(Error::NotInitialized)
            }
            State::Freed => Err(Error::NotInitialized),
        }
    }

    fn bus(&mut self) -> Result<(&mut I2C, u8), Error<I2C::Error>> {
        match &mut self.state {
            State::Ready { i2c, address } => Ok((i2c, *address)),
            State::Uninitialized | State::Freed => Err(Error::NotInitialized),
        }
    }

    fn read_register(&mut self, register: Register) -> Result<u8, Error<I2C::Error>> {
        let (i2c, address) = self.bus()?;
        let mut data: [u8; 1] = [0];
        i2c.write_read(address, &[register.command()], &mut data)?;
        Ok(data[0])
    }

    fn read_word(&mut self, register: Register) -> Result<u16, Error<I2C::Error>> {
        let (i2c, address) = self.bus()?;
        let mut data: [u8; 2] = [0; 2];
        i2c.write_read(address, &[register.word_command()], &mut data)?;
        Ok(u16::from_le_bytes(data))
    }

    fn write_register(&mut self, register: Register, value: u8) -> Result<(), Error<I2C::Error>> {
        let (i2c, address) = self.bus()?;
        i2c.write(address, &[register.command(), value])?;
        Ok(())
    }

    /// Powers the device up.  Both channels read zero while it is down.
    pub fn enable(&mut self) -> Result<&mut Self, Error<I2C::Error>> {
        self.write_register(Register::Control, POWER_ON)?;
        Ok(self)
    }

    /// Powers the device down.
    pub fn disable(&mut self) -> Result<&mut Self, Error<I2C::Error>> {
        self.write_register(Register::Control, POWER_OFF)?;
        Ok(self)
    }

    pub fn is_enabled(&mut self) -> Result<bool, Error<I2C::Error>> {
        let control = self.read_register(Register::Control)?;
        Ok((control & 0x03) != 0)
    }

    pub fn get_id(&mut self) -> Result<Id, Error<I2C::Error>> {
        let id = self.read_register(Register::Id)?;
        Ok(Id {
            part_number: (id >> 4) & 0x0F,
            revision_number: id & 0x0F,
        })
    }

    /// Raw count from the full-spectrum photodiode (channel 0).
    pub fn get_broadband(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_word(Register::Chan0Low)
    }

    /// Raw count from the infrared photodiode (channel 1).
    pub fn get_infrared(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_word(Register::Chan1Low)
    }

    pub fn get_gain(&mut self) -> Result<Gain, Error<I2C::Error>> {
        let timing = self.read_register(Register::Timing)?;
        if (timing & 0x10) == 0 {
            Ok(Gain::Low)
        } else {
            Ok(Gain::High)
        }
    }

    /// Selects the gain, leaving the integration-time bits untouched.
    pub fn set_gain(&mut self, gain: Gain) -> Result<&mut Self, Error<I2C::Error>> {
        let timing = self.read_register(Register::Timing)?;
        self.write_register(Register::Timing, (timing & 0xEF) | u8::from(gain))?;
        Ok(self)
    }

    pub fn get_integration_time(&mut self) -> Result<IntegrationTime, Error<I2C::Error>> {
        let timing = self.read_register(Register::Timing)?;
        Ok(match timing & 0x03 {
            0x00 => IntegrationTime::Ms13_7,
            0x01 => IntegrationTime::Ms101,
            0x02 => IntegrationTime::Ms402,
            _ => IntegrationTime::Manual,
        })
    }

    /// Selects the integration time, leaving the gain bit untouched.
    pub fn set_integration_time(
        &mut self,
        integration_time: IntegrationTime,
    ) -> Result<&mut Self, Error<I2C::Error>> {
        let timing = self.read_register(Register::Timing)?;
        self.write_register(Register::Timing, (timing & 0xFC) | u8::from(integration_time))?;
        Ok(self)
    }

    /// Derives an illuminance value from both channels and the current
    /// configuration.
    ///
    /// `Ok(None)` means the reading is unusable: a channel clipped, the
    /// broadband count was zero, or the device is in manual timing mode,
    /// which has no calibration data.  See [`lux::compute`].
    pub fn get_lux(&mut self) -> Result<Option<f64>, Error<I2C::Error>> {
        let broadband = self.get_broadband()?;
        let infrared = self.get_infrared()?;
        let integration_time = self.get_integration_time()?;
        let gain = self.get_gain()?;
        Ok(lux::compute(broadband, infrared, gain, integration_time))
    }
}
