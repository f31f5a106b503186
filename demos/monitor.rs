//! Continuously samples the sensor and reports illuminance over RTT.
#![no_std]
#![no_main]

#[cfg(not(target_os = "none"))]
mod other {
    extern crate std;
    use std::println;
    #[no_mangle]
    pub extern "C" fn main() {
        loop {
            println!("unsupported target");
        }
    }
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod arm {
    use unofficial_tsl2561::{IntegrationTime, Tsl2561};

    use defmt::*;
    use defmt_rtt as _;
    use fugit::RateExtU32;
    use panic_probe as _;
    use rp2040_hal::{
        clocks::{init_clocks_and_plls, Clock},
        entry,
        gpio::{FunctionI2C, Pin, PullUp},
        i2c::I2C,
        pac,
        sio::Sio,
        watchdog::Watchdog,
    };

    #[link_section = ".boot2"]
    #[used]
    pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

    #[entry]
    fn main() -> ! {
        let mut pac = pac::Peripherals::take().unwrap();
        let core = pac::CorePeripherals::take().unwrap();
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let sio = Sio::new(pac.SIO);

        let external_xtal_freq_hz = 12_000_000u32;
        let clocks = init_clocks_and_plls(
            external_xtal_freq_hz,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        let pins = rp2040_hal::gpio::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        let sda_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio8.reconfigure();
        let scl_pin: Pin<_, FunctionI2C, PullUp> = pins.gpio9.reconfigure();

        let i2c = I2C::i2c0(
            pac.I2C0,
            sda_pin,
            scl_pin,
            400.kHz(),
            &mut pac.RESETS,
            &clocks.system_clock,
        );

        let mut delay =
            cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());

        let mut sensor = Tsl2561::new();
        sensor.init(i2c).unwrap();

        let id = sensor.get_id().unwrap();
        println!("part {} rev {}", id.part_number, id.revision_number);

        sensor
            .enable()
            .unwrap()
            .set_integration_time(IntegrationTime::Ms402)
            .unwrap();
        let settle = IntegrationTime::Ms402.duration().unwrap();

        loop {
            delay.delay_us(settle.to_micros());
            match sensor.get_lux().unwrap() {
                Some(lux) => println!("{} lux", lux),
                None => println!("reading clipped"),
            }
        }
    }
}
