//! Pin bank — remote I/O channels and the mode strap behind [`IoPort`].
//!
//! Digital channels use the `embedded-hal` 1.0 pin traits, so the same
//! bank drives ESP-IDF `PinDriver`s on target and plain mock pins in
//! tests.  Analog channels go through [`AnalogSampler`].

use embedded_hal::digital::{InputPin, StatefulOutputPin};
use log::warn;

use crate::app::ports::IoPort;
use crate::config::DIGITAL_CHANNELS;
use crate::pins;

#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{AnyIOPin, Input, Output, PinDriver};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Source of raw ADC samples.
pub trait AnalogSampler {
    /// 10-bit sample from remote analog `channel`, 0 for unmapped channels.
    fn sample(&mut self, channel: u8) -> u16;
}

/// Digital inputs, latched outputs, the mode strap, and the ADC.
pub struct PinBank<I, O, M, A> {
    inputs: [I; DIGITAL_CHANNELS],
    outputs: [O; DIGITAL_CHANNELS],
    mode: M,
    adc: A,
}

impl<I, O, M, A> PinBank<I, O, M, A>
where
    I: InputPin,
    O: StatefulOutputPin,
    M: InputPin,
    A: AnalogSampler,
{
    pub fn new(inputs: [I; DIGITAL_CHANNELS], outputs: [O; DIGITAL_CHANNELS], mode: M, adc: A) -> Self {
        Self {
            inputs,
            outputs,
            mode,
            adc,
        }
    }
}

impl<I, O, M, A> IoPort for PinBank<I, O, M, A>
where
    I: InputPin,
    O: StatefulOutputPin,
    M: InputPin,
    A: AnalogSampler,
{
    fn io_peripheral_selected(&mut self) -> bool {
        self.mode.is_high().unwrap_or_else(|_| {
            warn!("PinBank: mode strap read failed, assuming transparent");
            false
        })
    }

    fn read_analog(&mut self, channel: u8) -> u16 {
        self.adc.sample(channel)
    }

    fn read_input(&mut self, channel: u8) -> bool {
        let Some(pin) = self.inputs.get_mut(channel as usize) else {
            return false;
        };
        pin.is_high().unwrap_or_else(|_| {
            warn!("PinBank: input {} read failed", channel);
            false
        })
    }

    fn output_state(&mut self, channel: u8) -> bool {
        let Some(pin) = self.outputs.get_mut(channel as usize) else {
            return false;
        };
        pin.is_set_high().unwrap_or(false)
    }

    fn write_output(&mut self, channel: u8, high: bool) {
        let Some(pin) = self.outputs.get_mut(channel as usize) else {
            return;
        };
        let result = if high { pin.set_high() } else { pin.set_low() };
        if result.is_err() {
            warn!("PinBank: output {} write failed", channel);
        }
    }
}

// ── Board wiring ──────────────────────────────────────────────

/// The pin bank as wired on the carrier board.
#[cfg(target_os = "espidf")]
pub type BoardPinBank = PinBank<
    PinDriver<'static, AnyIOPin, Input>,
    PinDriver<'static, AnyIOPin, Output>,
    PinDriver<'static, AnyIOPin, Input>,
    Adc1Sampler,
>;

#[cfg(target_os = "espidf")]
impl BoardPinBank {
    /// Claim every remote I/O pin listed in [`pins`] and the ADC unit.
    pub fn from_board() -> crate::error::Result<Self> {
        let mut inputs = heapless::Vec::<_, DIGITAL_CHANNELS>::new();
        for gpio in pins::DIGITAL_INPUT_GPIOS {
            // SAFETY: each GPIO number in the pin map is claimed exactly once.
            let pin = unsafe { AnyIOPin::new(gpio) };
            let driver = PinDriver::input(pin)
                .map_err(|_| crate::error::Error::Gpio("digital input init failed"))?;
            let _ = inputs.push(driver);
        }

        let mut outputs = heapless::Vec::<_, DIGITAL_CHANNELS>::new();
        for gpio in pins::DIGITAL_OUTPUT_GPIOS {
            // SAFETY: as above.
            let pin = unsafe { AnyIOPin::new(gpio) };
            let mut driver = PinDriver::output(pin)
                .map_err(|_| crate::error::Error::Gpio("digital output init failed"))?;
            if driver.set_low().is_err() {
                warn!("PinBank: output GPIO{} could not be cleared", gpio);
            }
            let _ = outputs.push(driver);
        }

        // SAFETY: as above.
        let strap = unsafe { AnyIOPin::new(pins::MODE_SELECT_GPIO) };
        let mode = PinDriver::input(strap)
            .map_err(|_| crate::error::Error::Gpio("mode strap init failed"))?;

        let inputs = inputs
            .into_array()
            .map_err(|_| crate::error::Error::Gpio("input pin count"))?;
        let outputs = outputs
            .into_array()
            .map_err(|_| crate::error::Error::Gpio("output pin count"))?;

        log::info!("PinBank: {} inputs, {} outputs", DIGITAL_CHANNELS, DIGITAL_CHANNELS);
        Ok(Self::new(inputs, outputs, mode, Adc1Sampler::new()?))
    }
}

// ── ADC1 oneshot ──────────────────────────────────────────────

/// ADC1 oneshot sampler over the analog remote channels.
pub struct Adc1Sampler {
    #[cfg(target_os = "espidf")]
    handle: adc_oneshot_unit_handle_t,
    #[cfg(not(target_os = "espidf"))]
    levels: [u16; crate::config::ANALOG_CHANNELS],
}

impl Adc1Sampler {
    #[cfg(target_os = "espidf")]
    pub fn new() -> crate::error::Result<Self> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: called once from main() before the bridge loop.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(crate::error::Error::Gpio("ADC1 unit init failed"));
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        for &ch in &pins::ANALOG_ADC1_CHANNELS {
            // SAFETY: handle was just created above.
            let ret = unsafe { adc_oneshot_config_channel(handle, ch, &chan_cfg) };
            if ret != ESP_OK as i32 {
                return Err(crate::error::Error::Gpio("ADC1 channel config failed"));
            }
        }
        log::info!("Adc1Sampler: {} channels", pins::ANALOG_ADC1_CHANNELS.len());
        Ok(Self { handle })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> crate::error::Result<Self> {
        log::info!("Adc1Sampler: simulation backend");
        Ok(Self {
            levels: [0; crate::config::ANALOG_CHANNELS],
        })
    }

    /// Set the simulated 10-bit level of a remote analog channel.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_level(&mut self, channel: u8, level: u16) {
        let index = channel.wrapping_sub(pins::ANALOG_FIRST_CHANNEL) as usize;
        if let Some(slot) = self.levels.get_mut(index) {
            *slot = level & 0x3FF;
        }
    }
}

impl AnalogSampler for Adc1Sampler {
    #[cfg(target_os = "espidf")]
    fn sample(&mut self, channel: u8) -> u16 {
        let Some(ch) = pins::adc1_channel_for(channel) else {
            return 0;
        };
        let mut raw: i32 = 0;
        // SAFETY: handle valid for the sampler's lifetime; main-loop only.
        let ret = unsafe { adc_oneshot_read(self.handle, ch, &mut raw) };
        if ret != ESP_OK as i32 {
            warn!("Adc1Sampler: read ch{} failed ({})", ch, ret);
            return 0;
        }
        // 12-bit conversion scaled to the 10-bit wire format.
        (raw.max(0) as u16) >> 2
    }

    #[cfg(not(target_os = "espidf"))]
    fn sample(&mut self, channel: u8) -> u16 {
        match pins::adc1_channel_for(channel) {
            Some(ch) => self.levels[ch as usize],
            None => 0,
        }
    }
}
