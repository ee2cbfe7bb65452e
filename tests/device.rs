//! Facade tests against scripted mock hardware.
//!
//! The mock serial port is pre-loaded with request/response pairs: when
//! the driver writes bytes matching the next expected request, the
//! paired response becomes readable. Pins and delay are simple fakes
//! that record activity, so mode bracketing and timeout behavior are
//! observable without hardware.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};
use lora_e220::{
    Configuration, Device, Error, Mapping, ModuleModel, SaveMode, SerialPort, SubPacketSize,
};

#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    response: Vec<u8>,
}

/// Scripted serial port: expectations are consumed in write order.
#[derive(Default)]
struct MockSerial {
    expectations: VecDeque<Expectation>,
    rx: VecDeque<u8>,
    sent: Vec<Vec<u8>>,
}

impl MockSerial {
    /// Queue a request/response pair for the command exchange.
    fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Make bytes readable without any prior write, as if a frame
    /// arrived over the air.
    fn push_incoming(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

impl SerialPort for MockSerial {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.sent.push(bytes.to_vec());
        if let Some(expectation) = self.expectations.front() {
            if expectation.request == bytes {
                let expectation = self.expectations.pop_front().unwrap();
                self.rx.extend(expectation.response);
            }
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.rx.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn available(&mut self) -> usize {
        self.rx.len()
    }
}

/// Shared handle so tests can inspect the mock after the device takes it.
#[derive(Clone, Default)]
struct SharedSerial(Rc<RefCell<MockSerial>>);

impl SerialPort for SharedSerial {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.0.borrow_mut().write(bytes)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.0.borrow_mut().read(buf)
    }

    fn available(&mut self) -> usize {
        self.0.borrow_mut().available()
    }
}

/// Output pin recording its level history.
#[derive(Clone, Default)]
struct MockOutputPin {
    states: Rc<RefCell<Vec<bool>>>,
}

impl ErrorType for MockOutputPin {
    type Error = Infallible;
}

impl OutputPin for MockOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.states.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.states.borrow_mut().push(true);
        Ok(())
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
        match state {
            PinState::Low => self.set_low(),
            PinState::High => self.set_high(),
        }
    }
}

/// Input pin with a fixed level.
struct MockAuxPin {
    ready: bool,
}

impl ErrorType for MockAuxPin {
    type Error = Infallible;
}

impl InputPin for MockAuxPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.ready)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.ready)
    }
}

/// Delay that only counts elapsed virtual time.
#[derive(Clone, Default)]
struct MockDelay {
    elapsed_ns: Rc<RefCell<u64>>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.elapsed_ns.borrow_mut() += u64::from(ns);
    }
}

type TestDevice = Device<SharedSerial, MockOutputPin, MockOutputPin, MockAuxPin, MockDelay>;

fn device(model: ModuleModel) -> (TestDevice, SharedSerial, MockOutputPin, MockOutputPin) {
    let serial = SharedSerial::default();
    let m0 = MockOutputPin::default();
    let m1 = MockOutputPin::default();
    let device = Device::new(
        model,
        serial.clone(),
        m0.clone(),
        m1.clone(),
        MockAuxPin { ready: true },
        MockDelay::default(),
    );
    (device, serial, m0, m1)
}

const READ_REQUEST: &[u8] = &[0xC1, 0x00, 0x08];

/// Factory-default register block for the reference model.
const DEFAULT_BLOCK: &[u8] = &[0x00, 0x00, 0x00, 0b011_00_010, 0x00, 0b011, 0x00, 0x00];

fn read_response(block: &[u8]) -> Vec<u8> {
    let mut response = vec![0xC1, 0x00, 0x08];
    response.extend_from_slice(block);
    response
}

#[test]
fn begin_succeeds_when_module_is_ready() {
    let (mut lora, _, m0, m1) = device(ModuleModel::E220_400T22D);
    lora.begin().unwrap();

    // Normal mode is M0 low, M1 low
    assert_eq!(m0.states.borrow().as_slice(), &[false]);
    assert_eq!(m1.states.borrow().as_slice(), &[false]);
}

#[test]
fn begin_fails_when_module_never_readies() {
    let serial = SharedSerial::default();
    let mut lora = Device::new(
        ModuleModel::E220_400T22D,
        serial,
        MockOutputPin::default(),
        MockOutputPin::default(),
        MockAuxPin { ready: false },
        MockDelay::default(),
    );
    assert_eq!(lora.begin(), Err(Error::InitializationFailed));
}

#[test]
fn read_configuration_decodes_device_response() {
    let (mut lora, serial, m0, m1) = device(ModuleModel::E220_400T22D);
    serial
        .0
        .borrow_mut()
        .expect(READ_REQUEST, &read_response(DEFAULT_BLOCK));

    let configuration = lora.read_configuration().unwrap();

    assert_eq!(configuration.head, [0xC1, 0x00, 0x08]);
    assert_eq!(configuration.channel, 0);
    assert_eq!(configuration.frequency_mhz(), 410);
    assert_eq!(configuration.speed.uart_baud_rate.bps(), 9600);
    assert_eq!(configuration.option.transmission_power.dbm(), 22);
    assert!(!configuration.transmission_mode.is_fixed());

    // command bracket: Configuration mode (M0 and M1 both high, the
    // module's deep-sleep/program state) then back to Normal
    assert_eq!(m0.states.borrow().as_slice(), &[true, false]);
    assert_eq!(m1.states.borrow().as_slice(), &[true, false]);
}

#[test]
fn read_configuration_times_out_without_reply() {
    let (mut lora, _, _, _) = device(ModuleModel::E220_400T22D);
    assert_eq!(lora.read_configuration(), Err(Error::ResponseTimeout));
}

#[test]
fn read_configuration_rejects_unrecognized_head() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    // module answers "wrong format" and pads garbage
    serial
        .0
        .borrow_mut()
        .expect(READ_REQUEST, &[0xFF; 11]);

    assert_eq!(lora.read_configuration(), Err(Error::HeadNotRecognized));
}

#[test]
fn bare_wrong_format_reply_fails_fast_as_unrecognized() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    // the module's "wrong format" reply is the 3-byte head alone, with
    // no register bytes following; it must be classified as a bad head,
    // not as a response timeout
    serial.0.borrow_mut().expect(READ_REQUEST, &[0xFF, 0xFF, 0xFF]);

    assert_eq!(lora.read_configuration(), Err(Error::HeadNotRecognized));
}

#[test]
fn write_configuration_round_trips_unmodified_read() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    {
        let mut mock = serial.0.borrow_mut();
        mock.expect(READ_REQUEST, &read_response(DEFAULT_BLOCK));

        let mut write_request = vec![0xC0, 0x00, 0x08];
        write_request.extend_from_slice(DEFAULT_BLOCK);
        mock.expect(&write_request, &read_response(DEFAULT_BLOCK));
    }

    let read_back = lora.read_configuration().unwrap();
    let echoed = lora
        .write_configuration(&read_back, SaveMode::Persistent)
        .unwrap();

    assert_eq!(echoed.addr_high, read_back.addr_high);
    assert_eq!(echoed.addr_low, read_back.addr_low);
    assert_eq!(echoed.channel, read_back.channel);
    assert_eq!(echoed.speed, read_back.speed);
    assert_eq!(echoed.option, read_back.option);
    assert_eq!(echoed.transmission_mode, read_back.transmission_mode);
    assert_eq!(echoed.crypt, 0);
}

#[test]
fn write_configuration_detects_mismatched_echo() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    let mut write_request = vec![0xC0, 0x00, 0x08];
    write_request.extend_from_slice(DEFAULT_BLOCK);

    // echo comes back with a different channel register
    let mut tampered = DEFAULT_BLOCK.to_vec();
    tampered[2] = 5;
    serial
        .0
        .borrow_mut()
        .expect(&write_request, &read_response(&tampered));

    let configuration = Configuration::new(ModuleModel::E220_400T22D);
    assert_eq!(
        lora.write_configuration(&configuration, SaveMode::Persistent),
        Err(Error::WriteVerificationFailed)
    );
}

#[test]
fn write_configuration_with_illegal_power_sends_nothing() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);

    let mut configuration = Configuration::new(ModuleModel::E220_400T22D);
    configuration.option.transmission_power = lora_e220::TransmissionPower::Dbm30;

    assert_eq!(
        lora.write_configuration(&configuration, SaveMode::Persistent),
        Err(Error::InvalidConfigurationValue("transmission_power"))
    );
    assert!(serial.0.borrow().sent().is_empty());
}

#[test]
fn volatile_write_uses_temporary_command_code() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    let mut write_request = vec![0xC2, 0x00, 0x08];
    write_request.extend_from_slice(DEFAULT_BLOCK);
    serial
        .0
        .borrow_mut()
        .expect(&write_request, &read_response(DEFAULT_BLOCK));

    let configuration = Configuration::new(ModuleModel::E220_400T22D);
    lora.write_configuration(&configuration, SaveMode::Temporary)
        .unwrap();

    assert_eq!(serial.0.borrow().sent()[0][0], 0xC2);
}

#[test]
fn read_registers_returns_raw_bytes() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    serial
        .0
        .borrow_mut()
        .expect(&[0xC1, 0x02, 0x01], &[0xC1, 0x02, 0x01, 0x17]);

    let registers = lora.read_registers(0x02, 1).unwrap();
    assert_eq!(registers.as_slice(), &[0x17]);
}

#[test]
fn register_range_is_validated_before_transmission() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    assert_eq!(
        lora.read_registers(0x07, 2),
        Err(Error::InvalidConfigurationValue("length"))
    );
    assert!(serial.0.borrow().sent().is_empty());
}

#[test]
fn reset_sends_command_and_waits_for_ready() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    lora.reset().unwrap();
    assert_eq!(serial.0.borrow().sent(), &[vec![0xC4, 0x00, 0x00]]);
}

#[test]
fn transparent_send_is_byte_identical_to_payload() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    lora.send_transparent_message("Hello, world!").unwrap();
    assert_eq!(serial.0.borrow().sent(), &[b"Hello, world!".to_vec()]);
}

#[test]
fn fixed_send_prepends_address_and_channel() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    lora.send_fixed_message(0x00, 0x01, 23, "hi").unwrap();

    let sent = serial.0.borrow().sent().to_vec();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].len(), 3 + 2);
    assert_eq!(&sent[0][..3], &[0x00, 0x01, 23]);
    assert_eq!(&sent[0][3..], b"hi");
}

#[test]
fn broadcast_send_targets_the_all_ones_address() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    lora.send_broadcast_message(23, "hi").unwrap();
    assert_eq!(&serial.0.borrow().sent()[0][..3], &[0xFF, 0xFF, 23]);
}

#[test]
fn fixed_send_beyond_model_channel_range_is_rejected() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_900T22D);
    assert_eq!(
        lora.send_fixed_message(0x00, 0x01, 81, "hi"),
        Err(Error::InvalidConfigurationValue("channel"))
    );
    assert!(serial.0.borrow().sent().is_empty());
}

#[test]
fn oversized_payload_is_rejected_before_transmission() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);

    // shrink the sub-packet limit via a volatile configuration write
    let configuration = Configuration::builder(ModuleModel::E220_400T22D)
        .sub_packet(SubPacketSize::Bytes32)
        .build();
    let registers = configuration.to_registers().unwrap();
    let mut write_request = vec![0xC2, 0x00, 0x08];
    write_request.extend_from_slice(&registers);
    let mut response = vec![0xC1, 0x00, 0x08];
    response.extend_from_slice(&registers);
    serial.0.borrow_mut().expect(&write_request, &response);
    lora.write_configuration(&configuration, SaveMode::Temporary)
        .unwrap();

    let long = "x".repeat(33);
    assert_eq!(
        lora.send_transparent_message(&long),
        Err(Error::PayloadTooLarge)
    );
    // only the configuration write reached the wire
    assert_eq!(serial.0.borrow().sent().len(), 1);
}

#[test]
fn receive_message_with_rssi_splits_trailing_byte() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    serial.0.borrow_mut().push_incoming(b"Hello\x50");

    assert_eq!(lora.available(), 6);
    let received = lora.receive_message(true).unwrap().unwrap();
    assert_eq!(received.text.as_str(), "Hello");
    let rssi = received.rssi.unwrap();
    assert_eq!(rssi.0, 0x50);
    assert_eq!(rssi.dbm(), -176);
}

#[test]
fn receive_with_empty_buffer_is_not_an_error() {
    let (mut lora, _, _, _) = device(ModuleModel::E220_400T22D);
    assert_eq!(lora.available(), 0);
    assert_eq!(lora.receive_message(false).unwrap(), None);
}

#[test]
fn mapping_round_trips_through_transparent_mode() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);

    let mut mapping = Mapping::new();
    mapping
        .insert("key1".try_into().unwrap(), "value1".try_into().unwrap())
        .unwrap();
    mapping
        .insert("key2".try_into().unwrap(), "value2".try_into().unwrap())
        .unwrap();
    lora.send_transparent_mapping(&mapping).unwrap();

    // loop the transmitted frame back in
    let wire = serial.0.borrow().sent()[0].clone();
    serial.0.borrow_mut().push_incoming(&wire);

    let received = lora.receive_mapping(false).unwrap().unwrap();
    assert_eq!(received.mapping.len(), 2);
    assert_eq!(
        received.mapping.get(&"key1".try_into().unwrap()).unwrap(),
        "value1"
    );
    assert_eq!(
        received.mapping.get(&"key2".try_into().unwrap()).unwrap(),
        "value2"
    );
    assert_eq!(received.rssi, None);
}

#[test]
fn truncated_mapping_is_reported_malformed() {
    let (mut lora, serial, _, _) = device(ModuleModel::E220_400T22D);
    // one entry announced, buffer ends mid-value
    serial.0.borrow_mut().push_incoming(&[1, 1, b'k', 5, b'v']);

    assert_eq!(
        lora.receive_mapping(false).unwrap_err(),
        Error::MalformedMapping
    );
}
