#[cfg(feature = "std")]
mod tests {
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_hal::i2c::I2c;
    use iot_monitor_sensors::{testutil::*, *};

    fn door_readings() -> SensorData {
        SensorData {
            temperature: 21.5,
            humidity: 40.0,
            pressure: 1013.0,
            magnetic: [10, -5, 3],
            acceleration: [0, 0, 1000],
            gyroscope: [0, 0, 0],
        }
    }

    fn sentinel() -> SensorData {
        SensorData {
            temperature: -273.0,
            humidity: -1.0,
            pressure: -1.0,
            magnetic: [i32::MIN; 3],
            acceleration: [i32::MIN; 3],
            gyroscope: [i32::MIN; 3],
        }
    }

    fn same_field(a: &SensorData, b: &SensorData, field: Field) -> bool {
        match field {
            Field::Temperature => a.temperature == b.temperature,
            Field::Humidity => a.humidity == b.humidity,
            Field::Pressure => a.pressure == b.pressure,
            Field::Magnetic => a.magnetic == b.magnetic,
            Field::Acceleration => a.acceleration == b.acceleration,
            Field::Gyroscope => a.gyroscope == b.gyroscope,
        }
    }

    fn ready(hw: &MockHardware) -> Sensors<MockBoard> {
        let mut sensors = Sensors::new(hw.board());
        assert!(sensors.init().is_ok());
        sensors
    }

    #[test]
    fn test_read_all_with_every_sensor_available() {
        let hw = MockHardware::new(door_readings());
        let mut sensors = Sensors::new(hw.board());

        let availability = sensors.init().unwrap();
        assert!(availability.is_complete());
        assert_eq!(State::Ready, sensors.state());

        let mut data = sentinel();
        assert!(sensors.read_all(&mut data));
        assert_eq!(door_readings(), data);
    }

    #[test]
    fn test_drivers_initialized_in_order() {
        let hw = MockHardware::new(door_readings());
        let _sensors = ready(&hw);
        assert_eq!(SensorKind::ALL.to_vec(), hw.initialized());
    }

    #[test]
    fn test_humidity_init_failure() {
        let hw = MockHardware::new(door_readings());
        hw.set_pressure_temperature(19.0);
        hw.fail_init(SensorKind::Humidity);
        let mut sensors = Sensors::new(hw.board());

        let availability = sensors.init().unwrap();
        assert!(!availability.is_available(SensorKind::Humidity));
        assert_eq!(
            vec![SensorKind::Humidity],
            availability.unavailable().collect::<Vec<_>>()
        );

        let mut data = sentinel();
        assert!(!sensors.read_all(&mut data));
        assert_eq!(-1.0, data.humidity);
        // Temperature is served by the pressure sensor instead.
        assert_eq!(19.0, data.temperature);
        assert_eq!(1013.0, data.pressure);
        assert_eq!([10, -5, 3], data.magnetic);
        assert_eq!([0, 0, 1000], data.acceleration);
        assert_eq!([0, 0, 0], data.gyroscope);
    }

    #[test]
    fn test_one_driver_failure_does_not_block_the_others() {
        for failing in SensorKind::ALL {
            let hw = MockHardware::new(door_readings());
            hw.fail_init(failing);
            let mut sensors = Sensors::new(hw.board());

            let availability = sensors.init().unwrap();
            assert_eq!(SensorKind::ALL.to_vec(), hw.initialized());
            for kind in SensorKind::ALL {
                assert_eq!(kind != failing, availability.is_available(kind));
            }

            let mut data = sentinel();
            let updated = sensors.read_fields(&mut data, Fields::all());
            assert_eq!(availability.fields(), updated);
            assert!(!updated.is_all());
        }
    }

    #[test]
    fn test_read_all_over_every_availability_subset() {
        for mask in 0u8..16 {
            let hw = MockHardware::new(door_readings());
            let present: Vec<SensorKind> = SensorKind::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, kind)| kind)
                .collect();
            for kind in SensorKind::ALL {
                if !present.contains(&kind) {
                    hw.fail_init(kind);
                }
            }

            let mut sensors = ready(&hw);
            let expected = present
                .iter()
                .fold(Fields::empty(), |acc, kind| acc | kind.fields());

            let mut data = sentinel();
            let complete = sensors.read_all(&mut data);
            assert_eq!(present.len() == 4, complete, "mask {:#06b}", mask);

            for field in Field::READ_ORDER {
                let want = if expected.contains(field.flag()) {
                    door_readings()
                } else {
                    sentinel()
                };
                assert!(
                    same_field(&want, &data, field),
                    "mask {:#06b}, {:?}",
                    mask,
                    field
                );
            }
        }
    }

    #[test]
    fn test_transient_magnetometer_failure() {
        let hw = MockHardware::new(door_readings());
        let mut sensors = ready(&hw);

        let mut data = sentinel();
        hw.glitch(SensorKind::Magnetometer);
        assert!(!sensors.read_magnetic(&mut data));
        assert_eq!([i32::MIN; 3], data.magnetic);

        hw.set_readings(SensorData {
            magnetic: [12, -4, 7],
            ..door_readings()
        });
        assert!(sensors.read_magnetic(&mut data));
        assert_eq!([12, -4, 7], data.magnetic);
    }

    #[test]
    fn test_disconnected_sensor_recovers() {
        let hw = MockHardware::new(door_readings());
        let mut sensors = ready(&hw);

        hw.disconnect(SensorKind::Pressure);
        assert_eq!(Err(Error::Read(SensorKind::Pressure)), sensors.pressure());
        assert_eq!(Err(Error::Read(SensorKind::Pressure)), sensors.pressure());

        hw.reconnect(SensorKind::Pressure);
        assert_eq!(Ok(1013.0), sensors.pressure());
    }

    #[test]
    fn test_failed_acceleration_keeps_gyroscope() {
        let hw = MockHardware::new(door_readings());
        let mut sensors = ready(&hw);

        let mut data = sentinel();
        hw.glitch(SensorKind::Motion);
        assert!(!sensors.read_all(&mut data));
        assert_eq!([i32::MIN; 3], data.acceleration);
        assert_eq!([0, 0, 0], data.gyroscope);
        assert_eq!([10, -5, 3], data.magnetic);
    }

    #[test]
    fn test_reads_before_init_do_not_touch_hardware() {
        let hw = MockHardware::new(door_readings());
        let mut sensors = Sensors::new(hw.board());
        assert_eq!(State::Uninitialized, sensors.state());

        let mut data = sentinel();
        assert!(!sensors.read_all(&mut data));
        assert!(!sensors.read_temperature(&mut data));
        assert!(!sensors.read_humidity(&mut data));
        assert!(!sensors.read_pressure(&mut data));
        assert!(!sensors.read_acceleration(&mut data));
        assert!(!sensors.read_gyroscope(&mut data));
        assert!(!sensors.read_magnetic(&mut data));
        assert_eq!(Err(Error::NotInitialized), sensors.magnetic());

        assert_eq!(sentinel(), data);
        assert_eq!(0, hw.transactions());
        assert!(hw.initialized().is_empty());
        assert_eq!(Availability::default(), sensors.availability());
    }

    #[test]
    fn test_bus_unavailable_is_fatal() {
        let hw = MockHardware::new(door_readings());
        hw.fail_bus_claim();
        let mut sensors = Sensors::new(hw.board());

        assert_eq!(Err(Error::BusUnavailable), sensors.init());
        assert_eq!(State::BusUnavailable, sensors.state());
        assert!(!sensors.is_ready());

        let mut data = sentinel();
        assert!(!sensors.read_all(&mut data));
        assert!(!sensors.read_magnetic(&mut data));
        assert_eq!(Err(Error::BusUnavailable), sensors.acceleration());
        assert_eq!(Err(Error::AlreadyInitialized), sensors.init());

        assert_eq!(sentinel(), data);
        assert_eq!(0, hw.transactions());
        assert!(hw.initialized().is_empty());
    }

    #[test]
    fn test_init_only_once() {
        let hw = MockHardware::new(door_readings());
        let mut sensors = ready(&hw);
        let transactions = hw.transactions();

        assert_eq!(Err(Error::AlreadyInitialized), sensors.init());
        assert_eq!(transactions, hw.transactions());
        assert_eq!(4, hw.initialized().len());
    }

    #[test]
    fn test_unavailable_and_failed_reads_are_told_apart() {
        let hw = MockHardware::new(door_readings());
        hw.fail_init(SensorKind::Motion);
        let mut sensors = ready(&hw);

        hw.glitch(SensorKind::Magnetometer);
        assert_eq!(Err(Error::Read(SensorKind::Magnetometer)), sensors.magnetic());
        assert_eq!(
            Err(Error::Unavailable(SensorKind::Motion)),
            sensors.acceleration()
        );
        assert_eq!(Err(Error::Unavailable(SensorKind::Motion)), sensors.gyroscope());

        // Both look the same through the snapshot API.
        let mut data = sentinel();
        hw.glitch(SensorKind::Magnetometer);
        assert!(!sensors.read_magnetic(&mut data));
        assert!(!sensors.read_acceleration(&mut data));
    }

    #[test]
    fn test_temperature_falls_back_to_pressure_sensor() {
        let hw = MockHardware::new(door_readings());
        hw.set_pressure_temperature(19.0);
        hw.fail_init(SensorKind::Humidity);
        let mut sensors = ready(&hw);

        let mut data = sentinel();
        assert!(sensors.read_temperature(&mut data));
        assert_eq!(19.0, data.temperature);

        hw.disconnect(SensorKind::Pressure);
        assert_eq!(Err(Error::Read(SensorKind::Pressure)), sensors.temperature());
    }

    #[test]
    fn test_failed_humidity_read_is_not_masked() {
        let hw = MockHardware::new(door_readings());
        hw.set_pressure_temperature(19.0);
        let mut sensors = ready(&hw);
        let before = hw.transactions();

        hw.glitch(SensorKind::Humidity);
        let mut data = sentinel();
        assert!(!sensors.read_all(&mut data));
        assert_eq!(before + 6, hw.transactions());
        assert_eq!(-273.0, data.temperature);
        assert_eq!(40.0, data.humidity);
        assert_eq!(1013.0, data.pressure);

        hw.glitch(SensorKind::Humidity);
        assert!(!sensors.read_temperature(&mut data));
        assert_eq!(-273.0, data.temperature);
        assert_eq!(Ok(21.5), sensors.temperature());
    }

    #[test]
    fn test_environment_read_skips_motion() {
        let hw = MockHardware::new(door_readings());
        let mut sensors = ready(&hw);
        let before = hw.transactions();

        let mut data = sentinel();
        let updated = sensors.read_fields(&mut data, Fields::ENVIRONMENT);
        assert_eq!(Fields::ENVIRONMENT, updated);
        assert_eq!(before + 3, hw.transactions());

        assert_eq!(21.5, data.temperature);
        assert_eq!([i32::MIN; 3], data.acceleration);
        assert_eq!([i32::MIN; 3], data.magnetic);
    }

    #[test]
    fn test_targeted_read_skips_other_sensors() {
        let hw = MockHardware::new(door_readings());
        let mut sensors = ready(&hw);
        let before = hw.transactions();

        let mut data = sentinel();
        let updated = sensors.read_fields(&mut data, Fields::MOTION);
        assert_eq!(Fields::MOTION, updated);
        assert_eq!(before + 2, hw.transactions());

        assert_eq!([0, 0, 1000], data.acceleration);
        assert_eq!(-1.0, data.pressure);
        assert_eq!([i32::MIN; 3], data.magnetic);
    }

    #[test]
    fn test_release_drops_drivers_and_returns_bus() {
        let hw = MockHardware::new(door_readings());
        let sensors = ready(&hw);
        assert!(hw.teardown().is_empty());

        let (_board, bus) = sensors.release();
        assert_eq!(
            vec![
                Teardown::Driver(SensorKind::Magnetometer),
                Teardown::Driver(SensorKind::Humidity),
                Teardown::Driver(SensorKind::Pressure),
                Teardown::Driver(SensorKind::Motion),
            ],
            hw.teardown()
        );

        let mut bus = bus.unwrap();
        assert!(bus.write(MAGNETOMETER_ADDR, &[0x20, 0x00]).is_ok());
        drop(bus);
        assert_eq!(Some(&Teardown::Bus), hw.teardown().last());
    }

    #[test]
    fn test_dropping_sensors_drops_bus_last() {
        let hw = MockHardware::new(door_readings());
        drop(ready(&hw));
        assert_eq!(5, hw.teardown().len());
        assert_eq!(Some(&Teardown::Bus), hw.teardown().last());
    }

    #[test]
    fn test_release_without_bus() {
        let hw = MockHardware::new(door_readings());
        hw.fail_bus_claim();
        let mut sensors = Sensors::new(hw.board());
        assert!(sensors.init().is_err());

        let (_board, bus) = sensors.release();
        assert!(bus.is_none());

        let (_board, bus) = Sensors::new(hw.board()).release();
        assert!(bus.is_none());
        assert!(hw.teardown().is_empty());
    }

    #[test]
    fn test_shared_sensors() {
        let hw = MockHardware::new(door_readings());
        let shared: SharedSensors<NoopRawMutex, _> = SharedSensors::new(ready(&hw));

        let mut data = sentinel();
        assert!(shared.read_all(&mut data));
        assert_eq!(door_readings(), data);

        let nested = shared.lock(|_| shared.lock(|sensors| sensors.is_ready()));
        assert_eq!(Ok(Err(Error::Busy)), nested);

        assert!(shared.into_inner().is_ready());
    }

    #[test]
    fn test_snapshot_encodes_for_transport() {
        let encoded = serde_cbor::to_vec(&door_readings()).unwrap();
        let decoded: SensorData = serde_cbor::from_slice(&encoded).unwrap();
        assert_eq!(door_readings(), decoded);
    }
}
