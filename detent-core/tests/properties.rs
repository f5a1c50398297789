//! Property tests for the encoder and the event channel

mod common;

use std::collections::VecDeque;

use common::{TestClock, TestEncoder};
use detent_core::config::TimingConfig;
use detent_core::input::{EncoderInput, QuadratureDecoder};
use detent_core::{Event, EventChannel};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use proptest::prelude::*;

const CAPACITY: usize = 16;

type SmallChannel = EventChannel<NoopRawMutex, CAPACITY>;

fn encoder(start: i32) -> EncoderInput<TestEncoder, TestClock> {
    let hardware = TestEncoder {
        position: start,
        pressed: false,
    };
    EncoderInput::new(hardware, TestClock(0), TimingConfig::default(), 4)
}

/// Hold the button for `held_ms`, sampling every 10 ms, then wait 600 ms
fn press_for(input: &mut EncoderInput<TestEncoder, TestClock>, now: &mut u32, held_ms: u32) {
    let mut step = |input: &mut EncoderInput<TestEncoder, TestClock>, pressed: bool| {
        input.hardware_mut().pressed = pressed;
        *now += 10;
        input.clock_mut().0 = *now;
        input.update();
    };
    let samples = held_ms / 10;
    for _ in 0..samples.max(1) {
        step(input, true);
    }
    for _ in 0..60 {
        step(input, false);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn movement_sums_to_net_change(
        start in -200i32..200,
        deltas in prop::collection::vec(-9i32..=9, 0..64),
    ) {
        let mut input = encoder(start);
        let mut position = start;
        let mut total = 0;
        for delta in deltas {
            position += delta;
            input.hardware_mut().position = position;
            input.update();
            total += input.consume_movement();
        }
        prop_assert_eq!(total, position.div_euclid(4) - start.div_euclid(4));
    }

    #[test]
    fn quadrature_round_trip_returns_to_zero(steps in prop::collection::vec(any::<bool>(), 0..64)) {
        // Walk the Gray cycle one valid transition at a time
        const CYCLE: [(bool, bool); 4] = [(false, false), (true, false), (true, true), (false, true)];
        let mut decoder = QuadratureDecoder::new(false, false);
        let mut index: i32 = 0;
        for clockwise in &steps {
            index += if *clockwise { 1 } else { -1 };
            let (a, b) = CYCLE[index.rem_euclid(4) as usize];
            decoder.sample(a, b);
        }
        prop_assert_eq!(decoder.count(), index);
        prop_assert_eq!(decoder.noise(), 0);
    }

    #[test]
    fn press_duration_classified(held in 1u32..500) {
        // Sampling every 10 ms, the measured duration is a multiple of 10
        let held = held * 10;
        let mut input = encoder(0);
        let mut now = 0;
        press_for(&mut input, &mut now, held);

        let measured = input.last_press_duration();
        let click = input.consume_clicked();
        let long = input.consume_long_pressed();
        let ultra = input.consume_ultra_long_pressed();
        prop_assert!(!input.consume_double_clicked());

        prop_assert_eq!(click, measured < 500);
        prop_assert_eq!(long, (1000..3000).contains(&measured));
        prop_assert_eq!(ultra, measured >= 3000);
    }

    #[test]
    fn channel_keeps_order_and_rejects_when_full(values in prop::collection::vec(any::<i32>(), 0..40)) {
        let channel = SmallChannel::new();
        for (i, value) in values.iter().enumerate() {
            let accepted = channel.send_to_coordination(Event::EncoderRotation(*value));
            prop_assert_eq!(accepted, i < CAPACITY);
        }

        let mut received = Vec::new();
        while let Some(event) = channel.try_receive_from_render() {
            received.push(event);
        }
        let expected: Vec<Event> = values.iter().take(CAPACITY).map(|v| Event::EncoderRotation(*v)).collect();
        prop_assert_eq!(received, expected);

        let status = channel.status().to_coordination;
        prop_assert_eq!(status.accepted as usize, values.len().min(CAPACITY));
        prop_assert_eq!(status.rejected as usize, values.len().saturating_sub(CAPACITY));
    }

    #[test]
    fn channel_matches_bounded_queue_model(ops in prop::collection::vec(any::<Option<i32>>(), 0..200)) {
        // Some(v) sends v, None receives
        let channel = SmallChannel::new();
        let mut model = VecDeque::new();
        for op in ops {
            match op {
                Some(value) => {
                    let accepted = channel.send_to_render(Event::EncoderPressTime(value as u32));
                    prop_assert_eq!(accepted, model.len() < CAPACITY);
                    if accepted {
                        model.push_back(value as u32);
                    }
                }
                None => {
                    let expected = model.pop_front().map(Event::EncoderPressTime);
                    prop_assert_eq!(channel.try_receive_from_coordination(), expected);
                }
            }
        }
        prop_assert_eq!(channel.status().to_render.depth, model.len());
    }
}
