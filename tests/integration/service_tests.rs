//! LED task lifecycle: boot, breathing, join hand-off and steady mixing.

use std::sync::Arc;

use cctlamp::app::events::{LampEvent, OutputOwner};
use cctlamp::app::service::{LampPhase, LampService};
use cctlamp::config::LampConfig;
use cctlamp::control::mixer::Mixer;
use cctlamp::drivers::animation::AnimationMode;
use cctlamp::state::{LampCommand, LampState};

use crate::mock_hw::{MockDelay, MockPwm, RecordingSink};

struct Rig {
    service: LampService<MockPwm>,
    state: Arc<LampState>,
    delay: MockDelay,
    sink: RecordingSink,
    config: LampConfig,
}

const RESTORED: LampCommand = LampCommand {
    brightness: 200,
    mireds: 250,
};

fn rig_with(pwm: MockPwm) -> Rig {
    let config = LampConfig::default();
    let state = Arc::new(LampState::new(RESTORED));
    let service = LampService::new(pwm, Arc::clone(&state), &config);
    Rig {
        service,
        state,
        delay: MockDelay::default(),
        sink: RecordingSink::new(),
        config,
    }
}

fn started() -> Rig {
    let mut r = rig_with(MockPwm::new());
    r.service.start(&mut r.delay, &mut r.sink);
    r
}

impl Rig {
    fn tick(&mut self, joined: bool) {
        self.service.tick(joined, &mut self.delay, &mut self.sink);
    }

    fn expected(&self, brightness: u8, mireds: u16) -> [u8; 8] {
        let out = Mixer::new(&self.config).compute(brightness, mireds);
        [
            out.amber, out.amber, out.amber, out.amber, out.white, out.white, out.white,
            out.white,
        ]
    }
}

#[test]
fn start_plays_boot_sequence_then_breathes() {
    let r = started();

    assert_eq!(r.service.phase(), LampPhase::AwaitingNetwork);
    assert_eq!(r.service.owner(), OutputOwner::Animation);
    assert_eq!(r.service.animator().mode(), AnimationMode::Breathing);
    assert_eq!(r.service.pwm().duties, [0; 8], "boot sequence ends dark");
    assert_eq!(
        r.sink.events[0],
        LampEvent::Started { restored: RESTORED }
    );
    assert!(r.sink.events.contains(&LampEvent::PhaseChanged {
        from: LampPhase::Booting,
        to: LampPhase::AwaitingNetwork,
    }));
}

#[test]
fn tick_before_start_does_nothing() {
    let mut r = rig_with(MockPwm::new());
    r.tick(true);
    assert_eq!(r.service.phase(), LampPhase::Booting);
    assert!(r.service.pwm().writes.is_empty());
}

#[test]
fn second_start_is_ignored() {
    let mut r = started();
    let writes = r.service.pwm().writes.len();
    r.service.start(&mut r.delay, &mut r.sink);
    assert_eq!(r.service.pwm().writes.len(), writes);
    assert_eq!(
        r.sink
            .count(|e| matches!(e, LampEvent::Started { .. })),
        1
    );
}

#[test]
fn breathing_ignores_commands_until_joined() {
    let mut r = started();
    r.state.set_brightness(10);
    for _ in 0..50 {
        r.tick(false);
    }
    let d = r.service.pwm().duties;
    assert!(d.iter().all(|&x| x == d[0]), "breathing drives every channel alike");
    assert!(d[0] > 0);
    assert_eq!(
        r.sink
            .count(|e| matches!(e, LampEvent::OutputApplied { .. })),
        0
    );
}

#[test]
fn join_blinks_once_then_mixer_shows_restored_state() {
    let mut r = started();
    let writes_before = r.service.pwm().writes.len();

    r.tick(true);
    let blink_writes = r.service.pwm().writes[writes_before..]
        .iter()
        .filter(|(_, d)| *d == r.config.blink.duty)
        .count();
    assert_eq!(blink_writes, usize::from(r.config.blink.pulses) * 8);
    assert_eq!(r.service.phase(), LampPhase::Steady);
    assert_eq!(r.service.owner(), OutputOwner::Mixer);
    assert_eq!(r.service.animator().mode(), AnimationMode::Idle);
    assert_eq!(r.service.pwm().duties, r.expected(200, 250));

    // Further joined ticks neither blink again nor rewrite unchanged output.
    let writes_after = r.service.pwm().writes.len();
    for _ in 0..100 {
        r.tick(true);
    }
    assert_eq!(r.service.pwm().writes.len(), writes_after);
    assert_eq!(
        r.sink
            .count(|e| matches!(e, LampEvent::OwnerChanged(OutputOwner::Mixer))),
        1
    );
}

#[test]
fn command_during_breathing_is_shown_after_join() {
    let mut r = started();
    r.state.set_mireds(400);
    r.tick(false);
    r.tick(true);
    assert_eq!(r.service.pwm().duties, r.expected(200, 400));
}

#[test]
fn new_command_is_applied_on_next_tick() {
    let mut r = started();
    r.tick(true);

    r.state.set_command(LampCommand {
        brightness: 128,
        mireds: 400,
    });
    r.tick(true);
    assert_eq!(r.service.pwm().duties, [114, 114, 114, 114, 14, 14, 14, 14]);
    assert!(matches!(
        r.sink.events.last(),
        Some(LampEvent::OutputApplied {
            amber: 114,
            white: 14,
            power_on: true,
            ..
        })
    ));
}

#[test]
fn network_loss_keeps_mixer_in_charge() {
    let mut r = started();
    r.tick(true);
    let steady = r.service.pwm().duties;

    for _ in 0..20 {
        r.tick(false);
    }
    assert_eq!(r.service.phase(), LampPhase::Steady);
    assert_eq!(r.service.animator().mode(), AnimationMode::Idle);
    assert_eq!(r.service.pwm().duties, steady);
}

#[test]
fn power_off_darkens_and_power_on_restores() {
    let mut r = started();
    r.tick(true);

    r.state.set_power(false);
    r.tick(true);
    assert_eq!(r.service.pwm().duties, [0; 8]);
    assert_eq!(r.state.command().brightness, 200, "stored brightness kept");

    r.state.set_power(true);
    r.tick(true);
    assert_eq!(r.service.pwm().duties, r.expected(200, 250));
}

#[test]
fn partial_write_is_not_retried_until_next_command() {
    let mut pwm = MockPwm::new();
    pwm.failing.push(5);
    let mut r = rig_with(pwm);
    r.service.start(&mut r.delay, &mut r.sink);
    r.tick(true);

    // The event still reports what the mixer intended.
    let expected = r.expected(200, 250);
    assert!(r.sink.events.iter().any(|e| matches!(
        e,
        LampEvent::OutputApplied { amber, white, .. }
            if *amber == expected[0] && *white == expected[4]
    )));

    let writes = r.service.pwm().writes.len();
    r.tick(true);
    assert_eq!(r.service.pwm().writes.len(), writes);

    r.state.set_brightness(100);
    r.tick(true);
    assert!(r.service.pwm().writes.len() > writes);
}
