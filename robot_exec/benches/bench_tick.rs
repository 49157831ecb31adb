//! # Control Cycle Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::{ds::RobotMode, op::JoystickId};
use robot_lib::{
    hal::sim::SimRobot,
    robot::{Robot, RobotParams},
    tm::ArchivePublisher,
};

fn tick_benchmark(c: &mut Criterion) {
    // ---- Build a teleop robot seeking a preset ----

    let sim = SimRobot::new();
    let mut hw = sim.hardware();
    let mut robot = Robot::new(RobotParams::default()).unwrap();
    robot.set_mode(RobotMode::Teleop, &mut hw);

    {
        let mut s = sim.state_mut();
        s.set_lift_count(50);
        s.buttons.insert((JoystickId::Xbox, 8), true);
        s.axes.insert((JoystickId::Joystick, 1), -0.6);
        s.axes.insert((JoystickId::Joystick, 2), 0.3);
    }

    // Publisher without a session discards every packet
    let mut tm = ArchivePublisher::default();

    c.bench_function("robot tick", |b| {
        b.iter(|| black_box(robot.tick(&mut hw, &mut tm)))
    });
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
