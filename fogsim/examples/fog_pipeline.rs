//! A small fog topology: a sensor samples periodically and ships readings
//! to a broker, which spawns an actuator on activation and forwards
//! readings to it.

use fogsim::prelude::*;
use tracing::info;

const TAG_SAMPLE: Tag = 1;
const TAG_READING: Tag = 2;
const TAG_ACTUATE: Tag = 3;

/// Emits one reading per second, five in total.
struct Sensor {
    broker: EntityId,
    samples: u32,
}

impl Entity for Sensor {
    fn name(&self) -> &str {
        "sensor"
    }

    fn handle(&mut self, self_id: EntityId, event: Event, ctx: &mut Context<'_>) {
        match event.kind() {
            EventKind::Create => {
                ctx.hold(self_id, SimTime::from_secs(1), TAG_SAMPLE);
            }
            EventKind::HoldDone => {
                self.samples += 1;
                let reading = format!("reading-{}", self.samples);
                ctx.send(
                    self_id,
                    self.broker,
                    SimTime::from_millis(20),
                    TAG_READING,
                    Some(Payload::from(reading.as_str())),
                );
                if self.samples < 5 {
                    ctx.hold(self_id, SimTime::from_secs(1), TAG_SAMPLE);
                }
            }
            _ => {}
        }
    }
}

/// Spawns its actuator when activated, then forwards readings to it.
struct Broker {
    actuator: Option<EntityId>,
}

impl Entity for Broker {
    fn name(&self) -> &str {
        "broker"
    }

    fn handle(&mut self, self_id: EntityId, mut event: Event, ctx: &mut Context<'_>) {
        match event.kind() {
            EventKind::Create => {
                self.actuator = Some(ctx.spawn(Box::new(Actuator)));
            }
            EventKind::Send if event.tag() == TAG_READING => {
                if let Some(actuator) = self.actuator {
                    ctx.send(
                        self_id,
                        actuator,
                        SimTime::from_millis(5),
                        TAG_ACTUATE,
                        event.take_payload(),
                    );
                }
            }
            _ => {}
        }
    }
}

struct Actuator;

impl Entity for Actuator {
    fn name(&self) -> &str {
        "actuator"
    }

    fn handle(&mut self, _self_id: EntityId, event: Event, ctx: &mut Context<'_>) {
        if event.kind() == EventKind::Send && event.tag() == TAG_ACTUATE {
            let reading = event
                .payload()
                .map(|p| String::from_utf8_lossy(p.bytes()).into_owned())
                .unwrap_or_default();
            info!(time = %ctx.now(), reading = %reading, "actuating");
        }
    }
}

fn main() {
    init_simulation_logging();

    let mut sim = Simulation::default();
    let broker = sim.add_entity(Box::new(Broker { actuator: None }));
    sim.add_entity(Box::new(Sensor { broker, samples: 0 }));

    sim.execute(Executor::unbound());

    println!(
        "run finished at {} after {} events across {} entities",
        sim.time(),
        sim.events_processed(),
        sim.entity_count(),
    );
}
