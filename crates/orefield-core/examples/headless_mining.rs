//! Headless mining example: four workers, a node chain and a special node.
//!
//! A toy navigator delivers every move request on the following frame. The
//! loop runs ten simulated seconds at 60 frames per second and prints the
//! ledger once per scheduler tick.
//!
//! Run with: `RUST_LOG=orefield_core=debug cargo run -p orefield-core --example headless_mining`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use orefield_core::abilities::{LedgerScaling, ParentBypass, Prospector};
use orefield_core::config::EconomyConfig;
use orefield_core::economy::Economy;
use orefield_core::event::{EconomyEvent, EventKind};
use orefield_core::fixed::fixed64_to_f64;
use orefield_core::geometry::Position;
use orefield_core::id::{PathHandle, WorkerId};
use orefield_core::navigation::Navigator;
use orefield_core::node::{SpecialNodeDef, StandardNodeDef};
use orefield_core::resource::ResourceKind;
use orefield_core::strategy::Ability;
use tracing_subscriber::EnvFilter;

/// Arrives one frame after every request.
#[derive(Debug, Default)]
struct NextFrameNavigator {
    next: u64,
    in_flight: Arc<Mutex<Vec<PathHandle>>>,
}

impl Navigator for NextFrameNavigator {
    fn request_move(&mut self, _worker: WorkerId, _to: Position) -> PathHandle {
        self.next += 1;
        let handle = PathHandle(self.next);
        if let Ok(mut queue) = self.in_flight.lock() {
            queue.push(handle);
        }
        handle
    }
}

const CONFIG: &str = r#"
tick_interval_ms = 500
arrival_threshold = 0.5
leash_slack = 2.0
rng_seed = 42
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orefield_core=info")),
        )
        .init();

    let config = EconomyConfig::from_toml_str(CONFIG)?;
    let navigator = NextFrameNavigator::default();
    let in_flight = Arc::clone(&navigator.in_flight);
    let mut economy = Economy::new(config, Box::new(navigator))?;
    economy.events_mut().suppress(EventKind::WorkerStateChanged);

    // --- Level: copper (root) -> iron (child), a hidden special on copper ---

    let copper = economy.add_standard(StandardNodeDef::new(
        ResourceKind::Tier1,
        1.0,
        Position::new(0.0, 0.0),
    ))?;
    let iron = economy.add_child(
        copper,
        StandardNodeDef::new(ResourceKind::Tier2, 0.5, Position::new(6.0, 0.0)),
    )?;
    let crystal = economy.attach_special(copper, SpecialNodeDef::new(1.5, 6.0).hidden())?;

    // --- Workers ---

    let digger = economy.spawn_worker(Position::new(1.0, 1.0), Ability::Plain);
    let scout = economy.spawn_worker(Position::new(2.0, 2.0), Ability::custom(Prospector));
    let sapper = economy.spawn_worker(Position::new(5.0, 5.0), Ability::custom(ParentBypass));
    let scaler = economy.spawn_worker(
        Position::new(0.0, 3.0),
        Ability::custom(LedgerScaling::new(0.25)),
    );

    economy.command_mine(digger, Some(copper))?;
    economy.command_mine(sapper, Some(iron))?;
    economy.command_mine(scout, Some(crystal))?;
    economy.command_mine(scaler, Some(copper))?;

    // --- Run 10 simulated seconds at 60 FPS ---

    let frame = Duration::from_micros(16_667);
    for _ in 0..600 {
        let arrived: Vec<PathHandle> = in_flight
            .lock()
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default();
        for handle in arrived {
            economy.on_arrived(handle);
        }

        let result = economy.advance(frame);
        if result.steps_run == 0 {
            continue;
        }
        let ledger = economy.ledger_snapshot();
        println!(
            "tick {:>3}: T1={:<3} T2={:<3} special={:<3} (+{})",
            economy.tick(),
            ledger.total(ResourceKind::Tier1),
            ledger.total(ResourceKind::Tier2),
            ledger.total(ResourceKind::Special),
            result.units_posted,
        );
        for event in economy.drain_events() {
            match event {
                EconomyEvent::NodeDepleted { node, .. } => println!("  node {node:?} depleted"),
                EconomyEvent::JobEnded { worker, reason, .. } => {
                    println!("  worker {worker:?} stopped: {reason:?}")
                }
                _ => {}
            }
        }
    }

    println!("\nworkers:");
    for w in economy.worker_snapshots() {
        println!(
            "  {:?} [{}] {:?} banked={:.2}",
            w.id,
            w.ability,
            w.state,
            fixed64_to_f64(w.banked_remainder)
        );
    }
    Ok(())
}
