//! Seeded headless run: no async runtime, no pacing — drain the whole
//! timeline up to a horizon and print the final board.

use portvisor::{Bus, GridWriter, SimConfig, SimTime, Simulation};

fn main() {
    let cfg = SimConfig {
        seed: Some(7),
        ..SimConfig::default()
    };
    let bus = Bus::new(1 << 16);
    let mut rx = bus.subscribe();
    let mut sim = Simulation::new(&cfg, bus);

    let steps = sim.run_until(SimTime::new(200));

    // Rebuild the board purely from notifications, the way a renderer would.
    let grid = GridWriter::new(cfg.capacity, false);
    while let Ok(ev) = rx.try_recv() {
        grid.apply(&ev);
    }

    println!("{steps} steps executed, clock at {}", sim.now());
    println!("{}", grid.render());
    sim.controller().assert_invariants();
}
