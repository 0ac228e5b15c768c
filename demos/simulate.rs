use std::sync::Arc;
use std::time::Duration;

use portvisor::{GridWriter, LogWriter, Runtime, SimConfig, Subscribe};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut cfg = SimConfig::default();
    cfg.seed = Some(2024);
    cfg.time_unit = Duration::from_millis(250);
    cfg.horizon = Some(120);

    let grid = Arc::new(GridWriter::new(cfg.capacity, true));
    let subs: Vec<Arc<dyn Subscribe>> = vec![grid, Arc::new(LogWriter)];

    let runtime = Runtime::new(cfg, subs)?;
    match runtime.run().await {
        Ok(()) => println!("simulation stopped"),
        Err(e) => println!("simulation stopped with error: {e}"),
    }
    Ok(())
}
