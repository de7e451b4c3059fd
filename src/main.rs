// src/main.rs
// Demo entry point: flies the simulated vehicle around the configured polygon
// while a perception thread feeds obstacle detections into the core.

// Imports dependencies and Strix modules.
// - env_logger: Logging backend, level set through RUST_LOG.
// - strix: Navigation core plus the simulated vehicle and perception.
use log::{error, info};
use serde::Deserialize;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use strix::{
    sim::{SimulatedPerception, SimulatedVehicle, SimulationConfig},
    ClearanceOptimizer, NavigationCore, Point2, PoseSource, StrixConfig,
};

/// Simulation section of the demo configuration file
#[derive(Debug, Default, Deserialize)]
struct DemoFile {
    #[serde(default)]
    simulation: SimulationConfig,
}

/// Loads the core and simulation configuration from an optional YAML path.
fn load_config() -> Result<(StrixConfig, SimulationConfig), Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            let config = StrixConfig::from_yaml_str(&text)?;
            let demo: DemoFile = serde_yaml::from_str(&text)?;
            info!("Loaded configuration from {}", path);
            Ok((config, demo.simulation))
        }
        None => Ok((StrixConfig::default(), SimulationConfig::default())),
    }
}

/// Main function: runs the navigation core at a fixed rate for a bounded
/// number of cycles.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    info!("Starting Strix navigation demo...");

    let (config, sim_config) = match load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e);
        }
    };
    let period = Duration::from_secs_f64(1.0 / config.navigation.cycle_hz);
    let optimizer = ClearanceOptimizer::new(&config.optimizer);

    let [x, y] = sim_config.start;
    let vehicle = SimulatedVehicle::new(Point2::new(x, y), sim_config.step);
    let mut core = NavigationCore::new(
        config,
        Arc::new(vehicle.clone()),
        vehicle.clone(),
        optimizer,
    )?;

    // Perception runs on its own thread and only talks to the ingestor
    let running = Arc::new(AtomicBool::new(true));
    let perception_thread = {
        let ingestor = core.ingestor();
        let perception = SimulatedPerception::new(&sim_config);
        let vehicle = vehicle.clone();
        let running = Arc::clone(&running);
        thread::spawn(move || {
            while running.load(Ordering::Acquire) {
                let detections = perception.observe(&vehicle.position(), vehicle.yaw());
                if !detections.is_empty() {
                    ingestor.handle_batch(&detections);
                }
                thread::sleep(period / 2);
            }
        })
    };

    for cycle in 0..sim_config.cycles {
        let started = Instant::now();
        if let Err(e) = core.tick() {
            error!("Navigation cycle {} failed: {}", cycle, e);
            break;
        }
        if let Some(remaining) = period.checked_sub(started.elapsed()) {
            thread::sleep(remaining);
        }
    }

    running.store(false, Ordering::Release);
    if perception_thread.join().is_err() {
        error!("Perception thread panicked");
    }

    let status = core.get_status();
    info!(
        "Demo completed: outer {} inner {} valid {}, {} obstacles ({} dropped), {} replans ({} failed)",
        status.cursor.outer_index,
        status.cursor.inner_index,
        status.cursor.trajectory_valid,
        status.obstacle_count,
        status.dropped_obstacles,
        status.replans,
        status.replan_failures
    );
    Ok(())
}
