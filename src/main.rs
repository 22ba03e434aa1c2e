use fluidbox::{app, logging, AppConfig, AppError};

/// Usage: `fluidbox [config.json]`
fn main() -> Result<(), AppError> {
    let _logger = logging::setup("info")?;

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading config from {}", path);
            AppConfig::load(&path)?
        }
        None => AppConfig::default(),
    };
    config.validate()?;

    log::info!(
        "{} particles, box {:?}, mass {}, radius {}, target density {}, pressure x{}",
        config.particle_count,
        config.simulation.bounding_box_size,
        config.simulation.mass,
        config.simulation.smoothing_radius,
        config.simulation.target_density,
        config.simulation.pressure_multiplier
    );

    app::run(config)
}
