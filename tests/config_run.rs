use std::fs;
use filament::{
    config::{ Geometry, JobConfig, Simulation, build },
    error::ConfigError,
};

const TRANSVERSE: &str = r#"
    [beam]
    geometry = "xy"
    medium = "CaF2"
    lmbda = 800e-9
    M = 0
    m = 0
    P0_to_Pcr_G = 0.8
    x_0 = 100e-6
    y_0 = 100e-6
    n_x = 64
    n_y = 64
    radii_in_grid = 8.0
    noise_percent = 1.0

    [noise]
    r_corr = 40e-6
    seed = 12

    [propagation]
    n_z = 6
    dz0_to_z_diff = 1e-2
    print_current_state_every = 2
    save_beam_every = 3
    threads = 2

    [output]
    prefix = "noisy"
"#;

#[test]
fn serialized_config_parses_back() {
    let config: JobConfig = TRANSVERSE.parse().unwrap();
    assert_eq!(config.noise.as_ref().unwrap().variance, 1.0);
    let text = toml::to_string(&config).unwrap();
    let reparsed: JobConfig = text.parse().unwrap();
    assert_eq!(reparsed, config);
    assert_eq!(reparsed.validate().unwrap(), Geometry::Transverse);
}

#[test]
fn noise_percent_requires_noise_section() {
    let mut config: JobConfig = TRANSVERSE.parse().unwrap();
    config.noise = None;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Missing { key: "noise", .. }),
    ));
    config.beam.noise_percent = Some(0.0);
    assert!(config.validate().is_ok());
}

#[test]
fn transverse_job_writes_run_directory() {
    let mut config: JobConfig = TRANSVERSE.parse().unwrap();
    let root = std::env::temp_dir()
        .join(format!("filament-config-run-{}", std::process::id()));
    config.output.directory = root.clone();
    let dir = config.run_directory();
    assert_eq!(dir, root.join("noisy_beam_xy"));

    let mut sim = build(&config).unwrap();
    assert!(matches!(sim, Simulation::Transverse(_)));
    let mut logger = config.logger().with_executors(sim.executors());
    let track = sim.run(Some(&mut logger)).unwrap();
    assert_eq!(track.len(), 7);

    // seeded noise makes the run reproducible
    let mut again = build(&config).unwrap();
    let track_again = again.run(None).unwrap();
    assert_eq!(track.rows(), track_again.rows());

    let parameters = fs::read_to_string(dir.join("parameters.txt")).unwrap();
    assert!(parameters.contains("fourier_diffraction_executor_xy"));
    assert!(parameters.contains("noise_percent"));
    assert!(parameters.contains("CaF2"));
    let csv = fs::read_to_string(dir.join("track.csv")).unwrap();
    assert_eq!(csv.lines().count(), 8);
    for n in [0, 3, 6] {
        assert!(dir.join("beam").join(format!("{:05}.npz", n)).exists());
    }
    assert!(dir.join("track.npz").exists());
    assert!(dir.join("times.log").exists());
    fs::remove_dir_all(&root).unwrap();
}
