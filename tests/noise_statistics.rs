use approx::assert_relative_eq;
use filament::noise::{ GaussianNoise, NoiseGenerator };
use rand::{ Rng, SeedableRng, rngs::StdRng };

const N_X: usize = 512;
const N_Y: usize = 511;
const X_MAX: f64 = 500e-6;

#[test]
fn realized_statistics_match_targets() {
    let mut rng = StdRng::seed_from_u64(10546);
    let dx = X_MAX / N_X as f64;
    let dy = X_MAX / N_Y as f64;
    for epoch in 0..50 {
        let variance: f64 = rng.gen_range(0.5..1.5);
        let r_corr = rng.gen_range(5..15) as f64 * 1e-6;
        let mut noise = GaussianNoise::new(variance, r_corr).unwrap()
            .with_seed(epoch);
        noise.initialize(N_X, N_Y, dx, dy).unwrap();
        noise.process().unwrap();
        assert_eq!(noise.noise_field().unwrap().dim(), (N_X, N_Y));

        assert_relative_eq!(
            noise.variance_real().unwrap(), variance, max_relative = 0.2);
        assert_relative_eq!(
            noise.variance_imag().unwrap(), variance, max_relative = 0.2);
        // the decay-length estimate is coarse, hence the wide bound
        assert_relative_eq!(
            noise.r_corr_realized().unwrap(), r_corr, max_relative = 0.6);
    }
}

#[test]
fn autocorrelations_decay_monotonically_near_zero_lag() {
    let mut noise = GaussianNoise::new(1.0, 10e-6).unwrap().with_seed(3);
    noise.initialize(256, 256, 1e-6, 1e-6).unwrap();
    noise.process().unwrap();
    assert_eq!(noise.r_corr_in_points().unwrap(), 10);
    let acfs = noise.autocorrs().unwrap();
    for acf in [&acfs.real_x, &acfs.real_y, &acfs.imag_x, &acfs.imag_y] {
        assert!(acf[0] > 0.0);
        // the zero-lag value is the mean square of the channel
        (1..=5).for_each(|k| { assert!(acf[k] < acf[k - 1]); });
    }
}
