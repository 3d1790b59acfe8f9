use chromcore::filter::chain::SignalFilter;
use chromcore::{Chromatogram, PeakFinderConfig, PeakFinderWorker};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // synthetic TIC: drifting background with three gaussian peaks
    let peaks = [(300.0, 6.0, 8000.0), (520.0, 9.0, 2500.0), (545.0, 7.0, 4000.0)];
    let intensities: Vec<f64> = (0..1000)
        .map(|i| {
            let x = i as f64;
            let background = 200.0 + 0.1 * x + 15.0 * (x * 0.05).sin();
            let signal: f64 = peaks
                .iter()
                .map(|&(mu, sigma, h)| h * (-(x - mu).powi(2) / (2.0 * sigma * sigma)).exp())
                .sum();
            background + signal
        })
        .collect();
    let times: Vec<f64> = (0..1000).map(|i| i as f64 * 0.5).collect();

    let chromatogram = match Chromatogram::new(intensities, times) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };

    let config = PeakFinderConfig {
        peak_snr_threshold: 12.0,
        baseline_filter_window: 50,
        baseline_estimation_minima_window: 40,
        filters: vec![SignalFilter::Gaussian { sigma: 1.5, truncate: 3.0 }],
        ..PeakFinderConfig::default()
    };

    match PeakFinderWorker::new(config).run(&chromatogram) {
        Ok(result) => {
            println!("candidates: {:?}", result.candidate_indices);
            for peak in &result.peaks {
                println!("{}", peak);
            }
            for pair in &result.overlaps {
                println!("overlap: apex {} and apex {}", pair.previous_apex, pair.current_apex);
            }
        }
        Err(e) => log::error!("peak finding failed: {}", e),
    }
}
