use hlsgrab::config::Config;
use hlsgrab::driver;
use log::{error, info};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let config = Config::default();
    match driver::run_default(&config) {
        Ok(report) => {
            info!(
                "Done: {} downloaded, {} skipped, {} failed",
                report.downloaded(),
                report.skipped(),
                report.failed()
            );
        }
        Err(err) => {
            error!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}
