use anyhow::Context;
use env_logger::Env;
use orientation_poller::{
    create_imu, Interrupt, OrientationPoller, PollerConfig, Settings, SETTINGS_NAME,
};
use std::io;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let interrupt = Interrupt::install().context("failed to install Ctrl+C handler")?;
    let settings = Settings::load_or_default(SETTINGS_NAME);
    let imu = create_imu(&settings)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(mut poller) = OrientationPoller::start(imu, PollerConfig::default(), &mut out)? {
        eprintln!("Press Ctrl+C to exit");
        poller.run(&mut out, &interrupt)?;
    }
    Ok(())
}
