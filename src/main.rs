use anyhow::{Context, Result};
use std::io::{self, Write};
use std::process::ExitCode;

use weather_here::{Endpoints, Fetcher, Location, get_location, write_weather};

fn main() -> ExitCode {
    let env = env_logger::Env::default().default_filter_or("warn");
    env_logger::init_from_env(env);

    let endpoints = Endpoints::default();
    let fetcher = Fetcher::new().with_progress(true);
    let mut ok = true;

    // Without a location the forecast is still requested, for (0, 0).
    let location = match get_location(&fetcher, &endpoints.location)
        .context("failed to get location")
    {
        Ok(location) => location,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ok = false;
            Location::default()
        }
    };

    if let Err(err) = report(&fetcher, &endpoints, &location) {
        eprintln!("error: {:#}", err);
        ok = false;
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report(fetcher: &Fetcher, endpoints: &Endpoints, location: &Location) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    location.write_to(&mut out)?;
    out.flush()?;

    let result = write_weather(fetcher, &endpoints.weather, location, &mut out);
    out.flush()?;
    result.context("failed to get weather")?;
    Ok(())
}
