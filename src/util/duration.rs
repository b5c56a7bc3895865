use anyhow::{bail, ensure, Ok, Result};
use std::time::Duration;

/// Parses `SS[.ms]`, `MM:SS[.ms]` or `HH:MM:SS[.ms]`.
pub(crate) fn parse(arg: &str) -> Result<Duration> {
    let uint = |arg: &str| arg.parse::<u32>().map(f64::from);
    let uf64 = |arg: &str| {
        let val: f64 = arg.parse()?;
        ensure!(val.is_finite(), "Duration must be a finite number");
        ensure!(val >= 0., "Negative duration is not allowed");
        Ok(val)
    };

    let segments: Vec<_> = arg.split(':').collect();

    let seconds = match segments.as_slice() {
        [seconds] => uf64(seconds)?,
        [minutes, seconds] => uint(minutes)? * 60. + uf64(seconds)?,
        [hours, minutes, seconds] => {
            uint(hours)? * (60. * 60.) + uint(minutes)? * 60. + uf64(seconds)?
        }
        _ => bail!("Unknown duration format"),
    };

    Ok(Duration::from_secs_f64(seconds))
}
