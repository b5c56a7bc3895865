//! Media effects that users can request and the ffmpeg arguments they map to.

use crate::prelude::*;
use clap::Subcommand;

/// Sample rate the pitch shifting resamples the audio to.
const PITCH_SAMPLE_RATE: u32 = 44_100;

/// Older ffmpeg builds reject `atempo` factors outside of this range, so
/// bigger changes are expressed as a chain of several `atempo` stages.
const MIN_ATEMPO: f64 = 0.5;
const MAX_ATEMPO: f64 = 2.0;

const MAX_SWIRL_DEGREES: i64 = 360;
const MAX_SEMITONES: f64 = 24.0;

/// Range of saturation accepted by ffmpeg's `hue` filter
const MAX_SATURATION: f64 = 10.0;

#[derive(Subcommand, strum::Display, Debug, Clone, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Effect {
    /// Run ffmpeg with arbitrary arguments placed between the input and output
    ///
    /// Example: fftest -vf "hue=h=90:s=2"
    #[command(name = "fftest")]
    FfTest {
        /// Arguments passed to ffmpeg as is
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Rotate the hue and scale the saturation of a video
    ///
    /// Example: huesaturation 180 2.0
    #[command(name = "huesaturation")]
    HueSaturation {
        /// Hue angle in degrees, taken modulo 360
        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        hue: i64,

        /// Saturation multiplier from -10 to 10
        #[arg(
            default_value_t = 1.0,
            allow_negative_numbers = true,
            value_parser = parse_saturation,
        )]
        saturation: f64,
    },

    /// Swirl the video around its center
    Swirl {
        /// Swirl angle in degrees from -360 to 360
        #[arg(
            default_value_t = 90,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(-MAX_SWIRL_DEGREES..=MAX_SWIRL_DEGREES),
        )]
        angle: i64,
    },

    /// Shift the pitch of the audio without changing its duration
    Pitch {
        /// Number of semitones from -24 to 24
        #[arg(
            default_value_t = 0.0,
            allow_negative_numbers = true,
            value_parser = parse_semitones,
        )]
        semitones: f64,
    },
}

impl Effect {
    /// Arguments for ffmpeg that go between the input and the output files.
    pub(crate) fn ffmpeg_args(&self) -> Vec<String> {
        match self {
            Self::FfTest { args } => args.clone(),
            Self::HueSaturation { hue, saturation } => {
                let hue = normalize_hue(*hue);
                vec!["-vf".to_owned(), format!("hue=h={hue}:s={saturation}")]
            }
            Self::Swirl { angle } => vec!["-vf".to_owned(), format!("swirl=degrees={angle}")],
            Self::Pitch { semitones } => vec!["-filter:a".to_owned(), pitch_filter(*semitones)],
        }
    }
}

pub(crate) fn normalize_hue(hue: i64) -> i64 {
    hue.rem_euclid(360)
}

/// Playback rate multiplier that raises the pitch by the given number of semitones.
pub(crate) fn pitch_rate(semitones: f64) -> f64 {
    2f64.powf(semitones / 12.0)
}

/// Splits the tempo factor into `atempo` stages each of which fits into
/// the range supported by ffmpeg. Their product equals the given `tempo`.
fn atempo_chain(tempo: f64) -> Vec<f64> {
    let mut rest = tempo;
    let mut chain = vec![];

    while rest < MIN_ATEMPO {
        chain.push(MIN_ATEMPO);
        rest /= MIN_ATEMPO;
    }
    while rest > MAX_ATEMPO {
        chain.push(MAX_ATEMPO);
        rest /= MAX_ATEMPO;
    }

    chain.push(rest);
    chain
}

fn pitch_filter(semitones: f64) -> String {
    let rate = pitch_rate(semitones);

    // Playing the samples at a higher rate raises the pitch but also speeds
    // the audio up, so the tempo is slowed down by the same factor.
    let atempo = atempo_chain(1.0 / rate)
        .into_iter()
        .format_with(",", |tempo, f| f(&format_args!("atempo={tempo}")));

    format!("asetrate={PITCH_SAMPLE_RATE}*{rate},aresample={PITCH_SAMPLE_RATE},{atempo}")
}

fn parse_finite(arg: &str) -> Result<f64> {
    let val: f64 = arg.parse()?;
    ensure!(val.is_finite(), "The value must be a finite number");
    Ok(val)
}

fn parse_saturation(arg: &str) -> Result<f64> {
    let val = parse_finite(arg)?;
    ensure!(
        (-MAX_SATURATION..=MAX_SATURATION).contains(&val),
        "Saturation must be in range from -{MAX_SATURATION} to {MAX_SATURATION}"
    );
    Ok(val)
}

fn parse_semitones(arg: &str) -> Result<f64> {
    let val = parse_finite(arg)?;
    ensure!(
        (-MAX_SEMITONES..=MAX_SEMITONES).contains(&val),
        "Semitones must be in range from -{MAX_SEMITONES} to {MAX_SEMITONES}"
    );
    Ok(val)
}
