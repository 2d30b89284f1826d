//! Delay and loop resolution for animated GIF output.
//!
//! The frame-control toggle and the frame selector jointly pick a
//! `(delay, loop)` pair from a fixed table. Lookup is total: any combination
//! not listed falls back to [`EncodingParameters::DEFAULT`].

use std::fmt;
use std::str::FromStr;

/// Animation mode chosen for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSelector {
    /// Loop forever.
    Loop,
    /// A numbered frame mode. Only 2 through 9 have table entries.
    Count(u32),
    /// Anything else; always resolves to the default parameters.
    Other(String),
}

impl FromStr for FrameSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("loop") {
            return Ok(FrameSelector::Loop);
        }
        // only canonical decimals select a count; "02" or "+2" do not
        Ok(match trimmed.parse::<u32>() {
            Ok(n) if n.to_string() == trimmed => FrameSelector::Count(n),
            _ => FrameSelector::Other(trimmed.to_string()),
        })
    }
}

impl fmt::Display for FrameSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSelector::Loop => f.write_str("Loop"),
            FrameSelector::Count(n) => write!(f, "{}", n),
            FrameSelector::Other(s) => f.write_str(s),
        }
    }
}

/// The `-delay` and `-loop` values handed to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingParameters {
    /// Frame delay in ticks (1/100 s).
    pub delay: i32,
    /// Number of animation loops; 0 means forever.
    pub loop_count: u32,
}

impl EncodingParameters {
    /// Used when no table row matches.
    pub const DEFAULT: EncodingParameters = EncodingParameters {
        delay: 500,
        loop_count: 0,
    };

    const fn new(delay: i32, loop_count: u32) -> Self {
        Self { delay, loop_count }
    }
}

/// Which toggle states a row applies to.
#[derive(Debug, Clone, Copy)]
enum Toggle {
    Any,
    On,
    Off,
}

impl Toggle {
    fn matches(self, frame_control: bool) -> bool {
        match self {
            Toggle::Any => true,
            Toggle::On => frame_control,
            Toggle::Off => !frame_control,
        }
    }
}

/// Which selectors a row applies to.
#[derive(Debug, Clone, Copy)]
enum Frames {
    Loop,
    Counts(&'static [u32]),
}

impl Frames {
    fn matches(self, selector: &FrameSelector) -> bool {
        match (self, selector) {
            (Frames::Loop, FrameSelector::Loop) => true,
            (Frames::Counts(counts), FrameSelector::Count(n)) => counts.contains(n),
            _ => false,
        }
    }
}

struct Row {
    toggle: Toggle,
    frames: Frames,
    params: EncodingParameters,
}

const fn row(toggle: Toggle, frames: Frames, delay: i32, loop_count: u32) -> Row {
    Row {
        toggle,
        frames,
        params: EncodingParameters::new(delay, loop_count),
    }
}

// The off/2 row carries a negative delay as it has always shipped. It is
// kept until the intended value is confirmed.
const TABLE: &[Row] = &[
    row(Toggle::Any, Frames::Loop, 300, 0),
    row(Toggle::On, Frames::Counts(&[2, 3, 4]), 300, 1),
    row(Toggle::Off, Frames::Counts(&[2]), -200, 5),
    row(Toggle::Off, Frames::Counts(&[3]), 200, 4),
    row(Toggle::Off, Frames::Counts(&[4]), 200, 3),
    row(Toggle::On, Frames::Counts(&[5, 6]), 250, 1),
    row(Toggle::Off, Frames::Counts(&[5]), 166, 3),
    row(Toggle::Off, Frames::Counts(&[6]), 150, 3),
    row(Toggle::On, Frames::Counts(&[7, 8, 9]), 200, 1),
    row(Toggle::Off, Frames::Counts(&[7]), 140, 3),
    row(Toggle::Off, Frames::Counts(&[8]), 166, 2),
    row(Toggle::Off, Frames::Counts(&[9]), 150, 2),
];

/// Resolve the encoding parameters for a toggle/selector pair.
///
/// # Example
///
/// ```
/// use gdnpro_magick::{resolve_parameters, EncodingParameters, FrameSelector};
///
/// let params = resolve_parameters(true, &FrameSelector::Loop);
/// assert_eq!(params, EncodingParameters { delay: 300, loop_count: 0 });
/// ```
pub fn resolve_parameters(frame_control: bool, frames: &FrameSelector) -> EncodingParameters {
    TABLE
        .iter()
        .find(|r| r.toggle.matches(frame_control) && r.frames.matches(frames))
        .map(|r| r.params)
        .unwrap_or(EncodingParameters::DEFAULT)
}
