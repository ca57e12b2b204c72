use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

const TIMING_SEPARATOR: &str = " --> ";
const BLOCK_SEPARATOR: &str = "\n\n";
const MIN_BLOCK_LINES: usize = 3;

// seconds and the millisecond field are kept apart so as_seconds() sums
// them instead of dividing a millisecond total
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamp {
    seconds: u64,
    millis: u64,
}

impl Timestamp {
    pub fn from_parts(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<Self> {
        let seconds = hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)?;
        // total must also fit as signed milliseconds
        let total = seconds.checked_mul(1000)?.checked_add(millis)?;
        i64::try_from(total).ok()?;
        Some(Self { seconds, millis })
    }

    pub fn as_millis(&self) -> i64 {
        (self.seconds * 1000 + self.millis) as i64
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds as f64 + self.millis as f64 / 1000.0
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.as_millis() == other.as_millis()
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_millis().cmp(&other.as_millis())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.as_millis();
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            ms / 3_600_000,
            (ms % 3_600_000) / 60_000,
            (ms % 60_000) / 1000,
            ms % 1000
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("expected HH:MM:SS,mmm, got {0:?}")]
    Format(String),

    #[error("invalid {field} {value:?} in {input:?}")]
    Component {
        field: &'static str,
        value: String,
        input: String,
    },

    #[error("timestamp {0:?} is out of range")]
    OutOfRange(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("timing line {0:?} has no \" --> \" separator")]
    MissingSeparator(String),

    #[error("bad start time: {0}")]
    Start(TimestampError),

    #[error("bad end time: {0}")]
    End(TimestampError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: Timestamp,
    pub end: Timestamp,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBlock {
    // 1-based
    pub index: usize,
    pub error: BlockError,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Parsed {
    pub cues: Vec<Cue>,
    pub skipped: Vec<SkippedBlock>,
}

pub fn parse_timestamp(input: &str) -> Result<Timestamp, TimestampError> {
    let input = input.trim();
    let format_error = || TimestampError::Format(input.to_string());

    let mut fields = input.split(':');
    let (Some(hours), Some(minutes), Some(rest), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(format_error());
    };
    let (seconds, millis) = rest.split_once(',').ok_or_else(format_error)?;

    let component = |field: &'static str, value: &str| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| TimestampError::Component {
                field,
                value: value.to_string(),
                input: input.to_string(),
            })
    };

    Timestamp::from_parts(
        component("hours", hours)?,
        component("minutes", minutes)?,
        component("seconds", seconds)?,
        component("milliseconds", millis)?,
    )
    .ok_or_else(|| TimestampError::OutOfRange(input.to_string()))
}

/// Splits SubRip text into cues.
///
/// Blocks with fewer than three lines are dropped without a trace. Blocks
/// whose timing line is unusable are dropped too, but reported in
/// [`Parsed::skipped`] so the caller can log them.
pub fn parse_srt(content: &str) -> Parsed {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut parsed = Parsed::default();

    for (i, block) in content.trim().split(BLOCK_SEPARATOR).enumerate() {
        // runs of 3+ newlines leave stray newlines at the block edges
        let lines: Vec<&str> = block.trim_matches('\n').split('\n').collect();
        if lines.len() < MIN_BLOCK_LINES {
            continue;
        }

        match parse_block(&lines) {
            Ok(cue) => parsed.cues.push(cue),
            Err(error) => parsed.skipped.push(SkippedBlock {
                index: i + 1,
                error,
            }),
        }
    }

    parsed
}

fn parse_block(lines: &[&str]) -> Result<Cue, BlockError> {
    // lines[0] is the sequence number, not needed
    let timing = lines[1];
    let (start, end) = timing
        .split_once(TIMING_SEPARATOR)
        .ok_or_else(|| BlockError::MissingSeparator(timing.to_string()))?;

    // SRT allows display coordinates after the end time (`X1:.. X2:..`)
    let end = end.split_whitespace().next().unwrap_or(end);

    Ok(Cue {
        start: parse_timestamp(start).map_err(BlockError::Start)?,
        end: parse_timestamp(end).map_err(BlockError::End)?,
        text: lines[2..].join(" ").trim().to_string(),
    })
}
