//! Stream parameters: sample format, channel count/rate, interleaving.

use core::fmt;

/// Sample container format. Sample byte widths per the audio data formats
/// table: 2, 4, 4, 4 respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    S16Le,
    S24Le,
    S32Le,
    FloatLe,
}

impl SampleFormat {
    /// Container size in bytes for one sample of this format.
    pub const fn sample_bytes(self) -> usize {
        match self {
            SampleFormat::S16Le => 2,
            SampleFormat::S24Le => 4,
            SampleFormat::S32Le => 4,
            SampleFormat::FloatLe => 4,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleFormat::S16Le => "s16_le",
            SampleFormat::S24Le => "s24_le",
            SampleFormat::S32Le => "s32_le",
            SampleFormat::FloatLe => "float_le",
        };
        write!(f, "{name}")
    }
}

/// Sample interleaving layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interleaving {
    /// L1 R1 L2 R2 ... (the default).
    ChannelsSamplesInterleaved,
    /// L1..Ln R1..Rn.
    ChannelsBlocksInterleaved,
}

/// Stream parameters carried by an audio buffer once they have been set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamParams {
    pub rate: u32,
    pub channels: u16,
    pub format: SampleFormat,
    pub interleaving: Interleaving,
}

impl StreamParams {
    /// `frame_bytes = channels * sample_bytes(format)`.
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * self.format.sample_bytes()
    }

    /// `period_bytes = frames * frame_bytes`.
    pub fn period_bytes(&self, frames: usize) -> usize {
        frames * self.frame_bytes()
    }
}

/// How `set_params` resolves a parameter set already installed on a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetParamsMode {
    /// Only install if unset; fail with a conflict if already set to a
    /// different value.
    IfUnset,
    /// Overwrite unconditionally.
    Force,
}
