//! Timestamp sub-interface (§4.4): `ts_config/ts_start/ts_stop/ts_get`
//! for precision position reporting, mirroring `struct timestamp_ops` in the
//! original `dai.h`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallclockSample {
    pub walclock: u64,
    pub sample_count: u64,
    pub walclock_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TsConfig {
    pub walclock_rate: u32,
}
