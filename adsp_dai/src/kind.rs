//! The heterogeneous zoo of physical audio transports a DAI gateway can
//! front. Kept as a plain enum — unlike [`adsp_component::ComponentKind`] it
//! is a genuine registry key (see [`crate::registry::DaiRegistry`]), not an
//! introspection tag competing with vtable dispatch.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DaiType {
    Ssp,
    Dmic,
    I2s,
    Alh,
    Sai,
    Hda,
    HostDma,
    LinkDma,
}

impl core::fmt::Display for DaiType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            DaiType::Ssp => "ssp",
            DaiType::Dmic => "dmic",
            DaiType::I2s => "i2s",
            DaiType::Alh => "alh",
            DaiType::Sai => "sai",
            DaiType::Hda => "hda",
            DaiType::HostDma => "host_dma",
            DaiType::LinkDma => "link_dma",
        };
        f.write_str(name)
    }
}
