//! `ComponentKind`: the 18 `SOF_COMP_*` variants, kept as a plain enum used
//! only for introspection, logging, and topology decoding. Dispatch never
//! switches on this — it goes through the `ComponentOps` vtable (a trait
//! object, not this enum).

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Host,
    Dai,
    Buffer,
    Volume,
    Mixer,
    Mux,
    Demux,
    Src,
    Asrc,
    Tone,
    EqIir,
    EqFir,
    KeywordDetect,
    Kpb,
    Selector,
    DcBlock,
    SmartAmp,
    ModuleAdapter,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Host => "host",
            ComponentKind::Dai => "dai",
            ComponentKind::Buffer => "buffer",
            ComponentKind::Volume => "volume",
            ComponentKind::Mixer => "mixer",
            ComponentKind::Mux => "mux",
            ComponentKind::Demux => "demux",
            ComponentKind::Src => "src",
            ComponentKind::Asrc => "asrc",
            ComponentKind::Tone => "tone",
            ComponentKind::EqIir => "eq_iir",
            ComponentKind::EqFir => "eq_fir",
            ComponentKind::KeywordDetect => "keyword_detect",
            ComponentKind::Kpb => "kpb",
            ComponentKind::Selector => "selector",
            ComponentKind::DcBlock => "dcblock",
            ComponentKind::SmartAmp => "smart_amp",
            ComponentKind::ModuleAdapter => "module_adapter",
        };
        write!(f, "{name}")
    }
}
