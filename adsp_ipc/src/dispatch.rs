//! Dispatch loop (§4.6): decode the primary header from the inbox, run the
//! matching handler, write the reply to the outbox. A request cannot start
//! while another is in flight; a second arriving request is answered
//! `busy` without ever reaching the handler.
//!
//! `adsp_ipc` does not know how to execute `comp_new`/`pipe_new`/`trigger`
//! itself — that means touching the pipeline graph, which lives in
//! `adsp_pipeline`. Instead callers implement [`CommandHandler`] and hand
//! it to a [`Dispatcher`]; the runtime crate is where the two meet.

use adsp_core::CoreError;

use crate::class::validate_subcmd;
use crate::error::{IpcError, Result};
use crate::fragment::{FragmentPosition, Reassembler};
use crate::header::{MsgClass, MsgDirection, PrimaryHeader};
use crate::notify::{Notification, NotifyRing};
use crate::reply::ReplyStatus;

/// A decoded request ready for a handler: the header plus whatever payload
/// bytes followed it (already reassembled, if it was a fragmented
/// large-config transfer).
pub struct Request<'a> {
    pub header: PrimaryHeader,
    pub payload: &'a [u8],
}

/// Implemented by whatever owns the pipeline graph and component/DAI
/// registries. Returning `Ok(())` replies success; returning `Err` maps the
/// `CoreError` straight to a reply status.
pub trait CommandHandler {
    fn handle(&mut self, request: Request<'_>) -> std::result::Result<(), CoreError>;
}

/// A single in-flight request's class/subcmd/primary-specific, held so a
/// second arriving request before the first acks is answered `busy`.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    class: MsgClass,
    subcmd: u8,
    primary_specific: u16,
}

pub struct Dispatcher<H: CommandHandler> {
    handler: H,
    in_flight: Option<InFlight>,
    reassembler: Reassembler,
    notifications: NotifyRing,
}

/// Header layout for a `set_config` large-config fragment: the
/// command-specific payload opens with `param_id: u32, offset: u32,
/// total_len: u32, position: u8`, followed by the fragment bytes.
fn parse_fragment_header(payload: &[u8]) -> Result<(u32, u32, u32, FragmentPosition, &[u8])> {
    if payload.len() < 13 {
        return Err(IpcError::BadParam);
    }
    let param_id = u32::from_le_bytes(payload[0..4].try_into().unwrap());
    let offset = u32::from_le_bytes(payload[4..8].try_into().unwrap());
    let total_len = u32::from_le_bytes(payload[8..12].try_into().unwrap());
    let position = match payload[12] {
        0 => FragmentPosition::First,
        1 => FragmentPosition::Middle,
        2 => FragmentPosition::Last,
        3 => FragmentPosition::Single,
        _ => return Err(IpcError::BadParam),
    };
    Ok((param_id, offset, total_len, position, &payload[13..]))
}

impl<H: CommandHandler> Dispatcher<H> {
    pub fn new(handler: H, notify_capacity: usize, notify_reserved: usize) -> Self {
        Self {
            handler,
            in_flight: None,
            reassembler: Reassembler::new(),
            notifications: NotifyRing::new(notify_capacity, notify_reserved),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Handle one inbox message: `raw_header` is the 32-bit primary header
    /// word, `payload` the bytes that followed it. Returns the 32-bit reply
    /// header word to write to the outbox (header re-used for the status).
    ///
    /// `dai_config` is the one GLB_TPLG subcommand whose payload (§6.5) the
    /// dispatcher must treat as opaque and forward unexamined to the
    /// handler, rather than attempt fragment/TLV interpretation on it.
    pub fn dispatch(&mut self, raw_header: u32, payload: &[u8]) -> u32 {
        let header = match PrimaryHeader::from_u32(raw_header) {
            Ok(h) => h,
            Err(e) => return self.reply_raw(MsgClass::GlbTplg, 0, 0, e.into()),
        };

        if header.direction != MsgDirection::Request {
            return self.reply_raw(header.class, header.subcmd, header.primary_specific, IpcError::BadParam.into());
        }

        if self.in_flight.is_some() {
            tracing::warn!(class = ?header.class, subcmd = header.subcmd, "request rejected: dispatcher busy");
            return self.reply(header, ReplyStatus::from(IpcError::Busy));
        }
        if let Err(e) = validate_subcmd(header.class, header.subcmd) {
            tracing::warn!(class = ?header.class, subcmd = header.subcmd, "request rejected: unknown subcmd");
            return self.reply(header, e.into());
        }

        self.in_flight =
            Some(InFlight { class: header.class, subcmd: header.subcmd, primary_specific: header.primary_specific });

        let is_large_config =
            matches!(header.class, MsgClass::GlbTplg) && header.subcmd == crate::class::GlbTplgCmd::DaiConfig.as_u8();

        let status = if is_large_config {
            self.dispatch_fragment(header, payload)
        } else {
            match self.handler.handle(Request { header, payload }) {
                Ok(()) => ReplyStatus::SUCCESS,
                Err(e) => ReplyStatus::from(e),
            }
        };

        self.in_flight = None;
        self.reply(header, status)
    }

    fn dispatch_fragment(&mut self, header: PrimaryHeader, payload: &[u8]) -> ReplyStatus {
        let (param_id, offset, total_len, position, fragment) = match parse_fragment_header(payload) {
            Ok(v) => v,
            Err(e) => return e.into(),
        };
        match self.reassembler.accept(param_id, offset as usize, total_len as usize, fragment, position) {
            Ok(Some(complete)) => match self.handler.handle(Request { header, payload: &complete }) {
                Ok(()) => ReplyStatus::SUCCESS,
                Err(e) => ReplyStatus::from(e),
            },
            Ok(None) => ReplyStatus::SUCCESS,
            Err(e) => e.into(),
        }
    }

    fn reply(&self, header: PrimaryHeader, status: ReplyStatus) -> u32 {
        self.reply_raw(header.class, header.subcmd, header.primary_specific, status)
    }

    fn reply_raw(&self, class: MsgClass, subcmd: u8, primary_specific: u16, status: ReplyStatus) -> u32 {
        let reply = PrimaryHeader::request(class, subcmd, primary_specific).reply_header();
        (reply.to_u32() & !0x00ff_ffff) | status.to_u32()
    }

    /// Queue a dsp->host notification. See [`NotifyRing`] for the
    /// drop-safe/reserved-slot policy.
    pub fn notify(&mut self, notification: Notification) -> Result<()> {
        self.notifications.push(notification)
    }

    pub fn poll_notification(&mut self) -> Option<Notification> {
        self.notifications.pop()
    }
}
