//! End-to-end scenario tests driving a full `Runtime` the way IPC/topology
//! would: build a graph, negotiate params, trigger, run periods, and
//! inspect what reached (or didn't reach) the transport on the far side.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adsp_buffer::{Interleaving, SampleFormat, StreamParams};
use adsp_component::kernel::{GainKernel, KernelOp, SrcKernel, SrcMode};
use adsp_component::{Direction, GatewayTransport, TriggerCmd};
use adsp_core::{Q8_16, idc::idc_link};
use adsp_ipc::{CommandHandler, Dispatcher, MsgClass, PrimaryHeader, Request};
use adsp_pipeline::{PipelineState, TimeDomain};
use adsp_runtime::{ComponentSpec, Runtime};

/// A gateway transport backed by a shared queue, so a test can seed the
/// bytes a `Capture`-direction gateway pulls and read back the bytes a
/// `Playback`-direction gateway pushed, after the `Runtime` has taken
/// ownership of the boxed transport.
#[derive(Clone, Default)]
struct SharedQueue(Arc<Mutex<VecDeque<u8>>>);

impl SharedQueue {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(VecDeque::new())))
    }

    fn seed(&self, bytes: &[u8]) {
        self.0.lock().unwrap().extend(bytes.iter().copied());
    }

    fn drain_all(&self) -> Vec<u8> {
        self.0.lock().unwrap().drain(..).collect()
    }
}

impl GatewayTransport for SharedQueue {
    fn push_output(&mut self, frames: &[u8]) -> adsp_component::Result<()> {
        self.0.lock().unwrap().extend(frames.iter().copied());
        Ok(())
    }

    fn pull_input(&mut self, out: &mut [u8]) -> adsp_component::Result<()> {
        let mut q = self.0.lock().unwrap();
        for slot in out.iter_mut() {
            *slot = q.pop_front().unwrap_or(0);
        }
        Ok(())
    }
}

fn params(rate: u32) -> StreamParams {
    StreamParams { rate, channels: 1, format: SampleFormat::S16Le, interleaving: Interleaving::ChannelsSamplesInterleaved }
}

fn encode(samples: &[i32]) -> Vec<u8> {
    let mut out = vec![0u8; samples.len() * 2];
    adsp_component::encode_s16(samples, &mut out);
    out
}

fn decode(bytes: &[u8]) -> Vec<i32> {
    adsp_component::decode_s16(bytes)
}

/// E1: `host_comp -> buf_1 -> volume(gain=0.5) -> buf_2 -> dai_comp`. DAI
/// samples are the host's samples halved and saturated; 1000 periods run
/// with no xrun even though only the first period carries real data (the
/// host transport zero-fills once exhausted, matching a real mailbox with
/// nothing new written).
#[test]
fn e1_simple_playback_halves_host_samples_at_the_dai() {
    let frames = 8usize;
    let host_q = SharedQueue::new();
    let dai_q = SharedQueue::new();

    let input = vec![20_000i32, -20_000, 1000, -1000, 32_000, -32_000, 500, -500];
    host_q.seed(&encode(&input));

    let mut rt = Runtime::new(0);
    let pid = rt.alloc_pipeline_id();
    let host = rt.alloc_component_id();
    let volume = rt.alloc_component_id();
    let dai = rt.alloc_component_id();

    rt.comp_new(host, pid, Direction::Capture, ComponentSpec::Gateway { transport: Box::new(host_q.clone()) }, None).unwrap();
    rt.comp_new(volume, pid, Direction::Playback, ComponentSpec::Volume { gain: Q8_16::from_f64(0.5), bits: 16 }, None).unwrap();
    rt.comp_new(dai, pid, Direction::Playback, ComponentSpec::Gateway { transport: Box::new(dai_q.clone()) }, None).unwrap();

    let buf_a = rt.alloc_buffer_id();
    let buf_b = rt.alloc_buffer_id();
    rt.buffer_new(buf_a, frames * 2, false, false);
    rt.buffer_new(buf_b, frames * 2, false, false);
    rt.comp_connect(host, buf_a, volume).unwrap();
    rt.comp_connect(volume, buf_b, dai).unwrap();

    rt.pipe_new(pid, host, host, dai, 1000, 5, frames, TimeDomain::TimerIrq, 5_000);
    rt.pipe_complete(pid).unwrap();
    rt.pcm_params(pid, Direction::Playback, params(48_000)).unwrap();
    rt.trigger(pid, TriggerCmd::Start).unwrap();

    let mut expected = vec![Vec::new()];
    GainKernel::new(Q8_16::from_f64(0.5), 16).process(&[&input], &mut expected, frames).unwrap();

    assert!(!rt.run_period(pid).unwrap());
    let received = decode(&dai_q.drain_all());
    assert_eq!(received, expected[0]);

    for _ in 0..999 {
        assert!(!rt.run_period(pid).unwrap(), "no xrun expected once the host transport runs dry");
    }
}

/// E2: `host -> volume(0.5) -> src(44100->48000) -> dai`. The pipeline's
/// own plumbing (buffers, gateways) is exercised end to end; the expected
/// samples are derived by running the identical `GainKernel`/`SrcKernel`
/// pair directly on the same input, so the test proves the wiring
/// reproduces what the kernels alone would produce, not a hand-derived
/// reference signal.
#[test]
fn e2_rate_conversion_matches_kernels_run_directly() {
    let frames = 100usize;
    let host_q = SharedQueue::new();
    let dai_q = SharedQueue::new();

    let input: Vec<i32> = (0..frames as i32).map(|n| n * 37).collect();
    host_q.seed(&encode(&input));

    let mut rt = Runtime::new(0);
    let pid = rt.alloc_pipeline_id();
    let host = rt.alloc_component_id();
    let volume = rt.alloc_component_id();
    let src = rt.alloc_component_id();
    let dai = rt.alloc_component_id();

    rt.comp_new(host, pid, Direction::Capture, ComponentSpec::Gateway { transport: Box::new(host_q.clone()) }, None).unwrap();
    rt.comp_new(volume, pid, Direction::Playback, ComponentSpec::Volume { gain: Q8_16::from_f64(0.5), bits: 16 }, None).unwrap();
    rt.comp_new(
        src,
        pid,
        Direction::Playback,
        ComponentSpec::Src { input_rate: 44_100, output_rate: 48_000, mode: SrcMode::Nearest },
        None,
    )
    .unwrap();
    rt.comp_new(dai, pid, Direction::Playback, ComponentSpec::Gateway { transport: Box::new(dai_q.clone()) }, None).unwrap();

    let buf_a = rt.alloc_buffer_id();
    let buf_b = rt.alloc_buffer_id();
    let buf_c = rt.alloc_buffer_id();
    rt.buffer_new(buf_a, frames * 2, false, false);
    rt.buffer_new(buf_b, frames * 2, false, false);
    // The SRC upsamples, so its output buffer must hold more than one
    // period's worth of post-conversion bytes even though the downstream
    // DAI only ever drains `frames` samples per period.
    rt.buffer_new(buf_c, 512, false, false);
    rt.comp_connect(host, buf_a, volume).unwrap();
    rt.comp_connect(volume, buf_b, src).unwrap();
    rt.comp_connect(src, buf_c, dai).unwrap();

    rt.pipe_new(pid, host, host, dai, 1000, 5, frames, TimeDomain::TimerIrq, 5_000);
    rt.pipe_complete(pid).unwrap();
    rt.pcm_params(pid, Direction::Playback, params(44_100)).unwrap();
    rt.trigger(pid, TriggerCmd::Start).unwrap();
    assert!(!rt.run_period(pid).unwrap());

    let mut expected_volume = vec![Vec::new()];
    GainKernel::new(Q8_16::from_f64(0.5), 16).process(&[&input], &mut expected_volume, frames).unwrap();
    let mut expected_src = vec![Vec::new()];
    SrcKernel::new(44_100, 48_000, SrcMode::Nearest).process(&[&expected_volume[0]], &mut expected_src, frames).unwrap();
    assert!(expected_src[0].len() > frames, "an upsampling SRC must produce more frames than it consumed");

    let received = decode(&dai_q.drain_all());
    assert_eq!(received.len(), frames);
    assert_eq!(received, expected_src[0][..frames]);
}

/// E3: two host sources feed one mixer. `host_a` always delivers 0x1000,
/// `host_b` delivers 0x2000 until it stalls; `underrun_permitted` on
/// `host_b`'s buffer means the mixer keeps running on zero-filled silence
/// from that branch with no xrun once `host_b` stops being fed.
#[test]
fn e3_mixer_sums_two_sources_then_continues_after_one_stalls() {
    let frames = 4usize;
    let host_a_q = SharedQueue::new();
    let host_b_q = SharedQueue::new();
    let dai_q = SharedQueue::new();

    let mut rt = Runtime::new(0);
    let pid = rt.alloc_pipeline_id();
    let host_a = rt.alloc_component_id();
    let host_b = rt.alloc_component_id();
    let mixer = rt.alloc_component_id();
    let dai = rt.alloc_component_id();

    rt.comp_new(host_a, pid, Direction::Capture, ComponentSpec::Gateway { transport: Box::new(host_a_q.clone()) }, None).unwrap();
    rt.comp_new(host_b, pid, Direction::Capture, ComponentSpec::Gateway { transport: Box::new(host_b_q.clone()) }, None).unwrap();
    rt.comp_new(mixer, pid, Direction::Playback, ComponentSpec::Mixer { bits: 16 }, None).unwrap();
    rt.comp_new(dai, pid, Direction::Playback, ComponentSpec::Gateway { transport: Box::new(dai_q.clone()) }, None).unwrap();

    let buf_a = rt.alloc_buffer_id();
    let buf_b = rt.alloc_buffer_id();
    let buf_out = rt.alloc_buffer_id();
    rt.buffer_new(buf_a, frames * 2, false, false);
    // host_b's branch permits underrun: once it stalls, its buffer
    // zero-fills rather than surfacing an xrun on the shared pipeline.
    rt.buffer_new(buf_b, frames * 2, false, true);
    rt.buffer_new(buf_out, frames * 2, false, false);
    rt.comp_connect(host_a, buf_a, mixer).unwrap();
    rt.comp_connect(host_b, buf_b, mixer).unwrap();
    rt.comp_connect(mixer, buf_out, dai).unwrap();

    rt.pipe_new(pid, mixer, host_a, dai, 1000, 5, frames, TimeDomain::TimerIrq, 5_000);
    rt.pipe_complete(pid).unwrap();
    rt.pcm_params(pid, Direction::Playback, params(48_000)).unwrap();
    rt.trigger(pid, TriggerCmd::Start).unwrap();

    // Feed both sources for the first period: the scheduling walk starts at
    // `mixer`, so host_a/host_b's own `copy()` (which pulls from their
    // transport into their buffer) has to be pumped explicitly first, the
    // way an interrupt-driven DMA fill would run ahead of the scheduler.
    host_a_q.seed(&encode(&[0x1000; 4]));
    host_b_q.seed(&encode(&[0x2000; 4]));
    rt.graph.run_period(host_a, frames).unwrap();
    rt.graph.run_period(host_b, frames).unwrap();
    assert!(!rt.run_period(pid).unwrap());
    assert_eq!(decode(&dai_q.drain_all()), vec![0x3000; 4]);

    // host_b stalls: only host_a is pumped this period.
    host_a_q.seed(&encode(&[0x1000; 4]));
    rt.graph.run_period(host_a, frames).unwrap();
    assert!(!rt.run_period(pid).unwrap(), "underrun_permitted on host_b's buffer must absorb the stall without an xrun");
    assert_eq!(decode(&dai_q.drain_all()), vec![0x1000; 4]);
}

/// E4: `host(core=0) -> buf -> dai(core=1)`. `trigger(start)` issued to
/// core 0 crosses to core 1 over an IDC link and core 1's pipeline reaches
/// `Active`, observed by core 0 as the call's successful return. The DAI
/// endpoint is a real `adsp_dai::DaiGateway`, not the generic simulated
/// transport, so its LLP slot advances as core 1 runs periods; core 0
/// observes that advance through a clone of the same `DaiRegistry` (LLP
/// position is host-pollable without claiming the DAI, mirroring a real
/// cross-core position query).
#[test]
fn e4_cross_core_trigger_reaches_active_over_idc() {
    let mut core1 = Runtime::new(1);
    let pid = core1.alloc_pipeline_id();
    let host = core1.alloc_component_id();
    let dai = core1.alloc_component_id();

    core1.comp_new(host, pid, Direction::Capture, ComponentSpec::Gateway { transport: Box::new(SharedQueue::new()) }, None).unwrap();
    core1
        .comp_new(
            dai,
            pid,
            Direction::Playback,
            ComponentSpec::DaiGateway { dai_type: adsp_dai::DaiType::Ssp, instance: 0, ring_capacity: 256 },
            None,
        )
        .unwrap();
    let buf = core1.alloc_buffer_id();
    core1.buffer_new(buf, 256, false, true);
    core1.comp_connect(host, buf, dai).unwrap();
    core1.pipe_new(pid, host, host, dai, 1000, 5, 8, TimeDomain::TimerIrq, 5_000);
    core1.pipe_complete(pid).unwrap();
    core1.pcm_params(pid, Direction::Playback, params(48_000)).unwrap();

    // Core 0's view of the same DAI registry: cloning an `Arc`-backed
    // registry, the way the IDC link below already crosses "cores" over
    // shared memory rather than real inter-core hardware.
    let core0_dais = core1.dais.clone();

    let (mut caller, mut responder) = idc_link::<TriggerCmd, bool>(4);
    let handle = std::thread::spawn(move || {
        while !responder.poll_once(|cmd| {
            core1.trigger(pid, cmd).unwrap();
            core1.pipelines[&pid].state() == PipelineState::Active
        }) {
            std::thread::yield_now();
        }
        for _ in 0..4 {
            core1.run_period(pid).unwrap();
        }
        core1
    });

    // core 0 has no pipeline of its own in this scenario; it only issues
    // the cross-core trigger and observes the result.
    let reached_active = caller.call_remote(TriggerCmd::Start, Duration::from_secs(2)).unwrap();
    assert!(reached_active);

    let core1 = handle.join().unwrap();
    assert_eq!(core1.pipelines[&pid].state(), PipelineState::Active);

    let llp = core0_dais.read_llp(adsp_dai::DaiType::Ssp, 0).unwrap();
    assert!(llp > 0, "LLP slot for the DAI must have advanced as observed from core 0");
}

/// E6: an 8 KiB config blob arrives as 4 x 2 KiB `set_config` fragments
/// (`first, middle, middle, last`); the handler only sees the concatenated
/// whole on the last fragment. An interleaved out-of-order fragment (a
/// second `first` before the in-flight assembly finishes) is rejected with
/// `bad_state` rather than silently corrupting the pending assembly.
#[test]
fn e6_large_config_fragments_reassemble_in_order_and_reject_interleaving() {
    #[derive(Clone, Default)]
    struct RecordingHandler {
        last_payload: Arc<Mutex<Option<Vec<u8>>>>,
    }

    impl CommandHandler for RecordingHandler {
        fn handle(&mut self, request: Request<'_>) -> std::result::Result<(), adsp_core::CoreError> {
            *self.last_payload.lock().unwrap() = Some(request.payload.to_vec());
            Ok(())
        }
    }

    fn fragment_payload(param_id: u32, offset: u32, total_len: u32, position: u8, bytes: &[u8]) -> Vec<u8> {
        let mut out = param_id.to_le_bytes().to_vec();
        out.extend(offset.to_le_bytes());
        out.extend(total_len.to_le_bytes());
        out.push(position);
        out.extend_from_slice(bytes);
        out
    }

    const CHUNK: usize = 2 * 1024;
    const TOTAL: usize = 4 * CHUNK;
    let blob: Vec<u8> = (0..TOTAL).map(|i| (i % 256) as u8).collect();

    let recording = RecordingHandler::default();
    let mut dispatcher = Dispatcher::new(recording.clone(), 4, 1);
    let req = PrimaryHeader::request(MsgClass::GlbTplg, adsp_ipc::GlbTplgCmd::DaiConfig.as_u8(), 0).to_u32();

    let positions = [0u8, 1, 1, 2]; // first, middle, middle, last
    for (i, &position) in positions.iter().enumerate() {
        let offset = (i * CHUNK) as u32;
        let chunk = &blob[i * CHUNK..(i + 1) * CHUNK];
        let payload = fragment_payload(7, offset, TOTAL as u32, position, chunk);
        let reply = dispatcher.dispatch(req, &payload);
        assert_eq!(reply & 0x00ff_ffff, 0, "fragment {i} must be accepted");
    }
    assert_eq!(recording.last_payload.lock().unwrap().as_deref(), Some(blob.as_slice()));

    // A fresh `first` fragment for a new assembly while none is pending is
    // fine; but sending a `middle` for a param_id that never had a `first`
    // (simulating a fragment arriving out of order / interleaved with
    // another transfer) must be rejected rather than accepted silently.
    let stray_middle = fragment_payload(9, CHUNK as u32, TOTAL as u32, 1, &blob[..CHUNK]);
    let reply = dispatcher.dispatch(req, &stray_middle);
    assert_ne!(reply & 0x00ff_ffff, 0, "a middle fragment with no preceding first must be rejected");
}

/// E5: E1's topology, but `host` is an independent producer pumped
/// explicitly (the way an interrupt-driven DMA fill runs ahead of the
/// scheduler, as in E3) rather than the pipeline's own scheduling
/// component — `dai` is scheduled instead, so a period where `host` isn't
/// pumped genuinely starves `buf` instead of always refilling it first.
/// Within that one period an xrun notification is raised and the pipeline
/// moves to `error_stop`; `reset` then a fresh `trigger(start)` (no
/// firmware reset, no graph rebuild) resumes clean playback.
#[test]
fn e5_xrun_recovery_reports_once_then_restarts_cleanly() {
    let frames = 4usize;
    let host_q = SharedQueue::new();
    let dai_q = SharedQueue::new();

    let mut rt = Runtime::new(0);
    let pid = rt.alloc_pipeline_id();
    let host = rt.alloc_component_id();
    let dai = rt.alloc_component_id();

    rt.comp_new(host, pid, Direction::Capture, ComponentSpec::Gateway { transport: Box::new(host_q.clone()) }, None).unwrap();
    rt.comp_new(dai, pid, Direction::Playback, ComponentSpec::Gateway { transport: Box::new(dai_q.clone()) }, None).unwrap();
    let buf = rt.alloc_buffer_id();
    // No underrun_permitted: once `host` stops being pumped, `dai`'s
    // consume of an empty buffer must surface as an xrun.
    rt.buffer_new(buf, frames * 2, false, false);
    rt.comp_connect(host, buf, dai).unwrap();

    // sched_comp = dai: the scheduled walk only drains `buf`, it never
    // calls `host`'s own `copy()`.
    // xrun_limit_usecs=0: the very first xrun this period crosses the
    // threshold and is reported immediately rather than accumulated.
    rt.pipe_new(pid, dai, host, dai, 1000, 5, frames, TimeDomain::TimerIrq, 0);
    rt.pipe_complete(pid).unwrap();
    rt.pcm_params(pid, Direction::Playback, params(48_000)).unwrap();
    rt.trigger(pid, TriggerCmd::Start).unwrap();

    host_q.seed(&encode(&[111, 222, 333, 444]));
    rt.graph.run_period(host, frames).unwrap();
    assert!(!rt.run_period(pid).unwrap());
    assert_eq!(decode(&dai_q.drain_all()), vec![111, 222, 333, 444]);

    // host goes silent for a period: nothing is pumped into `buf` before
    // `dai` drains it, so this period genuinely starves.
    let xrun_reported = rt.run_period(pid).unwrap();
    assert!(xrun_reported, "the first period with nothing in the buffer must cross the zero xrun threshold");
    assert_eq!(rt.pipelines[&pid].state(), PipelineState::ErrorStop);

    rt.trigger(pid, TriggerCmd::Reset).unwrap();
    assert_eq!(rt.pipelines[&pid].state(), PipelineState::Ready);
    rt.pcm_params(pid, Direction::Playback, params(48_000)).unwrap();
    rt.trigger(pid, TriggerCmd::Start).unwrap();
    assert_eq!(rt.pipelines[&pid].state(), PipelineState::Active);

    host_q.seed(&encode(&[9, 8, 7, 6]));
    rt.graph.run_period(host, frames).unwrap();
    assert!(!rt.run_period(pid).unwrap(), "a fully re-pumped period after recovery must not xrun");
    assert_eq!(decode(&dai_q.drain_all()), vec![9, 8, 7, 6]);
}
