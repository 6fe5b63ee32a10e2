mod session;
mod settings;

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use log::{debug, info, warn};
use midir::{MidiIO, MidiInput, MidiOutput, MidiOutputConnection};
use midly::MidiMessage;
use midly::live::LiveEvent;
use num_derive::FromPrimitive;

use mackie_library::NUM_CHANNEL_STRIPS;
use mackie_library::controller::MainDisplayController;
use mackie_library::display::SysexSink;

use crate::self_test::self_test;
use crate::session::Session;
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[clap(
    name = "Platform M+ Mackie Control display driver",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Args {
    #[clap(short, long, help = "Config file (see example_config.toml)")]
    config: Option<String>,

    #[clap(short, long, help = "Show text on the displays and exit")]
    text: Option<String>,
}

/// Mackie Control switch ids (MIDI note numbers) the driver reacts to.
/// The remaining ids on the surface map to fader and transport
/// functions handled by the host, not by the displays.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq)]
enum SwitchId {
    AssignIo = 40,
    AssignSends = 41,
    AssignPan = 42,
    AssignPlugins = 43,
    AssignEq = 44,
    AssignDynamics = 45,
    BankLeft = 46,
    BankRight = 47,
    ChannelLeft = 48,
    ChannelRight = 49,
    Returns = 51,
    NameValue = 52,
    SmpteBeats = 53,
    Stop = 93,
    Play = 94,
}

/// Routes engine frames to the hardware. Send failures are logged and
/// dropped; display writes must never stall the tick loop.
struct MidiSink {
    connection: MidiOutputConnection,
}

impl SysexSink for MidiSink {
    fn send_sysex(&mut self, frame: &[u8]) {
        if let Err(err) = self.connection.send(frame) {
            warn!("dropping display frame: {err}");
        }
    }
}

fn find_port<T: MidiIO>(io: &T, name: &str) -> Result<T::Port> {
    io.ports()
        .into_iter()
        .find(|port| io.port_name(port).ok().as_deref() == Some(name))
        .with_context(|| format!("MIDI port {name:?} not found"))
}

/// Extracts a handled switch press from a raw MIDI message. The
/// surface reports button presses as note-ons with velocity 127.
fn parse_switch(message: &[u8]) -> Option<SwitchId> {
    match LiveEvent::parse(message).ok()? {
        LiveEvent::Midi {
            message: MidiMessage::NoteOn { key, vel },
            ..
        } if vel.as_int() > 0 => num::FromPrimitive::from_u8(key.as_int()),
        _ => None,
    }
}

fn handle_switch(
    controller: &mut MainDisplayController,
    session: &mut Session,
    settings: &Settings,
    out: &mut dyn SysexSink,
    switch: SwitchId,
) {
    debug!("switch {switch:?}");
    let duration = settings.info_duration_ticks;
    match switch {
        SwitchId::SmpteBeats => controller.toggle_time_mode(session, out),
        SwitchId::NameValue => {
            let enabled = !controller.meters_enabled();
            controller.enable_meters(enabled);
        }
        SwitchId::Returns => {
            let show = !controller.returns_shown();
            controller.set_show_return_track_names(show);
        }
        SwitchId::Play => session.set_playing(true),
        SwitchId::Stop => session.set_playing(false),
        SwitchId::BankLeft => {
            let offset = controller.channel_offset().saturating_sub(NUM_CHANNEL_STRIPS);
            controller.set_channel_offset(offset);
        }
        SwitchId::BankRight => {
            controller.set_channel_offset(controller.channel_offset() + NUM_CHANNEL_STRIPS);
        }
        SwitchId::ChannelLeft => {
            let offset = controller.channel_offset().saturating_sub(1);
            controller.set_channel_offset(offset);
        }
        SwitchId::ChannelRight => {
            controller.set_channel_offset(controller.channel_offset() + 1);
        }
        SwitchId::AssignPan => {
            controller.set_parameters(Some(session.pan_parameters(controller.strip_count())));
            controller.show_assignment_status("Pan", "", duration, out);
        }
        SwitchId::AssignSends => {
            controller
                .set_channel_strip_strings(Some(session.send_levels(controller.strip_count())));
            controller.show_assignment_status("Sends", "", duration, out);
        }
        SwitchId::AssignIo => {
            controller.set_channel_strip_strings(Some(session.io_labels(controller.strip_count())));
            controller.show_assignment_status("Input/Output", "", duration, out);
        }
        SwitchId::AssignPlugins => {
            controller.set_parameters(None);
            controller.show_assignment_status("Plug-ins", "", duration, out);
        }
        SwitchId::AssignEq => {
            controller.set_parameters(None);
            controller.show_assignment_status("EQ", "", duration, out);
        }
        SwitchId::AssignDynamics => {
            controller.set_parameters(None);
            controller.show_assignment_status("Dynamics", "", duration, out);
        }
    }
}

fn main_loop(
    controller: &mut MainDisplayController,
    session: &mut Session,
    rx: &mpsc::Receiver<SwitchId>,
    sink: &mut MidiSink,
    settings: &Settings,
) {
    let tick = Duration::from_millis(settings.tick_ms);
    loop {
        // Drain edge-triggered input events before rendering, so mode
        // toggles never happen inside a render pass.
        loop {
            match rx.try_recv() {
                Ok(switch) => handle_switch(controller, session, settings, sink, switch),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }
        session.advance();
        controller.on_tick(session, sink);
        thread::sleep(tick);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = Config::builder();
    if let Some(config_fn) = &args.config {
        cfg = cfg.add_source(config::File::with_name(config_fn));
    }
    let cfg = cfg.build().context("Can't create settings")?;
    let settings: Settings = cfg.try_deserialize().context("Can't parse settings")?;
    settings.validate().map_err(anyhow::Error::msg)?;
    info!("running with settings: {settings:?}");

    let output = MidiOutput::new("Platform M+ display driver")?;
    let output_port = find_port(&output, &settings.output_port)?;
    let connection = output
        .connect(&output_port, "platform-display")
        .map_err(|err| anyhow::anyhow!("couldn't connect MIDI output: {err}"))?;
    let mut sink = MidiSink { connection };
    info!("MIDI output {:?} connected", settings.output_port);

    let mut controller = MainDisplayController::new();
    controller.set_extensions(settings.left_extensions, settings.right_extensions);
    let mut session = Session::new(&settings);
    let tick = Duration::from_millis(settings.tick_ms);

    // If --text is provided, just show the text and leave (no MIDI
    // input needed).
    if let Some(text) = args.text {
        controller.show_assignment_status(&text, "", 30, &mut sink);
        for _ in 0..30 {
            controller.on_tick(&session, &mut sink);
            thread::sleep(tick);
        }
        controller.teardown(&mut sink);
        return Ok(());
    }

    let input = MidiInput::new("Platform M+ display driver in")?;
    let input_port = find_port(&input, &settings.input_port)?;
    let (tx, rx) = mpsc::channel();
    let _input_connection = input
        .connect(
            &input_port,
            "platform-display-in",
            move |_timestamp, message, _| {
                if let Some(switch) = parse_switch(message) {
                    let _ = tx.send(switch);
                }
            },
            (),
        )
        .map_err(|err| anyhow::anyhow!("couldn't connect MIDI input: {err}"))?;
    info!("MIDI input {:?} connected", settings.input_port);

    self_test(&mut controller, &session, &mut sink, tick);

    main_loop(&mut controller, &mut session, &rx, &mut sink, &settings);

    // Best effort: leave the offline banner on the hardware.
    controller.teardown(&mut sink);
    Ok(())
}
