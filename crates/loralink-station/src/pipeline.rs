use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use loralink_frame::{
    classify, decode_frame, encode_custom, encode_gps, encode_predefined, Classification,
    DeviceSession, Frame, FrameBody,
};
use loralink_transport::RadioLink;
use tracing::{debug, info, info_span, warn};

use crate::command::{parse_line, Command};
use crate::error::{Result, StationError};
use crate::queue::{command_queue, CommandReceiver, CommandSender, DEFAULT_QUEUE_CAPACITY};
use crate::report::{Reporter, StationEvent};
use crate::role::StationRole;
use crate::selection::{
    ButtonPoller, ButtonSource, Display, DisplayRenderer, InboxEntry, Selection,
};
use crate::signal::SignalReading;

/// How long an idle transmitter waits on the queue before rechecking shutdown.
const TRANSMIT_IDLE_WAIT: Duration = Duration::from_millis(100);

/// Cooperative stop flag shared by every role of a station.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Station configuration.
#[derive(Debug, Clone)]
pub struct StationConfig {
    pub role: StationRole,
    /// Command queue depth. Default: 10.
    pub queue_capacity: usize,
    /// Pause between radio polls. Default: 10 ms.
    pub receive_interval: Duration,
    /// Pause between input reads. Default: 50 ms.
    pub input_interval: Duration,
    /// Pause after each transmission. Default: 10 ms.
    pub transmit_interval: Duration,
    /// Pause between button samples. Default: 50 ms.
    pub button_interval: Duration,
    /// Display refresh period. Default: 100 ms.
    pub render_interval: Duration,
}

impl StationConfig {
    pub fn for_role(role: StationRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            role: StationRole::Base,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            receive_interval: Duration::from_millis(10),
            input_interval: Duration::from_millis(50),
            transmit_interval: Duration::from_millis(10),
            button_interval: Duration::from_millis(50),
            render_interval: Duration::from_millis(100),
        }
    }
}

/// Line-oriented operator input.
pub trait TextInput: Send {
    /// Read one line, blocking. `Ok(None)` at end of input.
    ///
    /// An [`io::ErrorKind::InvalidData`] error skips the line; any other
    /// error ends input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// [`TextInput`] over any buffered reader (stdin, a file, a cursor).
///
/// Bytes that are not UTF-8 are replaced, never rejected.
#[derive(Debug)]
pub struct LineInput<R> {
    reader: R,
}

impl<R> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead + Send> TextInput for LineInput<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line)? {
            0 => Ok(None),
            _ => Ok(Some(String::from_utf8_lossy(&line).into_owned())),
        }
    }
}

/// Polls the radio and reports every inbound frame.
pub struct Receiver {
    link: Arc<dyn RadioLink>,
    reporter: Arc<dyn Reporter>,
    role: StationRole,
    interval: Duration,
    inbox: Option<Selection>,
}

impl Receiver {
    pub fn new(
        link: Arc<dyn RadioLink>,
        reporter: Arc<dyn Reporter>,
        role: StationRole,
        interval: Duration,
    ) -> Self {
        Self {
            link,
            reporter,
            role,
            interval,
            inbox: None,
        }
    }

    /// Also record received messages in a button-driven menu's inbox.
    pub fn with_inbox(mut self, selection: Selection) -> Self {
        self.inbox = Some(selection);
        self
    }

    /// Drain and handle one waiting frame. Returns whether one was waiting.
    pub fn poll_once(&self) -> Result<bool> {
        if !self.link.has_inbound_data()? {
            return Ok(false);
        }
        let bytes = self.link.receive_available()?;
        self.handle(&bytes);
        Ok(true)
    }

    /// Classify, decode and report one received buffer.
    pub fn handle(&self, bytes: &[u8]) {
        let signal = self.link.last_signal_strength().map(SignalReading::from_dbm);
        let event = match classify(bytes) {
            Classification::Corrupt => StationEvent::Corrupt {
                len: bytes.len(),
                signal,
            },
            Classification::Unrecognized(tag) => StationEvent::Unrecognized {
                tag,
                len: bytes.len(),
                signal,
            },
            Classification::Frame(kind) => match decode_frame(bytes) {
                Ok(frame) => {
                    let expected = self.role.expects(kind);
                    if !expected {
                        warn!(kind = kind.name(), role = self.role.name(), "unexpected frame kind");
                    }
                    let message = match &frame.body {
                        FrameBody::Predefined(msg) => self.role.inbound_catalog().get(msg.msg_id),
                        _ => None,
                    };
                    self.record_inbox(&frame, message);
                    StationEvent::Received {
                        frame,
                        message,
                        signal,
                        expected,
                    }
                }
                Err(error) => StationEvent::Malformed {
                    error,
                    len: bytes.len(),
                    signal,
                },
            },
        };
        self.reporter.report(&event);
    }

    fn record_inbox(&self, frame: &Frame, message: Option<&'static str>) {
        let Some(selection) = &self.inbox else {
            return;
        };
        let text = match &frame.body {
            FrameBody::Predefined(_) => message.unwrap_or("unknown message").to_string(),
            FrameBody::Custom(msg) => msg.text.clone(),
            FrameBody::Gps(_) => return,
        };
        let entry = InboxEntry {
            source_id: frame.header.source_id,
            transmission_id: frame.header.transmission_id,
            text,
        };
        if let Err(err) = selection.record_inbox(entry) {
            warn!(error = %err, "failed to update inbox");
        }
    }

    /// Poll until shutdown.
    pub fn run(self, shutdown: Shutdown) {
        let _span = info_span!("receiver").entered();
        while !shutdown.is_triggered() {
            if let Err(err) = self.poll_once() {
                warn!(error = %err, "radio receive failed");
            }
            thread::sleep(self.interval);
        }
        debug!("receiver stopped");
    }
}

/// Turns text lines into queued commands.
pub struct InputProducer {
    input: Box<dyn TextInput>,
    queue: CommandSender,
    reporter: Arc<dyn Reporter>,
    role: StationRole,
    interval: Duration,
}

impl InputProducer {
    pub fn new(
        input: Box<dyn TextInput>,
        queue: CommandSender,
        reporter: Arc<dyn Reporter>,
        role: StationRole,
        interval: Duration,
    ) -> Self {
        Self {
            input,
            queue,
            reporter,
            role,
            interval,
        }
    }

    /// Parse one line and enqueue the result, blocking while the queue is full.
    ///
    /// Lines that produce no command are reported, not returned as errors;
    /// the only error is a closed queue.
    pub fn handle_line(&self, line: &str) -> Result<()> {
        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(err) => {
                self.reporter.report(&StationEvent::InputIgnored {
                    line: line.trim().to_string(),
                    reason: err.to_string(),
                });
                return Ok(());
            }
        };

        if !self.role.can_produce(&command) {
            self.reporter.report(&StationEvent::Rejected {
                reason: format!("{} stations cannot send {}", self.role, command.kind()),
                command,
            });
            return Ok(());
        }

        debug!(%command, "queueing command");
        self.queue.push(command)
    }

    /// Read lines until input ends, the queue closes, or shutdown.
    pub fn run(mut self, shutdown: Shutdown) {
        let _span = info_span!("input").entered();
        while !shutdown.is_triggered() {
            match self.input.read_line() {
                Ok(Some(line)) => {
                    if let Err(err) = self.handle_line(&line) {
                        debug!(error = %err, "input producer stopping");
                        break;
                    }
                }
                Ok(None) => {
                    debug!("input closed");
                    break;
                }
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    self.reporter.report(&StationEvent::InputIgnored {
                        line: String::new(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    warn!(error = %err, "input read failed");
                    break;
                }
            }
            thread::sleep(self.interval);
        }
    }
}

/// Encodes queued commands and hands them to the radio.
///
/// Owns the [`DeviceSession`], so it is the only writer of the
/// transmission counter.
pub struct Transmitter {
    session: DeviceSession,
    queue: CommandReceiver,
    link: Arc<dyn RadioLink>,
    reporter: Arc<dyn Reporter>,
    role: StationRole,
    interval: Duration,
}

impl Transmitter {
    pub fn new(
        session: DeviceSession,
        queue: CommandReceiver,
        link: Arc<dyn RadioLink>,
        reporter: Arc<dyn Reporter>,
        role: StationRole,
        interval: Duration,
    ) -> Self {
        Self {
            session,
            queue,
            link,
            reporter,
            role,
            interval,
        }
    }

    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    /// Encode and send one command.
    ///
    /// Returns the transmission id used, or `None` when the command was
    /// rejected. The counter only advances after a successful send.
    pub fn transmit(&mut self, command: Command) -> Result<Option<u16>> {
        let mut message = None;
        let frame = match &command {
            Command::Predefined { msg_id } => {
                message = self.role.outbound_catalog().get(*msg_id);
                encode_predefined(&self.session, *msg_id)
            }
            Command::Custom { text } => match encode_custom(&self.session, text) {
                Ok(frame) => frame,
                Err(err) => {
                    self.reporter.report(&StationEvent::Rejected {
                        command,
                        reason: err.to_string(),
                    });
                    return Ok(None);
                }
            },
            Command::Position {
                longitude,
                latitude,
            } => encode_gps(&self.session, *longitude, *latitude),
        };

        self.link.send(&frame)?;
        let transmission_id = self.session.next_transmission_id();

        self.reporter.report(&StationEvent::Transmitted {
            kind: command.kind(),
            command,
            transmission_id,
            len: frame.len(),
            message,
        });
        Ok(Some(transmission_id))
    }

    /// Transmit until the queue closes, or until shutdown once it is empty.
    pub fn run(mut self, shutdown: Shutdown) {
        let _span = info_span!("transmitter").entered();
        loop {
            match self.queue.pop_timeout(TRANSMIT_IDLE_WAIT) {
                Ok(Some(command)) => {
                    if let Err(err) = self.transmit(command) {
                        warn!(error = %err, "transmission failed");
                    }
                    thread::sleep(self.interval);
                }
                Ok(None) if shutdown.is_triggered() => break,
                Ok(None) => {}
                Err(_) => {
                    debug!("command queue closed");
                    break;
                }
            }
        }
        debug!(
            next_transmission_id = self.session.transmission_id(),
            "transmitter stopped"
        );
    }
}

/// Where a station's commands come from.
pub enum StationInput {
    /// Text command lines.
    Text(Box<dyn TextInput>),
    /// Button presses, with a display showing the menu.
    Buttons {
        source: Box<dyn ButtonSource>,
        display: Box<dyn Display>,
    },
    /// No operator input; commands arrive only through
    /// [`StationHandle::commands`].
    Detached,
}

/// A configured station, ready to start its roles.
pub struct Station {
    config: StationConfig,
    session: DeviceSession,
    link: Arc<dyn RadioLink>,
    reporter: Arc<dyn Reporter>,
}

impl Station {
    pub fn new(
        config: StationConfig,
        session: DeviceSession,
        link: Arc<dyn RadioLink>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            config,
            session,
            link,
            reporter,
        }
    }

    /// Start every role on its own thread.
    pub fn spawn(self, input: StationInput) -> Result<StationHandle> {
        let Station {
            config,
            session,
            link,
            reporter,
        } = self;
        let role = config.role;
        let shutdown = Shutdown::new();
        let (tx, rx) = command_queue(config.queue_capacity);

        info!(
            %role,
            source_id = session.source_id(),
            destination_id = session.destination_id(),
            queue_capacity = config.queue_capacity,
            "starting station"
        );

        let mut selection = None;
        let mut workers = Vec::new();
        let mut input_worker = None;

        match input {
            StationInput::Text(text) => {
                let producer = InputProducer::new(
                    text,
                    tx.clone(),
                    Arc::clone(&reporter),
                    role,
                    config.input_interval,
                );
                let stop = shutdown.clone();
                input_worker = Some(spawn_role("input", &shutdown, move || producer.run(stop))?);
            }
            StationInput::Buttons { source, display } => {
                let menu = Selection::new(role.outbound_catalog());
                let poller =
                    ButtonPoller::new(source, menu.clone(), tx.clone(), config.button_interval);
                let renderer = DisplayRenderer::new(display, menu.clone(), config.render_interval);
                let stop = shutdown.clone();
                input_worker = Some(spawn_role("buttons", &shutdown, move || poller.run(stop))?);
                let stop = shutdown.clone();
                workers.push(spawn_role("display", &shutdown, move || renderer.run(stop))?);
                selection = Some(menu);
            }
            StationInput::Detached => {}
        }

        let mut receiver = Receiver::new(
            Arc::clone(&link),
            Arc::clone(&reporter),
            role,
            config.receive_interval,
        );
        if let Some(menu) = &selection {
            receiver = receiver.with_inbox(menu.clone());
        }
        let stop = shutdown.clone();
        let receiver_worker = spawn_role("receiver", &shutdown, move || receiver.run(stop))?;

        let transmitter = Transmitter::new(
            session,
            rx,
            link,
            reporter,
            role,
            config.transmit_interval,
        );
        let stop = shutdown.clone();
        let transmitter_worker =
            spawn_role("transmitter", &shutdown, move || transmitter.run(stop))?;

        Ok(StationHandle {
            shutdown,
            commands: Some(tx),
            selection,
            input: input_worker,
            transmitter: Some(transmitter_worker),
            receiver: Some(receiver_worker),
            workers,
        })
    }
}

/// Start one role. On failure the roles already running are told to stop.
fn spawn_role<F>(role: &'static str, shutdown: &Shutdown, f: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(role.to_string())
        .spawn(f)
        .map_err(|source| spawn_failed(role, shutdown, source))
}

fn spawn_failed(role: &'static str, shutdown: &Shutdown, source: io::Error) -> StationError {
    warn!(role, error = %source, "role failed to start, stopping station");
    shutdown.trigger();
    StationError::Spawn { role, source }
}

/// Handle to a running station.
pub struct StationHandle {
    shutdown: Shutdown,
    commands: Option<CommandSender>,
    selection: Option<Selection>,
    input: Option<JoinHandle<()>>,
    transmitter: Option<JoinHandle<()>>,
    receiver: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl StationHandle {
    /// A producer handle onto the station's command queue.
    pub fn commands(&self) -> Option<CommandSender> {
        self.commands.clone()
    }

    /// The menu, when the station runs on buttons.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// The stop flag shared by every role.
    pub fn shutdown_flag(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Whether the operator input role has ended (end of input, closed
    /// source, or a closed queue). Always true without operator input.
    pub fn input_finished(&self) -> bool {
        self.input.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Run until operator input ends, then stop.
    ///
    /// Commands already queued are transmitted before the transmitter
    /// exits. Any [`CommandSender`] obtained from [`Self::commands`] must be
    /// dropped for this to return.
    pub fn wait(mut self) {
        self.commands = None;
        join_role("input", self.input.take());
        join_role("transmitter", self.transmitter.take());
        self.stop();
    }

    /// Stop now. Queued commands are still drained.
    ///
    /// An input role blocked in a read cannot be interrupted; it is left
    /// to finish on its own.
    pub fn shutdown(mut self) {
        self.shutdown.trigger();
        self.commands = None;
        join_role("transmitter", self.transmitter.take());
        if let Some(input) = self.input.take() {
            if input.is_finished() {
                join_role("input", Some(input));
            }
        }
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.trigger();
        join_role("receiver", self.receiver.take());
        for worker in self.workers.drain(..) {
            join_role("worker", Some(worker));
        }
        info!("station stopped");
    }
}

fn join_role(role: &'static str, handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        if handle.join().is_err() {
            warn!(role, "role thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Mutex;

    use loralink_frame::{
        decode_custom, decode_header, decode_predefined, encode_custom_at, encode_predefined_at,
        FrameKind, Timestamp,
    };
    use loralink_transport::MemoryLink;

    use super::*;
    use crate::selection::{Button, Screen};
    use crate::signal::SignalBand;

    #[derive(Default)]
    struct Collect(Mutex<Vec<StationEvent>>);

    impl Reporter for Collect {
        fn report(&self, event: &StationEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    impl Collect {
        fn events(&self) -> Vec<StationEvent> {
            self.0.lock().unwrap().clone()
        }
    }

    fn receiver_for(link: MemoryLink, role: StationRole) -> (Receiver, Arc<Collect>) {
        let reporter = Arc::new(Collect::default());
        let receiver = Receiver::new(
            Arc::new(link),
            reporter.clone(),
            role,
            Duration::from_millis(1),
        );
        (receiver, reporter)
    }

    #[test]
    fn receiver_reports_predefined_with_catalog_text_and_band() {
        let (local, remote) = MemoryLink::pair();
        let (receiver, reporter) = receiver_for(local.with_signal_strength(-70), StationRole::Base);

        let field = DeviceSession::configure(0x01, 0x02).with_transmission_id(9);
        remote
            .send(&encode_predefined_at(&field, Timestamp::default(), 3))
            .unwrap();

        assert!(receiver.poll_once().unwrap());
        assert!(!receiver.poll_once().unwrap());

        let events = reporter.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            StationEvent::Received {
                frame,
                message,
                signal,
                expected,
            } => {
                assert_eq!(frame.header.source_id, 0x01);
                assert_eq!(frame.header.transmission_id, 9);
                assert_eq!(*message, Some("I need medical assistance"));
                assert_eq!(signal.map(|s| s.band), Some(SignalBand::Good));
                assert!(*expected);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn receiver_drops_corrupt_and_unrecognized_frames() {
        let (local, _remote) = MemoryLink::pair();
        let (receiver, reporter) = receiver_for(local, StationRole::Base);

        let session = DeviceSession::configure(1, 2);
        let mut frame = encode_predefined_at(&session, Timestamp::default(), 0).to_vec();
        frame[12] ^= 0x01;
        receiver.handle(&frame);
        receiver.handle(&[]);
        receiver.handle(&[0x09, 0x09]);

        let events = reporter.events();
        assert!(matches!(events[0], StationEvent::Corrupt { len: 14, signal: None }));
        assert!(matches!(events[1], StationEvent::Corrupt { len: 0, .. }));
        assert!(matches!(events[2], StationEvent::Unrecognized { tag: 0x09, .. }));
    }

    #[test]
    fn receiver_reports_short_frames_as_malformed() {
        let (local, _remote) = MemoryLink::pair();
        let (receiver, reporter) = receiver_for(local, StationRole::Base);
        receiver.handle(&[0x01, 0x01]);
        assert!(matches!(
            reporter.events()[0],
            StationEvent::Malformed { len: 2, .. }
        ));
    }

    #[test]
    fn field_receiver_flags_gps_as_unexpected() {
        let (local, _remote) = MemoryLink::pair();
        let (receiver, reporter) = receiver_for(local, StationRole::Field);
        let gps = loralink_frame::encode_gps_at(
            &DeviceSession::configure(2, 1),
            Timestamp::default(),
            1.0,
            2.0,
        );
        receiver.handle(&gps);
        assert!(matches!(
            reporter.events()[0],
            StationEvent::Received { expected: false, .. }
        ));
    }

    #[test]
    fn receiver_fills_inbox() {
        let (local, _remote) = MemoryLink::pair();
        let selection = Selection::new(StationRole::Field.outbound_catalog());
        let (receiver, _reporter) = receiver_for(local, StationRole::Field);
        let receiver = receiver.with_inbox(selection.clone());

        let base = DeviceSession::configure(0x02, 0x01).with_transmission_id(4);
        receiver.handle(&encode_custom_at(&base, Timestamp::default(), "stay put").unwrap());

        let mut state = selection.snapshot().unwrap();
        state.press(Button::Mode);
        match state.screen(StationRole::Field.outbound_catalog()) {
            Screen::Inbox {
                last: Some(entry), ..
            } => {
                assert_eq!(entry.text, "stay put");
                assert_eq!(entry.transmission_id, 4);
            }
            other => panic!("unexpected screen {other:?}"),
        }
    }

    fn transmitter_for(
        role: StationRole,
    ) -> (Transmitter, CommandSender, MemoryLink, Arc<Collect>) {
        let (local, remote) = MemoryLink::pair();
        let (tx, rx) = command_queue(DEFAULT_QUEUE_CAPACITY);
        let reporter = Arc::new(Collect::default());
        let identity = role.default_identity();
        let transmitter = Transmitter::new(
            DeviceSession::configure(identity.source_id, identity.destination_id),
            rx,
            Arc::new(local),
            reporter.clone(),
            role,
            Duration::from_millis(1),
        );
        (transmitter, tx, remote, reporter)
    }

    #[test]
    fn transmitter_numbers_frames_in_send_order() {
        let (mut transmitter, _tx, remote, _reporter) = transmitter_for(StationRole::Base);

        assert_eq!(
            transmitter.transmit(Command::Predefined { msg_id: 4 }).unwrap(),
            Some(0)
        );
        assert_eq!(
            transmitter
                .transmit(Command::Custom {
                    text: "hi".to_string()
                })
                .unwrap(),
            Some(1)
        );

        let first = remote.receive_available().unwrap();
        let header = decode_header(&first).unwrap();
        assert_eq!(first[0], FrameKind::Predefined.tag());
        assert_eq!(header.source_id, 0x02);
        assert_eq!(header.destination_id, 0x01);
        assert_eq!(header.transmission_id, 0);
        assert_eq!(decode_predefined(&first).unwrap().msg_id, 4);

        let second = remote.receive_available().unwrap();
        assert_eq!(decode_header(&second).unwrap().transmission_id, 1);
        assert_eq!(decode_custom(&second).unwrap().text, "hi");
    }

    #[test]
    fn oversize_custom_is_rejected_without_consuming_an_id() {
        let (mut transmitter, _tx, remote, reporter) = transmitter_for(StationRole::Base);

        let long = "z".repeat(loralink_frame::MAX_CUSTOM_LEN + 1);
        assert_eq!(
            transmitter.transmit(Command::Custom { text: long }).unwrap(),
            None
        );
        assert!(!remote.has_inbound_data().unwrap());
        assert_eq!(transmitter.session().transmission_id(), 0);
        assert!(matches!(
            reporter.events()[0],
            StationEvent::Rejected { .. }
        ));
    }

    #[test]
    fn failed_send_does_not_advance_counter() {
        let (mut transmitter, _tx, remote, _reporter) = transmitter_for(StationRole::Base);
        drop(remote);
        assert!(transmitter
            .transmit(Command::Predefined { msg_id: 0 })
            .is_err());
        assert_eq!(transmitter.session().transmission_id(), 0);
    }

    #[test]
    fn transmitter_run_drains_queue_then_exits_on_close() {
        let (transmitter, tx, remote, reporter) = transmitter_for(StationRole::Field);
        for msg_id in 0..3 {
            tx.push(Command::Predefined { msg_id }).unwrap();
        }
        tx.push(Command::Position {
            longitude: 10.5,
            latitude: -3.25,
        })
        .unwrap();
        drop(tx);

        transmitter.run(Shutdown::new());

        for expected in 0..4u16 {
            let frame = remote.receive_available().unwrap();
            assert_eq!(decode_header(&frame).unwrap().transmission_id, expected);
        }
        let transmitted = reporter
            .events()
            .iter()
            .filter(|e| matches!(e, StationEvent::Transmitted { .. }))
            .count();
        assert_eq!(transmitted, 4);
    }

    struct Lines(std::vec::IntoIter<io::Result<Option<String>>>);

    impl TextInput for Lines {
        fn read_line(&mut self) -> io::Result<Option<String>> {
            self.0.next().unwrap_or(Ok(None))
        }
    }

    fn producer_over(input: Box<dyn TextInput>) -> (CommandReceiver, Arc<Collect>) {
        let (tx, rx) = command_queue(DEFAULT_QUEUE_CAPACITY);
        let reporter = Arc::new(Collect::default());
        InputProducer::new(
            input,
            tx,
            reporter.clone(),
            StationRole::Base,
            Duration::from_millis(1),
        )
        .run(Shutdown::new());
        (rx, reporter)
    }

    #[test]
    fn non_utf8_line_does_not_end_input() {
        let input = LineInput::new(Cursor::new(b"1\n\xe9t\xe9\n2\nC: still here\n".to_vec()));
        let (rx, reporter) = producer_over(Box::new(input));

        assert_eq!(rx.pop(), Some(Command::Predefined { msg_id: 0 }));
        assert_eq!(rx.pop(), Some(Command::Predefined { msg_id: 1 }));
        assert_eq!(
            rx.pop(),
            Some(Command::Custom {
                text: "still here".to_string()
            })
        );
        assert_eq!(rx.pop(), None);
        assert!(matches!(
            &reporter.events()[0],
            StationEvent::InputIgnored { line, .. } if line == "\u{FFFD}t\u{FFFD}"
        ));
    }

    #[test]
    fn invalid_data_from_input_skips_the_line() {
        let input = Lines(
            vec![
                Ok(Some("3\n".to_string())),
                Err(io::Error::new(io::ErrorKind::InvalidData, "bad bytes")),
                Ok(Some("4\n".to_string())),
                Err(io::Error::other("device gone")),
                Ok(Some("5\n".to_string())),
            ]
            .into_iter(),
        );
        let (rx, reporter) = producer_over(Box::new(input));

        assert_eq!(rx.pop(), Some(Command::Predefined { msg_id: 2 }));
        assert_eq!(rx.pop(), Some(Command::Predefined { msg_id: 3 }));
        assert_eq!(rx.pop(), None);
        assert!(matches!(
            reporter.events()[0],
            StationEvent::InputIgnored { .. }
        ));
    }

    #[test]
    fn spawn_failure_stops_running_roles() {
        let shutdown = Shutdown::new();
        let err = spawn_failed("receiver", &shutdown, io::Error::other("no threads"));
        assert!(shutdown.is_triggered());
        assert!(matches!(err, StationError::Spawn { role: "receiver", .. }));
    }

    #[test]
    fn input_producer_parses_filters_and_queues() {
        let (tx, rx) = command_queue(DEFAULT_QUEUE_CAPACITY);
        let reporter = Arc::new(Collect::default());
        let producer = InputProducer::new(
            Box::new(LineInput::new(Cursor::new(
                "\n4\nc: on my way\nG:1,2\nnope\n".to_string(),
            ))),
            tx,
            reporter.clone(),
            StationRole::Base,
            Duration::from_millis(1),
        );
        producer.run(Shutdown::new());

        assert_eq!(rx.pop(), Some(Command::Predefined { msg_id: 3 }));
        assert_eq!(
            rx.pop(),
            Some(Command::Custom {
                text: "on my way".to_string()
            })
        );
        assert_eq!(rx.pop(), None);

        let events = reporter.events();
        assert!(matches!(events[0], StationEvent::Rejected { .. }));
        assert!(matches!(
            &events[1],
            StationEvent::InputIgnored { line, .. } if line == "nope"
        ));
    }
}
