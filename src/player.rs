//! Host-facing player
//!
//! [`Player`] bundles a shared [`Transport`] with the piano-roll renderer and
//! exposes the host operations in one place. The browser wrapper in
//! `api::player` is a thin shell over it; native hosts and tests use it
//! directly.
//!
//! # Loading
//!
//! `load` claims a ticket synchronously, at the moment the host asks, and
//! returns a future that resolves once the bytes have arrived and been
//! parsed. The transport is borrowed only at the two ends of that future,
//! never across an await, so ticks and renders keep running against the old
//! score while the load is in flight.

use crate::config::PlayerConfig;
use crate::error::{LoadOutcome, ParseError};
use crate::models::Score;
use crate::parse::parse_smf;
use crate::renderers::{DisplayList, PianoRoll, Rect, Surface};
use crate::transport::{TickStatus, Transport, Trigger};
use std::cell::{Ref, RefCell};
use std::convert::Infallible;
use std::future::Future;
use std::rc::Rc;

pub struct Player {
    transport: Rc<RefCell<Transport>>,
    renderer: PianoRoll,
    config: PlayerConfig,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            transport: Rc::new(RefCell::new(Transport::new(&config))),
            renderer: PianoRoll::new(config.render.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn transport(&self) -> Ref<'_, Transport> {
        self.transport.borrow()
    }

    pub fn score(&self) -> Option<Rc<Score>> {
        self.transport.borrow().score().cloned()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load a score from a byte source that completes later.
    ///
    /// The newest call wins: a load superseded while in flight resolves to
    /// `Ok(LoadOutcome::Superseded)` and changes nothing. A source error
    /// abandons the load and is returned as-is; a parse error leaves the
    /// current score active.
    pub fn load<F, E>(&self, source: F) -> impl Future<Output = Result<LoadOutcome, E>> + 'static
    where
        F: Future<Output = Result<Vec<u8>, E>> + 'static,
        E: From<ParseError> + 'static,
    {
        let transport = Rc::clone(&self.transport);
        let ticket = transport.borrow_mut().begin_load();

        async move {
            let bytes = match source.await {
                Ok(bytes) => bytes,
                Err(e) => {
                    transport.borrow_mut().cancel_load(ticket);
                    return Err(e);
                }
            };
            let parsed = parse_smf(&bytes);
            let outcome = transport.borrow_mut().finish_load(ticket, parsed)?;
            Ok(outcome)
        }
    }

    /// Parse and install bytes that are already in memory.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<(), ParseError> {
        self.transport.borrow_mut().load_bytes(bytes)
    }

    // ========================================================================
    // Transport controls
    // ========================================================================

    pub fn ready(&self) -> bool {
        self.transport.borrow().ready()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.borrow().is_playing()
    }

    pub fn play(&self) {
        self.transport.borrow_mut().play();
    }

    pub fn stop(&self) {
        self.transport.borrow_mut().stop();
    }

    pub fn tick(&self, delta_seconds: f64) -> TickStatus {
        self.transport.borrow_mut().tick(delta_seconds)
    }

    pub fn seek_time(&self, time: f64, clear_sounds: bool) {
        self.transport.borrow_mut().seek_time(time, clear_sounds);
    }

    pub fn seek_bar(&self, bar: usize, clear_sounds: bool) {
        self.transport.borrow_mut().seek_bar(bar, clear_sounds);
    }

    pub fn skip(&self, delta_seconds: f64) {
        self.transport.borrow_mut().skip(delta_seconds);
    }

    pub fn set_loop_bars(&self, start_bar: usize, end_bar: usize) {
        self.transport.borrow_mut().set_loop_bars(start_bar, end_bar);
    }

    pub fn clear_loop(&self) {
        self.transport.borrow_mut().clear_loop();
    }

    pub fn set_volume(&self, volume: f32) {
        self.transport.borrow_mut().set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.transport.borrow().volume()
    }

    pub fn set_display_range(&self, seconds: f64) {
        self.transport.borrow_mut().set_display_range(seconds);
    }

    pub fn current_time(&self) -> f64 {
        self.transport.borrow().current_time()
    }

    pub fn duration(&self) -> f64 {
        self.transport.borrow().duration()
    }

    pub fn current_bar(&self) -> usize {
        self.transport.borrow().current_bar()
    }

    pub fn num_bars(&self) -> usize {
        self.transport.borrow().num_bars()
    }

    /// Drain the note triggers produced since the last call.
    pub fn take_triggers(&self) -> Vec<Trigger> {
        self.transport.borrow_mut().take_triggers()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    pub fn render<S: Surface>(&self, surface: &mut S, x: f64, y: f64, width: f64, height: f64) -> Result<(), S::Error> {
        let transport = self.transport.borrow();
        let snapshot = transport.snapshot();
        self.renderer
            .render(surface, transport.score().map(|s| s.as_ref()), &snapshot, Rect::new(x, y, width, height))
    }

    pub fn render_display_list(&self, x: f64, y: f64, width: f64, height: f64) -> DisplayList {
        let mut list = DisplayList::new();
        let result: Result<(), Infallible> = self.render(&mut list, x, y, width, height);
        match result {
            Ok(()) => list,
            Err(never) => match never {},
        }
    }
}
