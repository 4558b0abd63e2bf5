use std::sync::mpsc;

use crate::error::Result;
use crate::grid::Viewport;
use crate::input::PointerEvent;
use crate::renderer::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Everything a host can tell the simulation about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Resized(Viewport),
    Visibility(Visibility),
    Pointer(PointerEvent),
}

/// The surface the simulation draws into and receives events from.
///
/// Events are pushed through the sender handed to `subscribe` and drained by
/// the scheduler at frame boundaries, so a host may emit from any thread.
pub trait HostEnvironment {
    fn viewport(&self) -> Viewport;
    fn subscribe(&mut self, events: mpsc::Sender<HostEvent>);
    fn unsubscribe(&mut self);
    fn present(&mut self, frame: &Frame<'_>) -> Result<()>;
}

/// Off-screen host: keeps the last frame and lets callers inject events.
#[derive(Debug)]
pub struct HeadlessHost {
    viewport: Viewport,
    events: Option<mpsc::Sender<HostEvent>>,
    presented: u64,
    last_frame: Vec<u8>,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport, events: None, presented: 0, last_frame: Vec::new() }
    }

    /// Deliver an event to the subscriber. Returns false when nobody is
    /// listening.
    pub fn emit(&mut self, event: HostEvent) -> bool {
        if let HostEvent::Resized(viewport) = event {
            if !viewport.is_degenerate() {
                self.viewport = viewport;
            }
        }
        match &self.events {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.events.is_some()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// RGBA bytes of the most recent frame.
    pub fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }
}

impl HostEnvironment for HeadlessHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn subscribe(&mut self, events: mpsc::Sender<HostEvent>) {
        self.events = Some(events);
    }

    fn unsubscribe(&mut self) {
        self.events = None;
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.last_frame.clear();
        self.last_frame.extend_from_slice(frame.rgba);
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscriber() {
        let mut host = HeadlessHost::new(Viewport::new(10, 10));
        assert!(!host.emit(HostEvent::Visibility(Visibility::Hidden)));
    }

    #[test]
    fn test_events_reach_subscriber_in_order() {
        let mut host = HeadlessHost::new(Viewport::new(10, 10));
        let (tx, rx) = mpsc::channel();
        host.subscribe(tx);
        assert!(host.emit(HostEvent::Pointer(PointerEvent::Down)));
        assert!(host.emit(HostEvent::Pointer(PointerEvent::Up)));
        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![HostEvent::Pointer(PointerEvent::Down), HostEvent::Pointer(PointerEvent::Up)]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut host = HeadlessHost::new(Viewport::new(10, 10));
        let (tx, rx) = mpsc::channel();
        host.subscribe(tx);
        host.unsubscribe();
        assert!(!host.is_subscribed());
        assert!(!host.emit(HostEvent::Pointer(PointerEvent::Down)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_resize_event_updates_viewport() {
        let mut host = HeadlessHost::new(Viewport::new(10, 10));
        host.emit(HostEvent::Resized(Viewport::new(30, 20)));
        assert_eq!(host.viewport(), Viewport::new(30, 20));
        host.emit(HostEvent::Resized(Viewport::new(0, 20)));
        assert_eq!(host.viewport(), Viewport::new(30, 20), "degenerate size ignored");
    }

    #[test]
    fn test_present_keeps_last_frame() {
        let mut host = HeadlessHost::new(Viewport::new(1, 1));
        let pixels = [1u8, 2, 3, 4];
        host.present(&Frame { rgba: &pixels, width: 1, height: 1 }).unwrap();
        assert_eq!(host.presented(), 1);
        assert_eq!(host.last_frame(), &pixels);
    }
}
