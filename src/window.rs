use std::sync::mpsc;

use liquid_ether::error::{Result, SimError};
use liquid_ether::grid::Viewport;
use liquid_ether::host::{HostEnvironment, HostEvent, Visibility};
use liquid_ether::input::PointerEvent;
use liquid_ether::renderer::Frame;
use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};

/// Convert RGBA &[u8] buffer to 0RGB &[u32] buffer for minifb.
fn rgba_to_argb(rgba: &[u8], out: &mut [u32]) {
    for (i, pixel) in rgba.chunks_exact(4).enumerate() {
        out[i] = (pixel[0] as u32) << 16 | (pixel[1] as u32) << 8 | pixel[2] as u32;
    }
}

/// Desktop window host. Input is polled once per frame by `pump` and
/// forwarded as host events.
pub struct WindowHost {
    window: Window,
    events: Option<mpsc::Sender<HostEvent>>,
    framebuf: Vec<u32>,
    size: (usize, usize),
    focused: bool,
    mouse: Option<(f32, f32)>,
    pressed: bool,
}

impl WindowHost {
    pub fn open(title: &str, width: usize, height: usize, target_fps: usize) -> std::result::Result<Self, minifb::Error> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(target_fps);
        Ok(Self {
            window,
            events: None,
            framebuf: Vec::new(),
            size: (width, height),
            focused: true,
            mouse: None,
            pressed: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Turn window state changes since the last call into host events.
    pub fn pump(&mut self) {
        let size = self.window.get_size();
        if size != self.size {
            self.size = size;
            self.send(HostEvent::Resized(Viewport::new(size.0, size.1)));
        }

        let focused = self.window.is_active();
        if focused != self.focused {
            self.focused = focused;
            let visibility = if focused { Visibility::Visible } else { Visibility::Hidden };
            self.send(HostEvent::Visibility(visibility));
        }

        let mouse = self.window.get_mouse_pos(MouseMode::Discard);
        if let Some((x, y)) = mouse {
            if self.mouse != mouse {
                self.send(HostEvent::Pointer(PointerEvent::Move { x, y }));
            }
        }
        self.mouse = mouse;

        let pressed = self.window.get_mouse_down(MouseButton::Left);
        if pressed != self.pressed {
            self.pressed = pressed;
            let event = if pressed { PointerEvent::Down } else { PointerEvent::Up };
            self.send(HostEvent::Pointer(event));
        }
    }

    /// Keep the window responsive while no frame is being presented.
    pub fn refresh(&mut self) {
        self.window.update();
    }

    fn send(&self, event: HostEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

impl HostEnvironment for WindowHost {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.size.0, self.size.1)
    }

    fn subscribe(&mut self, events: mpsc::Sender<HostEvent>) {
        self.events = Some(events);
    }

    fn unsubscribe(&mut self) {
        self.events = None;
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.framebuf.resize(frame.width * frame.height, 0);
        rgba_to_argb(frame.rgba, &mut self.framebuf);
        self.window
            .update_with_buffer(&self.framebuf, frame.width, frame.height)
            .map_err(|e| SimError::Host(e.to_string()))
    }
}
