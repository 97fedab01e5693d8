use serde::{Deserialize, Serialize};

/// Native window and display handles handed to swapchain creation.
/// Interpretation is up to the backend (HWND, X11 window, NSView, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NativeSurface {
    pub window: u64,
    pub display: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Event {
    WindowClose,
    Key { key: u32, pressed: bool },
    MouseMove { x: i32, y: i32 },
    MouseButton { button: MouseButton, pressed: bool },
    Wheel { delta: f32 },
    /// Must be forwarded to `swapchain_resize` by the application.
    Resize { width: u32, height: u32 },
    Rune(char),
}

/// A window that can be rendered into and polled for input.
pub trait EventSource {
    fn native_surface(&self) -> NativeSurface;

    /// Next pending event, or `None` when the queue is currently empty.
    fn poll(&mut self) -> Option<Event>;
}
