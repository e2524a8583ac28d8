mod platform;
pub(crate) mod win32;

pub use platform::Win32Platform;
