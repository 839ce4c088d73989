//! Named background threads
//!
//! Every long lived thread in the scanner gets a name so it shows up in
//! traces and in platform thread dumps.

use std::{io, thread::JoinHandle};

/// Spawn a named OS thread
pub fn spawn_named<F, T>(name: &str, f: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    std::thread::Builder::new().name(name.to_string()).spawn(f)
}

/// True when the caller is running on the thread behind `handle`
pub fn is_current<T>(handle: &JoinHandle<T>) -> bool {
    handle.thread().id() == std::thread::current().id()
}
