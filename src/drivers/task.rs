//! FreeRTOS-backed thread spawning.
//!
//! ESP-IDF implements `std::thread` on pthreads, which are FreeRTOS tasks.
//! `esp_pthread_set_cfg()` configures the *next* `pthread_create()` made by
//! the calling thread, so the config and spawn calls must not be interleaved
//! with other thread creation on the same thread.
//!
//! The ESP32-C6 has a single HP core, so no core affinity is set. On host
//! targets priority is ignored and only the stack size applies.

use std::io;
use std::thread::JoinHandle;

/// Spawn a named task with explicit priority and stack size.
///
/// `name` must be NUL-terminated (e.g. `"sensors\0"`).
#[cfg(target_os = "espidf")]
pub fn spawn_task(
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    // SAFETY: `name` is 'static and NUL-terminated; cfg is copied by IDF.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.prio = priority as i32;
        cfg.stack_size = (stack_kb * 1024) as i32;
        cfg.thread_name = name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
    }

    let display_name = name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' (pri={}, stack={}KB)",
        display_name,
        priority,
        stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .spawn(f)
}

/// Host fallback: plain thread with the requested stack.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_task(
    _priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    let display_name = name.trim_end_matches('\0');
    log::info!("Spawning '{}' (sim, stack={}KB)", display_name, stack_kb);

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}
