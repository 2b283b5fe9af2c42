//! SIGINT, SIGTERM and SIGHUP handling for the extractor.
//!
//! The handlers only raise a [`Cancellation`]. They are installed without
//! `SA_RESTART`, so a blocked read returns EINTR and the prompt or unpack
//! unwinds normally: the terminal guard and the staging directory are
//! dropped before `main` returns exit code 130.

use sealpack_core::Cancellation;

/// Restores the previous dispositions on drop.
pub struct SignalGuard {
    #[cfg(unix)]
    previous: Vec<(libc::c_int, libc::sigaction)>,
}

#[cfg(unix)]
mod imp {
    use std::io;
    use std::sync::OnceLock;

    use super::SignalGuard;
    use sealpack_core::Cancellation;

    pub(super) const SIGNALS: [libc::c_int; 3] = [libc::SIGINT, libc::SIGTERM, libc::SIGHUP];

    // First install wins; the process has one extraction.
    static TARGET: OnceLock<Cancellation> = OnceLock::new();

    extern "C" fn on_signal(_signal: libc::c_int) {
        if let Some(cancellation) = TARGET.get() {
            cancellation.cancel();
        }
    }

    pub(super) fn install(cancellation: &Cancellation) -> io::Result<SignalGuard> {
        let _ = TARGET.set(cancellation.clone());

        let mut guard = SignalGuard {
            previous: Vec::with_capacity(SIGNALS.len()),
        };
        for signal in SIGNALS {
            // SAFETY: an all-zero sigaction is a valid starting point; the
            // handler and an empty mask are filled in before use.
            let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
            action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = 0;
            let mut previous: libc::sigaction = unsafe { std::mem::zeroed() };
            // SAFETY: both structs are initialized and outlive the calls.
            let rc = unsafe {
                libc::sigemptyset(&mut action.sa_mask);
                libc::sigaction(signal, &action, &mut previous)
            };
            if rc != 0 {
                // Dropping the partial guard restores what was installed.
                return Err(io::Error::last_os_error());
            }
            guard.previous.push((signal, previous));
        }
        Ok(guard)
    }

    pub(super) fn restore(guard: &mut SignalGuard) {
        for (signal, previous) in guard.previous.drain(..).rev() {
            // SAFETY: `previous` was filled in by sigaction in `install`.
            unsafe {
                libc::sigaction(signal, &previous, std::ptr::null_mut());
            }
        }
    }
}

/// Route SIGINT, SIGTERM and SIGHUP into `cancellation` until the guard drops.
pub fn install(cancellation: &Cancellation) -> std::io::Result<SignalGuard> {
    #[cfg(unix)]
    {
        imp::install(cancellation)
    }
    #[cfg(not(unix))]
    {
        let _ = cancellation;
        Ok(SignalGuard {})
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        imp::restore(self);
    }
}
