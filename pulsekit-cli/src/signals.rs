//! Routes termination signals into a [`CancelToken`].

use std::sync::OnceLock;

use pulsekit_lib::cancel::CancelToken;

static SIGNAL_TOKEN: OnceLock<CancelToken> = OnceLock::new();

#[cfg(unix)]
extern "C" fn handle_signal(_signum: libc::c_int) {
    if let Some(token) = SIGNAL_TOKEN.get() {
        token.cancel();
    }
}

/// Install handlers for SIGINT, SIGTERM, SIGQUIT and SIGPIPE and return the
/// token they cancel.
pub fn install() -> CancelToken {
    let token = SIGNAL_TOKEN.get_or_init(CancelToken::new).clone();

    #[cfg(unix)]
    {
        let handler = handle_signal as extern "C" fn(libc::c_int);
        for signum in [libc::SIGINT, libc::SIGTERM, libc::SIGQUIT, libc::SIGPIPE] {
            // The handler only performs an atomic store.
            unsafe {
                libc::signal(signum, handler as libc::sighandler_t);
            }
        }
    }

    token
}
