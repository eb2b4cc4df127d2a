use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::parser::base::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// An operating system signal number, as understood by `signal(2)`.
pub type Signal = std::os::raw::c_int;

/// Interrupt from the keyboard (`Ctrl-C`).
#[cfg(unix)]
pub const SIGINT: Signal = libc::SIGINT;

/// Termination request.
#[cfg(unix)]
pub const SIGTERM: Signal = libc::SIGTERM;

/// A cooperative cancellation token handed to every action.
///
/// Clones observe the same cancellation.
/// A [`Context::child`] is cancelled whenever its parent is, but cancelling the child leaves the parent untouched.
///
/// ### Example
/// ```
/// # use commander_builder as commander;
/// use commander::Context;
///
/// let parent = Context::background();
/// let child = parent.child();
/// assert!(!child.is_cancelled());
///
/// parent.cancel();
/// assert!(child.is_cancelled());
/// assert!(child.check().unwrap_err().is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    trapped: bool,
    parent: Option<Box<Context>>,
}

impl Context {
    /// Create a root context which is never cancelled unless asked to.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that is cancelled along with this one.
    pub fn child(&self) -> Self {
        Self {
            cancelled: Arc::default(),
            trapped: false,
            parent: Some(Box::new(self.clone())),
        }
    }

    /// Cancel this context, and every context derived from it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether this context (or any of its ancestors) has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || (self.trapped && trap::signalled())
            || self
                .parent
                .as_ref()
                .map_or(false, |parent| parent.is_cancelled())
    }

    /// Fail with [`Error::Cancelled`] if this context has been cancelled.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    // Derive a context which also observes the process wide signal trap.
    fn trapped(&self) -> Self {
        let mut context = self.child();
        context.trapped = true;
        context
    }
}

// Nothing is trapped under cargo (`cargo run`, `cargo test`).
pub(crate) fn default_signals() -> Vec<Signal> {
    if env::var_os("CARGO").is_some() {
        return Vec::default();
    }

    #[cfg(unix)]
    {
        vec![SIGINT]
    }

    #[cfg(not(unix))]
    {
        Vec::default()
    }
}

/// Signal handlers installed for the duration of a parse.
///
/// Dropping the trap restores the previous handlers, and moves any received signal into the context's own cancellation.
///
/// Delivery is recorded in a single process wide flag, which every install clears.
/// Traps must not overlap: a parse started while another is trapping (a second `Cli`, or a nested parse) discards the outer trap's pending signal.
pub(crate) struct Trap {
    context: Context,
    #[cfg(unix)]
    previous: Vec<(Signal, libc::sighandler_t)>,
}

impl Trap {
    pub(crate) fn install(parent: &Context, signals: &[Signal]) -> Self {
        if signals.is_empty() {
            return Self {
                context: parent.child(),
                #[cfg(unix)]
                previous: Vec::default(),
            };
        }

        let context = parent.trapped();
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Trapping signals {signals:?}.");
        }

        Self {
            #[cfg(unix)]
            previous: trap::install(signals),
            context,
        }
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }
}

impl Drop for Trap {
    fn drop(&mut self) {
        #[cfg(unix)]
        trap::restore(&self.previous);

        if self.context.trapped && trap::signalled() {
            self.context.cancel();
        }
    }
}

#[cfg(unix)]
mod trap {
    use super::Signal;
    use std::sync::atomic::{AtomicBool, Ordering};

    static SIGNALLED: AtomicBool = AtomicBool::new(false);

    extern "C" fn on_signal(signal: libc::c_int) {
        SIGNALLED.store(true, Ordering::SeqCst);
        // One shot: the next delivery takes the default action.
        unsafe {
            libc::signal(signal, libc::SIG_DFL);
        }
    }

    pub(super) fn signalled() -> bool {
        SIGNALLED.load(Ordering::SeqCst)
    }

    pub(super) fn install(signals: &[Signal]) -> Vec<(Signal, libc::sighandler_t)> {
        SIGNALLED.store(false, Ordering::SeqCst);
        let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        let mut previous = Vec::default();

        for signal in signals {
            let replaced = unsafe { libc::signal(*signal, handler) };

            if replaced != libc::SIG_ERR {
                previous.push((*signal, replaced));
            }
        }

        previous
    }

    pub(super) fn restore(previous: &[(Signal, libc::sighandler_t)]) {
        for (signal, handler) in previous {
            unsafe {
                libc::signal(*signal, *handler);
            }
        }
    }
}

#[cfg(not(unix))]
mod trap {
    pub(super) fn signalled() -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_not_cancelled() {
        // Setup
        let context = Context::background();

        // Execute
        let result = context.check();

        // Verify
        assert_matches!(result, Ok(()));
        assert!(!context.is_cancelled());
    }

    #[test]
    fn clones_share_cancellation() {
        // Setup
        let context = Context::background();
        let clone = context.clone();

        // Execute
        clone.cancel();

        // Verify
        assert!(context.is_cancelled());
        assert_matches!(context.check(), Err(Error::Cancelled));
    }

    #[test]
    fn child_does_not_cancel_parent() {
        // Setup
        let parent = Context::background();
        let child = parent.child();
        let grandchild = child.child();

        // Execute
        child.cancel();

        // Verify
        assert!(!parent.is_cancelled());
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn trap_without_signals() {
        // Setup
        let parent = Context::background();

        // Execute
        let trap = Trap::install(&parent, &[]);

        // Verify
        assert!(!trap.context().trapped);
        parent.cancel();
        assert!(trap.context().is_cancelled());
    }

    #[cfg(unix)]
    #[test]
    fn trap_signal() {
        // Setup
        let parent = Context::background();
        let trap = Trap::install(&parent, &[libc::SIGUSR2]);
        let context = trap.context().clone();

        // Execute
        unsafe {
            libc::raise(libc::SIGUSR2);
        }

        // Verify
        assert!(context.is_cancelled());
        assert!(!parent.is_cancelled());
        drop(trap);
        assert!(context.is_cancelled());
    }
}
