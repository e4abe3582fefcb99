//! Worker thread scheduling priority.

use std::fmt;
use tracing::{trace, warn};

/// Scheduling priority applied to a worker thread when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// nice 19
    Lowest,
    /// nice 10
    Low,
    /// Inherit the spawning thread's priority
    #[default]
    Normal,
    /// nice -10
    High,
    /// nice -20
    Highest,
}

impl Priority {
    /// The equivalent Unix nice value.
    pub const fn nice(self) -> i32 {
        match self {
            Self::Lowest => 19,
            Self::Low => 10,
            Self::Normal => 0,
            Self::High => -10,
            Self::Highest => -20,
        }
    }

    /// Apply this priority to the calling thread.
    ///
    /// Raising priority usually needs privileges; failure is logged and
    /// otherwise ignored.
    pub fn apply(self) {
        if self == Self::Normal {
            return;
        }

        match set_current_thread_nice(self.nice()) {
            Ok(()) => trace!(priority = %self, "thread priority set"),
            Err(e) => warn!(priority = %self, error = %e, "failed to set thread priority"),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lowest => "lowest",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Highest => "highest",
        };
        f.write_str(name)
    }
}

// On Linux the nice value of PRIO_PROCESS/0 is per thread.
#[cfg(unix)]
#[allow(unsafe_code)]
fn set_current_thread_nice(nice: i32) -> std::io::Result<()> {
    // SAFETY: setpriority takes plain integers and touches no memory.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn set_current_thread_nice(_nice: i32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "thread priority is not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_values_are_ordered() {
        let all = [
            Priority::Lowest,
            Priority::Low,
            Priority::Normal,
            Priority::High,
            Priority::Highest,
        ];
        assert!(all.windows(2).all(|w| w[0].nice() > w[1].nice()));
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_lowering_priority_succeeds() {
        std::thread::spawn(|| {
            Priority::Lowest.apply();
            assert!(set_current_thread_nice(Priority::Lowest.nice()).is_ok());
        })
        .join()
        .unwrap();
    }
}
