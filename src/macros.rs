/// Log through the `log` facade when the configured verbosity reaches `$level`.
///
/// `verbose!(self.verbose, AlgorithmVars, "target sample: {}", n)`
macro_rules! verbose {
    ($current:expr, Summary, $($arg:tt)+) => {
        if $current >= $crate::config::Verbosity::Summary {
            log::info!($($arg)+);
        }
    };
    ($current:expr, AlgorithmVars, $($arg:tt)+) => {
        if $current >= $crate::config::Verbosity::AlgorithmVars {
            log::debug!($($arg)+);
        }
    };
    ($current:expr, BoxFinders, $($arg:tt)+) => {
        if $current >= $crate::config::Verbosity::BoxFinders {
            log::debug!($($arg)+);
        }
    };
    ($current:expr, Reading, $($arg:tt)+) => {
        if $current >= $crate::config::Verbosity::Reading {
            log::trace!($($arg)+);
        }
    };
}
