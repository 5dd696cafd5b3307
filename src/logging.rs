//! Logging configuration for the orchestration events this crate emits.
//!
//! Library code logs through `tracing` at the pipeline seams:
//! - the normalized span list after pad/merge (`spans`, at `debug`)
//! - each transcription window (`from`, `to`, `duration`, `expanded`, `prompt`,
//!   at `debug`)
//! - per-chunk VAD progress in the Silero driver (`from`, `to`, at `debug`)
//!
//! Note that the `prompt` field carries previously transcribed text, so `debug`
//! output can contain spoken content. The default filter installed here keeps that
//! below the surface (`vadscribe=info`); opt in with `VADSCRIBE_LOG=vadscribe=debug`
//! when you need to see the windows and prompts themselves.
//!
//! Consumers that already own a subscriber should skip this module entirely and
//! filter the `vadscribe` target in their own setup.

/// Initialize JSON logging with this crate's events visible at `info`.
///
/// `VADSCRIBE_LOG` overrides the default filter.
#[cfg(feature = "logging")]
pub fn init() {
    init_with_default("vadscribe=info");
}

/// Initialize JSON logging with a caller-chosen default filter directive.
///
/// The directive uses the usual env-filter syntax (e.g. `"vadscribe=debug"` to see
/// window boundaries and prompts, `"warn"` to quiet everything). `VADSCRIBE_LOG`
/// still takes precedence when set. An unparseable directive falls back to `error`.
#[cfg(feature = "logging")]
pub fn init_with_default(directive: &str) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::filter::Directive;

    let default: Directive = directive
        .parse()
        .unwrap_or_else(|_| tracing::level_filters::LevelFilter::ERROR.into());

    let filter = EnvFilter::builder()
        .with_env_var("VADSCRIBE_LOG")
        .with_default_directive(default)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Initialize logging when the `logging` feature is not enabled.
///
/// We keep this as a no-op so library consumers can call `vadscribe::logging::init()`
/// without needing to pull in `tracing-subscriber`.
#[cfg(not(feature = "logging"))]
pub fn init() {}

/// No-op counterpart of `init_with_default` without the `logging` feature.
#[cfg(not(feature = "logging"))]
pub fn init_with_default(_directive: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }

    #[test]
    fn unparseable_default_directive_falls_back_instead_of_panicking() {
        init_with_default("not a directive !!");

        // The pipeline's debug events must be emittable regardless of which
        // subscriber won the install race.
        tracing::debug!(
            from = "00:00:00.000",
            to = "00:00:01.000",
            prompt = "",
            "transcribing window"
        );
    }
}
