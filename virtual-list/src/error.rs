/// A configuration value that the engines will clamp to a safe default.
///
/// Construction never fails: options are normalized silently. Call `validate()` on the options
/// if you want to surface these to a log or a developer overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("estimated extent must be positive (0 is clamped to 1)")]
    ZeroEstimate,
    #[error("column count must be positive (0 is clamped to 1)")]
    ZeroColumnCount,
    #[error("column item width must be positive (0 is clamped to 1)")]
    ZeroItemWidth,
}
