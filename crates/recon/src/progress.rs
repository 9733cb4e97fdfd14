use std::fmt;

/// Observational progress signal. Consuming it is optional; results never depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A pipeline step starting or finishing.
    Stage(String),
    /// Geometry scan position.
    Scanning { done: usize, total: usize },
}

impl ProgressEvent {
    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }

    /// Scan completion in whole percent. 0 for an empty scan.
    pub fn percent(&self) -> Option<usize> {
        match self {
            Self::Scanning { done, total } if *total > 0 => Some(done * 100 / total),
            Self::Scanning { .. } => Some(0),
            Self::Stage(_) => None,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage(msg) => write!(f, "{msg}"),
            Self::Scanning { done, total } => write!(
                f,
                "Processing features: {}% ({done}/{total})",
                self.percent().unwrap_or(0)
            ),
        }
    }
}

/// Sink that drops every event.
pub fn discard(_event: ProgressEvent) {}
