use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Snapshot of the manual nodata controls of the stretch panel: the
/// "use nodata" checkbox, whether the value field is enabled, and its text.
///
/// The override only takes effect when both controls are on and the text
/// parses as a number; otherwise the band's declared nodata is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodataOverride {
    pub checked: bool,
    pub field_enabled: bool,
    pub text: String,
}

impl NodataOverride {
    /// Override that is switched on with the given text
    pub fn enabled(text: impl Into<String>) -> Self {
        Self {
            checked: true,
            field_enabled: true,
            text: text.into(),
        }
    }

    /// Override that is switched off
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.checked && self.field_enabled
    }

    /// The override value, when active and well-formed
    pub fn value(&self) -> Option<f64> {
        if !self.is_active() {
            return None;
        }
        self.text.trim().parse::<f64>().ok()
    }

    /// Effective nodata: the override when usable, else `declared`
    pub fn resolve(&self, declared: Option<f64>) -> Option<f64> {
        if !self.is_active() {
            return declared;
        }
        match self.value() {
            Some(v) => {
                debug!("Using nodata override {} (declared: {:?})", v, declared);
                Some(v)
            }
            None => {
                warn!(
                    "Ignoring nodata override '{}': not a number; using declared nodata {:?}",
                    self.text, declared
                );
                declared
            }
        }
    }
}
