//! Projection placement policy
//!
//! Chooses which display receives the projection surface and where the
//! surface goes. Precedence (first match wins):
//! 1. the remembered device id (case-insensitive, ignored when empty)
//! 2. the first non-primary display
//! 3. the primary display
//! 4. the first display reported
//!
//! An empty monitor list resolves to a windowed fallback region instead of
//! an error; projection must keep working with a misbehaving display stack.

use serde::Serialize;

use crate::config;
use crate::monitors::{MonitorDescriptor, Rect};

/// Which precedence tier picked the target display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionReason {
    Preferred,
    Secondary,
    Primary,
    FirstAvailable,
}

impl std::fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            SelectionReason::Preferred => "preferred monitor",
            SelectionReason::Secondary => "first secondary monitor",
            SelectionReason::Primary => "primary monitor",
            SelectionReason::FirstAvailable => "first available monitor",
        };
        write!(f, "{}", value)
    }
}

/// Select the projection target along with the tier that matched.
pub fn select_target_with_reason<'a>(
    monitors: &'a [MonitorDescriptor],
    preferred_device_id: &str,
) -> Option<(&'a MonitorDescriptor, SelectionReason)> {
    let preferred = preferred_device_id.trim();
    if !preferred.is_empty() {
        if let Some(m) = monitors.iter().find(|m| m.matches_device_id(preferred)) {
            return Some((m, SelectionReason::Preferred));
        }
        tracing::debug!(
            preferred = %preferred,
            "Preferred monitor not connected, falling through"
        );
    }

    if let Some(m) = monitors.iter().find(|m| !m.is_primary) {
        return Some((m, SelectionReason::Secondary));
    }

    if let Some(m) = monitors.iter().find(|m| m.is_primary) {
        return Some((m, SelectionReason::Primary));
    }

    monitors
        .first()
        .map(|m| (m, SelectionReason::FirstAvailable))
}

/// Select the display that should receive projection.
pub fn select_target<'a>(
    monitors: &'a [MonitorDescriptor],
    preferred_device_id: &str,
) -> Option<&'a MonitorDescriptor> {
    select_target_with_reason(monitors, preferred_device_id).map(|(m, _)| m)
}

/// Geometry of the projection surface over `descriptor`: its exact bounds.
pub fn compute_geometry(descriptor: &MonitorDescriptor) -> Rect {
    descriptor.bounds
}

/// Region used when no display could be resolved
pub fn fallback_geometry() -> Rect {
    Rect::from(config::window::FALLBACK_REGION)
}

/// Resolved placement of the projection surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Borderless, topmost, exactly covering a display
    Monitor {
        device_id: String,
        reason: SelectionReason,
        rect: Rect,
    },
    /// Windowed default used when no display is known
    Fallback { rect: Rect },
}

impl Placement {
    pub fn rect(&self) -> Rect {
        match self {
            Placement::Monitor { rect, .. } | Placement::Fallback { rect } => *rect,
        }
    }

    pub fn borderless_topmost(&self) -> bool {
        matches!(self, Placement::Monitor { .. })
    }

    pub fn device_id(&self) -> Option<&str> {
        match self {
            Placement::Monitor { device_id, .. } => Some(device_id),
            Placement::Fallback { .. } => None,
        }
    }
}

/// Resolve where the projection surface goes for this monitor snapshot.
pub fn resolve_placement(monitors: &[MonitorDescriptor], preferred_device_id: &str) -> Placement {
    match select_target_with_reason(monitors, preferred_device_id) {
        Some((monitor, reason)) => {
            let rect = compute_geometry(monitor);
            tracing::info!(
                device_id = %monitor.device_id,
                reason = %reason,
                rect = %rect,
                "Projection target selected"
            );
            Placement::Monitor {
                device_id: monitor.device_id.clone(),
                reason,
                rect,
            }
        }
        None => {
            let rect = fallback_geometry();
            tracing::warn!(rect = %rect, "No monitors available, using windowed fallback");
            Placement::Fallback { rect }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: &str, primary: bool, bounds: (i32, i32, u32, u32)) -> MonitorDescriptor {
        MonitorDescriptor::new(id, primary, Rect::from(bounds))
    }

    #[test]
    fn test_whitespace_preference_is_ignored() {
        let monitors = vec![
            monitor("A", true, (0, 0, 1920, 1080)),
            monitor("B", false, (1920, 0, 1280, 720)),
        ];
        let (m, reason) = select_target_with_reason(&monitors, "   ").unwrap();
        assert_eq!(m.device_id, "B");
        assert_eq!(reason, SelectionReason::Secondary);
    }

    #[test]
    fn test_all_primary_picks_first_primary() {
        // Every display reports primary: tier 3 picks the first primary
        let monitors = vec![
            monitor("A", true, (0, 0, 100, 100)),
            monitor("B", true, (100, 0, 100, 100)),
        ];
        let (m, reason) = select_target_with_reason(&monitors, "").unwrap();
        assert_eq!(m.device_id, "A");
        assert_eq!(reason, SelectionReason::Primary);
    }

    #[test]
    fn test_placement_accessors() {
        let monitors = vec![monitor("A", true, (0, 0, 1920, 1080))];
        let placement = resolve_placement(&monitors, "");
        assert!(placement.borderless_topmost());
        assert_eq!(placement.device_id(), Some("A"));
        assert_eq!(placement.rect(), Rect::new(0, 0, 1920, 1080));

        let fallback = resolve_placement(&[], "A");
        assert!(!fallback.borderless_topmost());
        assert_eq!(fallback.device_id(), None);
        assert_eq!(fallback.rect(), Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn test_placement_serializes_with_kind_tag() {
        let placement = Placement::Fallback {
            rect: Rect::new(0, 0, 800, 600),
        };
        let value = serde_json::to_value(&placement).unwrap();
        assert_eq!(value["kind"], "fallback");
        assert_eq!(value["rect"]["width"], 800);
    }
}
