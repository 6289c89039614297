use crate::models::ConsultationPackage;

/// Duration applied when a package is chosen without picking one explicitly.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Durations offered by the wizard.
pub const OFFERED_DURATIONS: [i64; 3] = [30, 45, 60];

/// Price for a duration: base price scaled by duration/30, truncated to a
/// whole amount. Durations that are not multiples of 30 produce fractional
/// multipliers (45 min → 1.5×) before truncation.
pub fn price_for_duration(base_price: i64, duration_minutes: i64) -> i64 {
    let multiplier = duration_minutes as f64 / 30.0;
    (base_price as f64 * multiplier) as i64
}

pub fn package_catalog() -> Vec<ConsultationPackage> {
    vec![
        ConsultationPackage {
            id: "messaging".to_string(),
            name: "Messaging".to_string(),
            description: "Chat messages with doctor".to_string(),
            base_price: 20,
        },
        ConsultationPackage {
            id: "voice".to_string(),
            name: "Voice Call".to_string(),
            description: "Voice call with doctor".to_string(),
            base_price: 40,
        },
        ConsultationPackage {
            id: "video".to_string(),
            name: "Video Call".to_string(),
            description: "Video call with doctor".to_string(),
            base_price: 60,
        },
    ]
}

pub fn find_package(id: &str) -> Option<ConsultationPackage> {
    package_catalog().into_iter().find(|package| package.id == id)
}
