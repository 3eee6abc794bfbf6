//! Security-feature policy
//!
//! Turns a set of implemented security features into the no-vulnerability
//! probability used by the generator. The core never looks at features
//! itself; it only receives the derived probability through a
//! `ProbabilityPolicy`.
//!
//! Feature weights are illustrative exposure reductions. Exposure can never
//! drop below 0.05: no ECU is fully secure.

use rand::Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Lowest residual exposure reachable through security features (0.05).
pub const EXPOSURE_FLOOR: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Decimal places kept after each reduction step.
const EXPOSURE_DP: u32 = 2;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Unknown security feature: {0}")]
    UnknownFeature(String),

    #[error("Security feature enabled twice: {0}")]
    DuplicateFeature(SecurityFeature),

    #[error("Features {first} and {second} are mutually exclusive ({group})")]
    ConflictingFeatures {
        group: FeatureGroup,
        first: SecurityFeature,
        second: SecurityFeature,
    },
}

// ── Policy seam ─────────────────────────────────────────────────────

/// Derives the effective no-vulnerability probability for a run.
pub trait ProbabilityPolicy: fmt::Debug {
    fn derive(&self, no_vuln_probability: f64) -> f64;
}

/// Uses the configured probability unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl ProbabilityPolicy for Baseline {
    fn derive(&self, no_vuln_probability: f64) -> f64 {
        no_vuln_probability
    }
}

// ── Feature catalogue ───────────────────────────────────────────────

/// Mutually exclusive feature groups. At most one member may be enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureGroup {
    JtagLock,
    SecureDiagnostics,
    Firewall,
}

impl FeatureGroup {
    pub fn members(&self) -> &'static [SecurityFeature] {
        match self {
            FeatureGroup::JtagLock => &[
                SecurityFeature::JtagLockSharedPassword,
                SecurityFeature::JtagLockPerEcuPassword,
            ],
            FeatureGroup::SecureDiagnostics => &[
                SecurityFeature::SecureDiagnosticsSecurityAccess,
                SecurityFeature::SecureDiagnosticsAuthenticated,
            ],
            FeatureGroup::Firewall => &[
                SecurityFeature::FirewallWhitelist,
                SecurityFeature::FirewallBlacklist,
            ],
        }
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureGroup::JtagLock => "JTAG lock",
            FeatureGroup::SecureDiagnostics => "secure diagnostics",
            FeatureGroup::Firewall => "firewall",
        };
        f.write_str(name)
    }
}

/// One catalogue entry as seen by selection: a standalone feature or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogueEntry {
    Single(SecurityFeature),
    Group(FeatureGroup),
}

/// Catalogue order, used for automatic selection and for applying reductions.
const CATALOGUE: [CatalogueEntry; 13] = [
    CatalogueEntry::Single(SecurityFeature::IntrusionDetection),
    CatalogueEntry::Single(SecurityFeature::IntrusionPrevention),
    CatalogueEntry::Single(SecurityFeature::SecureBoot),
    CatalogueEntry::Single(SecurityFeature::SecureFlashing),
    CatalogueEntry::Single(SecurityFeature::SecureUpdates),
    CatalogueEntry::Single(SecurityFeature::SecureCommunication),
    CatalogueEntry::Group(FeatureGroup::JtagLock),
    CatalogueEntry::Group(FeatureGroup::SecureDiagnostics),
    CatalogueEntry::Single(SecurityFeature::HsmKeyStorage),
    CatalogueEntry::Group(FeatureGroup::Firewall),
    CatalogueEntry::Single(SecurityFeature::AiFirewallAdaptation),
    CatalogueEntry::Single(SecurityFeature::RealTimeAttackAdaptation),
    CatalogueEntry::Single(SecurityFeature::FleetLearning),
];

/// Security feature that may be implemented on an ECU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityFeature {
    IntrusionDetection,
    IntrusionPrevention,
    SecureBoot,
    SecureFlashing,
    /// Secure over-the-air updates
    SecureUpdates,
    /// SecOC message authentication
    SecureCommunication,
    JtagLockSharedPassword,
    JtagLockPerEcuPassword,
    /// UDS 0x27 SecurityAccess
    SecureDiagnosticsSecurityAccess,
    /// UDS 0x29 Authentication
    SecureDiagnosticsAuthenticated,
    HsmKeyStorage,
    FirewallWhitelist,
    FirewallBlacklist,
    AiFirewallAdaptation,
    RealTimeAttackAdaptation,
    FleetLearning,
}

impl SecurityFeature {
    pub const ALL: [SecurityFeature; 16] = [
        SecurityFeature::IntrusionDetection,
        SecurityFeature::IntrusionPrevention,
        SecurityFeature::SecureBoot,
        SecurityFeature::SecureFlashing,
        SecurityFeature::SecureUpdates,
        SecurityFeature::SecureCommunication,
        SecurityFeature::JtagLockSharedPassword,
        SecurityFeature::JtagLockPerEcuPassword,
        SecurityFeature::SecureDiagnosticsSecurityAccess,
        SecurityFeature::SecureDiagnosticsAuthenticated,
        SecurityFeature::HsmKeyStorage,
        SecurityFeature::FirewallWhitelist,
        SecurityFeature::FirewallBlacklist,
        SecurityFeature::AiFirewallAdaptation,
        SecurityFeature::RealTimeAttackAdaptation,
        SecurityFeature::FleetLearning,
    ];

    /// Exposure removed by this feature.
    pub fn reduction(&self) -> Decimal {
        let thousandths = match self {
            SecurityFeature::IntrusionDetection => 20,
            SecurityFeature::IntrusionPrevention => 20,
            SecurityFeature::SecureBoot => 60,
            SecurityFeature::SecureFlashing => 60,
            SecurityFeature::SecureUpdates => 50,
            SecurityFeature::SecureCommunication => 50,
            SecurityFeature::JtagLockSharedPassword => 15,
            SecurityFeature::JtagLockPerEcuPassword => 25,
            SecurityFeature::SecureDiagnosticsSecurityAccess => 15,
            SecurityFeature::SecureDiagnosticsAuthenticated => 25,
            SecurityFeature::HsmKeyStorage => 50,
            SecurityFeature::FirewallWhitelist => 60,
            SecurityFeature::FirewallBlacklist => 40,
            SecurityFeature::AiFirewallAdaptation => 70,
            SecurityFeature::RealTimeAttackAdaptation => 90,
            SecurityFeature::FleetLearning => 70,
        };
        Decimal::new(thousandths, 3)
    }

    /// Exclusive group this feature belongs to, if any.
    pub fn group(&self) -> Option<FeatureGroup> {
        match self {
            SecurityFeature::JtagLockSharedPassword | SecurityFeature::JtagLockPerEcuPassword => {
                Some(FeatureGroup::JtagLock)
            }
            SecurityFeature::SecureDiagnosticsSecurityAccess
            | SecurityFeature::SecureDiagnosticsAuthenticated => Some(FeatureGroup::SecureDiagnostics),
            SecurityFeature::FirewallWhitelist | SecurityFeature::FirewallBlacklist => {
                Some(FeatureGroup::Firewall)
            }
            _ => None,
        }
    }

    /// Short name accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            SecurityFeature::IntrusionDetection => "ids",
            SecurityFeature::IntrusionPrevention => "ips",
            SecurityFeature::SecureBoot => "secure-boot",
            SecurityFeature::SecureFlashing => "secure-flashing",
            SecurityFeature::SecureUpdates => "secure-ota",
            SecurityFeature::SecureCommunication => "secoc",
            SecurityFeature::JtagLockSharedPassword => "jtag-shared-password",
            SecurityFeature::JtagLockPerEcuPassword => "jtag-per-ecu-password",
            SecurityFeature::SecureDiagnosticsSecurityAccess => "uds-security-access",
            SecurityFeature::SecureDiagnosticsAuthenticated => "uds-authentication",
            SecurityFeature::HsmKeyStorage => "hsm",
            SecurityFeature::FirewallWhitelist => "firewall-whitelist",
            SecurityFeature::FirewallBlacklist => "firewall-blacklist",
            SecurityFeature::AiFirewallAdaptation => "ai-firewall",
            SecurityFeature::RealTimeAttackAdaptation => "realtime-adaptation",
            SecurityFeature::FleetLearning => "fleet-learning",
        }
    }
}

impl fmt::Display for SecurityFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SecurityFeature {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SecurityFeature::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PolicyError::UnknownFeature(s.to_string()))
    }
}

/// The set of features enabled on the simulated ECUs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureCatalogue {
    enabled: Vec<SecurityFeature>,
}

impl FeatureCatalogue {
    /// Enable an explicit list of features.
    ///
    /// Rejects duplicates and more than one member of an exclusive group.
    pub fn new(features: impl IntoIterator<Item = SecurityFeature>) -> Result<Self, PolicyError> {
        let mut enabled: Vec<SecurityFeature> = Vec::new();
        for feature in features {
            if enabled.contains(&feature) {
                return Err(PolicyError::DuplicateFeature(feature));
            }
            if let Some(group) = feature.group() {
                if let Some(first) = enabled.iter().find(|f| f.group() == Some(group)) {
                    return Err(PolicyError::ConflictingFeatures {
                        group,
                        first: *first,
                        second: feature,
                    });
                }
            }
            enabled.push(feature);
        }
        Ok(Self { enabled })
    }

    /// Random feature selection: each standalone feature on a fair coin, each
    /// group picks uniformly among "none" and its members.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut enabled = Vec::new();
        for entry in CATALOGUE {
            match entry {
                CatalogueEntry::Single(feature) => {
                    if rng.gen_bool(0.5) {
                        enabled.push(feature);
                    }
                }
                CatalogueEntry::Group(group) => {
                    let members = group.members();
                    let pick = rng.gen_range(0..=members.len());
                    if pick > 0 {
                        enabled.push(members[pick - 1]);
                    }
                }
            }
        }
        Self { enabled }
    }

    pub fn enabled(&self) -> &[SecurityFeature] {
        &self.enabled
    }

    /// Exposure left after applying every enabled feature to `base`.
    ///
    /// Each step subtracts one reduction, rounds to two decimals and then
    /// clamps at the floor. A step never raises exposure, so an unrounded
    /// `base` below the floor comes back unchanged.
    pub fn residual_exposure(&self, base: Decimal) -> Decimal {
        let floor = EXPOSURE_FLOOR.min(base);
        self.enabled.iter().fold(base, |exposure, feature| {
            (exposure - feature.reduction())
                .round_dp(EXPOSURE_DP)
                .max(floor)
                .min(exposure)
        })
    }
}

impl ProbabilityPolicy for FeatureCatalogue {
    /// `1 - residual_exposure(1 - p)`
    fn derive(&self, no_vuln_probability: f64) -> f64 {
        let p = Decimal::from_f64(no_vuln_probability)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO)
            .min(Decimal::ONE);
        let exposure = self.residual_exposure(Decimal::ONE - p);
        let derived = (Decimal::ONE - exposure).to_f64().unwrap_or(no_vuln_probability);

        let names: Vec<&str> = self.enabled.iter().map(|f| f.name()).collect();
        info!(
            features = ?names,
            base = no_vuln_probability,
            %exposure,
            derived,
            "Security features applied"
        );
        derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_baseline_passthrough() {
        assert_eq!(Baseline.derive(0.42), 0.42);
    }

    #[test]
    fn test_no_features_keeps_probability() {
        let catalogue = FeatureCatalogue::default();
        assert_eq!(catalogue.derive(0.0), 0.0);
        assert_eq!(catalogue.derive(0.7), 0.7);
    }

    #[test]
    fn test_reductions_from_unprotected_ecu() {
        let catalogue = FeatureCatalogue::new([
            SecurityFeature::SecureBoot,
            SecurityFeature::HsmKeyStorage,
            SecurityFeature::JtagLockPerEcuPassword,
        ])
        .unwrap();
        // 1.0 - 0.06 - 0.05 - 0.025 = 0.865 -> rounded per step: 0.94, 0.89, 0.865 -> 0.86
        assert_eq!(catalogue.residual_exposure(Decimal::ONE), d("0.86"));
        assert!((catalogue.derive(0.0) - 0.14).abs() < 1e-9);
    }

    #[test]
    fn test_exposure_floor() {
        let all_singles: Vec<SecurityFeature> = SecurityFeature::ALL
            .into_iter()
            .filter(|f| f.group().is_none())
            .collect();
        let catalogue = FeatureCatalogue::new(all_singles).unwrap();
        assert_eq!(catalogue.residual_exposure(d("0.3")), EXPOSURE_FLOOR);
        // Floor never raises exposure above its starting point
        assert_eq!(catalogue.residual_exposure(d("0.01")), d("0.01"));
    }

    #[test]
    fn test_conflicting_group_members_rejected() {
        let err = FeatureCatalogue::new([
            SecurityFeature::FirewallWhitelist,
            SecurityFeature::SecureBoot,
            SecurityFeature::FirewallBlacklist,
        ])
        .unwrap_err();
        assert_eq!(
            err,
            PolicyError::ConflictingFeatures {
                group: FeatureGroup::Firewall,
                first: SecurityFeature::FirewallWhitelist,
                second: SecurityFeature::FirewallBlacklist,
            }
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = FeatureCatalogue::new([SecurityFeature::SecureBoot, SecurityFeature::SecureBoot])
            .unwrap_err();
        assert_eq!(err, PolicyError::DuplicateFeature(SecurityFeature::SecureBoot));
    }

    #[test]
    fn test_parse_feature_names() {
        for feature in SecurityFeature::ALL {
            assert_eq!(feature.name().parse::<SecurityFeature>().unwrap(), feature);
        }
        assert!(matches!(
            "quantum-shield".parse::<SecurityFeature>(),
            Err(PolicyError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_random_selection_respects_groups() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..200 {
            let catalogue = FeatureCatalogue::random(&mut rng);
            // Re-validating a random selection must succeed
            assert!(FeatureCatalogue::new(catalogue.enabled().iter().copied()).is_ok());
            let derived = catalogue.derive(0.0);
            assert!((0.0..=0.95).contains(&derived));
        }
    }

    #[test]
    fn test_derived_probability_never_below_input() {
        let catalogue = FeatureCatalogue::new([SecurityFeature::IntrusionDetection]).unwrap();
        for p in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert!(catalogue.derive(p) >= p - 1e-9);
        }
    }

    #[test]
    fn test_unrounded_probability_near_one_kept() {
        // 1 - 0.954 = 0.046 sits below the floor and must not round up to 0.05
        let catalogue = FeatureCatalogue::new([SecurityFeature::IntrusionDetection]).unwrap();
        assert_eq!(catalogue.residual_exposure(d("0.046")), d("0.046"));
        assert!(catalogue.derive(0.954) >= 0.954 - 1e-9);
        assert!(catalogue.derive(0.9999) >= 0.9999 - 1e-9);
    }
}
